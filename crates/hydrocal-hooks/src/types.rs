//! Core data types for the hook dispatch system
//!
//! This module defines the data structures that describe extension points and
//! the values flowing through a dispatch: hook specifications, their
//! parameters, aggregation policies, call arguments, and dispatch outcomes.
//!
//! # Examples
//!
//! Describing an extension point:
//!
//! ```ignore
//! use hydrocal_hooks::{Aggregation, HookSpec, ParameterSpec};
//!
//! let spec = HookSpec {
//!     name: "cal_model_output".to_string(),
//!     parameters: vec![ParameterSpec::required("id", "string")],
//!     aggregation: Aggregation::FirstResult,
//!     finish: false,
//! };
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result-aggregation policy of a hook specification
///
/// Decides what the dispatcher does with the values produced by the
/// implementation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Collect every present result, in call order
    All,

    /// Stop at the first implementation returning a present value
    FirstResult,
}

/// Call-order priority of a hook implementation
///
/// `First` implementations run before all `Normal` ones, which run before all
/// `Last` ones, regardless of registration time. Within the same priority the
/// later-registered implementation runs first.
///
/// The derived ordering is the bucket order used by the call ordering engine,
/// so the variant declaration order is load-bearing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Run before the normal bucket ("tryfirst")
    First,

    /// Default position in the chain
    #[default]
    Normal,

    /// Run after the normal bucket ("trylast")
    Last,
}

/// One parameter of a hook specification
///
/// The `ty` field is a free-form semantic type label ("string", "int",
/// "object", ...) used only for diagnostics; argument values themselves are
/// opaque JSON values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name, unique within the specification
    pub name: String,

    /// Semantic type label for diagnostics
    pub ty: String,

    /// Whether callers must supply this parameter on every dispatch
    pub required: bool,
}

impl ParameterSpec {
    /// Create a required parameter
    pub fn required(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            required: true,
        }
    }

    /// Create an opt-in parameter that callers may omit
    pub fn optional(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            required: false,
        }
    }
}

/// A hook specification: the named contract of one extension point
///
/// A specification describes the parameters implementations may consume and
/// the result-aggregation policy applied when the hook is called. Names are
/// unique; re-registering an existing name fails.
///
/// Finish-style specifications (`finish: true`) guarantee that every
/// registered implementation is invoked even when earlier ones fail; failures
/// are collected and reported together after the full sweep. Finish-style
/// specifications must use [`Aggregation::All`] and do not permit wrapper
/// implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSpec {
    /// Unique specification name
    pub name: String,

    /// Ordered parameter contract
    pub parameters: Vec<ParameterSpec>,

    /// Result-aggregation policy
    pub aggregation: Aggregation,

    /// Whether this is a finish-style hook (all implementations always run)
    #[serde(default)]
    pub finish: bool,
}

impl HookSpec {
    /// Create a specification with no parameters
    pub fn new(name: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            aggregation,
            finish: false,
        }
    }

    /// Append a parameter to the contract
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Mark this specification as a finish-style hook
    #[must_use]
    pub fn finish_style(mut self) -> Self {
        self.finish = true;
        self
    }

    /// Whether `name` is one of this specification's parameters
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.name == name)
    }
}

/// The concrete argument values supplied for one dispatch call
///
/// Keyed by parameter name. Created per call and discarded after the call
/// returns; the dispatcher projects it down to each implementation's accepted
/// parameter subset before invoking it.
///
/// # Examples
///
/// ```ignore
/// use hydrocal_hooks::CallArgs;
/// use serde_json::json;
///
/// let args = CallArgs::new().with("a", json!(5)).with("label", json!("x"));
/// assert_eq!(args.get("a"), Some(&json!(5)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: BTreeMap<String, Value>,
}

impl CallArgs {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, builder style
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Add or replace an argument
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Look up an argument by parameter name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether an argument is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of arguments present
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments are present
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the (name, value) pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Project this argument set down to the accepted parameter subset
    ///
    /// Arguments for parameters an implementation did not declare are not
    /// passed to it.
    pub(crate) fn project(&self, accepted: &[String]) -> CallArgs {
        let values = accepted
            .iter()
            .filter_map(|name| {
                self.values
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect();
        CallArgs { values }
    }
}

/// The aggregated result of one dispatch call
///
/// Under [`Aggregation::FirstResult`] a single optional value; under
/// [`Aggregation::All`] the ordered sequence of collected present values in
/// execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// First present value, if any implementation produced one
    Single(Option<Value>),

    /// Every present value, in execution order
    Collected(Vec<Value>),
}

impl DispatchOutcome {
    /// The single value of a `FirstResult` dispatch, if present
    ///
    /// Applied to a `Collected` outcome this returns the first collected
    /// value: the implementations ran in call order, so the head of the
    /// collection is the value a `FirstResult` dispatch of the same chain
    /// would have produced. Callers that must not conflate the two modes
    /// should match on the variant instead.
    pub fn into_single(self) -> Option<Value> {
        match self {
            DispatchOutcome::Single(value) => value,
            DispatchOutcome::Collected(mut values) => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.remove(0))
                }
            }
        }
    }

    /// The collected values of an `All` dispatch
    pub fn into_collected(self) -> Vec<Value> {
        match self {
            DispatchOutcome::Single(value) => value.into_iter().collect(),
            DispatchOutcome::Collected(values) => values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_bucket_order() {
        assert!(Priority::First < Priority::Normal);
        assert!(Priority::Normal < Priority::Last);
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_call_args_project_filters_unaccepted() {
        let args = CallArgs::new()
            .with("a", json!(1))
            .with("b", json!(2))
            .with("c", json!(3));

        let projected = args.project(&["a".to_string(), "c".to_string()]);
        assert_eq!(projected.len(), 2);
        assert_eq!(projected.get("a"), Some(&json!(1)));
        assert_eq!(projected.get("c"), Some(&json!(3)));
        assert!(!projected.contains("b"));
    }

    #[test]
    fn test_call_args_project_skips_absent() {
        let args = CallArgs::new().with("a", json!(1));
        let projected = args.project(&["a".to_string(), "missing".to_string()]);
        assert_eq!(projected.len(), 1);
    }

    #[test]
    fn test_spec_has_parameter() {
        let spec = HookSpec::new("sum", Aggregation::All)
            .with_parameter(ParameterSpec::required("a", "int"));
        assert!(spec.has_parameter("a"));
        assert!(!spec.has_parameter("b"));
    }

    #[test]
    fn test_outcome_accessors() {
        let single = DispatchOutcome::Single(Some(json!(7)));
        assert_eq!(single.into_single(), Some(json!(7)));

        let collected = DispatchOutcome::Collected(vec![json!(1), json!(2)]);
        assert_eq!(collected.into_collected(), vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_into_single_across_variants() {
        // On a collected outcome the head value stands in for the
        // first-result winner; empty collections yield no value.
        let collected = DispatchOutcome::Collected(vec![json!("head"), json!("tail")]);
        assert_eq!(collected.into_single(), Some(json!("head")));
        assert_eq!(DispatchOutcome::Collected(vec![]).into_single(), None);

        let single = DispatchOutcome::Single(Some(json!(1)));
        assert_eq!(single.into_collected(), vec![json!(1)]);
    }

    #[test]
    fn test_spec_serde_round_trip() {
        let spec = HookSpec::new("cal_finish", Aggregation::All)
            .with_parameter(ParameterSpec::optional("exception", "string"))
            .finish_style();

        let text = serde_json::to_string(&spec).unwrap();
        let back: HookSpec = serde_json::from_str(&text).unwrap();
        assert_eq!(back.name, "cal_finish");
        assert!(back.finish);
        assert_eq!(back.aggregation, Aggregation::All);
    }
}
