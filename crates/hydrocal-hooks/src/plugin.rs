//! Plugin-facing contracts
//!
//! A plugin offers implementations of known hook specifications. Instead of
//! runtime metaprogramming ("decorate a method to register it"), the contract
//! is explicit: a plugin declares, per operation, which specification it
//! implements, which of that specification's parameters it consumes, its
//! priority, and whether it is a wrapper. The registry validates all of this
//! at registration time, not at call time.
//!
//! # Examples
//!
//! A plugin supplying a fallback model-output reader:
//!
//! ```ignore
//! use hydrocal_hooks::{
//!     CallArgs, HookPlugin, HookResult, ImplementationDef, Priority,
//! };
//! use serde_json::json;
//!
//! struct CsvOutputReader;
//!
//! impl HookPlugin for CsvOutputReader {
//!     fn name(&self) -> &str {
//!         "csv-output-reader"
//!     }
//!
//!     fn implementations(&self) -> Vec<ImplementationDef> {
//!         vec![
//!             // Registered trylast so externally provided readers win.
//!             ImplementationDef::standard("cal_model_output", &["id"], |args: &CallArgs| {
//!                 Ok(Some(json!({ "series": [], "id": args.get("id").cloned() })))
//!             })
//!             .with_priority(Priority::Last),
//!         ]
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{PluginError, Result};
use crate::types::{CallArgs, DispatchOutcome, Priority};

/// Result type returned by plugin callables
///
/// `Ok(None)` is an absent result: under `All` aggregation it is omitted from
/// the collected values, under `FirstResult` the chain continues past it.
pub type HookResult = std::result::Result<Option<Value>, PluginError>;

/// A standard (non-wrapper) hook implementation
///
/// The callable is opaque to the core: it receives the call arguments already
/// projected down to its accepted parameter subset and returns a present or
/// absent value, or fails.
///
/// Implemented for any matching `Fn` closure, so plain functions and captures
/// both work without a wrapper type.
pub trait HookCallable: Send + Sync {
    /// Invoke the implementation with its accepted arguments
    fn invoke(&self, args: &CallArgs) -> HookResult;
}

impl<F> HookCallable for F
where
    F: Fn(&CallArgs) -> HookResult + Send + Sync,
{
    fn invoke(&self, args: &CallArgs) -> HookResult {
        self(args)
    }
}

/// Decision returned by a wrapper's pre-phase
pub enum WrapperControl {
    /// Delegate to the rest of the chain (the normal case)
    Continue,

    /// Do not delegate; supply the call's eventual outcome directly
    ///
    /// The short-circuiting wrapper's own post-phase is not invoked; wrappers
    /// already opened outside it still close normally and observe this
    /// outcome.
    ShortCircuit(DispatchOutcome),
}

/// A wrapper hook implementation
///
/// Wrappers run code both before and after the rest of the chain for one
/// call, nested like scopes: the wrapper ordered first becomes the outermost
/// scope. The pre-phase may short-circuit; the post-phase observes the inner
/// outcome (result or error) and may pass it through, transform it, or
/// suppress an error by returning `Ok` — suppression is a deliberate design
/// affordance, not a bug.
///
/// Both phases receive the call arguments projected to the wrapper's accepted
/// parameter subset. The post-phase of a delegating wrapper runs exactly once
/// per call, success or error.
pub trait HookWrapper: Send + Sync {
    /// Pre-phase, entered outermost-first before the non-wrapper chain runs
    fn before(&self, args: &CallArgs) -> std::result::Result<WrapperControl, PluginError> {
        let _ = args;
        Ok(WrapperControl::Continue)
    }

    /// Post-phase, closed innermost-first with the inner outcome
    fn after(&self, args: &CallArgs, outcome: Result<DispatchOutcome>) -> Result<DispatchOutcome> {
        let _ = args;
        outcome
    }
}

/// The callable payload of an implementation: standard or wrapper
#[derive(Clone)]
pub enum HookTarget {
    /// Ordinary chain member
    Standard(Arc<dyn HookCallable>),

    /// Nested-scope wrapper around the chain
    Wrapper(Arc<dyn HookWrapper>),
}

impl HookTarget {
    /// Whether this target is a wrapper
    pub fn is_wrapper(&self) -> bool {
        matches!(self, HookTarget::Wrapper(_))
    }
}

impl fmt::Debug for HookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookTarget::Standard(_) => f.write_str("HookTarget::Standard"),
            HookTarget::Wrapper(_) => f.write_str("HookTarget::Wrapper"),
        }
    }
}

/// One declared implementation a plugin offers for a hook specification
///
/// This is what the plugin loader collaborator feeds into the registry once it
/// has resolved a plugin identifier to a concrete object and introspected its
/// declared operations against known specification names.
#[derive(Debug, Clone)]
pub struct ImplementationDef {
    /// Name of the hook specification this implements
    pub hook: String,

    /// Subset of the specification's parameters actually consumed
    pub accepted: Vec<String>,

    /// Call-order priority
    pub priority: Priority,

    /// The callable itself
    pub target: HookTarget,
}

impl ImplementationDef {
    /// Declare a standard implementation at `Normal` priority
    pub fn standard<C>(hook: impl Into<String>, accepted: &[&str], callable: C) -> Self
    where
        C: HookCallable + 'static,
    {
        Self {
            hook: hook.into(),
            accepted: accepted.iter().map(|s| (*s).to_string()).collect(),
            priority: Priority::Normal,
            target: HookTarget::Standard(Arc::new(callable)),
        }
    }

    /// Declare a wrapper implementation at `Normal` priority
    pub fn wrapper<W>(hook: impl Into<String>, accepted: &[&str], wrapper: W) -> Self
    where
        W: HookWrapper + 'static,
    {
        Self {
            hook: hook.into(),
            accepted: accepted.iter().map(|s| (*s).to_string()).collect(),
            priority: Priority::Normal,
            target: HookTarget::Wrapper(Arc::new(wrapper)),
        }
    }

    /// Override the priority, builder style
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// A plugin: a named provider of zero or more hook implementations
///
/// The loader resolves a plugin identifier to an object implementing this
/// trait, then registers everything it declares. The name is the plugin's
/// identity for diagnostics, duplicate detection, and bulk unregistration.
pub trait HookPlugin: Send + Sync {
    /// Stable identity of this plugin
    fn name(&self) -> &str;

    /// The implementations this plugin offers
    fn implementations(&self) -> Vec<ImplementationDef>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_closure_implements_hook_callable() {
        let callable = |args: &CallArgs| -> HookResult {
            let a = args.get("a").and_then(Value::as_i64).unwrap_or(0);
            Ok(Some(json!(a + 1)))
        };
        let args = CallArgs::new().with("a", json!(41));
        assert_eq!(callable.invoke(&args).unwrap(), Some(json!(42)));
    }

    #[test]
    fn test_default_wrapper_phases_pass_through() {
        struct Passive;
        impl HookWrapper for Passive {}

        let args = CallArgs::new();
        assert!(matches!(
            Passive.before(&args).unwrap(),
            WrapperControl::Continue
        ));
        let outcome = Passive
            .after(&args, Ok(DispatchOutcome::Single(Some(json!(1)))))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Single(Some(json!(1))));
    }

    #[test]
    fn test_standard_def_defaults_to_normal_priority() {
        let def = ImplementationDef::standard("sum", &["a"], |_: &CallArgs| -> HookResult {
            Ok(None)
        });
        assert_eq!(def.priority, Priority::Normal);
        assert!(!def.target.is_wrapper());

        let def = def.with_priority(Priority::Last);
        assert_eq!(def.priority, Priority::Last);
    }
}
