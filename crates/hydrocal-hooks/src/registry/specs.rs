//! Hook specification registry

use std::collections::HashMap;

use tracing::debug;

use crate::error::{HooksError, Result};
use crate::types::{Aggregation, HookSpec};

/// Registry of known hook specifications
///
/// Stores the named call contracts that implementations register against.
/// Specification names are unique; registering a name twice fails with
/// [`HooksError::DuplicateSpecification`] rather than silently replacing the
/// earlier contract.
#[derive(Debug, Default)]
pub struct SpecRegistry {
    specs: HashMap<String, HookSpec>,
}

impl SpecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook specification
    ///
    /// # Errors
    ///
    /// - [`HooksError::DuplicateSpecification`] if the name is already present
    /// - [`HooksError::InvalidSpecification`] if parameter names are not
    ///   unique, or a finish-style specification uses `FirstResult`
    ///   aggregation (a finish sweep always runs every implementation, so
    ///   first-result semantics cannot apply)
    pub fn register(&mut self, spec: HookSpec) -> Result<()> {
        for (i, parameter) in spec.parameters.iter().enumerate() {
            if spec.parameters[..i].iter().any(|p| p.name == parameter.name) {
                return Err(HooksError::InvalidSpecification {
                    name: spec.name.clone(),
                    reason: format!("duplicate parameter name '{}'", parameter.name),
                });
            }
        }

        if spec.finish && spec.aggregation == Aggregation::FirstResult {
            return Err(HooksError::InvalidSpecification {
                name: spec.name.clone(),
                reason: "finish-style hooks must use 'all' aggregation".to_string(),
            });
        }

        if self.specs.contains_key(&spec.name) {
            return Err(HooksError::DuplicateSpecification(spec.name));
        }

        debug!(
            hook = %spec.name,
            aggregation = ?spec.aggregation,
            finish = spec.finish,
            parameters = spec.parameters.len(),
            "registered hook specification"
        );
        self.specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Look up a specification by name; no side effects
    pub fn lookup(&self, name: &str) -> Option<&HookSpec> {
        self.specs.get(name)
    }

    /// Number of registered specifications
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether no specifications are registered
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParameterSpec;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SpecRegistry::new();
        let spec = HookSpec::new("cal_start", Aggregation::All)
            .with_parameter(ParameterSpec::required("meta", "object"));

        registry.register(spec).unwrap();

        let found = registry.lookup("cal_start").unwrap();
        assert_eq!(found.parameters.len(), 1);
        assert!(registry.lookup("cal_stop").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = SpecRegistry::new();
        registry
            .register(HookSpec::new("cal_start", Aggregation::All))
            .unwrap();

        let err = registry
            .register(HookSpec::new("cal_start", Aggregation::FirstResult))
            .unwrap_err();
        assert!(matches!(err, HooksError::DuplicateSpecification(name) if name == "cal_start"));

        // The first registration is still intact.
        assert_eq!(
            registry.lookup("cal_start").unwrap().aggregation,
            Aggregation::All
        );
    }

    #[test]
    fn test_duplicate_parameter_names_rejected() {
        let mut registry = SpecRegistry::new();
        let spec = HookSpec::new("sum", Aggregation::All)
            .with_parameter(ParameterSpec::required("a", "int"))
            .with_parameter(ParameterSpec::optional("a", "string"));

        let err = registry.register(spec).unwrap_err();
        assert!(matches!(err, HooksError::InvalidSpecification { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_finish_style_requires_all_aggregation() {
        let mut registry = SpecRegistry::new();
        let spec = HookSpec::new("cal_finish", Aggregation::FirstResult).finish_style();

        let err = registry.register(spec).unwrap_err();
        assert!(matches!(err, HooksError::InvalidSpecification { .. }));
    }
}
