//! Plugin manager facade
//!
//! Ties the specification registry, implementation registry, and dispatcher
//! together behind the two surfaces the host consumes:
//!
//! - the **registration API** (`register_specification`, `add_implementation`,
//!   `remove_implementations`, `register_plugin`, `unregister_plugin`), driven
//!   by the plugin loader collaborator;
//! - the **call API** (`call`), driven by the host lifecycle at its defined
//!   points (startup, per-iteration, shutdown/finish).
//!
//! Registration requires `&mut self`; dispatch takes `&self`. A host embedding
//! the manager in a multi-threaded environment must serialize mutation against
//! concurrent calls itself — the core defines no locking of its own beyond the
//! chain memo.

use tracing::{debug, info};

use crate::dispatcher;
use crate::error::{HooksError, Result};
use crate::plugin::{HookPlugin, ImplementationDef};
use crate::registry::{ImplementationRegistry, SpecRegistry};
use crate::types::{CallArgs, DispatchOutcome, HookSpec};

/// The hook dispatch core's public entry point
///
/// # Examples
///
/// ```ignore
/// use hydrocal_hooks::{
///     Aggregation, CallArgs, HookResult, HookSpec, ImplementationDef,
///     ParameterSpec, PluginManager,
/// };
/// use serde_json::json;
///
/// let mut manager = PluginManager::new();
/// manager.register_specification(
///     HookSpec::new("sum", Aggregation::All)
///         .with_parameter(ParameterSpec::required("a", "int")),
/// )?;
///
/// manager.add_implementation(
///     "adder",
///     ImplementationDef::standard("sum", &["a"], |args: &CallArgs| -> HookResult {
///         let a = args.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
///         Ok(Some(json!(a + 1)))
///     }),
/// )?;
///
/// let outcome = manager.call("sum", &CallArgs::new().with("a", json!(5)))?;
/// assert_eq!(outcome.into_collected(), vec![json!(6)]);
/// # Ok::<(), hydrocal_hooks::HooksError>(())
/// ```
#[derive(Debug, Default)]
pub struct PluginManager {
    specs: SpecRegistry,
    impls: ImplementationRegistry,
}

impl PluginManager {
    /// Create a manager with no specifications or implementations
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook specification
    ///
    /// # Errors
    ///
    /// See [`SpecRegistry::register`].
    pub fn register_specification(&mut self, spec: HookSpec) -> Result<()> {
        self.specs.register(spec)
    }

    /// Look up a registered specification by name
    pub fn specification(&self, name: &str) -> Option<&HookSpec> {
        self.specs.lookup(name)
    }

    /// Register a single implementation under an owner identity
    ///
    /// # Errors
    ///
    /// - [`HooksError::UnknownHook`] if `def.hook` names no registered
    ///   specification
    /// - [`HooksError::SignatureMismatch`] / [`HooksError::WrapperNotAllowed`]
    ///   per [`ImplementationRegistry::add`]
    pub fn add_implementation(
        &mut self,
        owner: impl Into<String>,
        def: ImplementationDef,
    ) -> Result<()> {
        let spec = self
            .specs
            .lookup(&def.hook)
            .ok_or_else(|| HooksError::UnknownHook(def.hook.clone()))?;
        self.impls.add(spec, owner.into(), def)
    }

    /// Remove all of `owner`'s implementations for one hook
    ///
    /// Not an error when nothing matches; returns the number removed.
    pub fn remove_implementations(&mut self, hook: &str, owner: &str) -> Result<usize> {
        self.impls.remove(hook, owner)
    }

    /// Register every implementation a plugin declares
    ///
    /// Validates the plugin's whole declaration set; on any failure the
    /// partially registered implementations are rolled back, so a plugin is
    /// either fully registered or not at all.
    ///
    /// # Errors
    ///
    /// - [`HooksError::DuplicatePlugin`] if the plugin's name is already
    ///   registered
    /// - any per-implementation registration error
    pub fn register_plugin(&mut self, plugin: &dyn HookPlugin) -> Result<usize> {
        let owner = plugin.name().to_string();
        if self.impls.is_registered(&owner) {
            return Err(HooksError::DuplicatePlugin(owner));
        }

        let defs = plugin.implementations();
        let count = defs.len();
        for def in defs {
            if let Err(err) = self.add_implementation(owner.clone(), def) {
                self.impls.remove_owner(&owner)?;
                return Err(err);
            }
        }

        info!(plugin = %owner, implementations = count, "registered plugin");
        Ok(count)
    }

    /// Remove every implementation a plugin registered, across all hooks
    ///
    /// Returns the number removed; zero when the plugin was not registered.
    pub fn unregister_plugin(&mut self, owner: &str) -> Result<usize> {
        let removed = self.impls.remove_owner(owner)?;
        if removed > 0 {
            info!(plugin = %owner, implementations = removed, "unregistered plugin");
        }
        Ok(removed)
    }

    /// Whether a plugin identity has any registered implementation
    pub fn is_registered(&self, owner: &str) -> bool {
        self.impls.is_registered(owner)
    }

    /// Number of implementations currently registered for `hook`
    pub fn implementation_count(&self, hook: &str) -> usize {
        self.impls.count(hook)
    }

    /// Dispatch one hook call
    ///
    /// Resolves the specification and the (possibly memoized) implementation
    /// chain, then runs the chain under the spec's aggregation and wrapper
    /// semantics. The chain snapshot is held for the whole call, so
    /// registration changes made during the call take effect next call.
    ///
    /// Takes `&self`: an implementation may re-entrantly dispatch another,
    /// unrelated hook as ordinary call-stack nesting.
    ///
    /// # Errors
    ///
    /// - [`HooksError::UnknownHook`] if no such specification exists
    /// - [`HooksError::MissingArgument`] if a required parameter is absent
    /// - [`HooksError::Implementation`] / [`HooksError::AggregateFinish`] /
    ///   [`HooksError::EarlyStop`] per the dispatch rules
    pub fn call(&self, hook: &str, args: &CallArgs) -> Result<DispatchOutcome> {
        let spec = self
            .specs
            .lookup(hook)
            .ok_or_else(|| HooksError::UnknownHook(hook.to_string()))?;
        let chain = self.impls.chain(hook)?;
        debug!(hook, arguments = args.len(), "hook call");
        dispatcher::dispatch(spec, &chain, args)
    }
}
