//! Hook implementation registry with memoized chain cache

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{HooksError, Result};
use crate::ordering::{self, ImplementationChain};
use crate::plugin::{HookTarget, ImplementationDef};
use crate::types::{HookSpec, Priority};

/// One registered implementation record
///
/// Owned exclusively by the registry; the dispatcher only ever sees records
/// through an immutable [`ImplementationChain`] snapshot.
#[derive(Debug, Clone)]
pub struct RegisteredImpl {
    /// Identity of the plugin that registered this implementation
    pub(crate) owner: String,

    /// Subset of the specification's parameters this implementation consumes
    pub(crate) accepted: Vec<String>,

    /// Call-order priority
    pub(crate) priority: Priority,

    /// Registration sequence number, the tie-break within a priority bucket
    pub(crate) seq: u64,

    /// The callable payload
    pub(crate) target: HookTarget,
}

impl RegisteredImpl {
    /// Identity of the registering plugin
    pub fn owner(&self) -> &str {
        &self.owner
    }
}

/// Registry of hook implementations, keyed by hook name
///
/// Stores, per hook, the ordered registration history, and memoizes the
/// derived [`ImplementationChain`]. Mutation (`&mut self`) invalidates the
/// memo for the touched hook; the next dispatch recomputes it lazily.
///
/// The memo lives behind an `RwLock` only so that [`chain`](Self::chain) can
/// fill it from `&self`; registration versus dispatch serialization is the
/// caller's responsibility, as mutation requires `&mut self`.
#[derive(Debug, Default)]
pub struct ImplementationRegistry {
    by_hook: HashMap<String, Vec<RegisteredImpl>>,
    chains: RwLock<HashMap<String, Arc<ImplementationChain>>>,
    next_seq: u64,
}

impl ImplementationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation against its resolved specification
    ///
    /// The manager facade resolves `spec` from `def.hook` before calling this;
    /// a definition naming a different hook than the supplied specification is
    /// rejected rather than filed under the wrong contract.
    ///
    /// # Errors
    ///
    /// - [`HooksError::UnknownHook`] if `def.hook` does not name `spec`
    /// - [`HooksError::SignatureMismatch`] if any accepted parameter is not
    ///   part of the specification
    /// - [`HooksError::WrapperNotAllowed`] if a wrapper targets a finish-style
    ///   specification (a finish sweep must run every implementation exactly
    ///   once, which nested scopes cannot guarantee)
    pub fn add(&mut self, spec: &HookSpec, owner: String, def: ImplementationDef) -> Result<()> {
        if spec.name != def.hook {
            return Err(HooksError::UnknownHook(def.hook));
        }

        if let Some(unknown) = def.accepted.iter().find(|name| !spec.has_parameter(name)) {
            return Err(HooksError::SignatureMismatch {
                hook: spec.name.clone(),
                owner,
                parameter: unknown.clone(),
            });
        }

        if spec.finish && def.target.is_wrapper() {
            return Err(HooksError::WrapperNotAllowed {
                hook: spec.name.clone(),
                owner,
            });
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        debug!(
            hook = %spec.name,
            owner = %owner,
            priority = ?def.priority,
            wrapper = def.target.is_wrapper(),
            seq,
            "registered hook implementation"
        );

        self.by_hook
            .entry(spec.name.clone())
            .or_default()
            .push(RegisteredImpl {
                owner,
                accepted: def.accepted,
                priority: def.priority,
                seq,
                target: def.target,
            });
        self.invalidate(&spec.name)?;
        Ok(())
    }

    /// Remove all implementations registered by `owner` for `hook`
    ///
    /// A no-op returning `Ok(0)` when nothing matches — removal is idempotent,
    /// unlike registration.
    pub fn remove(&mut self, hook: &str, owner: &str) -> Result<usize> {
        let removed = match self.by_hook.get_mut(hook) {
            Some(impls) => {
                let before = impls.len();
                impls.retain(|r| r.owner != owner);
                before - impls.len()
            }
            None => 0,
        };

        if removed > 0 {
            debug!(hook, owner, removed, "removed hook implementations");
            self.invalidate(hook)?;
        }
        Ok(removed)
    }

    /// Remove every implementation registered by `owner`, across all hooks
    pub fn remove_owner(&mut self, owner: &str) -> Result<usize> {
        let mut removed = 0;
        let mut touched = Vec::new();
        for (hook, impls) in &mut self.by_hook {
            let before = impls.len();
            impls.retain(|r| r.owner != owner);
            let delta = before - impls.len();
            if delta > 0 {
                removed += delta;
                touched.push(hook.clone());
            }
        }
        for hook in touched {
            self.invalidate(&hook)?;
        }
        if removed > 0 {
            debug!(owner, removed, "unregistered plugin implementations");
        }
        Ok(removed)
    }

    /// Whether `owner` has any implementation registered, on any hook
    pub fn is_registered(&self, owner: &str) -> bool {
        self.by_hook
            .values()
            .any(|impls| impls.iter().any(|r| r.owner == owner))
    }

    /// Number of implementations registered for `hook`
    pub fn count(&self, hook: &str) -> usize {
        self.by_hook.get(hook).map_or(0, Vec::len)
    }

    /// Resolve the memoized chain for `hook`, recomputing it if stale
    ///
    /// Returns an immutable snapshot the dispatcher holds for one whole call.
    pub fn chain(&self, hook: &str) -> Result<Arc<ImplementationChain>> {
        {
            let chains = self
                .chains
                .read()
                .map_err(|e| HooksError::Registry(format!("chain memo lock poisoned: {e}")))?;
            if let Some(chain) = chains.get(hook) {
                return Ok(Arc::clone(chain));
            }
        }

        let registered = self.by_hook.get(hook).map_or(&[][..], Vec::as_slice);
        let chain = Arc::new(ordering::compute_chain(registered));

        let mut chains = self
            .chains
            .write()
            .map_err(|e| HooksError::Registry(format!("chain memo lock poisoned: {e}")))?;
        chains.insert(hook.to_string(), Arc::clone(&chain));
        Ok(chain)
    }

    /// Drop the memoized chain for `hook`; recomputed on next dispatch
    fn invalidate(&mut self, hook: &str) -> Result<()> {
        self.chains
            .get_mut()
            .map_err(|e| HooksError::Registry(format!("chain memo lock poisoned: {e}")))?
            .remove(hook);
        Ok(())
    }
}
