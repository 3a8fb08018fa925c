//! Call ordering engine
//!
//! Computes the invocation order for a hook from its registration history and
//! priority modifiers:
//!
//! - implementations are partitioned into `First` / `Normal` / `Last` buckets;
//! - within a bucket the later-registered implementation runs first — a stack
//!   discipline, so late-loaded customizations can observe and override the
//!   effects of defaults when side-effect order matters;
//! - the final order is the `First` bucket, then `Normal`, then `Last`.
//!
//! Wrappers and non-wrappers are ordered independently as separate chains.
//! Among wrappers the same ordering applies, and the wrapper ordered first
//! becomes the outermost scope around the non-wrapper chain.
//!
//! The computed chain is memoized per hook by the implementation registry and
//! recomputed lazily after any mutation of that hook's implementations.

use std::cmp::Reverse;

use crate::registry::implementations::RegisteredImpl;

/// The derived execution order for one hook
///
/// An immutable snapshot: the dispatcher holds it (via `Arc`) for the whole
/// duration of a call, so registry mutations during the call cannot corrupt
/// the in-flight iteration. They take effect on the next call.
#[derive(Debug, Default)]
pub struct ImplementationChain {
    /// Non-wrapper implementations, in call order
    pub(crate) callees: Vec<RegisteredImpl>,

    /// Wrapper implementations, outermost first
    pub(crate) wrappers: Vec<RegisteredImpl>,
}

impl ImplementationChain {
    /// Number of non-wrapper implementations
    pub fn callee_count(&self) -> usize {
        self.callees.len()
    }

    /// Number of wrapper implementations
    pub fn wrapper_count(&self) -> usize {
        self.wrappers.len()
    }

    /// Owners of the non-wrapper chain, in call order (diagnostics)
    pub fn callee_owners(&self) -> Vec<&str> {
        self.callees.iter().map(|r| r.owner.as_str()).collect()
    }
}

/// Compute the execution order for a hook's registered implementations
pub(crate) fn compute_chain(registered: &[RegisteredImpl]) -> ImplementationChain {
    let (wrappers, callees): (Vec<_>, Vec<_>) = registered
        .iter()
        .cloned()
        .partition(|r| r.target.is_wrapper());

    ImplementationChain {
        callees: order(callees),
        wrappers: order(wrappers),
    }
}

/// Priority buckets in declaration order, last-registered-first within each
fn order(mut impls: Vec<RegisteredImpl>) -> Vec<RegisteredImpl> {
    impls.sort_by_key(|r| (r.priority, Reverse(r.seq)));
    impls
}
