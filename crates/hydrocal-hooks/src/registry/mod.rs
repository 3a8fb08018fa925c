//! Specification and implementation registries
//!
//! Two registries back the dispatch core:
//!
//! 1. **Specification registry** ([`SpecRegistry`]): the set of known hook
//!    contracts. A name registers at most once.
//! 2. **Implementation registry** ([`ImplementationRegistry`]): per hook name,
//!    the ordered set of registered callables plus their modifiers, and the
//!    memoized [`ImplementationChain`](crate::ordering::ImplementationChain)
//!    derived from them.
//!
//! Registration is validated here, at registration time: an implementation
//! whose accepted parameters are not a subset of its specification's
//! parameters is rejected before it can ever be called.

pub mod implementations;
pub mod specs;

pub use implementations::{ImplementationRegistry, RegisteredImpl};
pub use specs::SpecRegistry;
