//! Hydrocal Hooks System
//!
//! Hook specification registry and dispatch core: lets independently authored
//! plugins intercept and extend the calibration host's lifecycle without the
//! host knowing about them at compile time.
//!
//! # Overview
//!
//! The host registers named *hook specifications* describing a call contract
//! (parameters and result-aggregation policy). Plugins supply
//! *implementations* of those specifications. A call invokes all matching
//! implementations in a well-defined order, aggregates their results, and
//! reports failures deterministically — including "wrapper" implementations
//! that run code both before and after the rest of the chain.
//!
//! # Architecture
//!
//! The system consists of four main components:
//!
//! 1. **Specification Registry** (`registry::specs`): the known hook contracts
//! 2. **Implementation Registry** (`registry::implementations`): per hook, the
//!    registered callables plus their modifiers and the memoized call chain
//! 3. **Call Ordering Engine** (`ordering`): priority buckets with a
//!    later-registered-first tie-break, wrappers ordered as a separate chain
//! 4. **Dispatcher** (`dispatcher`): executes the chain for one call with
//!    aggregation and wrapper semantics
//!
//! [`PluginManager`] ties them together behind the registration and call APIs.
//! The plugin loader and configuration parsing are external collaborators: the
//! core only invokes opaque callables with JSON-valued arguments.
//!
//! # Quick Start
//!
//! ```ignore
//! use hydrocal_hooks::{
//!     Aggregation, CallArgs, HookResult, HookSpec, ImplementationDef,
//!     ParameterSpec, PluginManager,
//! };
//! use serde_json::json;
//!
//! let mut manager = PluginManager::new();
//!
//! manager.register_specification(
//!     HookSpec::new("sum", Aggregation::All)
//!         .with_parameter(ParameterSpec::required("a", "int")),
//! )?;
//!
//! manager.add_implementation(
//!     "my-plugin",
//!     ImplementationDef::standard("sum", &["a"], |args: &CallArgs| -> HookResult {
//!         let a = args.get("a").and_then(|v| v.as_i64()).unwrap_or(0);
//!         Ok(Some(json!(a + 1)))
//!     }),
//! )?;
//!
//! let outcome = manager.call("sum", &CallArgs::new().with("a", json!(5)))?;
//! assert_eq!(outcome.into_collected(), vec![json!(6)]);
//! # Ok::<(), hydrocal_hooks::HooksError>(())
//! ```
//!
//! # Ordering
//!
//! Implementations carry a [`Priority`] (`First` / `Normal` / `Last`). Within
//! a priority the later-registered implementation runs first, a stack
//! discipline that lets late-loaded customizations observe and override the
//! defaults' effects. Wrappers nest around the non-wrapper chain, the
//! last-registered highest-priority wrapper outermost.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, HooksError>`. An implementation error halts the
//! remaining chain and propagates outward through open wrapper post-phases —
//! which may observe, transform, or deliberately suppress it. Finish-style
//! hooks instead run every implementation and report collected failures as
//! one aggregate, so no plugin's cleanup is hidden by another's failure. A
//! plugin can request deliberate cancellation with the [`EarlyStop`] sentinel.
//!
//! # Concurrency
//!
//! Dispatch is synchronous, single-threaded call-chain semantics; nesting is
//! ordinary re-entrant stack behavior. Registration (`&mut self`) versus
//! dispatch (`&self`) is serialized by the borrow rules; hosts embedding the
//! manager behind shared ownership must provide their own mutual exclusion.

pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod ordering;
pub mod plugin;
pub mod registry;
pub mod types;

// Re-export public types
pub use error::{EarlyStop, HooksError, ImplementationFailure, PluginError, Result};
pub use lifecycle::{
    register_lifecycle_specs, CAL_FINISH, CAL_MODEL_CONFIGURE, CAL_MODEL_ITERATION_FINISH,
    CAL_MODEL_OUTPUT, CAL_START,
};
pub use manager::PluginManager;
pub use ordering::ImplementationChain;
pub use plugin::{
    HookCallable, HookPlugin, HookResult, HookTarget, HookWrapper, ImplementationDef,
    WrapperControl,
};
pub use registry::{ImplementationRegistry, SpecRegistry};
pub use types::{
    Aggregation, CallArgs, DispatchOutcome, HookSpec, ParameterSpec, Priority,
};
