//! Error types for the hook dispatch system
//!
//! All errors use the `thiserror` crate. The taxonomy separates
//! registration-time contract violations (duplicate specifications, signature
//! mismatches) from call-time failures (an implementation raising mid-chain).
//!
//! # Error Handling Patterns
//!
//! 1. **Registration errors** are returned to the registrant immediately and
//!    never silently swallowed.
//!
//! 2. **Call-time implementation errors** abort the remaining non-wrapper
//!    chain and propagate to the caller after wrapper post-phases have had a
//!    chance to observe or suppress them. They carry the owning plugin's
//!    identity so operators can disable or fix a misbehaving plugin.
//!
//! 3. **Finish-style hooks** never let one plugin's failure hide another
//!    plugin's chance to clean up: failures are collected during the sweep and
//!    reported together as [`HooksError::AggregateFinish`].
//!
//! 4. **Deliberate cancellation** is a distinguished sentinel, not a generic
//!    failure: an implementation failing with [`EarlyStop`] surfaces as
//!    [`HooksError::EarlyStop`] for the host lifecycle to check explicitly.

use thiserror::Error;

/// Opaque failure produced by a plugin callable
///
/// The core never interprets these beyond checking for the [`EarlyStop`]
/// sentinel; they are wrapped with the owning plugin's identity before they
/// reach the caller.
pub type PluginError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Sentinel error a plugin raises to request deliberate cancellation
///
/// The dispatcher surfaces this as [`HooksError::EarlyStop`] instead of
/// [`HooksError::Implementation`], so the host can distinguish "a plugin asked
/// to stop" from "a plugin broke" without special-casing the dispatch path.
///
/// # Examples
///
/// ```ignore
/// use hydrocal_hooks::EarlyStop;
///
/// return Err(EarlyStop::new("objective converged").into());
/// ```
#[derive(Debug, Error)]
#[error("early stop: {reason}")]
pub struct EarlyStop {
    /// Human-readable reason for stopping
    pub reason: String,
}

impl EarlyStop {
    /// Create a new early-stop request
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A single implementation failure, with the offending plugin's identity
#[derive(Debug, Error)]
#[error("plugin '{owner}' failed in hook '{hook}': {cause}")]
pub struct ImplementationFailure {
    /// Hook specification name being dispatched
    pub hook: String,

    /// Identity of the plugin that registered the failing implementation
    pub owner: String,

    /// The original error raised by the implementation
    pub cause: PluginError,
}

/// Errors that can occur in the hook dispatch system
#[derive(Debug, Error)]
pub enum HooksError {
    /// Call or registration against an unregistered specification name
    #[error("unknown hook: {0}")]
    UnknownHook(String),

    /// A specification with this name is already registered
    #[error("hook specification already registered: {0}")]
    DuplicateSpecification(String),

    /// The specification itself violates its own contract
    ///
    /// Common causes: duplicate parameter names, or a finish-style hook
    /// declared with `FirstResult` aggregation.
    #[error("invalid hook specification '{name}': {reason}")]
    InvalidSpecification {
        /// Specification name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// An implementation declared a parameter its specification does not have
    #[error(
        "implementation by '{owner}' does not match hook '{hook}': \
         parameter '{parameter}' is not part of the specification"
    )]
    SignatureMismatch {
        /// Hook specification name
        hook: String,
        /// Registering plugin identity
        owner: String,
        /// The undeclared parameter
        parameter: String,
    },

    /// A wrapper implementation targeted a specification that forbids wrappers
    #[error("hook '{hook}' does not permit wrapper implementations (from '{owner}')")]
    WrapperNotAllowed {
        /// Hook specification name
        hook: String,
        /// Registering plugin identity
        owner: String,
    },

    /// A plugin with this identity is already registered
    #[error("plugin already registered: {0}")]
    DuplicatePlugin(String),

    /// A required parameter was not supplied at call time
    #[error("missing required argument '{parameter}' for hook '{hook}'")]
    MissingArgument {
        /// Hook specification name
        hook: String,
        /// The absent required parameter
        parameter: String,
    },

    /// An implementation raised during a call
    #[error(transparent)]
    Implementation(#[from] ImplementationFailure),

    /// One or more implementations failed during a finish-style call
    ///
    /// Every registered implementation still ran; the failures are reported
    /// together after the full sweep.
    #[error("{} implementation(s) failed during finish hook '{hook}'", failures.len())]
    AggregateFinish {
        /// Hook specification name
        hook: String,
        /// Each collected failure, in execution order
        failures: Vec<ImplementationFailure>,
    },

    /// A plugin requested deliberate cancellation via the [`EarlyStop`] sentinel
    #[error("early stop requested: {0}")]
    EarlyStop(String),

    /// Internal registry bookkeeping failed (e.g. a poisoned memo lock)
    #[error("registry error: {0}")]
    Registry(String),
}

/// Result type for hook dispatch operations
pub type Result<T> = std::result::Result<T, HooksError>;
