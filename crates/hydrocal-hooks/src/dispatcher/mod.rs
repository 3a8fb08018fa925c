//! Hook call dispatcher
//!
//! Executes the ordered implementation chain for one call, applying the
//! specification's aggregation policy and wrapper semantics:
//!
//! 1. required arguments are checked up front;
//! 2. wrapper pre-phases open outermost-first (a pre-phase may short-circuit
//!    the whole call, or fail like any implementation);
//! 3. the non-wrapper chain runs in computed order, each implementation
//!    receiving only its accepted arguments;
//! 4. wrapper post-phases close innermost-first, observing the result or the
//!    propagated error — a post-phase may transform the outcome or suppress
//!    an error;
//! 5. the final outcome returns to the caller.
//!
//! An implementation error halts the remaining non-wrapper chain immediately
//! and propagates outward through the still-open post-phases. Finish-style
//! hooks are the exception: every implementation runs, failures are collected,
//! and an aggregate error is reported after the full sweep.
//!
//! Dispatch is synchronous and single-threaded: a call runs to completion
//! before returning, and an implementation is free to trigger another,
//! unrelated dispatch re-entrantly on the ordinary call stack.

use tracing::{debug, error, warn};

use crate::error::{EarlyStop, HooksError, ImplementationFailure, PluginError, Result};
use crate::ordering::ImplementationChain;
use crate::plugin::{HookTarget, WrapperControl};
use crate::registry::RegisteredImpl;
use crate::types::{Aggregation, CallArgs, DispatchOutcome, HookSpec};

/// Execute one hook call against a resolved chain snapshot
///
/// The caller has already resolved `spec` and `chain`; the snapshot is
/// immutable for the duration of the call, so registration changes made from
/// inside an implementation take effect on the next call only. Most hosts go
/// through [`PluginManager::call`](crate::manager::PluginManager::call), which
/// performs both resolutions.
pub fn dispatch(
    spec: &HookSpec,
    chain: &ImplementationChain,
    args: &CallArgs,
) -> Result<DispatchOutcome> {
    for parameter in spec.parameters.iter().filter(|p| p.required) {
        if !args.contains(&parameter.name) {
            return Err(HooksError::MissingArgument {
                hook: spec.name.clone(),
                parameter: parameter.name.clone(),
            });
        }
    }

    debug!(
        hook = %spec.name,
        callees = chain.callee_count(),
        wrappers = chain.wrapper_count(),
        finish = spec.finish,
        "dispatching hook call"
    );

    if spec.finish {
        // Wrappers are rejected at registration for finish-style hooks, so
        // the sweep only ever sees the callee chain.
        return run_finish_sweep(spec, chain, args);
    }

    // Open wrapper pre-phases outermost-first. A short-circuiting or failing
    // pre-phase stops descent; wrappers opened so far still close normally.
    let mut opened = Vec::with_capacity(chain.wrapper_count());
    let mut short_circuit = None;
    for registered in &chain.wrappers {
        let wrapper = match &registered.target {
            HookTarget::Wrapper(wrapper) => wrapper,
            HookTarget::Standard(_) => continue,
        };
        let wrapper_args = args.project(&registered.accepted);
        match wrapper.before(&wrapper_args) {
            Ok(WrapperControl::Continue) => opened.push((wrapper, wrapper_args)),
            Ok(WrapperControl::ShortCircuit(outcome)) => {
                debug!(hook = %spec.name, owner = %registered.owner, "wrapper short-circuited call");
                short_circuit = Some(Ok(outcome));
                break;
            }
            Err(cause) => {
                short_circuit = Some(Err(classify(&spec.name, &registered.owner, cause)));
                break;
            }
        }
    }

    let mut outcome = match short_circuit {
        Some(outcome) => outcome,
        None => run_chain(spec, chain, args),
    };

    // Close post-phases innermost-first; each observes the current outcome
    // and may transform it or suppress an error.
    for (wrapper, wrapper_args) in opened.into_iter().rev() {
        outcome = wrapper.after(&wrapper_args, outcome);
    }

    outcome
}

/// Run the non-wrapper chain under the spec's aggregation policy
fn run_chain(
    spec: &HookSpec,
    chain: &ImplementationChain,
    args: &CallArgs,
) -> Result<DispatchOutcome> {
    let mut collected = Vec::new();

    for registered in &chain.callees {
        let value = match invoke(registered, args) {
            Ok(value) => value,
            Err(cause) => return Err(classify(&spec.name, &registered.owner, cause)),
        };

        match (value, spec.aggregation) {
            (Some(value), Aggregation::FirstResult) => {
                debug!(hook = %spec.name, owner = %registered.owner, "first present result");
                return Ok(DispatchOutcome::Single(Some(value)));
            }
            (Some(value), Aggregation::All) => collected.push(value),
            (None, _) => {}
        }
    }

    Ok(match spec.aggregation {
        Aggregation::FirstResult => DispatchOutcome::Single(None),
        Aggregation::All => DispatchOutcome::Collected(collected),
    })
}

/// Finish-style sweep: every implementation runs, failures are aggregated
///
/// The triggering operation's own error, if any, arrives as an ordinary
/// argument value supplied by the host — it is not re-raised here. Failures
/// raised by the implementations themselves (including `EarlyStop`, which has
/// nothing left to cancel during teardown) are collected and reported
/// together once the sweep is complete.
fn run_finish_sweep(
    spec: &HookSpec,
    chain: &ImplementationChain,
    args: &CallArgs,
) -> Result<DispatchOutcome> {
    let mut collected = Vec::new();
    let mut failures = Vec::new();

    for registered in &chain.callees {
        match invoke(registered, args) {
            Ok(Some(value)) => collected.push(value),
            Ok(None) => {}
            Err(cause) => {
                warn!(
                    hook = %spec.name,
                    owner = %registered.owner,
                    error = %cause,
                    "finish hook implementation failed; continuing sweep"
                );
                failures.push(ImplementationFailure {
                    hook: spec.name.clone(),
                    owner: registered.owner.clone(),
                    cause,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(DispatchOutcome::Collected(collected))
    } else {
        Err(HooksError::AggregateFinish {
            hook: spec.name.clone(),
            failures,
        })
    }
}

/// Invoke one standard implementation with its accepted argument subset
fn invoke(
    registered: &RegisteredImpl,
    args: &CallArgs,
) -> std::result::Result<Option<serde_json::Value>, PluginError> {
    match &registered.target {
        HookTarget::Standard(callable) => callable.invoke(&args.project(&registered.accepted)),
        HookTarget::Wrapper(_) => Ok(None),
    }
}

/// Wrap a plugin failure with its owner identity, or surface the sentinel
fn classify(hook: &str, owner: &str, cause: PluginError) -> HooksError {
    if let Some(stop) = cause.downcast_ref::<EarlyStop>() {
        debug!(hook, owner, reason = %stop.reason, "implementation requested early stop");
        return HooksError::EarlyStop(stop.reason.clone());
    }

    error!(hook, owner, error = %cause, "hook implementation failed");
    HooksError::Implementation(ImplementationFailure {
        hook: hook.to_string(),
        owner: owner.to_string(),
        cause,
    })
}
