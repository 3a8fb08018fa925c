//! End-to-end test of the calibration lifecycle over the hook core
//!
//! Drives the standard lifecycle specifications the way the host calibration
//! loop would: configure, start, per-iteration output retrieval and
//! bookkeeping, then the guaranteed finish sweep after a simulated failure.

use std::sync::{Arc, Mutex};

use serde_json::json;

use hydrocal_hooks::{
    register_lifecycle_specs, CallArgs, DispatchOutcome, EarlyStop, HookPlugin, HookResult,
    HooksError, ImplementationDef, PluginManager, Priority, CAL_FINISH, CAL_MODEL_CONFIGURE,
    CAL_MODEL_ITERATION_FINISH, CAL_MODEL_OUTPUT,
};

/// Built-in output reader: captures configuration, serves model output as the
/// trylast fallback so externally provided readers win
struct RoutingOutputReader {
    captured_config: Arc<Mutex<Option<serde_json::Value>>>,
}

impl HookPlugin for RoutingOutputReader {
    fn name(&self) -> &str {
        "routing-output-reader"
    }

    fn implementations(&self) -> Vec<ImplementationDef> {
        let captured = Arc::clone(&self.captured_config);
        vec![
            ImplementationDef::standard(
                CAL_MODEL_CONFIGURE,
                &["config"],
                move |args: &CallArgs| -> HookResult {
                    *captured.lock().unwrap() = args.get("config").cloned();
                    Ok(None)
                },
            ),
            ImplementationDef::standard(
                CAL_MODEL_OUTPUT,
                &["id"],
                |args: &CallArgs| -> HookResult {
                    let id = args.get("id").and_then(|v| v.as_str()).unwrap_or("");
                    Ok(Some(json!({ "id": id, "source": "fallback" })))
                },
            )
            .with_priority(Priority::Last),
        ]
    }
}

/// Per-iteration archiver plus a cleanup step that runs during finish
struct IterationArchiver {
    archived: Arc<Mutex<Vec<i64>>>,
    finished: Arc<Mutex<bool>>,
}

impl HookPlugin for IterationArchiver {
    fn name(&self) -> &str {
        "iteration-archiver"
    }

    fn implementations(&self) -> Vec<ImplementationDef> {
        let archived = Arc::clone(&self.archived);
        let finished = Arc::clone(&self.finished);
        vec![
            ImplementationDef::standard(
                CAL_MODEL_ITERATION_FINISH,
                &["iteration", "workdir"],
                move |args: &CallArgs| -> HookResult {
                    let iteration = args
                        .get("iteration")
                        .and_then(|v| v.as_i64())
                        .unwrap_or(-1);
                    archived.lock().unwrap().push(iteration);
                    Ok(None)
                },
            )
            .with_priority(Priority::Last),
            ImplementationDef::standard(
                CAL_FINISH,
                &["exception"],
                move |_: &CallArgs| -> HookResult {
                    *finished.lock().unwrap() = true;
                    Ok(None)
                },
            ),
        ]
    }
}

fn lifecycle_manager() -> PluginManager {
    let mut manager = PluginManager::new();
    register_lifecycle_specs(&mut manager).unwrap();
    manager
}

#[test]
fn test_configure_then_output_with_fallback_reader() {
    let captured = Arc::new(Mutex::new(None));
    let mut manager = lifecycle_manager();
    manager
        .register_plugin(&RoutingOutputReader {
            captured_config: Arc::clone(&captured),
        })
        .unwrap();

    let config = json!({ "plugin_settings": { "routing": { "output": "flow.csv" } } });
    manager
        .call(
            CAL_MODEL_CONFIGURE,
            &CallArgs::new().with("config", config.clone()),
        )
        .unwrap();
    assert_eq!(captured.lock().unwrap().as_ref(), Some(&config));

    let outcome = manager
        .call(CAL_MODEL_OUTPUT, &CallArgs::new().with("id", json!("nex-42")))
        .unwrap();
    assert_eq!(
        outcome.into_single().unwrap()["source"],
        json!("fallback")
    );
}

#[test]
fn test_external_reader_preempts_fallback() {
    let mut manager = lifecycle_manager();
    manager
        .register_plugin(&RoutingOutputReader {
            captured_config: Arc::new(Mutex::new(None)),
        })
        .unwrap();

    // An externally provided reader at Normal priority runs before the
    // built-in Last-priority fallback and wins the first-result race.
    manager
        .add_implementation(
            "external-reader",
            ImplementationDef::standard(CAL_MODEL_OUTPUT, &["id"], |_: &CallArgs| -> HookResult {
                Ok(Some(json!({ "source": "external" })))
            }),
        )
        .unwrap();

    let outcome = manager
        .call(CAL_MODEL_OUTPUT, &CallArgs::new().with("id", json!("nex-42")))
        .unwrap();
    assert_eq!(outcome.into_single().unwrap()["source"], json!("external"));
}

#[test]
fn test_iteration_loop_with_early_stop() {
    let archived = Arc::new(Mutex::new(Vec::new()));
    let mut manager = lifecycle_manager();
    manager
        .register_plugin(&IterationArchiver {
            archived: Arc::clone(&archived),
            finished: Arc::new(Mutex::new(false)),
        })
        .unwrap();

    // A convergence checker asks to stop after the third iteration.
    manager
        .add_implementation(
            "convergence-check",
            ImplementationDef::standard(
                CAL_MODEL_ITERATION_FINISH,
                &["iteration"],
                |args: &CallArgs| -> HookResult {
                    let iteration = args.get("iteration").and_then(|v| v.as_i64()).unwrap_or(0);
                    if iteration >= 3 {
                        Err(Box::new(EarlyStop::new("objective converged")))
                    } else {
                        Ok(None)
                    }
                },
            ),
        )
        .unwrap();

    // Host loop: dispatch iterations until the sentinel shows up.
    let mut stopped_at = None;
    for iteration in 1..=10 {
        let args = CallArgs::new()
            .with("iteration", json!(iteration))
            .with("workdir", json!("/tmp/run"));
        match manager.call(CAL_MODEL_ITERATION_FINISH, &args) {
            Ok(_) => {}
            Err(HooksError::EarlyStop(_)) => {
                stopped_at = Some(iteration);
                break;
            }
            Err(other) => panic!("unexpected dispatch error: {other}"),
        }
    }

    assert_eq!(stopped_at, Some(3));
    // The convergence checker runs before the Last-priority archiver, so
    // iteration 3 was never archived.
    assert_eq!(*archived.lock().unwrap(), vec![1, 2]);
}

#[test]
fn test_finish_sweep_after_upstream_failure() {
    let finished = Arc::new(Mutex::new(false));
    let mut manager = lifecycle_manager();
    manager
        .register_plugin(&IterationArchiver {
            archived: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::clone(&finished),
        })
        .unwrap();

    // A second plugin whose cleanup itself fails.
    manager
        .add_implementation(
            "flaky-cleanup",
            ImplementationDef::standard(CAL_FINISH, &["exception"], |_: &CallArgs| -> HookResult {
                Err("temp dir already gone".into())
            }),
        )
        .unwrap();

    // The host hands the upstream failure in as an ordinary argument.
    let args = CallArgs::new().with("exception", json!("model exited with status 1"));
    let err = manager.call(CAL_FINISH, &args).unwrap_err();

    match err {
        HooksError::AggregateFinish { hook, failures } => {
            assert_eq!(hook, CAL_FINISH);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].owner, "flaky-cleanup");
        }
        other => panic!("expected aggregate finish error, got {other}"),
    }
    // The archiver's cleanup still ran despite the other plugin failing.
    assert!(*finished.lock().unwrap());
}

#[test]
fn test_finish_sweep_without_failures() {
    let finished = Arc::new(Mutex::new(false));
    let mut manager = lifecycle_manager();
    manager
        .register_plugin(&IterationArchiver {
            archived: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::clone(&finished),
        })
        .unwrap();

    let outcome = manager.call(CAL_FINISH, &CallArgs::new()).unwrap();
    assert_eq!(outcome, DispatchOutcome::Collected(vec![]));
    assert!(*finished.lock().unwrap());
}
