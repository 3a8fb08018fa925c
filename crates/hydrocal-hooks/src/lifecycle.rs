//! Standard calibration lifecycle hook specifications
//!
//! The host calibration loop calls these at its defined lifecycle points.
//! Plugins implement whichever subset they care about: an output reader
//! implements `cal_model_output`, an archiver implements
//! `cal_model_iteration_finish`, and so on.
//!
//! - [`CAL_MODEL_CONFIGURE`] — before the run, plugins capture model and
//!   evaluation settings (per-plugin settings blobs arrive inside `config`).
//! - [`CAL_START`] — the run is about to begin.
//! - [`CAL_MODEL_OUTPUT`] — first-result: the first plugin able to produce the
//!   simulated series for a nexus wins; built-in readers register at `Last`
//!   priority so externally provided readers take precedence.
//! - [`CAL_MODEL_ITERATION_FINISH`] — per-iteration bookkeeping such as
//!   archiving outputs for later inspection.
//! - [`CAL_FINISH`] — finish-style: runs even when the triggering operation
//!   failed, with the upstream error handed in as the ordinary `exception`
//!   argument; every plugin gets its cleanup chance and failures are reported
//!   together.

use crate::error::Result;
use crate::manager::PluginManager;
use crate::types::{Aggregation, HookSpec, ParameterSpec};

/// Plugins capture model/evaluation configuration before the run
pub const CAL_MODEL_CONFIGURE: &str = "cal_model_configure";

/// The calibration run is starting
pub const CAL_START: &str = "cal_start";

/// Produce the simulated output series for one nexus (first result wins)
pub const CAL_MODEL_OUTPUT: &str = "cal_model_output";

/// One calibration iteration finished
pub const CAL_MODEL_ITERATION_FINISH: &str = "cal_model_iteration_finish";

/// The run is over, successfully or not; guaranteed cleanup point
pub const CAL_FINISH: &str = "cal_finish";

/// Register the standard lifecycle specifications on a manager
///
/// # Errors
///
/// Fails with `DuplicateSpecification` if any of the lifecycle names is
/// already registered.
pub fn register_lifecycle_specs(manager: &mut PluginManager) -> Result<()> {
    manager.register_specification(
        HookSpec::new(CAL_MODEL_CONFIGURE, Aggregation::All)
            .with_parameter(ParameterSpec::required("config", "object")),
    )?;

    manager.register_specification(
        HookSpec::new(CAL_START, Aggregation::All)
            .with_parameter(ParameterSpec::required("meta", "object")),
    )?;

    manager.register_specification(
        HookSpec::new(CAL_MODEL_OUTPUT, Aggregation::FirstResult)
            .with_parameter(ParameterSpec::required("id", "string")),
    )?;

    manager.register_specification(
        HookSpec::new(CAL_MODEL_ITERATION_FINISH, Aggregation::All)
            .with_parameter(ParameterSpec::required("iteration", "int"))
            .with_parameter(ParameterSpec::required("workdir", "string")),
    )?;

    manager.register_specification(
        HookSpec::new(CAL_FINISH, Aggregation::All)
            .with_parameter(ParameterSpec::optional("exception", "string"))
            .finish_style(),
    )?;

    Ok(())
}
