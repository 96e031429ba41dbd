//! Local sim-trace output.
//!
//! Every accepted step is logged at `debug` as a `SIM_TRACE_LOG:` line with
//! fixed per-field precision. When a trace directory is configured the step
//! is also appended to a per-phase CSV file under
//! `<root>/<agent>/{training,evaluation}-simtrace/iteration.csv`.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{Phase, Result, StepRecord, STEP_FIELDS};

pub const SIM_TRACE_LOG_PREFIX: &str = "SIM_TRACE_LOG:";
pub const TRAINING_TRACE_DIR: &str = "training-simtrace";
pub const EVALUATION_TRACE_DIR: &str = "evaluation-simtrace";
pub const TRACE_FILE_NAME: &str = "iteration.csv";

/// Emit the fixed-precision trace line for `step`.
pub fn sim_trace_log(step: &StepRecord) {
    debug!("{}{}", SIM_TRACE_LOG_PREFIX, step.log_line());
}

pub struct SimTraceWriter {
    agent_dir: PathBuf,
}

impl SimTraceWriter {
    /// Create the agent's trace directories under `root`.
    pub fn create(root: impl AsRef<Path>, agent: &str) -> Result<Self> {
        let agent_dir = root.as_ref().join(agent);
        fs::create_dir_all(agent_dir.join(TRAINING_TRACE_DIR))?;
        fs::create_dir_all(agent_dir.join(EVALUATION_TRACE_DIR))?;
        debug!(dir = %agent_dir.display(), "sim-trace directories ready");
        Ok(Self { agent_dir })
    }

    pub fn path(&self, phase: Phase) -> PathBuf {
        let dir = match phase {
            Phase::Train => TRAINING_TRACE_DIR,
            Phase::Eval => EVALUATION_TRACE_DIR,
        };
        self.agent_dir.join(dir).join(TRACE_FILE_NAME)
    }

    /// Append one CSV line for `step`, writing the header first if the file
    /// is new or empty.
    pub fn append(&self, phase: Phase, step: &StepRecord) -> Result<()> {
        let mut file = open_append(&self.path(phase))?;
        if file.metadata()?.len() == 0 {
            writeln!(file, "{}", STEP_FIELDS.join(","))?;
        }
        writeln!(file, "{}", step.trace_values().join(","))?;
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
