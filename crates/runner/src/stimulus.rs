//! Test-stimulus execution.
//!
//! The stimulus payload comes out of the same reviewed document whose query
//! was just registered, and it IS executable syntax for the configured
//! interpreter. It is still never interpolated into a shell string: the
//! interpreter is launched directly with a fixed argument list and the
//! payload as one trailing argument.

use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StimulusError {
    #[error("failed to launch stimulus interpreter {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fire-and-forget stimulus execution; the exit code is logged by the
/// caller, never gated on. A stimulus that silently did nothing surfaces at
/// reconciliation instead.
pub trait StimulusRunner {
    fn run_stimulus(&self, payload: &str) -> Result<i32, StimulusError>;
}

/// Runs payloads through a fixed interpreter executable.
#[derive(Debug, Clone)]
pub struct InterpreterStimulus {
    program: String,
    args: Vec<String>,
}

impl InterpreterStimulus {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        InterpreterStimulus {
            program: program.into(),
            args,
        }
    }
}

impl StimulusRunner for InterpreterStimulus {
    fn run_stimulus(&self, payload: &str) -> Result<i32, StimulusError> {
        tracing::debug!(program = %self.program, "running test stimulus");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(payload)
            .status()
            .map_err(|source| StimulusError::Launch {
                program: self.program.clone(),
                source,
            })?;
        // Signal-terminated processes have no code; report them as -1.
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn exit_code_is_reported_not_gated_on() {
        let runner = InterpreterStimulus::new("sh", vec!["-c".to_string()]);
        assert_eq!(runner.run_stimulus("exit 0").unwrap(), 0);
        assert_eq!(runner.run_stimulus("exit 3").unwrap(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn payload_is_one_argument_not_a_shell_fragment() {
        // The payload lands in $0 untouched; a second injected word would
        // change the exit code if it were re-split by a shell layer.
        let runner = InterpreterStimulus::new("sh", vec!["-c".to_string(), "exit $#".to_string()]);
        assert_eq!(runner.run_stimulus("one whole payload; rm -rf /tmp/x").unwrap(), 0);
    }

    #[test]
    fn missing_interpreter_is_a_launch_error() {
        let runner = InterpreterStimulus::new("definitely-not-installed-anywhere", Vec::new());
        assert!(matches!(
            runner.run_stimulus("anything"),
            Err(StimulusError::Launch { .. })
        ));
    }
}
