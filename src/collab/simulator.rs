/// External simulation engine
///
/// The engine is a separate program. It receives
/// `{"sequence": ..., "scanner": ...}` on stdin and answers with a JSON
/// document on stdout.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{SimulationResult, Simulator};
use crate::data::model::{ScannerModel, SequenceModel};

/// Result of running the engine once
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl SimulatorCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Command line for logs
    pub fn to_command_string(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.clone());
        parts.join(" ")
    }

    /// Run with `input` on stdin, collecting stdout and stderr
    pub fn execute_piped(&self, input: &[u8]) -> io::Result<CommandOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        log::info!("Executing: {}", self.to_command_string());
        let mut child = cmd.spawn()?;

        // Feed stdin from its own thread so a chatty engine cannot fill
        // stdout while we are still blocked writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_vec();
            thread::spawn(move || stdin.write_all(&input))
        });
        let output = child.wait_with_output()?;
        let written = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))),
            None => Ok(()),
        };

        let result = CommandOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        };
        if let Err(e) = written {
            // An engine that exits without reading everything is reported by
            // its exit status; a clean exit with unread input is still an error.
            if result.success {
                return Err(io::Error::new(
                    e.kind(),
                    format!("writing input failed: {} (stderr: {})", e, result.stderr.trim()),
                ));
            }
            log::debug!("Input not fully written to {}: {}", self.program, e);
        }
        if !result.success {
            log::warn!(
                "Command failed (exit {}): {}\nstderr: {}",
                result.exit_code.unwrap_or(-1),
                self.to_command_string(),
                result.stderr
            );
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommandSimulator {
    command: Option<SimulatorCommand>,
}

impl CommandSimulator {
    pub fn new(command: Option<SimulatorCommand>) -> Self {
        Self { command }
    }
}

impl Simulator for CommandSimulator {
    fn simulate(&self, seq: &SequenceModel, scan: &ScannerModel) -> Result<SimulationResult, String> {
        let command = self
            .command
            .as_ref()
            .ok_or_else(|| "No simulator configured (set SEQ_EDITOR_SIMULATOR)".to_string())?;

        let input = json!({
            "sequence": seq.as_value(),
            "scanner": scan.as_value(),
        });
        let input = serde_json::to_vec(&input).map_err(|e| format!("Serialize error: {}", e))?;

        let output = command
            .execute_piped(&input)
            .map_err(|e| format!("Could not run {}: {}", command.program, e))?;
        if !output.success {
            return Err(format!(
                "{} exited with {}: {}",
                command.program,
                output
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                output.stderr.trim()
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map(SimulationResult)
            .map_err(|e| format!("Simulator returned invalid JSON: {}", e))
    }
}
