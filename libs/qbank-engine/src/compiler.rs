/// Compiler Adapter
///
/// Runs a compile command against a materialized source file. No timeout is
/// applied; the compiler bounds itself. Success means exit code 0, and the
/// diagnostics are returned verbatim.
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::error::ExecutionError;
use crate::materializer::SourceFile;
use crate::process::{run_process, ProcessOutcome};
use qbank_common::types::CompileOutcome;

/// Compile `source` with the configured argv
pub async fn compile(argv: &[String], source: &SourceFile) -> Result<CompileOutcome, ExecutionError> {
    let command = source.expand(argv);
    let start = Instant::now();

    match run_process(&command, Some(&source.dir), None, None).await {
        ProcessOutcome::Completed {
            stdout,
            stderr,
            exit_code,
        } => {
            let compilation_time_ms = start.elapsed().as_millis() as u64;
            if exit_code == Some(0) {
                info!(compilation_time_ms, "Compilation succeeded");
                return Ok(CompileOutcome::success());
            }

            // javac reports on stderr; some toolchains only use stdout
            let diagnostics = if stderr.trim().is_empty() { stdout } else { stderr };
            warn!(
                compilation_time_ms,
                exit_code = ?exit_code,
                error_preview = diagnostics.lines().next().unwrap_or(""),
                "Compilation failed"
            );
            Ok(CompileOutcome::failure(diagnostics))
        }
        ProcessOutcome::SpawnFailed { program, message } => Err(ExecutionError::ToolchainMissing(
            format!("Compiler '{}' is not available: {}", program, message),
        )),
        // Unreachable without a timeout, kept total
        ProcessOutcome::TimedOut { timeout } => Ok(CompileOutcome::failure(format!(
            "Compilation timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

/// Check that a toolchain can be started at all
pub async fn probe(argv: &[String], cwd: Option<&Path>, advice: &str) -> Result<(), ExecutionError> {
    match run_process(argv, cwd, None, None).await {
        ProcessOutcome::SpawnFailed { program, message } => {
            warn!(program = %program, error = %message, "Toolchain probe failed");
            Err(ExecutionError::ToolchainMissing(advice.to_string()))
        }
        _ => Ok(()),
    }
}
