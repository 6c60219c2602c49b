/// Process Runner primitive
///
/// Spawns one external process, front-loads its stdin, collects stdout and
/// stderr until exit, and races the whole exchange against an optional
/// wall-clock timeout. Whichever finishes first decides the outcome:
///
/// ```text
/// NotStarted -> Running -> Completed | TimedOut | SpawnFailed
/// ```
///
/// Nothing here throws: every failure becomes a `ProcessOutcome`.
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Process exited on its own
    Completed {
        stdout: String,
        stderr: String,
        exit_code: Option<i32>,
    },
    /// Process was killed after exceeding the timeout
    TimedOut { timeout: Duration },
    /// Process could not be started or waited on
    SpawnFailed { program: String, message: String },
}

impl ProcessOutcome {
    /// Completed with exit code 0
    pub fn success(&self) -> bool {
        matches!(
            self,
            ProcessOutcome::Completed {
                exit_code: Some(0),
                ..
            }
        )
    }
}

async fn feed_stdin(pipe: Option<ChildStdin>, input: Option<&str>) -> std::io::Result<()> {
    let (Some(mut pipe), Some(input)) = (pipe, input) else {
        return Ok(());
    };

    match pipe.write_all(input.as_bytes()).await {
        // Program exited or closed stdin without reading everything
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
        Err(e) => return Err(e),
        Ok(()) => {}
    }
    // Dropping the pipe closes the stream: all input is front-loaded
    drop(pipe);
    Ok(())
}

async fn read_pipe<R>(pipe: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    pipe.read_to_end(&mut out).await?;
    Ok(out)
}

/// Run `argv` to completion.
///
/// ## Arguments
/// * `argv` - program followed by its arguments
/// * `cwd` - working directory, inherited when `None`
/// * `stdin` - text written to stdin before it is closed; stdin is null when `None`
/// * `timeout` - wall-clock limit; unbounded when `None`
pub async fn run_process(
    argv: &[String],
    cwd: Option<&Path>,
    stdin: Option<&str>,
    timeout: Option<Duration>,
) -> ProcessOutcome {
    let Some((program, args)) = argv.split_first() else {
        return ProcessOutcome::SpawnFailed {
            program: String::new(),
            message: "Empty command".to_string(),
        };
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            debug!(program = %program, error = %e, "Failed to spawn process");
            return ProcessOutcome::SpawnFailed {
                program: program.clone(),
                message: format!("Failed to start {}: {}", program, e),
            };
        }
    };

    let start = Instant::now();
    let stdin_pipe = child.stdin.take();
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let exchange = async {
        let ((), stdout, stderr) = tokio::try_join!(
            feed_stdin(stdin_pipe, stdin),
            read_pipe(stdout_pipe),
            read_pipe(stderr_pipe)
        )?;
        let status = child.wait().await?;
        Ok::<_, std::io::Error>((stdout, stderr, status))
    };

    let finished = match timeout {
        Some(limit) => tokio::time::timeout(limit, exchange).await.ok(),
        None => Some(exchange.await),
    };

    match finished {
        Some(Ok((stdout, stderr, status))) => {
            debug!(
                program = %program,
                exit_code = ?status.code(),
                execution_ms = start.elapsed().as_millis() as u64,
                "Process exited"
            );
            ProcessOutcome::Completed {
                stdout: String::from_utf8_lossy(&stdout).into_owned(),
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
                exit_code: status.code(),
            }
        }
        Some(Err(e)) => {
            warn!(program = %program, error = %e, "Lost track of process");
            ProcessOutcome::SpawnFailed {
                program: program.clone(),
                message: format!("Failed while running {}: {}", program, e),
            }
        }
        None => {
            // Timer won the race: kill and reap
            let limit = timeout.unwrap_or_default();
            if let Err(e) = child.kill().await {
                warn!(program = %program, error = %e, "Failed to kill timed-out process");
            }
            debug!(
                program = %program,
                timeout_ms = limit.as_millis() as u64,
                "Process timed out"
            );
            ProcessOutcome::TimedOut { timeout: limit }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn test_stdin_is_forwarded() {
        let outcome = run_process(&argv(&["cat"]), None, Some("1 2\n"), None).await;
        assert_eq!(
            outcome,
            ProcessOutcome::Completed {
                stdout: "1 2\n".to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            }
        );
        assert!(outcome.success());
    }

    #[tokio::test]
    async fn test_stderr_and_exit_code() {
        let outcome = run_process(
            &argv(&["sh", "-c", "echo out; echo err >&2; exit 3"]),
            None,
            None,
            Some(Duration::from_secs(5)),
        )
        .await;

        match outcome {
            ProcessOutcome::Completed {
                stdout,
                stderr,
                exit_code,
            } => {
                assert_eq!(stdout, "out\n");
                assert_eq!(stderr, "err\n");
                assert_eq!(exit_code, Some(3));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let start = Instant::now();
        let outcome = run_process(
            &argv(&["sleep", "30"]),
            None,
            None,
            Some(Duration::from_millis(200)),
        )
        .await;

        assert_eq!(
            outcome,
            ProcessOutcome::TimedOut {
                timeout: Duration::from_millis(200)
            }
        );
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let outcome = run_process(
            &argv(&["qbank-definitely-not-installed"]),
            None,
            Some("x"),
            None,
        )
        .await;

        match outcome {
            ProcessOutcome::SpawnFailed { program, message } => {
                assert_eq!(program, "qbank-definitely-not-installed");
                assert!(message.starts_with("Failed to start qbank-definitely-not-installed"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_command() {
        let outcome = run_process(&[], None, None, None).await;
        assert!(matches!(outcome, ProcessOutcome::SpawnFailed { .. }));
        assert!(!outcome.success());
    }

    #[tokio::test]
    async fn test_program_ignoring_stdin() {
        // Large input to a program that never reads it must not fail the run
        let input = "x".repeat(1024 * 1024);
        let outcome = run_process(
            &argv(&["sh", "-c", "echo done"]),
            None,
            Some(&input),
            Some(Duration::from_secs(5)),
        )
        .await;

        match outcome {
            ProcessOutcome::Completed { stdout, .. } => assert_eq!(stdout, "done\n"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let outcome = run_process(&argv(&["cat", "marker.txt"]), Some(dir.path()), None, None).await;
        match outcome {
            ProcessOutcome::Completed { stdout, .. } => assert_eq!(stdout, "here"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
