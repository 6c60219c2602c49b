/// Job Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Coordinate workspace, runner and evaluator to produce the final response.
///
/// **Flow:**
/// 1. Validate the request (code present, test cases present, language configured)
/// 2. Acquire a fresh workspace
/// 3. Materialize the source, compile if the language needs it
/// 4. Run every test case sequentially, in request order
/// 5. Aggregate results
/// 6. Release the workspace on every exit path
///
/// Only invalid input, a missing toolchain and a failed compilation end a
/// request early. Everything that goes wrong inside a single test case is
/// recorded in that test case's result.
use anyhow::Context;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::ExecutionError;
use crate::evaluator::{aggregate, evaluate_test};
use crate::runner::{runner_for, Runner};
use crate::workspace::Workspace;
use qbank_common::types::{ExecutionRequest, ExecutionResponse};

#[derive(Debug, Clone)]
pub struct Executor {
    config: Arc<EngineConfig>,
}

impl Executor {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn from_shared(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute a submission against all of its test cases
    #[instrument(
        skip(self, request),
        fields(language = %request.language, test_count = request.test_cases.len())
    )]
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, ExecutionError> {
        validate_request(request)?;

        let runner = runner_for(request.language, &self.config.languages)?;
        runner.ensure_toolchain().await?;

        let workspace = Workspace::acquire(&self.config.temp_root)
            .await
            .context("Failed to prepare workspace")?;

        let start = Instant::now();
        let result = execute_in(&workspace, runner.as_ref(), request).await;
        workspace.release().await;

        match &result {
            Ok(ExecutionResponse::Completed(report)) => info!(
                total = report.summary.total,
                passed = report.summary.passed,
                failed = report.summary.failed,
                execution_ms = start.elapsed().as_millis() as u64,
                "Execution completed"
            ),
            Ok(ExecutionResponse::CompileFailed(_)) => {
                info!(execution_ms = start.elapsed().as_millis() as u64, "Compilation failed")
            }
            Err(e) => warn!(error = %e, "Execution aborted"),
        }

        result
    }
}

fn validate_request(request: &ExecutionRequest) -> Result<(), ExecutionError> {
    if request.source_code.trim().is_empty() {
        return Err(ExecutionError::invalid_input("No code provided"));
    }
    if request.test_cases.is_empty() {
        return Err(ExecutionError::invalid_input("No test cases provided"));
    }
    Ok(())
}

async fn execute_in(
    workspace: &Workspace,
    runner: &dyn Runner,
    request: &ExecutionRequest,
) -> Result<ExecutionResponse, ExecutionError> {
    let source = runner.materialize(workspace, &request.source_code).await?;

    // Step 1: compile (compiled languages only)
    let compiled = match runner.maybe_compile(&source).await? {
        Some(outcome) if !outcome.succeeded => {
            return Ok(ExecutionResponse::compile_failed(outcome.diagnostics));
        }
        Some(_) => true,
        None => false,
    };

    // Step 2: one process per test case, strictly sequential
    let mut results = Vec::with_capacity(request.test_cases.len());
    for (idx, test_case) in request.test_cases.iter().enumerate() {
        let test_num = idx + 1;
        let start = Instant::now();
        let outcome = runner.run(&source, &test_case.input).await;
        let result = evaluate_test(test_num, test_case, &outcome);

        debug!(
            test_num,
            passed = result.passed,
            has_error = result.error.is_some(),
            execution_ms = start.elapsed().as_millis() as u64,
            "Test result"
        );
        results.push(result);
    }

    // Step 3: aggregate
    let summary = aggregate(&results);
    Ok(ExecutionResponse::completed(results, summary, compiled))
}
