/// Test Evaluator - Language-Agnostic Grading
///
/// **Core Responsibility:**
/// Turn a raw process outcome into a `TestResult` and aggregate results into
/// an `ExecutionSummary`.
///
/// **Critical Properties:**
/// - Knows nothing about processes, workspaces or toolchains
/// - Pure functions, no I/O
///
/// **Comparison Rules:**
/// - Trim leading and trailing whitespace of both sides: YES
/// - Internal whitespace and line endings: compared byte for byte
/// - Case sensitivity: YES
/// - Numeric tolerance or partial credit: NO
use crate::process::ProcessOutcome;
use qbank_common::types::{ExecutionSummary, TestCase, TestResult};

/// Normalize output string for comparison
fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Whether `actual` matches `expected` under the comparison rules
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    normalize_output(actual) == normalize_output(expected)
}

/// Grade one test case.
///
/// ## Arguments
/// * `index` - 1-based position of the test case in the request
/// * `test_case` - input and expected output
/// * `outcome` - what the process did
pub fn evaluate_test(index: usize, test_case: &TestCase, outcome: &ProcessOutcome) -> TestResult {
    let (actual_output, passed, error) = match outcome {
        ProcessOutcome::Completed { stdout, stderr, .. } => (
            normalize_output(stdout).to_string(),
            outputs_match(stdout, &test_case.expected_output),
            (!stderr.is_empty()).then(|| stderr.clone()),
        ),
        ProcessOutcome::TimedOut { timeout } => (
            String::new(),
            false,
            Some(format!("Execution timed out after {}ms", timeout.as_millis())),
        ),
        ProcessOutcome::SpawnFailed { message, .. } => (String::new(), false, Some(message.clone())),
    };

    TestResult {
        test_case: index,
        input: test_case.input.clone(),
        expected_output: test_case.expected_output.clone(),
        actual_output,
        passed,
        error,
    }
}

/// Aggregate graded results: `total == passed + failed` always holds
pub fn aggregate(results: &[TestResult]) -> ExecutionSummary {
    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    ExecutionSummary {
        total,
        passed,
        failed: total - passed,
    }
}
