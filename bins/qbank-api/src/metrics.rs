// Prometheus metrics for the code-test endpoints

use anyhow::Result;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use qbank_common::types::{ExecutionResponse, Language};
use std::time::Duration;

lazy_static! {
    static ref CODE_TEST_REQUESTS: IntCounterVec = register_int_counter_vec!(
        "qbank_code_test_requests_total",
        "Code-test requests by language and outcome",
        &["language", "outcome"]
    )
    .expect("metric can be registered");
    static ref TEST_CASES: IntCounterVec = register_int_counter_vec!(
        "qbank_test_cases_total",
        "Graded test cases by language and result",
        &["language", "result"]
    )
    .expect("metric can be registered");
    static ref EXECUTION_DURATION: HistogramVec = register_histogram_vec!(
        "qbank_execution_duration_seconds",
        "Wall time of code-test requests",
        &["language"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("metric can be registered");
}

/// Count a request that ended without a response body of its own
pub fn record_request(language: &str, outcome: &str) {
    CODE_TEST_REQUESTS
        .with_label_values(&[language, outcome])
        .inc();
}

pub fn observe_execution(language: Language, response: &ExecutionResponse, elapsed: Duration) {
    let outcome = match response {
        ExecutionResponse::Completed(report) if report.summary.failed == 0 => "passed",
        ExecutionResponse::Completed(_) => "failed",
        ExecutionResponse::CompileFailed(_) => "compile_error",
    };
    record_request(language.as_str(), outcome);

    if let Some(summary) = response.summary() {
        TEST_CASES
            .with_label_values(&[language.as_str(), "passed"])
            .inc_by(summary.passed as u64);
        TEST_CASES
            .with_label_values(&[language.as_str(), "failed"])
            .inc_by(summary.failed as u64);
    }

    EXECUTION_DURATION
        .with_label_values(&[language.as_str()])
        .observe(elapsed.as_secs_f64());
}

/// Text exposition of every registered metric
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_common::types::ExecutionSummary;

    #[test]
    fn test_observe_execution_is_rendered() {
        let response = ExecutionResponse::completed(
            Vec::new(),
            ExecutionSummary { total: 2, passed: 1, failed: 1 },
            false,
        );
        observe_execution(Language::Python, &response, Duration::from_millis(20));
        record_request("unknown", "rejected");

        let text = render().unwrap();
        assert!(text.contains("qbank_code_test_requests_total"));
        assert!(text.contains("qbank_test_cases_total"));
        assert!(text.contains("qbank_execution_duration_seconds"));
        assert!(text.contains("outcome=\"failed\""));
    }
}
