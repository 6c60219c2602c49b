use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the code-test service knows how to build and run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Python,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Java, Language::Python, Language::JavaScript];

    /// Case-insensitive lookup by the name used in routes and config files
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "java" => Some(Language::Java),
            "python" => Some(Language::Python),
            "javascript" => Some(Language::JavaScript),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (input, expected output) pair used to grade a submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
            description: None,
        }
    }
}

/// A single submission: language, source and the ordered test cases to grade it against
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    pub language: Language,
    #[serde(rename = "code")]
    pub source_code: String,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Result of the compile step for compiled languages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutcome {
    pub succeeded: bool,
    pub diagnostics: String,
}

impl CompileOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            diagnostics: String::new(),
        }
    }

    pub fn failure(diagnostics: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// Graded outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// 1-based position of the test case in the request
    pub test_case: usize,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Response body when every test case was run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compilation_success: Option<bool>,
    pub test_results: Vec<TestResult>,
    pub summary: ExecutionSummary,
}

/// Response body when compilation failed and nothing was run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileFailure {
    pub success: bool,
    pub error: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionResponse {
    Completed(ExecutionReport),
    CompileFailed(CompileFailure),
}

impl ExecutionResponse {
    pub fn completed(
        test_results: Vec<TestResult>,
        summary: ExecutionSummary,
        compiled: bool,
    ) -> Self {
        ExecutionResponse::Completed(ExecutionReport {
            success: true,
            compilation_success: compiled.then_some(true),
            test_results,
            summary,
        })
    }

    pub fn compile_failed(details: impl Into<String>) -> Self {
        ExecutionResponse::CompileFailed(CompileFailure {
            success: false,
            error: "Compilation failed".to_string(),
            details: details.into(),
        })
    }

    pub fn summary(&self) -> Option<&ExecutionSummary> {
        match self {
            ExecutionResponse::Completed(report) => Some(&report.summary),
            ExecutionResponse::CompileFailed(_) => None,
        }
    }

    /// True when compilation succeeded and every test case passed
    pub fn all_passed(&self) -> bool {
        match self {
            ExecutionResponse::Completed(report) => report.summary.failed == 0,
            ExecutionResponse::CompileFailed(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }
}

/// Entry of the supported-languages listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
    pub extension: String,
    pub description: String,
    pub features: Vec<String>,
}
