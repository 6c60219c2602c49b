/// Per-language execution strategies
///
/// Each supported language has one `Runner` implementation. The executor and
/// the syntax validator only talk to this trait, so language differences live
/// here and nowhere else.
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::compiler;
use crate::config::{LanguageConfig, LanguageConfigManager};
use crate::error::ExecutionError;
use crate::materializer::{self, SourceFile};
use crate::process::{run_process, ProcessOutcome};
use crate::workspace::Workspace;
use qbank_common::types::{CompileOutcome, Language, ValidationResult};

const JDK_ADVICE: &str =
    "Java compiler (javac) is not available on this server. Please install a JDK and make sure javac is on the PATH.";

#[async_trait]
pub trait Runner: Send + Sync {
    fn language(&self) -> Language;

    /// Fail early when the toolchain is not installed
    async fn ensure_toolchain(&self) -> Result<(), ExecutionError> {
        Ok(())
    }

    /// Write the submission into the workspace
    async fn materialize(&self, workspace: &Workspace, source_code: &str) -> Result<SourceFile>;

    /// Compile when the language needs it; `None` for interpreted languages
    async fn maybe_compile(&self, source: &SourceFile) -> Result<Option<CompileOutcome>, ExecutionError>;

    /// Run one test case input through the program
    async fn run(&self, source: &SourceFile, input: &str) -> ProcessOutcome;

    /// Report errors without executing the program's logic
    async fn syntax_check(&self, source: &SourceFile) -> Result<ValidationResult, ExecutionError>;
}

/// Pick the strategy for `language`
pub fn runner_for(
    language: Language,
    languages: &LanguageConfigManager,
) -> Result<Box<dyn Runner>, ExecutionError> {
    let config = languages
        .get_config(language)
        .cloned()
        .ok_or_else(|| ExecutionError::UnsupportedLanguage(language.to_string()))?;

    Ok(match language {
        Language::Java => Box::new(JavaRunner { config }),
        Language::Python => Box::new(PythonRunner { config }),
        Language::JavaScript => Box::new(JavaScriptRunner { config }),
    })
}

fn run_timeout(config: &LanguageConfig) -> Option<Duration> {
    config.run_timeout_ms.map(Duration::from_millis)
}

/// Every test case input is sent with a trailing newline
async fn run_with_input(config: &LanguageConfig, source: &SourceFile, input: &str) -> ProcessOutcome {
    let command = source.expand(&config.run);
    let stdin = format!("{}\n", input);
    run_process(&command, Some(&source.dir), Some(&stdin), run_timeout(config)).await
}

async fn materialize_script(
    config: &LanguageConfig,
    workspace: &Workspace,
    source_code: &str,
) -> Result<SourceFile> {
    let normalized = materializer::normalize_script(source_code, config.preserve_indentation);
    materializer::write_source(workspace, &config.file_name, &normalized).await
}

/// Run the interpreter's check-only mode
async fn check_script(config: &LanguageConfig, source: &SourceFile) -> Result<ValidationResult, ExecutionError> {
    let Some(check) = config.check.as_ref() else {
        debug!(language = %config.name, "No syntax check configured");
        return Ok(ValidationResult::valid());
    };

    match run_process(&source.expand(check), Some(&source.dir), None, run_timeout(config)).await {
        outcome if outcome.success() => Ok(ValidationResult::valid()),
        ProcessOutcome::Completed { stdout, stderr, .. } => {
            let errors = if stderr.trim().is_empty() { stdout } else { stderr };
            Ok(ValidationResult::invalid(errors))
        }
        ProcessOutcome::TimedOut { timeout } => Ok(ValidationResult::invalid(format!(
            "Syntax check timed out after {}ms",
            timeout.as_millis()
        ))),
        ProcessOutcome::SpawnFailed { message, .. } => Err(ExecutionError::ToolchainMissing(message)),
    }
}

pub struct JavaRunner {
    config: LanguageConfig,
}

impl JavaRunner {
    async fn compile(&self, source: &SourceFile) -> Result<CompileOutcome, ExecutionError> {
        match self.config.compile.as_ref() {
            Some(argv) => compiler::compile(argv, source).await,
            None => Ok(CompileOutcome::success()),
        }
    }
}

#[async_trait]
impl Runner for JavaRunner {
    fn language(&self) -> Language {
        Language::Java
    }

    async fn ensure_toolchain(&self) -> Result<(), ExecutionError> {
        match self.config.probe.as_ref() {
            Some(argv) => compiler::probe(argv, None, JDK_ADVICE).await,
            None => Ok(()),
        }
    }

    async fn materialize(&self, workspace: &Workspace, source_code: &str) -> Result<SourceFile> {
        let (class_name, text) = materializer::java_source(source_code);
        let file_name = if class_name == materializer::JAVA_DEFAULT_CLASS {
            self.config.file_name.clone()
        } else {
            format!("{}.java", class_name)
        };
        materializer::write_source(workspace, &file_name, &text).await
    }

    async fn maybe_compile(&self, source: &SourceFile) -> Result<Option<CompileOutcome>, ExecutionError> {
        self.compile(source).await.map(Some)
    }

    async fn run(&self, source: &SourceFile, input: &str) -> ProcessOutcome {
        run_with_input(&self.config, source, input).await
    }

    async fn syntax_check(&self, source: &SourceFile) -> Result<ValidationResult, ExecutionError> {
        let outcome = self.compile(source).await?;
        Ok(if outcome.succeeded {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(outcome.diagnostics)
        })
    }
}

pub struct PythonRunner {
    config: LanguageConfig,
}

#[async_trait]
impl Runner for PythonRunner {
    fn language(&self) -> Language {
        Language::Python
    }

    async fn materialize(&self, workspace: &Workspace, source_code: &str) -> Result<SourceFile> {
        materialize_script(&self.config, workspace, source_code).await
    }

    async fn maybe_compile(&self, _source: &SourceFile) -> Result<Option<CompileOutcome>, ExecutionError> {
        Ok(None)
    }

    async fn run(&self, source: &SourceFile, input: &str) -> ProcessOutcome {
        run_with_input(&self.config, source, input).await
    }

    async fn syntax_check(&self, source: &SourceFile) -> Result<ValidationResult, ExecutionError> {
        check_script(&self.config, source).await
    }
}

pub struct JavaScriptRunner {
    config: LanguageConfig,
}

#[async_trait]
impl Runner for JavaScriptRunner {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    async fn materialize(&self, workspace: &Workspace, source_code: &str) -> Result<SourceFile> {
        materialize_script(&self.config, workspace, source_code).await
    }

    async fn maybe_compile(&self, _source: &SourceFile) -> Result<Option<CompileOutcome>, ExecutionError> {
        Ok(None)
    }

    async fn run(&self, source: &SourceFile, input: &str) -> ProcessOutcome {
        run_with_input(&self.config, source, input).await
    }

    async fn syntax_check(&self, source: &SourceFile) -> Result<ValidationResult, ExecutionError> {
        check_script(&self.config, source).await
    }
}
