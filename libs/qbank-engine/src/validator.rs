/// Syntax Validator
///
/// Quick feedback without running the submission: Java is compiled only,
/// interpreted languages use their check-only mode. The workspace is always
/// cleaned up.
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::error::ExecutionError;
use crate::runner::runner_for;
use crate::workspace::Workspace;
use qbank_common::types::{Language, ValidationResult};

#[derive(Debug, Clone)]
pub struct SyntaxValidator {
    config: Arc<EngineConfig>,
}

impl SyntaxValidator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn from_shared(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }

    #[instrument(skip(self, source_code), fields(language = %language))]
    pub async fn validate(
        &self,
        language: Language,
        source_code: &str,
    ) -> Result<ValidationResult, ExecutionError> {
        if source_code.trim().is_empty() {
            return Err(ExecutionError::invalid_input("Language and code are required"));
        }

        let runner = runner_for(language, &self.config.languages)?;
        runner.ensure_toolchain().await?;

        let workspace = Workspace::acquire(&self.config.temp_root)
            .await
            .context("Failed to prepare workspace")?;

        let result = match runner.materialize(&workspace, source_code).await {
            Ok(source) => runner.syntax_check(&source).await,
            Err(e) => Err(e.into()),
        };
        workspace.release().await;

        if let Ok(validation) = &result {
            info!(valid = validation.valid, "Syntax check finished");
        }
        result
    }
}
