// CLI commands for running and validating submissions locally
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use qbank_common::types::{ExecutionRequest, Language, TestCase};
use qbank_engine::config::default_temp_root;
use qbank_engine::{EngineConfig, Executor, LanguageConfigManager, SyntaxValidator};

/// A cases file is either a bare array or a request-shaped object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CasesFile {
    List(Vec<TestCase>),
    Wrapped {
        #[serde(rename = "testCases")]
        test_cases: Vec<TestCase>,
    },
}

fn parse_language(name: &str) -> Result<Language> {
    match Language::parse(name) {
        Some(language) => Ok(language),
        None => bail!("Unsupported language: {}", name),
    }
}

fn load_engine_config(config_path: &Path, temp_root: Option<&Path>) -> Result<EngineConfig> {
    let languages = LanguageConfigManager::load_or_builtin(config_path)?;
    let temp_root = temp_root
        .map(Path::to_path_buf)
        .unwrap_or_else(default_temp_root);
    Ok(EngineConfig::new(temp_root, languages))
}

fn read_source(source: &Path) -> Result<String> {
    fs::read_to_string(source).with_context(|| format!("Failed to read {}", source.display()))
}

/// Load test cases from a JSON file
pub fn load_cases(cases_path: &Path) -> Result<Vec<TestCase>> {
    let content = fs::read_to_string(cases_path)
        .with_context(|| format!("Failed to read {}", cases_path.display()))?;
    let cases: CasesFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", cases_path.display()))?;

    Ok(match cases {
        CasesFile::List(cases) => cases,
        CasesFile::Wrapped { test_cases } => test_cases,
    })
}

/// Run a source file against its test cases and print the response.
///
/// Returns whether the submission compiled and passed every test case.
pub async fn run_tests(
    config_path: &Path,
    language: &str,
    source: &Path,
    cases: &Path,
    temp_root: Option<&Path>,
) -> Result<bool> {
    let language = parse_language(language)?;
    let request = ExecutionRequest {
        language,
        source_code: read_source(source)?,
        test_cases: load_cases(cases)?,
    };

    let executor = Executor::new(load_engine_config(config_path, temp_root)?);
    let response = executor.execute(&request).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.all_passed())
}

/// Syntax-check a source file and print the validation result
pub async fn validate_source(
    config_path: &Path,
    language: &str,
    source: &Path,
    temp_root: Option<&Path>,
) -> Result<bool> {
    let language = parse_language(language)?;
    let code = read_source(source)?;

    let validator = SyntaxValidator::new(load_engine_config(config_path, temp_root)?);
    let result = validator.validate(language, &code).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result.valid)
}

/// Print the configured languages
pub fn list_languages(config_path: &Path) -> Result<()> {
    let languages = LanguageConfigManager::load_or_builtin(config_path)?;

    println!("📋 Configured languages:\n");
    for info in languages.language_infos() {
        println!("  {:<12} {:<6} {}", info.name, info.extension, info.description);
        if !info.features.is_empty() {
            println!("  {:<12} {:<6} features: {}", "", "", info.features.join(", "));
        }
    }

    Ok(())
}

/// Write the built-in toolchain settings to `config_path`
pub fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            config_path.display()
        );
    }

    // Ensure config directory exists
    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let json = LanguageConfigManager::builtin().to_json()?;
    fs::write(config_path, json)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✅ Wrote {}", config_path.display());
    Ok(())
}
