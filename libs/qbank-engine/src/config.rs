// Toolchain configuration for the code-test engine
use anyhow::{bail, Context, Result};
use qbank_common::types::{Language, LanguageInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_LANGUAGES_PATH: &str = "config/languages.json";
pub const TEMP_ROOT_DIR_NAME: &str = "qbank-code-test";

/// How one language is materialized, compiled, run and syntax-checked.
///
/// Every argv may use the placeholders `{file}` (source path), `{dir}`
/// (workspace directory) and `{class}` (source file stem).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    pub file_name: String,
    pub extension: String,
    #[serde(default)]
    pub compile: Option<Vec<String>>,
    pub run: Vec<String>,
    #[serde(default)]
    pub check: Option<Vec<String>>,
    /// Command whose failure to start means the toolchain is not installed
    #[serde(default)]
    pub probe: Option<Vec<String>>,
    #[serde(default)]
    pub run_timeout_ms: Option<u64>,
    #[serde(default)]
    pub preserve_indentation: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl LanguageConfig {
    pub fn builtin(language: Language) -> Self {
        let argv = |parts: &[&str]| parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        let features = |parts: &[&str]| parts.iter().map(|p| p.to_string()).collect::<Vec<_>>();

        match language {
            Language::Java => Self {
                name: "java".to_string(),
                file_name: "TestCode.java".to_string(),
                extension: ".java".to_string(),
                compile: Some(argv(&["javac", "{file}"])),
                run: argv(&["java", "-cp", "{dir}", "{class}"]),
                check: None,
                probe: Some(argv(&["javac", "-version"])),
                run_timeout_ms: Some(15_000),
                preserve_indentation: false,
                description: "Java programming language".to_string(),
                features: features(&["Compilation", "Runtime testing", "Standard input/output"]),
            },
            Language::Python => Self {
                name: "python".to_string(),
                file_name: "test_code.py".to_string(),
                extension: ".py".to_string(),
                compile: None,
                run: argv(&["python3", "{file}"]),
                check: Some(argv(&["python3", "-m", "py_compile", "{file}"])),
                probe: None,
                run_timeout_ms: Some(15_000),
                preserve_indentation: false,
                description: "Python programming language".to_string(),
                features: features(&["Interpreted execution", "Runtime testing", "Standard input/output"]),
            },
            Language::JavaScript => Self {
                name: "javascript".to_string(),
                file_name: "test_code.js".to_string(),
                extension: ".js".to_string(),
                compile: None,
                run: argv(&["node", "{file}"]),
                check: Some(argv(&["node", "--check", "{file}"])),
                probe: None,
                run_timeout_ms: Some(10_000),
                preserve_indentation: false,
                description: "JavaScript (Node.js) programming language".to_string(),
                features: features(&["Interpreted execution", "Runtime testing", "Standard input/output"]),
            },
        }
    }

    pub fn info(&self) -> LanguageInfo {
        LanguageInfo {
            name: self.name.clone(),
            extension: self.extension.clone(),
            description: self.description.clone(),
            features: self.features.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<Language, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Built-in toolchain settings for every supported language
    pub fn builtin() -> Self {
        let configs = Language::ALL
            .iter()
            .map(|lang| (*lang, LanguageConfig::builtin(*lang)))
            .collect();
        Self { configs }
    }

    /// Load language configurations from a languages.json file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to load {}", config_path.display()))
    }

    /// Load from `config_path` when it exists, otherwise fall back to the built-ins
    pub fn load_or_builtin(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            info!(
                path = %config_path.display(),
                "Language config not found, using built-in toolchains"
            );
            Ok(Self::builtin())
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let languages_json: LanguagesJson =
            serde_json::from_str(content).context("Failed to parse languages.json")?;

        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            let Some(language) = Language::parse(&lang.name) else {
                bail!("Unknown language '{}' in languages.json", lang.name);
            };
            if lang.run.is_empty() {
                bail!("Language '{}' has an empty run command", lang.name);
            }
            configs.insert(language, lang);
        }

        if configs.is_empty() {
            bail!("No languages configured in languages.json");
        }

        Ok(Self { configs })
    }

    /// Serialize back to the languages.json layout
    pub fn to_json(&self) -> Result<String> {
        let languages_json = LanguagesJson {
            languages: self
                .list_languages()
                .into_iter()
                .filter_map(|lang| self.get_config(lang).cloned())
                .collect(),
        };
        serde_json::to_string_pretty(&languages_json).context("Failed to serialize languages.json")
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: Language) -> Option<&LanguageConfig> {
        self.configs.get(&language)
    }

    /// Replace the configuration of one language
    pub fn set_config(&mut self, language: Language, config: LanguageConfig) {
        self.configs.insert(language, config);
    }

    /// List all configured languages, in a stable order
    pub fn list_languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.configs.keys().copied().collect();
        languages.sort();
        languages
    }

    pub fn language_infos(&self) -> Vec<LanguageInfo> {
        self.list_languages()
            .into_iter()
            .filter_map(|lang| self.get_config(lang))
            .map(LanguageConfig::info)
            .collect()
    }
}

impl Default for LanguageConfigManager {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Everything the engine needs, passed explicitly into each component
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Parent directory of the per-request workspaces
    pub temp_root: PathBuf,
    pub languages: LanguageConfigManager,
}

impl EngineConfig {
    pub fn new(temp_root: impl Into<PathBuf>, languages: LanguageConfigManager) -> Self {
        Self {
            temp_root: temp_root.into(),
            languages,
        }
    }

    /// Build from `CODE_TEST_TEMP_ROOT` and `LANGUAGES_CONFIG`
    pub fn from_env() -> Result<Self> {
        let temp_root = std::env::var("CODE_TEST_TEMP_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_temp_root());
        let languages_path = std::env::var("LANGUAGES_CONFIG")
            .unwrap_or_else(|_| DEFAULT_LANGUAGES_PATH.to_string());

        let languages = LanguageConfigManager::load_or_builtin(Path::new(&languages_path))?;
        Ok(Self::new(temp_root, languages))
    }
}

pub fn default_temp_root() -> PathBuf {
    std::env::temp_dir().join(TEMP_ROOT_DIR_NAME)
}
