// Shared fixtures: toolchains backed by `sh` so tests run on any Unix host
use std::path::Path;

use crate::config::{EngineConfig, LanguageConfig, LanguageConfigManager};
use qbank_common::types::Language;

pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn script_language(name: &str, file_name: &str) -> LanguageConfig {
    LanguageConfig {
        name: name.to_string(),
        file_name: file_name.to_string(),
        extension: ".sh".to_string(),
        compile: None,
        run: argv(&["sh", "{file}"]),
        check: Some(argv(&["sh", "-n", "{file}"])),
        probe: None,
        run_timeout_ms: Some(5_000),
        preserve_indentation: false,
        description: format!("{} (sh stand-in)", name),
        features: Vec::new(),
    }
}

/// "python" and "javascript" run their source with `sh`; "java" compiles with a
/// fake javac that rejects `= ;` and runs as `cat`
pub fn sh_languages() -> LanguageConfigManager {
    let mut languages = LanguageConfigManager::builtin();
    languages.set_config(Language::Python, script_language("python", "test_code.sh"));
    languages.set_config(Language::JavaScript, script_language("javascript", "test_code.sh"));
    languages.set_config(
        Language::Java,
        LanguageConfig {
            name: "java".to_string(),
            file_name: "TestCode.java".to_string(),
            extension: ".java".to_string(),
            compile: Some(argv(&[
                "sh",
                "-c",
                "if grep -q '= ;' {file}; then echo '{class}.java:3: error: illegal start of expression' >&2; exit 1; fi",
            ])),
            run: argv(&["cat"]),
            check: None,
            probe: Some(argv(&["true"])),
            run_timeout_ms: Some(5_000),
            preserve_indentation: false,
            description: "java (sh stand-in)".to_string(),
            features: Vec::new(),
        },
    );
    languages
}

pub fn sh_engine_config(temp_root: &Path) -> EngineConfig {
    EngineConfig::new(temp_root, sh_languages())
}

/// Override the run timeout of one language
pub fn with_timeout(mut config: EngineConfig, language: Language, timeout_ms: u64) -> EngineConfig {
    if let Some(lang) = config.languages.get_config(language).cloned() {
        config.languages.set_config(
            language,
            LanguageConfig {
                run_timeout_ms: Some(timeout_ms),
                ..lang
            },
        );
    }
    config
}
