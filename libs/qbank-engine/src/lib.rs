//! Multi-language code-test engine.
//!
//! Takes a submission (language, source, test cases), materializes it into a
//! private workspace, compiles it when the language needs it, runs one process
//! per test case and grades the trimmed output.

pub mod compiler;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod materializer;
pub mod process;
pub mod runner;
pub mod validator;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{EngineConfig, LanguageConfig, LanguageConfigManager};
pub use error::ExecutionError;
pub use executor::Executor;
pub use validator::SyntaxValidator;
