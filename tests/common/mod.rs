/*!
 * Common test utilities for the storyvox test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use storyvox::app_config::{Config, ProviderKind};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Route test log output through env_logger; repeated calls are ignored
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Settings for fast offline runs writing into `output_dir`
pub fn test_config(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.synthesis.provider = ProviderKind::Mock;
    config.synthesis.rate_limit_delay_ms = 0;
    config.synthesis.jitter_ms = 0;
    config.synthesis.retry_count = 0;
    config.output.directory = output_dir.to_string_lossy().to_string();
    config
}

/// Sample scripts for each mode
pub const STORY_SCRIPT: &str = "Once upon a time, there was a fox.\nIt cost $20.50 at 3:05 PM.\nThe end.";

pub const DIALOGUE_SCRIPT: &str = "Q: What time is it?\nA: It is 3:00.\nQ: Thanks!\nA: You are welcome.";

pub const MULTI_SCRIPT: &str = "NARRATOR: The forest was quiet.\nCHAR1: Hello there!\nCHAR2: Hi, friend.\nCHAR3: Good morning.\nNARRATOR: They walked on.";

/// Number of entries in a directory
pub fn count_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}
