/*!
 * Tests for the settings store
 */

use anyhow::Result;

use storyvox::app_config::{Config, LogLevel, ProviderKind};
use crate::common;

#[test]
fn test_defaultConfig_shouldHaveDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.synthesis.provider, ProviderKind::Http);
    assert_eq!(config.synthesis.max_chars_per_request, 500);
    assert_eq!(config.audio.sample_rate, 24_000);
    assert_eq!(config.audio.fade_ms, 50);
    assert_eq!(config.pauses.long_ms, 700);
    assert_eq!(config.pauses.short_ms, 350);
    assert_eq!(config.modes.single.repeat, 1);
    assert_eq!(config.output.directory, ".");
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_providerKind_fromStr_shouldAcceptKnownNames() {
    assert_eq!("HTTP".parse::<ProviderKind>().unwrap(), ProviderKind::Http);
    assert_eq!("mock".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
    assert!("ollama".parse::<ProviderKind>().is_err());
    assert_eq!(ProviderKind::Mock.to_string(), "mock");
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config, Config::default());
    assert_eq!(Config::load(&path)?, config);
    Ok(())
}

#[test]
fn test_save_shouldPersistOverrides() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.synthesis.provider = ProviderKind::Mock;
    config.modes.dialogue.question_pause_ms = 250;
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded.synthesis.provider, ProviderKind::Mock);
    assert_eq!(loaded.modes.dialogue.question_pause_ms, 250);
    Ok(())
}

#[test]
fn test_load_withInvalidJson_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load(&path).is_err());
    Ok(())
}

#[test]
fn test_validate_withZeroTimeout_shouldFail() {
    let mut config = Config::default();
    config.pipeline.timeout_secs = 0;
    assert!(config.validate().is_err());
}
