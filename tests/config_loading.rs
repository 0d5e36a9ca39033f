//! Loading engine configuration from TOML files

use blockmap_rs::{ConfigError, EngineConfig, MemoryManager, StrategyKind};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
        total_memory_bytes = 1024
        block_size_bytes = 128
        default_strategy = "next"
        journal_capacity = 4
        "#,
    );

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.total_blocks(), 8);
    assert_eq!(config.default_strategy, StrategyKind::NextFit);

    let mut memory = MemoryManager::from_config(config).unwrap();
    let a = memory.create_process_default("A", 128, "").unwrap();
    let b = memory.create_process_default("B", 128, "").unwrap();
    memory.delete_process(a.id).unwrap();
    let c = memory.create_process_default("C", 128, "").unwrap();

    // Next-fit keeps moving forward instead of reusing block 0
    assert_eq!((a.start_block, b.start_block, c.start_block), (0, 1, 2));
}

#[test]
fn test_journal_capacity_from_config() {
    let file = write_config("journal_capacity = 2");
    let config = EngineConfig::load(file.path()).unwrap();
    let mut memory = MemoryManager::from_config(config).unwrap();

    for i in 0..5 {
        memory
            .create_process(format!("P{i}"), 1, "", StrategyKind::FirstFit)
            .unwrap();
    }

    assert_eq!(memory.journal().len(), 2);
    assert!(memory
        .journal()
        .latest()
        .unwrap()
        .message
        .starts_with("Created process P4"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_load_rejects_zero_block_size() {
    let file = write_config("block_size_bytes = 0");
    assert!(matches!(
        EngineConfig::load(file.path()),
        Err(ConfigError::InvalidBlockSize(0))
    ));
}

#[test]
fn test_load_rejects_oversized_region() {
    let file = write_config(
        r#"
        total_memory_bytes = 9223372036854775807
        block_size_bytes = 1
        "#,
    );
    assert!(matches!(
        EngineConfig::load(file.path()),
        Err(ConfigError::TooManyBlocks { .. })
    ));
}

#[test]
fn test_load_rejects_malformed_toml() {
    let file = write_config("total_memory_bytes = \"lots\"");
    assert!(matches!(
        EngineConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_config_roundtrips_through_toml() {
    let config = EngineConfig::new(4096, 256).with_default_strategy(StrategyKind::BestFit);
    let text = toml::to_string(&config).unwrap();
    assert!(text.contains("default_strategy = \"best\""));
    assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
}
