/*!
 * Configuration Tests
 * Rules documents on disk and settings feeding the context
 */

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use nxfs::config::settings::{ENV_CACHE_LIMIT, ENV_CACHE_SLACK, ENV_RULES};
use nxfs::{
    CacheConfig, ContentCache, FsObjectType, MemorySource, NxFs, NxfsConfig, NxfsError,
    RuleDocument, TypedArray,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const RULES: &str = r#"<?xml version="1.0"?>
<filters>
  <default_rules>
    <table_csv>
      <separator>|</separator>
    </table_csv>
  </default_rules>
  <specific_rules>
    <object>
      <path>/pairs</path>
      <mode>table_csv</mode>
      <table_csv>
        <fsobject_type>FILE</fsobject_type>
        <extension>.csv</extension>
      </table_csv>
    </object>
  </specific_rules>
</filters>
"#;

#[test]
fn test_rules_document_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.xml");
    fs::write(&path, RULES).unwrap();

    let document = RuleDocument::from_file(&path).unwrap();
    assert!(document.find_default_rule("table_csv"));
    assert_eq!(document.find_specific_rule("/pairs"), Some("table_csv"));

    let options = document.fetch_specific_rule("/pairs");
    assert_eq!(options.get("separator").map(String::as_str), Some("|"));
    assert_eq!(options.get("extension").map(String::as_str), Some(".csv"));
}

#[test]
fn test_missing_rules_file_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let result = RuleDocument::from_file(dir.path().join("absent.xml"));
    assert!(matches!(result, Err(NxfsError::ConfigParse(_))));
}

#[test]
fn test_settings_overlay() {
    let env: HashMap<&str, &str> = [
        (ENV_RULES, "/etc/nxfs/rules.xml"),
        (ENV_CACHE_LIMIT, "2048"),
        (ENV_CACHE_SLACK, "0"),
    ]
    .into_iter()
    .collect();

    let config = NxfsConfig::default()
        .with_overrides(|key| env.get(key).map(|v| v.to_string()))
        .with_source("/data/run.json");

    assert_eq!(config.rules_path, PathBuf::from("/etc/nxfs/rules.xml"));
    assert_eq!(config.source_path, Some(PathBuf::from("/data/run.json")));
    assert_eq!(
        config.cache,
        CacheConfig {
            eviction_slack: 0,
            memory_limit: Some(2048),
        }
    );
}

#[test]
fn test_context_from_config() {
    let dir = TempDir::new().unwrap();
    let rules = dir.path().join("rules.xml");
    fs::write(&rules, RULES).unwrap();

    let config = NxfsConfig::default().with_rules(&rules).with_overrides(|key| {
        (key == ENV_CACHE_LIMIT).then(|| "4096".to_string())
    });
    let document = RuleDocument::from_file(&config.rules_path).unwrap();
    let source = MemorySource::builder("pairs")
        .field("/pairs", &[2, 2], TypedArray::UInt8(vec![1, 2, 3, 4]))
        .build()
        .unwrap();

    let fs = NxFs::from_config(&config, Box::new(source), &document).unwrap();
    assert_eq!(fs.get_attributes("/pairs.csv").unwrap(), FsObjectType::File);
    assert_eq!(&fs.read("/pairs.csv").unwrap()[..], b"Untitled|Untitled\n1|3\n2|4\n");
    assert_eq!(fs.cache_stats().entries, 1);
}

#[test]
fn test_cache_budget_from_config() {
    let cache = ContentCache::from_config(&CacheConfig {
        eviction_slack: 0,
        memory_limit: Some(64),
    });
    assert_eq!(cache.stats().entries, 0);
    assert!(!cache.contains("/anything"));
}
