use std::path::{Path, PathBuf};

use apimodel_config::{discover_config_path, ApiModelConfig, ConfigError};
use apimodel_signature::{FileFormat, FormatVersion};
use pretty_assertions::assert_eq;

const FULL: &str = r#"
[logging]
level = "debug"
json = true
stderr = false

[signature]
format = "3.0"
kotlin_style_nulls = false
kotlin_name_type_order = true

[classpath]
indexes = ["deps/android-stubs.json", "/opt/stubs/jdk.json"]
"#;

#[test]
fn full_config_round_trips_into_typed_settings() {
    let config = ApiModelConfig::load_from_str(FULL).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert!(!config.logging.stderr);

    let format = config.signature.file_format().unwrap();
    assert_eq!(format.version, FormatVersion::V3);
    assert!(!format.kotlin_style_nulls);
    assert!(format.kotlin_name_type_order);
    assert_eq!(format.include_type_use_annotations, FileFormat::V3.include_type_use_annotations);

    let paths = config.classpath.resolve_paths(Path::new("/work/project"));
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/work/project/deps/android-stubs.json"),
            PathBuf::from("/opt/stubs/jdk.json"),
        ]
    );
}

#[test]
fn missing_sections_use_defaults() {
    let config = ApiModelConfig::load_from_str("[signature]\nformat = \"5.0\"\n").unwrap();
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.signature.file_format().unwrap(), FileFormat::V5);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = ApiModelConfig::load_from_str("[logging]\nlevle = \"debug\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err}");
}

#[test]
fn unsupported_format_version_is_an_invalid_value() {
    let err = ApiModelConfig::load_from_str("[signature]\nformat = \"1.0\"\n").unwrap_err();
    match err {
        ConfigError::InvalidValue { key, .. } => assert_eq!(key, "signature.format"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn config_files_are_discovered_and_loaded() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(discover_config_path(dir.path()), None);
    assert!(matches!(
        ApiModelConfig::load_from_path(dir.path().join("apimodel.toml")),
        Err(ConfigError::Io { .. })
    ));

    let path = dir.path().join(".apimodel.toml");
    std::fs::write(&path, FULL).unwrap();
    assert_eq!(discover_config_path(dir.path()), Some(path.clone()));
    let config = ApiModelConfig::load_from_path(&path).unwrap();
    assert_eq!(config.classpath.indexes.len(), 2);
}
