//! CLI TOML configuration tests

use clap::Parser;
use scanpipe::app::cli::Args;
use scanpipe::pipeline::ColorMode;
use std::path::Path;
use toml::Table;

fn table(text: &str) -> Table {
    toml::from_str(text).unwrap()
}

#[test]
fn test_config_fills_unset_options() {
    let mut args = Args::default();
    args.apply_toml_values(&table(
        r#"
        resolution = 300
        color = "monochrome"
        deskew = false
        jobs = 2
        fuzz = 10
        vendor-id = "04F9"
        log-level = "info"
        "#,
    ))
    .unwrap();

    let config = args.to_pipeline_config().unwrap();
    assert_eq!(config.resolution, 300);
    assert_eq!(config.color, ColorMode::Monochrome);
    assert_eq!(config.cleanup.deskew_threshold, None);
    assert_eq!(config.concurrency, 2);
    assert_eq!(config.cleanup.fuzz_percent, 10);
    assert_eq!(config.vendor_id, "04f9");
    assert_eq!(args.log_level.as_deref(), Some("info"));
}

#[test]
fn test_cli_overrides_config() {
    let mut args = Args::try_parse_from(["scanpipe", "-r", "600", "--deskew", "-c", "grayscale"]).unwrap();
    args.apply_toml_values(&table("resolution = 100\ndeskew = false\ncolor = \"truecolor\""))
        .unwrap();

    let config = args.to_pipeline_config().unwrap();
    assert_eq!(config.resolution, 600);
    assert_eq!(config.color, ColorMode::Grayscale);
    assert_eq!(config.cleanup.deskew_threshold, Some(30));
}

#[test]
fn test_unknown_key_rejected() {
    let mut args = Args::default();
    let err = args.apply_toml_values(&table("resolutoin = 300")).unwrap_err();
    assert!(err.message().contains("resolutoin"));
}

#[test]
fn test_wrong_value_types_rejected() {
    for text in ["jobs = \"four\"", "trim = \"yes\"", "color = 3", "jobs = -1"] {
        let mut args = Args::default();
        assert!(args.apply_toml_values(&table(text)).is_err(), "accepted {}", text);
    }
}

#[test]
fn test_invalid_config_value_caught_on_resolve() {
    let mut args = Args::default();
    args.apply_toml_values(&table("resolution = 250")).unwrap();
    assert!(args.to_pipeline_config().is_err());
}

#[test]
fn test_parse_error_names_the_file() {
    let mut args = Args::default();
    let err = args
        .apply_config_str("resolution = [", Path::new("/etc/scanpipe.toml"))
        .unwrap_err();
    assert!(err.message().contains("/etc/scanpipe.toml"));
}

#[tokio::test]
async fn test_explicit_config_file_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scanpipe.toml");
    std::fs::write(&path, "trim = false\nsane-model = \"BrotherADS2200\"\n").unwrap();

    let mut args = Args::try_parse_from(["scanpipe", "--config-file", path.to_str().unwrap()]).unwrap();
    let loaded = args.load_config_file().await.unwrap();

    assert_eq!(loaded.as_deref(), Some(path.as_path()));
    let config = args.to_pipeline_config().unwrap();
    assert!(!config.cleanup.trim);
    assert_eq!(config.sane_model, "BrotherADS2200");
}

#[tokio::test]
async fn test_explicit_missing_config_file_is_error() {
    let mut args = Args::try_parse_from(["scanpipe", "--config-file", "/no/such/scanpipe.toml"]).unwrap();
    assert!(args.load_config_file().await.is_err());
}
