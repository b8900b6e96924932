use super::*;
use crate::core::errors::SketchError;
use crate::sketch::MoleculeType;
use tempfile::tempdir;

fn expect_validation_error<T: std::fmt::Debug>(result: Result<T>) -> SketchError {
    result.expect_err("expected validation failure")
}

#[test]
fn default_configs_validate_successfully() {
    SketchConfig::default().validate().expect("sketch default");
    PerformanceConfig::default()
        .validate()
        .expect("performance default");
    PlotConfig::default().validate().expect("plot default");
    KmerPolicy::default().validate().expect("tokenizer default");
}

#[test]
fn partial_yaml_falls_back_to_defaults() {
    let yaml = "compute:\n  ksizes: [21, 31]\n  protein: true\ncomparison:\n  threshold: 0.5\n";
    let config: SketchConfig = serde_yaml::from_str(yaml).expect("parse partial config");

    assert_eq!(config.compute.ksizes, vec![21, 31]);
    assert!(config.compute.dna);
    assert!(config.compute.protein);
    assert_eq!(config.compute.num_hashes, 500);
    assert_eq!(config.comparison.moltype, MoleculeType::Dna);
    assert!((config.comparison.threshold - 0.5).abs() < f64::EPSILON);
    assert_eq!(config.tokenizer.ambiguous_bases, AmbiguousBasePolicy::Skip);
    config.validate().expect("partial config is valid");
}

#[test]
fn yaml_round_trip_through_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.yml");

    let mut config = SketchConfig::default();
    config.compute.seed = 7;
    config.tokenizer.ambiguous_bases = AmbiguousBasePolicy::Reject;
    config.to_yaml_file(&path).expect("write config");

    let loaded = SketchConfig::from_yaml_file(&path).expect("read config");
    assert_eq!(loaded, config);
}

#[test]
fn discovery_prefers_explicit_then_local_file() {
    let dir = tempdir().expect("tempdir");
    let explicit = dir.path().join("custom.yml");

    assert_eq!(
        SketchConfig::discover(Some(&explicit), dir.path()),
        Some(explicit.clone())
    );

    let local = dir.path().join(".seqsketch.yml");
    std::fs::write(&local, "compute:\n  seed: 3\n").expect("write local config");
    assert_eq!(SketchConfig::discover(None, dir.path()), Some(local));

    let loaded = SketchConfig::load(None, dir.path()).expect("load local config");
    assert_eq!(loaded.compute.seed, 3);
}

#[test]
fn missing_explicit_file_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let err = expect_validation_error(SketchConfig::load(
        Some(&dir.path().join("absent.yml")),
        dir.path(),
    ));
    assert!(matches!(err, SketchError::Io { .. }));
}

#[test]
fn performance_config_rejects_zero_limits() {
    let config = PerformanceConfig {
        max_threads: Some(0),
        ..PerformanceConfig::default()
    };
    let err = expect_validation_error(config.validate());
    assert!(
        format!("{err}").contains("max_threads"),
        "unexpected error message: {err}"
    );

    let config = PerformanceConfig {
        timeout_seconds: Some(0),
        ..PerformanceConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn contradictory_compute_section_fails_whole_config() {
    let mut config = SketchConfig::default();
    config.compute.dna = false;
    config.compute.protein = false;
    let err = expect_validation_error(config.validate());
    assert!(err.is_fatal());
}

#[test]
fn configured_renderer_wins_over_environment() {
    let config = PlotConfig {
        renderer: Some(PathBuf::from("/usr/local/bin/render-matrix")),
        format: PlotFormat::Pdf,
    };
    assert_eq!(
        config.resolve_renderer(),
        Some(PathBuf::from("/usr/local/bin/render-matrix"))
    );
    assert_eq!(config.format.extension(), "pdf");

    let empty = PlotConfig {
        renderer: Some(PathBuf::new()),
        ..PlotConfig::default()
    };
    assert!(empty.validate().is_err());
}
