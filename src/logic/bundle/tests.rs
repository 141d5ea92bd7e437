use std::fs;
use std::path::Path;

use ndarray::Array2;

use super::storage::{load_bundle, save_bundle};
use super::types::*;
use super::validate::validate_bundle;
use crate::error::PipelineError;
use crate::logic::features::FeatureLayout;
use crate::logic::model::{PcaModel, ReconstructionModel, Reconstructor};
use crate::logic::preprocess::{LabelEncoder, Normalizer, StandardScaler};
use crate::logic::scoring::{fit_threshold, ThresholdPolicy};

fn sample_matrix() -> Array2<f64> {
    Array2::from_shape_fn((40, 3), |(i, j)| {
        let t = i as f64 * 0.25;
        match j {
            0 => t.sin() * 2.0 + 10.0,
            1 => t.cos() - 3.0,
            _ => (i % 7) as f64 * 0.5,
        }
    })
}

fn fitted_bundle() -> ArtifactBundle {
    let x = sample_matrix();
    let mut scaler = StandardScaler::new();
    let normalized = scaler.fit_transform(x.view()).unwrap();

    let mut model = Reconstructor::Pca(PcaModel::new(2, 42));
    model.fit(normalized.view(), None).unwrap();

    let mut encoder = LabelEncoder::new();
    encoder.fit(&["0", "1", "0"]).unwrap();

    let validation = fit_threshold(&model, normalized.view(), &ThresholdPolicy::default()).unwrap();
    let layout = FeatureLayout::new("label", vec!["a".into(), "b".into(), "c".into()]);

    ArtifactBundle::new(layout, scaler, encoder, model, validation)
}

fn leftover_entries(parent: &Path) -> Vec<String> {
    fs::read_dir(parent)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".bundle-") || name.contains(".retired-"))
        .collect()
}

#[test]
fn test_fitted_bundle_is_valid() {
    let bundle = fitted_bundle();
    assert!(validate_bundle(&bundle).is_ok());
    assert!(bundle.threshold.is_finite());
}

#[test]
fn test_save_load_cycle() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");

    let original = fitted_bundle();
    let manifest = save_bundle(&original, &dir).unwrap();

    assert_eq!(manifest.checksums.len(), REQUIRED_ARTIFACTS.len());
    for name in REQUIRED_ARTIFACTS.iter().chain([MANIFEST_FILE].iter()) {
        assert!(dir.join(name).is_file(), "{} missing", name);
    }

    let loaded = load_bundle(&dir).unwrap();
    assert_eq!(loaded.id(), original.id());
    assert_eq!(loaded.threshold.to_bits(), original.threshold.to_bits());
    assert_eq!(loaded.layout(), original.layout());
    assert_eq!(loaded.label_encoder, original.label_encoder);

    // Same transform + reconstruction after the round trip
    let x = sample_matrix();
    let before = original.model.predict(original.normalizer.transform(x.view()).unwrap().view()).unwrap();
    let after = loaded.model.predict(loaded.normalizer.transform(x.view()).unwrap().view()).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_missing_directory() {
    let root = tempfile::tempdir().unwrap();
    let result = load_bundle(&root.path().join("nope"));
    assert!(matches!(result, Err(PipelineError::ArtifactLoad { .. })));
}

#[test]
fn test_missing_artifact() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");
    save_bundle(&fitted_bundle(), &dir).unwrap();

    fs::remove_file(dir.join(THRESHOLD_FILE)).unwrap();

    match load_bundle(&dir) {
        Err(PipelineError::ArtifactLoad { path, .. }) => assert!(path.ends_with(THRESHOLD_FILE)),
        other => panic!("Expected ArtifactLoad, got {:?}", other.map(|b| b.threshold)),
    }
}

#[test]
fn test_missing_manifest() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");
    save_bundle(&fitted_bundle(), &dir).unwrap();

    fs::remove_file(dir.join(MANIFEST_FILE)).unwrap();

    assert!(matches!(load_bundle(&dir), Err(PipelineError::ArtifactLoad { .. })));
}

#[test]
fn test_tampered_artifact_rejected() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");
    save_bundle(&fitted_bundle(), &dir).unwrap();

    // Valid JSON, wrong bytes
    fs::write(dir.join(THRESHOLD_FILE), r#"{"threshold": 123.0}"#).unwrap();

    match load_bundle(&dir) {
        Err(PipelineError::ArtifactLoad { reason, .. }) => assert!(reason.contains("checksum")),
        other => panic!("Expected checksum failure, got {:?}", other.map(|b| b.threshold)),
    }
}

#[test]
fn test_overwrite_replaces_bundle() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");

    let first = fitted_bundle();
    save_bundle(&first, &dir).unwrap();
    fs::write(dir.join("stray.txt"), "left from an older run").unwrap();

    let second = fitted_bundle();
    save_bundle(&second, &dir).unwrap();

    let loaded = load_bundle(&dir).unwrap();
    assert_eq!(loaded.id(), second.id());
    assert_ne!(loaded.id(), first.id());
    assert!(!dir.join("stray.txt").exists());
    assert!(leftover_entries(root.path()).is_empty());
}

#[test]
fn test_invalid_bundle_not_persisted() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");

    let good = fitted_bundle();
    save_bundle(&good, &dir).unwrap();

    let mut bad = fitted_bundle();
    bad.threshold = f64::NAN;
    let result = save_bundle(&bad, &dir);
    assert!(matches!(result, Err(PipelineError::ArtifactPersist { .. })));

    // Previous bundle untouched
    let loaded = load_bundle(&dir).unwrap();
    assert_eq!(loaded.id(), good.id());
    assert!(leftover_entries(root.path()).is_empty());
}

#[test]
fn test_reject_layout_hash_mismatch() {
    let mut bundle = fitted_bundle();
    bundle.manifest.layout.layout_hash = !bundle.manifest.layout.layout_hash;
    assert!(validate_bundle(&bundle).unwrap_err().contains("layout"));
}

#[test]
fn test_reject_dimension_disagreement() {
    let mut bundle = fitted_bundle();
    bundle.manifest.layout = FeatureLayout::new("label", vec!["a".into(), "b".into()]);
    assert!(validate_bundle(&bundle).is_err());
}

#[test]
fn test_reject_threshold_disagreement() {
    let mut bundle = fitted_bundle();
    bundle.threshold += 1.0;
    assert!(validate_bundle(&bundle).unwrap_err().contains("manifest"));
}

#[test]
fn test_reject_unfitted_model() {
    let mut bundle = fitted_bundle();
    bundle.model = Reconstructor::Pca(PcaModel::new(2, 42));
    assert!(validate_bundle(&bundle).unwrap_err().contains("not fitted"));
}

#[test]
fn test_load_recovers_bundle_stranded_mid_publish() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");
    let saved = fitted_bundle();
    save_bundle(&saved, &dir).unwrap();

    // Crash after the old bundle was moved aside, before the new one landed
    fs::rename(&dir, root.path().join(".models.retired-interrupted")).unwrap();

    let loaded = load_bundle(&dir).unwrap();
    assert_eq!(loaded.id(), saved.id());
    assert!(dir.is_dir());
    assert!(leftover_entries(root.path()).is_empty());
}

#[test]
fn test_newest_retired_bundle_wins() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");

    let older = fitted_bundle();
    save_bundle(&older, &dir).unwrap();
    fs::rename(&dir, root.path().join(".models.retired-a")).unwrap();

    let mut newer = fitted_bundle();
    newer.manifest.created_at = older.manifest.created_at + chrono::Duration::seconds(60);
    save_bundle(&newer, &dir).unwrap();
    // the successful publish swept the older leftover
    assert!(leftover_entries(root.path()).is_empty());
    fs::rename(&dir, root.path().join(".models.retired-b")).unwrap();
    save_bundle(&older, &root.path().join("scratch")).unwrap();
    fs::rename(root.path().join("scratch"), root.path().join(".models.retired-c")).unwrap();

    assert_eq!(load_bundle(&dir).unwrap().id(), newer.id());
}

#[test]
fn test_other_bundles_retired_dirs_are_ignored() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("models");
    let other = root.path().join("other");
    save_bundle(&fitted_bundle(), &other).unwrap();
    fs::rename(&other, root.path().join(".other.retired-x")).unwrap();

    assert!(matches!(load_bundle(&dir), Err(PipelineError::ArtifactLoad { .. })));
    assert!(root.path().join(".other.retired-x").is_dir());
}
