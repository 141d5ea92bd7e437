use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::types::*;
use super::validate::validate_bundle;
use crate::error::{PipelineError, Result};
use crate::logic::model::ReconstructionModel;

/// SHA-256 of `bytes`, lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn parent_dir(dir: &Path) -> PathBuf {
    match dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn to_json<T: Serialize>(value: &T, name: &str, dir: &Path) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|e| PipelineError::persist(dir.join(name), e))
}

fn write_artifact(staging: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = staging.join(name);
    let mut file = File::create(&path).map_err(|e| PipelineError::persist(&path, e))?;
    file.write_all(bytes).map_err(|e| PipelineError::persist(&path, e))?;
    file.sync_all().map_err(|e| PipelineError::persist(&path, e))?;
    Ok(())
}

// ============================================================================
// SAVE
// ============================================================================

/// Persist `bundle` into `dir`, all or nothing
///
/// Every artifact is written into a staging directory next to `dir`, the
/// manifest last. The staging directory then replaces `dir` by rename. Any
/// failure before the swap leaves the previous bundle as it was.
pub fn save_bundle(bundle: &ArtifactBundle, dir: &Path) -> Result<BundleManifest> {
    validate_bundle(bundle).map_err(|reason| PipelineError::persist(dir, reason))?;

    let parent = parent_dir(dir);
    fs::create_dir_all(&parent).map_err(|e| PipelineError::persist(&parent, e))?;

    // Guard removes the staging dir on any early return
    let staging = tempfile::Builder::new()
        .prefix(".bundle-staging-")
        .tempdir_in(&parent)
        .map_err(|e| PipelineError::persist(&parent, e))?;

    let artifacts: [(&str, Vec<u8>); 4] = [
        (NORMALIZER_FILE, to_json(&bundle.normalizer, NORMALIZER_FILE, dir)?),
        (LABEL_ENCODER_FILE, to_json(&bundle.label_encoder, LABEL_ENCODER_FILE, dir)?),
        (MODEL_FILE, to_json(&bundle.model, MODEL_FILE, dir)?),
        (THRESHOLD_FILE, to_json(&ThresholdArtifact { threshold: bundle.threshold }, THRESHOLD_FILE, dir)?),
    ];

    let mut manifest = bundle.manifest.clone();
    manifest.checksums.clear();

    for (name, bytes) in &artifacts {
        write_artifact(staging.path(), name, bytes)?;
        manifest.checksums.insert(name.to_string(), sha256_hex(bytes));
        log::debug!("Staged {} ({} bytes)", name, bytes.len());
    }

    let manifest_bytes = to_json(&manifest, MANIFEST_FILE, dir)?;
    write_artifact(staging.path(), MANIFEST_FILE, &manifest_bytes)?;

    publish(staging.path(), dir)?;

    log::info!("Bundle {} published to {}", manifest.bundle_id, dir.display());
    Ok(manifest)
}

/// Name prefix of a bundle moved aside during publish
fn retired_prefix(dir: &Path) -> String {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bundle".to_string());
    format!(".{}.retired-", name)
}

fn retired_entries(dir: &Path) -> Vec<PathBuf> {
    let prefix = retired_prefix(dir);
    match fs::read_dir(parent_dir(dir)) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .map(|e| e.path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Swap the staged directory into place
///
/// The old bundle is renamed aside first. If the process dies between the
/// two renames, `recover_retired` puts it back on the next load.
fn publish(staging: &Path, dir: &Path) -> Result<()> {
    let retired = if dir.exists() {
        let retired = parent_dir(dir).join(format!("{}{}", retired_prefix(dir), uuid::Uuid::new_v4()));
        fs::rename(dir, &retired)
            .map_err(|e| PipelineError::persist(dir, format!("cannot retire previous bundle: {}", e)))?;
        Some(retired)
    } else {
        None
    };

    if let Err(e) = fs::rename(staging, dir) {
        if let Some(previous) = &retired {
            if let Err(restore) = fs::rename(previous, dir) {
                log::error!("Failed to restore previous bundle from {}: {}", previous.display(), restore);
            }
        }
        return Err(PipelineError::persist(dir, format!("cannot publish staged bundle: {}", e)));
    }

    // Includes leftovers of earlier interrupted publishes
    for previous in retired_entries(dir) {
        if let Err(e) = fs::remove_dir_all(&previous) {
            log::warn!("Could not remove retired bundle {}: {}", previous.display(), e);
        }
    }

    Ok(())
}

/// Restore the newest retired bundle when `dir` itself is gone
fn recover_retired(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }

    let newest = retired_entries(dir)
        .into_iter()
        .filter_map(|path| {
            let bytes = fs::read(path.join(MANIFEST_FILE)).ok()?;
            let manifest: BundleManifest = serde_json::from_slice(&bytes).ok()?;
            Some((manifest.created_at, path))
        })
        .max_by_key(|(created_at, _)| *created_at);

    if let Some((_, retired)) = newest {
        log::warn!("Restoring {} from interrupted publish {}", dir.display(), retired.display());
        if let Err(e) = fs::rename(&retired, dir) {
            // Another reader may have restored it first
            if !dir.is_dir() {
                return Err(PipelineError::load(
                    dir,
                    format!("cannot restore retired bundle {}: {}", retired.display(), e),
                ));
            }
        }
    }

    Ok(())
}

// ============================================================================
// LOAD
// ============================================================================

fn read_json<T: DeserializeOwned>(dir: &Path, name: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| PipelineError::load(dir.join(name), e))
}

fn read_verified(dir: &Path, name: &str, manifest: &BundleManifest) -> Result<Vec<u8>> {
    let path = dir.join(name);
    let bytes = fs::read(&path).map_err(|e| PipelineError::load(&path, e))?;

    let expected = manifest
        .checksums
        .get(name)
        .ok_or_else(|| PipelineError::load(&path, "no checksum in manifest"))?;
    let actual = sha256_hex(&bytes);
    if &actual != expected {
        return Err(PipelineError::load(
            &path,
            format!("checksum mismatch (manifest {}, file {})", expected, actual),
        ));
    }

    Ok(bytes)
}

/// Load and verify a bundle
///
/// Fails with `ArtifactLoad` if the manifest or any artifact is missing,
/// altered, or inconsistent with the others.
pub fn load_bundle(dir: &Path) -> Result<ArtifactBundle> {
    log::info!("Loading artifact bundle from: {}", dir.display());

    recover_retired(dir)?;
    if !dir.is_dir() {
        return Err(PipelineError::load(dir, "bundle directory not found"));
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest_bytes = fs::read(&manifest_path).map_err(|e| PipelineError::load(&manifest_path, e))?;
    let manifest: BundleManifest = read_json(dir, MANIFEST_FILE, &manifest_bytes)?;

    if manifest.format_version != BUNDLE_FORMAT_VERSION {
        return Err(PipelineError::load(
            &manifest_path,
            format!("bundle format v{} not supported (expected v{})", manifest.format_version, BUNDLE_FORMAT_VERSION),
        ));
    }
    for name in REQUIRED_ARTIFACTS {
        if !dir.join(name).is_file() {
            return Err(PipelineError::load(dir.join(name), "artifact missing from bundle"));
        }
    }

    let normalizer = read_json(dir, NORMALIZER_FILE, &read_verified(dir, NORMALIZER_FILE, &manifest)?)?;
    let label_encoder = read_json(dir, LABEL_ENCODER_FILE, &read_verified(dir, LABEL_ENCODER_FILE, &manifest)?)?;
    let model = read_json(dir, MODEL_FILE, &read_verified(dir, MODEL_FILE, &manifest)?)?;
    let threshold: ThresholdArtifact = read_json(dir, THRESHOLD_FILE, &read_verified(dir, THRESHOLD_FILE, &manifest)?)?;

    let bundle = ArtifactBundle {
        manifest,
        normalizer,
        label_encoder,
        model,
        threshold: threshold.threshold,
    };

    validate_bundle(&bundle).map_err(|reason| PipelineError::load(dir, reason))?;

    log::info!(
        "Loaded bundle {} ({}, {} features, threshold {:.6})",
        bundle.id(),
        bundle.model.name(),
        bundle.layout().dim(),
        bundle.threshold
    );

    Ok(bundle)
}
