use super::types::{ArtifactBundle, BUNDLE_FORMAT_VERSION};
use crate::logic::model::ReconstructionModel;
use crate::logic::preprocess::Normalizer;

/// Check that the pieces of a bundle agree with each other
///
/// Returns a human-readable reason on failure; callers wrap it into a
/// persist or load error with the bundle path.
pub fn validate_bundle(bundle: &ArtifactBundle) -> Result<(), String> {
    let manifest = &bundle.manifest;

    if manifest.format_version != BUNDLE_FORMAT_VERSION {
        return Err(format!(
            "bundle format v{} not supported (expected v{})",
            manifest.format_version, BUNDLE_FORMAT_VERSION
        ));
    }

    let layout = &manifest.layout;
    if !layout.is_consistent() {
        return Err(format!("feature layout hash mismatch ({:08x})", layout.layout_hash));
    }

    let d = layout.dim();
    match bundle.normalizer.n_features() {
        Some(n) if n == d => {}
        Some(n) => return Err(format!("normalizer fitted on {} features, layout has {}", n, d)),
        None => return Err("normalizer is not fitted".to_string()),
    }
    match bundle.model.input_dim() {
        Some(n) if n == d => {}
        Some(n) => return Err(format!("{} expects {} features, layout has {}", bundle.model.name(), n, d)),
        None => return Err(format!("{} is not fitted", bundle.model.name())),
    }
    if manifest.model_kind != bundle.model.kind() {
        return Err(format!(
            "manifest says {:?}, model file holds {:?}",
            manifest.model_kind,
            bundle.model.kind()
        ));
    }

    if bundle.label_encoder.n_classes() == 0 {
        return Err("label encoder has no classes".to_string());
    }

    if !bundle.threshold.is_finite() || bundle.threshold < 0.0 {
        return Err(format!("threshold {} is not a finite non-negative number", bundle.threshold));
    }
    if bundle.threshold.to_bits() != manifest.validation.threshold.to_bits() {
        return Err(format!(
            "threshold {} disagrees with manifest {}",
            bundle.threshold, manifest.validation.threshold
        ));
    }

    Ok(())
}
