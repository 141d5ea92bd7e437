//! Classifier - error vs threshold

/// 1 = anomalous (`error > threshold`), 0 = normal. Equality is normal.
pub fn classify(errors: &[f64], threshold: f64) -> Vec<u8> {
    errors.iter().map(|&e| u8::from(is_anomaly(e, threshold))).collect()
}

pub fn is_anomaly(error: f64, threshold: f64) -> bool {
    error > threshold
}
