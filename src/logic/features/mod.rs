//! Features Module - feature schema of the trained bundle

pub mod layout;

pub use layout::{FeatureLayout, compute_layout_hash, LAYOUT_VERSION};
