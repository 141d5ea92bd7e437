//! Preprocess Module - feature scaling and label encoding
//!
//! Both components are fitted once on training data and persisted in the
//! bundle. Scoring only ever calls `transform`; refitting there would move
//! the error distribution away from the one the threshold was derived on.

pub mod scaler;
pub mod label_encoder;

pub use scaler::StandardScaler;
pub use label_encoder::LabelEncoder;

use ndarray::{Array2, ArrayView2};

use crate::error::Result;

/// Fitted per-feature transform
pub trait Normalizer {
    fn fit(&mut self, x: ArrayView2<f64>) -> Result<()>;

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;

    fn fit_transform(&mut self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Fitted dimensionality, `None` before `fit`
    fn n_features(&self) -> Option<usize>;
}
