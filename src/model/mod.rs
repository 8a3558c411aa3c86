use std::{path::Path, sync::Arc};

use crate::error::PredictError;
use crate::features::TripFeatures;

pub mod encoder;
pub mod linear;
#[cfg(feature = "torch")]
pub mod torch;

pub use encoder::FeatureEncoder;
pub use linear::LinearPredictor;
#[cfg(feature = "torch")]
pub use torch::TorchPredictor;

/// A pre-trained ETA model. Loaded once, then shared read-only across callers.
pub trait Predictor: Send + Sync {
    /// ETA in minutes for one assembled record.
    fn predict(&self, features: &TripFeatures) -> Result<f64, PredictError>;

    fn name(&self) -> &str;

    fn version(&self) -> Option<&str> {
        None
    }
}

/// Picks an adapter from the artifact's extension: `.pt` is TorchScript
/// (needs `torch_meta`), anything else is read as a linear JSON export.
pub fn load(model_path: &Path, torch_meta: Option<&Path>) -> Result<Arc<dyn Predictor>, PredictError> {
    let is_torchscript = model_path.extension().is_some_and(|ext| ext == "pt");
    if is_torchscript {
        return load_torchscript(model_path, torch_meta);
    }
    Ok(Arc::new(LinearPredictor::load(model_path)?))
}

#[cfg(feature = "torch")]
fn load_torchscript(
    model_path: &Path,
    torch_meta: Option<&Path>,
) -> Result<Arc<dyn Predictor>, PredictError> {
    let meta = torch_meta.ok_or_else(|| PredictError::Artifact {
        path: model_path.display().to_string(),
        reason: "TorchScript models need a feature meta file".to_string(),
    })?;
    let model = TorchPredictor::new(
        &model_path.to_string_lossy(),
        &meta.to_string_lossy(),
    )?;
    Ok(Arc::new(model))
}

#[cfg(not(feature = "torch"))]
fn load_torchscript(
    model_path: &Path,
    _torch_meta: Option<&Path>,
) -> Result<Arc<dyn Predictor>, PredictError> {
    Err(PredictError::Artifact {
        path: model_path.display().to_string(),
        reason: "built without the `torch` feature".to_string(),
    })
}
