use serde::Deserialize;
use std::{fs, path::Path};
use tch::{kind::Kind, CModule, Device, Tensor};

use super::{encoder::FeatureEncoder, Predictor};
use crate::error::PredictError;
use crate::features::TripFeatures;

#[derive(Deserialize)]
struct MetaJson {
    feat_list: Vec<String>,
    in_dim: Option<usize>,
}

/// TorchScript regressor taking a `[1, in_dim]` float tensor and returning a
/// single ETA value.
pub struct TorchPredictor {
    model: CModule,
    device: Device,
    encoder: FeatureEncoder,
    name: String,
}

fn artifact_err(path: &str, reason: impl ToString) -> PredictError {
    PredictError::Artifact {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

impl TorchPredictor {
    pub fn new(model_path: &str, meta_path: &str) -> Result<Self, PredictError> {
        let device = Device::Cpu;

        // meta.json carries the feature ordering and input dim
        let meta_txt =
            fs::read_to_string(Path::new(meta_path)).map_err(|e| artifact_err(meta_path, e))?;
        let meta: MetaJson =
            serde_json::from_str(&meta_txt).map_err(|e| artifact_err(meta_path, e))?;

        let encoder = FeatureEncoder::new(meta.feat_list)?;
        let in_dim = meta.in_dim.unwrap_or(encoder.len());
        if in_dim != encoder.len() {
            tracing::warn!(
                "meta.in_dim ({}) != feat_list.len() ({}); using feat_list.len()",
                in_dim,
                encoder.len()
            );
        }

        let model = CModule::load_on_device(model_path, device)
            .map_err(|e| artifact_err(model_path, e))?;

        // Probe output shape with a dummy forward; expect a single value
        let dummy = Tensor::zeros([1, encoder.len() as i64], (Kind::Float, device));
        let out = model
            .forward_ts(&[dummy])
            .map_err(|e| artifact_err(model_path, e))?;
        if out.numel() != 1 {
            return Err(artifact_err(
                model_path,
                format!("unexpected model output size: {:?}", out.size()),
            ));
        }

        let name = Path::new(model_path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "torchscript".to_string());

        Ok(Self {
            model,
            device,
            encoder,
            name,
        })
    }
}

impl Predictor for TorchPredictor {
    fn predict(&self, features: &TripFeatures) -> Result<f64, PredictError> {
        let x: Vec<f32> = self
            .encoder
            .encode(features)
            .into_iter()
            .map(|v| v as f32)
            .collect();
        let input = Tensor::from_slice(&x)
            .reshape([1, x.len() as i64])
            .to_device(self.device);

        let out = self
            .model
            .forward_ts(&[input])
            .map_err(|e| PredictError::Model(e.to_string()))?;
        if out.numel() != 1 {
            return Err(PredictError::Model(format!(
                "unexpected output shape: {:?}",
                out.size()
            )));
        }
        Ok(out.reshape([-1]).double_value(&[0]))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
