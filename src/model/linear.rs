use serde::Deserialize;
use std::{fs, path::Path};

use super::{encoder::FeatureEncoder, Predictor};
use crate::error::PredictError;
use crate::features::TripFeatures;

#[derive(Deserialize)]
struct LinearArtifact {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default)]
    version: Option<String>,
    feat_list: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

fn default_name() -> String {
    "linear".to_string()
}

/// Linear regression exported as JSON: `intercept + coefficients . x`, where
/// `x` is the encoded record in `feat_list` order.
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    name: String,
    version: Option<String>,
    encoder: FeatureEncoder,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearPredictor {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let txt = fs::read_to_string(path).map_err(|e| PredictError::Artifact {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json(&txt, &origin)
    }

    pub fn from_json(txt: &str, origin: &str) -> Result<Self, PredictError> {
        let artifact: LinearArtifact =
            serde_json::from_str(txt).map_err(|e| PredictError::Artifact {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;

        if artifact.coefficients.len() != artifact.feat_list.len() {
            return Err(PredictError::FeatureLength {
                got: artifact.coefficients.len(),
                expected: artifact.feat_list.len(),
            });
        }
        let encoder = FeatureEncoder::new(artifact.feat_list)?;

        Ok(Self {
            name: artifact.name,
            version: artifact.version,
            encoder,
            coefficients: artifact.coefficients,
            intercept: artifact.intercept,
        })
    }

    pub fn feat_list(&self) -> &[String] {
        self.encoder.feat_list()
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, features: &TripFeatures) -> Result<f64, PredictError> {
        // encoder width equals coefficients.len(), checked in from_json
        let x = self.encoder.encode(features);
        let eta = self.intercept
            + x.iter()
                .zip(&self.coefficients)
                .map(|(xi, wi)| xi * wi)
                .sum::<f64>();
        if !eta.is_finite() {
            return Err(PredictError::Model(format!("non-finite output {eta}")));
        }
        Ok(eta)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
