use crate::error::PredictError;
use crate::features::{is_categorical, TripFeatures, FEATURE_SCHEMA};

#[derive(Debug, Clone, PartialEq)]
enum Column {
    Numeric(&'static str),
    OneHot { field: &'static str, value: String },
}

/// Maps a `TripFeatures` record onto a model's input vector.
///
/// `feat_list` is the artifact's authoritative column order. Numeric columns
/// are named after the schema column (`distance_km`); categorical columns are
/// one-hot and named `Field=Value` (`City=Urban`). Any other name means the
/// artifact was fit against a different schema, and construction fails.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    feat_list: Vec<String>,
    columns: Vec<Column>,
}

impl FeatureEncoder {
    pub fn new(feat_list: Vec<String>) -> Result<Self, PredictError> {
        let columns = feat_list
            .iter()
            .map(|name| parse_column(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { feat_list, columns })
    }

    pub fn feat_list(&self) -> &[String] {
        &self.feat_list
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Always yields exactly `len()` values, one per `feat_list` entry.
    pub fn encode(&self, features: &TripFeatures) -> Vec<f64> {
        let record = features.columns();
        let lookup = |field: &str| {
            record
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, value)| value)
        };

        self.columns
            .iter()
            .map(|column| match column {
                Column::Numeric(field) => lookup(*field).and_then(|v| v.as_f64()).unwrap_or(0.0),
                Column::OneHot { field, value } => {
                    let hit = lookup(*field).and_then(|v| v.as_text()) == Some(value.as_str());
                    if hit {
                        1.0
                    } else {
                        0.0
                    }
                }
            })
            .collect()
    }
}

fn parse_column(name: &str) -> Result<Column, PredictError> {
    let schema_name = |s: &str| FEATURE_SCHEMA.iter().copied().find(|c| *c == s);

    if let Some(field) = schema_name(name) {
        if !is_categorical(field) {
            return Ok(Column::Numeric(field));
        }
    } else if let Some((field, value)) = name.split_once('=') {
        if let Some(field) = schema_name(field).filter(|f| is_categorical(f)) {
            return Ok(Column::OneHot {
                field,
                value: value.to_string(),
            });
        }
    }
    Err(PredictError::SchemaMismatch(name.to_string()))
}
