use thiserror::Error;

/// Failures while loading a model artifact or running inference.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    #[error("schema mismatch: column '{0}' is not produced by the feature record")]
    SchemaMismatch(String),

    #[error("feature length mismatch: got {got}, expected {expected}")]
    FeatureLength { got: usize, expected: usize },

    #[error("model error: {0}")]
    Model(String),
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read metadata at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("range for '{field}' has min {min} > max {max}")]
    InvalidRange { field: String, min: f64, max: f64 },

    #[error("category list for '{0}' is empty")]
    EmptyCategory(String),
}

/// A user-supplied value the form layer refuses before assembly.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} = '{value}' is not one of: {allowed}")]
    UnknownCategory {
        field: String,
        value: String,
        allowed: String,
    },

    #[error("no metadata for field '{0}'")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("terminal i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Input(#[from] InputError),
}
