pub mod config;
pub mod error;
pub mod eta;
pub mod features;
pub mod metadata;
pub mod model;
pub mod part_of_day;
pub mod server;
pub mod shell;

pub use eta::{estimate, Estimate};
pub use features::{assemble, RawInputs, TripFeatures, FEATURE_SCHEMA};
pub use model::Predictor;
pub use part_of_day::{classify, PartOfDay};
