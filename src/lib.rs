//! Credit-risk scoring: a coefficient (logistic regression) model loaded from
//! artifacts, and a fixed banking heuristic with derived business outputs.

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod output;
pub mod scoring;
pub mod service;

pub use error::RiskError;
pub use features::{Feature, FeatureRecord};
pub use model::{ModelHandle, ModelPaths};
pub use service::RiskService;
