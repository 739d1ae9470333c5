pub mod input;
pub mod record;
pub mod validation;

pub use input::{expand_patterns, read_applicants};
pub use record::{Feature, FeatureRecord};
pub use validation::{parse_record, parse_record_strict, validate_features};
