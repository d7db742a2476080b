pub mod features;
pub mod models;

pub use features::{derive_features, FeatureRecord, ValidationError};
pub use models::{City, InputError, MatchContext, PredictRequest, Team, CITIES, IPL_LOGO};
