//! EVA Engine
//!
//! Ecological Value Assessment: scores how valuable each subzone of a study
//! area is for one ecosystem component, and sums those scores across several
//! components into a Total EV.
//!
//! Pipeline for one dataset:
//! - `detection`: qualitative (presence/absence) vs quantitative data
//! - `utils/`: rescaling to the 0-5 scale and percentile helpers
//! - `classification`: LRF/ROF from occurrence plus user-assigned roles
//! - `metrics/`: AQ1-AQ15 (AQ9 concentration-weighted) and EV as their max
//! - `scorer`: runs the stages in order for one or many components
//!
//! Around it:
//! - `data`: Polars loading and boundary validation
//! - `store`: saved components and Total EV aggregation
//! - `session`: the working state of one assessment
//! - `profile`, `export`: feature statistics and result frames

pub mod config;
pub mod error;
pub mod data;
pub mod detection;
pub mod utils;
pub mod classification;
pub mod metrics;
pub mod scorer;
pub mod store;
pub mod session;
pub mod profile;
pub mod export;

// Re-export commonly used types
pub use config::EvaConfig;
pub use error::{DatasetError, EvaError, EvaResult, StoreError};
pub use data::{Dataset, ValidationReport, SUBZONE_ID};
pub use detection::{detect_data_type, DataType, Detection};
pub use utils::{rescale, rescale_qualitative, rescale_quantitative, RescaledMatrix};
pub use classification::{classify_features, Classification, Tag, TagSet, UserClassifications};
pub use metrics::*;
pub use scorer::{ComponentInput, ComponentScore, EvScorer};
pub use store::{ComponentSnapshot, ComponentStore, ComponentSummary, TotalEvTable};
pub use session::Session;
pub use profile::{feature_profiles, FeatureProfile};
