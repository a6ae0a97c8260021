use std::fmt;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Pipeline step an invocation stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    FetchReviews,
    Extract,
    WriteAnalysis,
    UpdateProfile,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchReviews => "fetch_reviews",
            Stage::Extract => "extract",
            Stage::WriteAnalysis => "write_analysis",
            Stage::UpdateProfile => "update_profile",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to fetch reviews: {0}")]
    Fetch(#[source] StoreError),

    #[error("Review corpus contains no words")]
    EmptyCorpus,

    #[error("Failed to write analysis: {0}")]
    WriteAnalysis(#[source] StoreError),

    #[error("Failed to update keyword profile: {0}")]
    UpdateProfile(#[source] StoreError),
}

impl AnalysisError {
    pub fn stage(&self) -> Stage {
        match self {
            AnalysisError::Fetch(_) => Stage::FetchReviews,
            AnalysisError::EmptyCorpus => Stage::Extract,
            AnalysisError::WriteAnalysis(_) => Stage::WriteAnalysis,
            AnalysisError::UpdateProfile(_) => Stage::UpdateProfile,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
