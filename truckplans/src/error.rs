use thiserror::Error;

/// Everything that can go wrong while turning aggregate flows into trips.
///
/// `InvalidDistribution` and `KeyNotFound` describe a single record's missing or bad lookup data.
/// The disaggregator absorbs them into `Point::Unresolved`, so they never abort a batch.
/// `Configuration` is fatal and is reported before any sampling starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("{table} has no entry for ({key1}, {key2})")]
    KeyNotFound {
        table: String,
        key1: String,
        key2: String,
    },

    #[error("bad configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
