//! Error type shared by the scheme, the table cache and the harness.

use thiserror::Error;

use crate::table::TableParams;

/// Everything that can go wrong while priming the cache or running cases.
#[derive(Debug, Error)]
pub enum LheError {
    /// Storage or file system failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The table could not be serialized.
    #[error("failed to encode decryption table: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    /// The artifact is truncated or garbled.
    #[error("failed to decode decryption table: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    /// Unreadable config file or environment override.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The CSV report could not be written.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Table shape rejected by [`TableParams::validate`] or an artifact of the wrong size.
    #[error("invalid table parameters: {0}")]
    InvalidParams(String),

    /// Encryption or decryption before `key_gen`.
    #[error("no key pair, call key_gen first")]
    MissingKey,

    /// Decryption or `save_table` without a table.
    #[error("no decryption table loaded")]
    MissingTable,

    /// The decrypted point is not `v·G` for any `v` in the table range.
    #[error("decrypted value lies outside the table range [{min}, {max})")]
    OutOfRange {
        /// Smallest decodable value.
        min: i64,
        /// One past the largest decodable value.
        max: i64,
    },

    /// The artifact does not start with the table magic.
    #[error("artifact is not a decryption table")]
    BadMagic,

    /// The artifact was written by a different format version.
    #[error("unsupported table format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version this build reads and writes.
        expected: u16,
        /// Version found in the artifact header.
        found: u16,
    },

    /// The artifact was built for another table shape.
    #[error("table was built for {found:?} but {expected:?} is configured")]
    TableMismatch {
        /// Configured shape.
        expected: TableParams,
        /// Shape recorded in the artifact header.
        found: TableParams,
    },

    /// A case measured itself through the wrong bencher entry point.
    #[error("case `{case}` is registered as {expected} but measured as {found}")]
    ProtocolMismatch {
        /// Case name.
        case: String,
        /// Registered isolation.
        expected: &'static str,
        /// Isolation actually used, or `nothing`.
        found: &'static str,
    },

    /// A case produced the wrong number of samples.
    #[error("case `{case}` recorded {found} samples, expected {expected}")]
    IterationMismatch {
        /// Case name.
        case: String,
        /// Requested iterations.
        expected: u64,
        /// Samples actually recorded.
        found: u64,
    },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, LheError>;
