//! LHE25519 decryption-table cache and primitive benchmarks

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]

pub mod error;
pub mod config;
pub mod table;
pub mod cipher;
pub mod scheme;
pub mod lhe25519;
pub mod storage;
pub mod cache;
pub mod timer;
pub mod bench;
pub mod report;
pub mod suite;

#[cfg(test)]
mod testing;

pub use bench::{Bencher, CaseContext, CaseDescriptor, CaseRegistry, Isolation};
pub use cache::TableCache;
pub use cipher::{Ciphertext, Plaintext};
pub use config::HarnessConfig;
pub use error::{LheError, Result};
pub use lhe25519::{Lhe25519, Lhe25519Provider};
pub use report::CaseReport;
pub use scheme::{LheScheme, SchemeProvider};
pub use storage::{FileStorage, RamStorage, TableStorage};
pub use table::{DecryptTable, TableParams};
pub use timer::{Clock, MonotonicClock};
