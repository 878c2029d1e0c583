//! Makes sure the decryption table is computed once and reused afterwards.

use tracing::info;

use crate::error::Result;
use crate::scheme::{LheScheme, SchemeProvider};
use crate::storage::TableStorage;

/// Decryption table cache over a storage backend and a scheme provider.
///
/// Presence of the artifact is trusted: an existing artifact is never
/// inspected or rewritten here. Format and parameter checks happen when a
/// scheme loads the table.
pub struct TableCache<'a, S: ?Sized, P> {
    storage: &'a S,
    provider: &'a P,
}

impl<'a, S, P> TableCache<'a, S, P>
where
    S: TableStorage + ?Sized,
    P: SchemeProvider,
{
    /// Cache over `storage`, building tables with `provider`.
    pub fn new(storage: &'a S, provider: &'a P) -> Self {
        Self { storage, provider }
    }

    /// Compute and persist the table if it is missing.
    ///
    /// Returns `true` when the table had to be computed on this call.
    pub fn ensure(&self) -> Result<bool> {
        if self.storage.exists()? {
            info!(
                storage = %self.storage.info(),
                "decryption table present, skipping precomputation"
            );
            return Ok(false);
        }

        info!(storage = %self.storage.info(), "decryption table missing, precomputing");
        let mut scheme = self.provider.instantiate();
        scheme.precompute_decrypt_table()?;

        let mut bytes: Vec<u8> = Vec::new();
        scheme.save_table(&mut bytes)?;
        self.storage.store(&bytes)?;
        info!(bytes = bytes.len(), "decryption table written");
        Ok(true)
    }
}
