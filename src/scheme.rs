//! Capability interface of a lookup-table homomorphic encryption scheme.
//!
//! The cache and the harness only ever talk to a scheme through these two
//! traits, so they can be driven by the real curve implementation or by a
//! deterministic stand-in.

use std::io::{Read, Write};

use crate::error::Result;

/// One scheme instance: a key pair plus an optional loaded decryption table.
pub trait LheScheme {
    /// Encoded, unencrypted value.
    type Plaintext;
    /// Encrypted value.
    type Ciphertext;

    /// Replace the current key pair with a fresh one.
    fn key_gen(&mut self);

    /// Plaintext form of `value`, without encryption.
    fn encode(&self, value: i64) -> Self::Plaintext;

    /// Encrypt under the current key. Fails if no key was generated.
    fn encrypt(&self, value: i64) -> Result<Self::Ciphertext>;

    /// Decrypt under the current key using the loaded table.
    ///
    /// Fails if there is no key or no table, or if the value lies outside
    /// the range the table supports.
    fn decrypt(&self, ct: &Self::Ciphertext) -> Result<i64>;

    /// `Enc(a) ⊕ Enc(b) = Enc(a + b)`
    fn hom_add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;

    /// `Enc(a) ⊖ Enc(b) = Enc(a - b)`
    fn hom_sub(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> Self::Ciphertext;

    /// `Enc(a) ⊕ b = Enc(a + b)`
    fn hom_add_plain(&self, ct: &Self::Ciphertext, pt: &Self::Plaintext) -> Self::Ciphertext;

    /// `Enc(a) ⊖ b = Enc(a - b)`
    fn hom_sub_plain(&self, ct: &Self::Ciphertext, pt: &Self::Plaintext) -> Self::Ciphertext;

    /// Scale a ciphertext by a plaintext scalar.
    fn hom_mul(&self, ct: &Self::Ciphertext, pt: &Self::Plaintext) -> Self::Ciphertext;

    /// `-Enc(a) = Enc(-a)`
    fn hom_negate(&self, ct: &Self::Ciphertext) -> Self::Ciphertext;

    /// Build the decryption table and keep it loaded in this instance.
    fn precompute_decrypt_table(&mut self) -> Result<()>;

    /// Write the loaded table in the scheme's own binary format.
    fn save_table(&self, writer: &mut dyn Write) -> Result<()>;

    /// Replace the loaded table with one read from `reader`.
    fn load_table(&mut self, reader: &mut dyn Read) -> Result<()>;
}

/// Factory for fresh scheme instances (no key, no table).
pub trait SchemeProvider {
    /// Scheme handed out by [`SchemeProvider::instantiate`].
    type Scheme: LheScheme;

    /// Fresh instance with no key and no table.
    fn instantiate(&self) -> Self::Scheme;
}
