//! Additively homomorphic EC-ElGamal over Ristretto25519 with table decryption.

use std::io::{Read, Write};

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use rand::RngCore;

use crate::cipher::{Ciphertext, Plaintext};
use crate::error::{LheError, Result};
use crate::scheme::{LheScheme, SchemeProvider};
use crate::table::{DecryptTable, TableParams};

struct KeyPair {
    secret: Scalar,
    public: RistrettoPoint,
}

impl KeyPair {
    fn generate() -> Self {
        let secret = random_scalar();
        Self {
            secret,
            public: RistrettoPoint::mul_base(&secret),
        }
    }
}

fn random_scalar() -> Scalar {
    let mut wide = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut wide);
    Scalar::from_bytes_mod_order_wide(&wide)
}

/// Scheme state: current key pair and the table it decrypts with.
pub struct Lhe25519 {
    params: TableParams,
    keys: Option<KeyPair>,
    table: Option<DecryptTable>,
}

impl Lhe25519 {
    /// Scheme for tables of shape `params`, without key or table.
    pub fn new(params: TableParams) -> Self {
        Self {
            params,
            keys: None,
            table: None,
        }
    }

    /// Table shape this instance expects.
    pub fn params(&self) -> &TableParams {
        &self.params
    }

    /// Loaded or precomputed table, if any.
    pub fn table(&self) -> Option<&DecryptTable> {
        self.table.as_ref()
    }

    fn keys(&self) -> Result<&KeyPair> {
        self.keys.as_ref().ok_or(LheError::MissingKey)
    }
}

impl LheScheme for Lhe25519 {
    type Plaintext = Plaintext;
    type Ciphertext = Ciphertext;

    fn key_gen(&mut self) {
        self.keys = Some(KeyPair::generate());
    }

    fn encode(&self, value: i64) -> Plaintext {
        Plaintext::encode(value)
    }

    fn encrypt(&self, value: i64) -> Result<Ciphertext> {
        let keys = self.keys()?;
        let r = random_scalar();
        Ok(Ciphertext {
            ephemeral: RistrettoPoint::mul_base(&r),
            masked: Plaintext::encode(value).to_point() + keys.public * r,
        })
    }

    fn decrypt(&self, ct: &Ciphertext) -> Result<i64> {
        let keys = self.keys()?;
        let table = self.table.as_ref().ok_or(LheError::MissingTable)?;
        let point = ct.masked - ct.ephemeral * keys.secret;
        table.decode(&point).ok_or(LheError::OutOfRange {
            min: self.params.min_value(),
            max: self.params.max_value(),
        })
    }

    fn hom_add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext {
        lhs + rhs
    }

    fn hom_sub(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> Ciphertext {
        lhs - rhs
    }

    fn hom_add_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Ciphertext {
        ct + pt
    }

    fn hom_sub_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Ciphertext {
        ct - pt
    }

    fn hom_mul(&self, ct: &Ciphertext, pt: &Plaintext) -> Ciphertext {
        ct * pt
    }

    fn hom_negate(&self, ct: &Ciphertext) -> Ciphertext {
        -ct
    }

    fn precompute_decrypt_table(&mut self) -> Result<()> {
        self.table = Some(DecryptTable::generate(self.params)?);
        Ok(())
    }

    fn save_table(&self, mut writer: &mut dyn Write) -> Result<()> {
        let table = self.table.as_ref().ok_or(LheError::MissingTable)?;
        table.write_to(&mut writer)
    }

    fn load_table(&mut self, mut reader: &mut dyn Read) -> Result<()> {
        self.table = Some(DecryptTable::read_from(&mut reader, &self.params)?);
        Ok(())
    }
}

/// Hands out [`Lhe25519`] instances for one table configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lhe25519Provider {
    params: TableParams,
}

impl Lhe25519Provider {
    /// Provider for tables of shape `params`.
    pub fn new(params: TableParams) -> Self {
        Self { params }
    }
}

impl SchemeProvider for Lhe25519Provider {
    type Scheme = Lhe25519;

    fn instantiate(&self) -> Lhe25519 {
        Lhe25519::new(self.params)
    }
}
