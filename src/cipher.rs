//! LHE25519 ciphertext and plaintext containers.

use std::ops::{Add, Mul, Neg, Sub};

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;

/// Scalar encoding of a signed integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plaintext(pub(crate) Scalar);

impl Plaintext {
    /// Encode a signed value, negatives wrap modulo the group order.
    pub fn encode(value: i64) -> Self {
        Self(scalar_from_i64(value))
    }

    /// The plaintext lifted into the group, `m·G`.
    pub(crate) fn to_point(self) -> RistrettoPoint {
        RistrettoPoint::mul_base(&self.0)
    }
}

/// ElGamal pair (r·G, m·G + r·PK)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) ephemeral: RistrettoPoint, // r·G
    pub(crate) masked: RistrettoPoint,    // m·G + r·PK
}

pub(crate) fn scalar_from_i64(value: i64) -> Scalar {
    if value >= 0 {
        Scalar::from(value.unsigned_abs())
    } else {
        -Scalar::from(value.unsigned_abs())
    }
}

impl Add for &Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: Self) -> Ciphertext {
        Ciphertext {
            ephemeral: self.ephemeral + rhs.ephemeral,
            masked: self.masked + rhs.masked,
        }
    }
}

impl Sub for &Ciphertext {
    type Output = Ciphertext;
    fn sub(self, rhs: Self) -> Ciphertext {
        Ciphertext {
            ephemeral: self.ephemeral - rhs.ephemeral,
            masked: self.masked - rhs.masked,
        }
    }
}

impl Neg for &Ciphertext {
    type Output = Ciphertext;
    fn neg(self) -> Ciphertext {
        Ciphertext {
            ephemeral: -self.ephemeral,
            masked: -self.masked,
        }
    }
}

/// Plaintext addition only touches the masked component.
impl Add<&Plaintext> for &Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: &Plaintext) -> Ciphertext {
        Ciphertext {
            ephemeral: self.ephemeral,
            masked: self.masked + rhs.to_point(),
        }
    }
}

impl Sub<&Plaintext> for &Ciphertext {
    type Output = Ciphertext;
    fn sub(self, rhs: &Plaintext) -> Ciphertext {
        Ciphertext {
            ephemeral: self.ephemeral,
            masked: self.masked - rhs.to_point(),
        }
    }
}

impl Mul<&Plaintext> for &Ciphertext {
    type Output = Ciphertext;
    fn mul(self, rhs: &Plaintext) -> Ciphertext {
        Ciphertext {
            ephemeral: self.ephemeral * rhs.0,
            masked: self.masked * rhs.0,
        }
    }
}

impl Add for Ciphertext {
    type Output = Ciphertext;
    fn add(self, rhs: Self) -> Ciphertext {
        &self + &rhs
    }
}

impl Sub for Ciphertext {
    type Output = Ciphertext;
    fn sub(self, rhs: Self) -> Ciphertext {
        &self - &rhs
    }
}

impl Neg for Ciphertext {
    type Output = Ciphertext;
    fn neg(self) -> Ciphertext {
        -&self
    }
}
