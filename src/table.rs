//! Baby-step lookup table that turns `v·G` back into a bounded `v`.
//!
//! The table stores the truncated compressed encoding of `i·G` for every
//! `i` in `[0, 2^baby_bits)`. Decoding shifts the target into the unsigned
//! range and walks giant steps of `2^baby_bits·G` until a hit is found.
//! Entries are kept sorted so that two builds for the same parameters
//! serialize to identical bytes.

use std::fmt;
use std::io::{Read, Write};

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LheError, Result};

const MAGIC: [u8; 8] = *b"LHE25519";

/// Bumped whenever the on-disk layout changes.
pub const FORMAT_VERSION: u16 = 1;

/// Shape of the decryption table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableParams {
    /// log2 of the number of baby steps stored in the table.
    pub baby_bits: u32,
    /// Width of the signed plaintext range, `[-2^(range_bits-1), 2^(range_bits-1))`.
    pub range_bits: u32,
}

impl Default for TableParams {
    fn default() -> Self {
        Self {
            baby_bits: 18,
            range_bits: 32,
        }
    }
}

impl TableParams {
    /// Shape with `2^baby_bits` entries covering a `range_bits`-bit signed range.
    pub fn new(baby_bits: u32, range_bits: u32) -> Self {
        Self {
            baby_bits,
            range_bits,
        }
    }

    /// Reject shapes that are empty, inverted or too expensive.
    pub fn validate(&self) -> Result<()> {
        if !(1..=28).contains(&self.baby_bits) {
            return Err(LheError::InvalidParams(format!(
                "baby_bits must be in 1..=28, got {}",
                self.baby_bits
            )));
        }
        if self.range_bits <= self.baby_bits || self.range_bits > 48 {
            return Err(LheError::InvalidParams(format!(
                "range_bits must be in {}..=48, got {}",
                self.baby_bits + 1,
                self.range_bits
            )));
        }
        if self.range_bits - self.baby_bits > 30 {
            return Err(LheError::InvalidParams(format!(
                "{} giant steps per decryption is too many",
                self.range_bits - self.baby_bits
            )));
        }
        Ok(())
    }

    /// Number of table entries.
    pub fn baby_steps(&self) -> u64 {
        1u64 << self.baby_bits
    }

    /// Worst-case number of giant steps per decryption.
    pub fn giant_steps(&self) -> u64 {
        1u64 << (self.range_bits - self.baby_bits)
    }

    /// Smallest decodable value.
    pub fn min_value(&self) -> i64 {
        -(1i64 << (self.range_bits - 1))
    }

    /// One past the largest decodable value.
    pub fn max_value(&self) -> i64 {
        1i64 << (self.range_bits - 1)
    }

    /// Whether `value` is decodable.
    pub fn contains(&self, value: i64) -> bool {
        (self.min_value()..self.max_value()).contains(&value)
    }
}

#[derive(Serialize, Deserialize)]
struct TableHeader {
    magic: [u8; 8],
    version: u16,
    params: TableParams,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
struct TableEntry {
    key: u64,
    index: u32,
}

/// Precomputed decryption table for a fixed [`TableParams`].
#[derive(Clone)]
pub struct DecryptTable {
    params: TableParams,
    entries: Vec<TableEntry>,
    giant_step: RistrettoPoint,
}

impl fmt::Debug for DecryptTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptTable")
            .field("params", &self.params)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl DecryptTable {
    /// Build the table from scratch. Costs `2^baby_bits` point additions and compressions.
    pub fn generate(params: TableParams) -> Result<Self> {
        params.validate()?;
        let mut entries = Vec::with_capacity(params.baby_steps() as usize);
        let mut point = RistrettoPoint::identity();
        for index in 0..(1u32 << params.baby_bits) {
            entries.push(TableEntry {
                key: point_key(&point),
                index,
            });
            point += RISTRETTO_BASEPOINT_POINT;
        }
        entries.sort_unstable();
        debug!(entries = entries.len(), ?params, "built decryption table");
        Ok(Self::from_entries(params, entries))
    }

    fn from_entries(params: TableParams, entries: Vec<TableEntry>) -> Self {
        let giant_step = -RistrettoPoint::mul_base(&Scalar::from(params.baby_steps()));
        Self {
            params,
            entries,
            giant_step,
        }
    }

    /// Shape the table was built for.
    pub fn params(&self) -> &TableParams {
        &self.params
    }

    /// Number of baby-step entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false` for a generated or loaded table.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recover `v` from `v·G`, or `None` when `v` is outside the supported range.
    pub fn decode(&self, point: &RistrettoPoint) -> Option<i64> {
        let half = self.params.max_value();
        let shifted = point + RistrettoPoint::mul_base(&Scalar::from(half.unsigned_abs()));
        let baby = self.params.baby_steps();

        let mut current = shifted;
        for giant in 0..self.params.giant_steps() {
            if let Some(offset) = self.lookup(&current, giant * baby, &shifted) {
                return i64::try_from(offset).ok().map(|v| v - half);
            }
            current += &self.giant_step;
        }
        None
    }

    fn lookup(
        &self,
        candidate: &RistrettoPoint,
        base: u64,
        shifted: &RistrettoPoint,
    ) -> Option<u64> {
        let key = point_key(candidate);
        let start = self.entries.partition_point(|e| e.key < key);
        // Keys are truncated, so every hit is confirmed against the full point.
        self.entries[start..]
            .iter()
            .take_while(|e| e.key == key)
            .map(|e| base + u64::from(e.index))
            .find(|&x| RistrettoPoint::mul_base(&Scalar::from(x)) == *shifted)
    }

    /// Serialize header and entries.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let config = bincode::config::standard();
        let header = TableHeader {
            magic: MAGIC,
            version: FORMAT_VERSION,
            params: self.params,
        };
        bincode::serde::encode_into_std_write(&header, writer, config)?;
        bincode::serde::encode_into_std_write(&self.entries, writer, config)?;
        writer.flush()?;
        Ok(())
    }

    /// Deserialize a table, rejecting artifacts that were not built for `expected`.
    pub fn read_from<R: Read>(reader: &mut R, expected: &TableParams) -> Result<Self> {
        let config = bincode::config::standard();
        let header: TableHeader = bincode::serde::decode_from_std_read(reader, config)?;
        if header.magic != MAGIC {
            return Err(LheError::BadMagic);
        }
        if header.version != FORMAT_VERSION {
            return Err(LheError::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: header.version,
            });
        }
        if header.params != *expected {
            return Err(LheError::TableMismatch {
                expected: *expected,
                found: header.params,
            });
        }

        let entries: Vec<TableEntry> = bincode::serde::decode_from_std_read(reader, config)?;
        if entries.len() as u64 != expected.baby_steps() {
            return Err(LheError::InvalidParams(format!(
                "table holds {} entries, expected {}",
                entries.len(),
                expected.baby_steps()
            )));
        }
        Ok(Self::from_entries(header.params, entries))
    }
}

fn point_key(point: &RistrettoPoint) -> u64 {
    let bytes = point.compress().to_bytes();
    let mut key = [0u8; 8];
    key.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::scalar_from_i64;

    fn small() -> TableParams {
        TableParams::new(8, 14)
    }

    fn encode_point(v: i64) -> RistrettoPoint {
        RistrettoPoint::mul_base(&scalar_from_i64(v))
    }

    #[test]
    fn test_params_validation() {
        assert!(TableParams::default().validate().is_ok());
        assert!(TableParams::new(0, 8).validate().is_err());
        assert!(TableParams::new(29, 40).validate().is_err());
        assert!(TableParams::new(8, 8).validate().is_err());
        assert!(TableParams::new(8, 49).validate().is_err());
        assert!(TableParams::new(4, 40).validate().is_err());

        let params = small();
        assert_eq!(params.min_value(), -8192);
        assert_eq!(params.max_value(), 8192);
        assert!(params.contains(-8192));
        assert!(!params.contains(8192));
    }

    #[test]
    fn test_decode_range_edges() {
        let table = DecryptTable::generate(small()).unwrap();
        assert_eq!(table.len(), 256);

        for v in [-8192, -8191, -257, -256, -1, 0, 1, 255, 256, 4097, 8191] {
            assert_eq!(table.decode(&encode_point(v)), Some(v), "value {}", v);
        }
        assert_eq!(table.decode(&encode_point(8192)), None);
        assert_eq!(table.decode(&encode_point(-8193)), None);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut first = Vec::new();
        DecryptTable::generate(small()).unwrap().write_to(&mut first).unwrap();
        let mut second = Vec::new();
        DecryptTable::generate(small()).unwrap().write_to(&mut second).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_persistence_round_trip() {
        let table = DecryptTable::generate(small()).unwrap();
        let mut bytes = Vec::new();
        table.write_to(&mut bytes).unwrap();

        let loaded = DecryptTable::read_from(&mut bytes.as_slice(), &small()).unwrap();
        assert_eq!(loaded.params(), table.params());
        for v in [-5000, -1, 0, 42, 8000] {
            let point = encode_point(v);
            assert_eq!(loaded.decode(&point), table.decode(&point));
        }

        let mut again = Vec::new();
        loaded.write_to(&mut again).unwrap();
        assert_eq!(bytes, again);
    }

    #[test]
    fn test_rejects_mismatched_params() {
        let mut bytes = Vec::new();
        DecryptTable::generate(small()).unwrap().write_to(&mut bytes).unwrap();

        let other = TableParams::new(8, 16);
        let err = DecryptTable::read_from(&mut bytes.as_slice(), &other).unwrap_err();
        assert!(matches!(err, LheError::TableMismatch { found, .. } if found == small()));
    }

    #[test]
    fn test_rejects_foreign_and_truncated_artifacts() {
        let foreign = b"definitely not a lookup table".to_vec();
        let err = DecryptTable::read_from(&mut foreign.as_slice(), &small()).unwrap_err();
        assert!(matches!(err, LheError::BadMagic));

        let mut bytes = Vec::new();
        DecryptTable::generate(small()).unwrap().write_to(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        let err = DecryptTable::read_from(&mut bytes.as_slice(), &small()).unwrap_err();
        assert!(matches!(err, LheError::Decode(_)));
    }
}
