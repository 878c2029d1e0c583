//! Deterministic stand-ins for the clock and the scheme.

use std::cell::Cell;
use std::io::{self, ErrorKind, Read, Write};
use std::rc::Rc;
use std::time::Duration;

use crate::error::{LheError, Result};
use crate::scheme::{LheScheme, SchemeProvider};
use crate::storage::TableStorage;
use crate::timer::Clock;

/// Clock that only moves when told to.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Storage that always reports the artifact missing and rejects every write.
#[derive(Debug, Default)]
pub struct FailingStorage {
    attempts: Cell<usize>,
}

impl FailingStorage {
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl TableStorage for FailingStorage {
    fn exists(&self) -> Result<bool> {
        Ok(false)
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        Err(io::Error::new(ErrorKind::NotFound, "nothing was ever stored").into())
    }

    fn store(&self, _bytes: &[u8]) -> Result<()> {
        self.attempts.set(self.attempts.get() + 1);
        Err(io::Error::new(ErrorKind::PermissionDenied, "storage is read-only").into())
    }

    fn info(&self) -> String {
        "FailingStorage".to_string()
    }
}

/// Simulated cost of each primitive, charged to the provider's clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct Costs {
    pub key_gen: Duration,
    pub encrypt: Duration,
    pub decrypt: Duration,
    pub hom_op: Duration,
    pub load_table: Duration,
}

pub const FAKE_TABLE: &[u8] = b"fake decryption table";
pub const FAKE_BOUND: i64 = 1 << 21;

#[derive(Clone, Default)]
pub struct FakeProvider {
    clock: ManualClock,
    costs: Costs,
    tables_built: Rc<Cell<usize>>,
    keys_issued: Rc<Cell<i64>>,
}

impl FakeProvider {
    pub fn with_costs(clock: ManualClock, costs: Costs) -> Self {
        Self {
            clock,
            costs,
            ..Self::default()
        }
    }

    pub fn tables_built(&self) -> usize {
        self.tables_built.get()
    }

    pub fn keys_issued(&self) -> i64 {
        self.keys_issued.get()
    }
}

impl SchemeProvider for FakeProvider {
    type Scheme = FakeScheme;

    fn instantiate(&self) -> FakeScheme {
        FakeScheme {
            provider: self.clone(),
            key: None,
            table: false,
        }
    }
}

/// `masked = value + key * weight`, linear in every operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FakeCiphertext {
    masked: i64,
    weight: i64,
}

pub struct FakeScheme {
    provider: FakeProvider,
    key: Option<i64>,
    table: bool,
}

impl FakeScheme {
    fn charge(&self, cost: Duration) {
        self.provider.clock.advance(cost);
    }

    fn key(&self) -> Result<i64> {
        self.key.ok_or(LheError::MissingKey)
    }
}

impl LheScheme for FakeScheme {
    type Plaintext = i64;
    type Ciphertext = FakeCiphertext;

    fn key_gen(&mut self) {
        let issued = self.provider.keys_issued.get() + 1;
        self.provider.keys_issued.set(issued);
        self.key = Some(issued * 7919);
        self.charge(self.provider.costs.key_gen);
    }

    fn encode(&self, value: i64) -> i64 {
        value
    }

    fn encrypt(&self, value: i64) -> Result<FakeCiphertext> {
        let key = self.key()?;
        self.charge(self.provider.costs.encrypt);
        Ok(FakeCiphertext {
            masked: value + key,
            weight: 1,
        })
    }

    fn decrypt(&self, ct: &FakeCiphertext) -> Result<i64> {
        let key = self.key()?;
        if !self.table {
            return Err(LheError::MissingTable);
        }
        self.charge(self.provider.costs.decrypt);
        let value = ct.masked - key * ct.weight;
        if (-FAKE_BOUND..FAKE_BOUND).contains(&value) {
            Ok(value)
        } else {
            Err(LheError::OutOfRange {
                min: -FAKE_BOUND,
                max: FAKE_BOUND,
            })
        }
    }

    fn hom_add(&self, lhs: &FakeCiphertext, rhs: &FakeCiphertext) -> FakeCiphertext {
        self.charge(self.provider.costs.hom_op);
        FakeCiphertext {
            masked: lhs.masked + rhs.masked,
            weight: lhs.weight + rhs.weight,
        }
    }

    fn hom_sub(&self, lhs: &FakeCiphertext, rhs: &FakeCiphertext) -> FakeCiphertext {
        self.charge(self.provider.costs.hom_op);
        FakeCiphertext {
            masked: lhs.masked - rhs.masked,
            weight: lhs.weight - rhs.weight,
        }
    }

    fn hom_add_plain(&self, ct: &FakeCiphertext, pt: &i64) -> FakeCiphertext {
        self.charge(self.provider.costs.hom_op);
        FakeCiphertext {
            masked: ct.masked + pt,
            weight: ct.weight,
        }
    }

    fn hom_sub_plain(&self, ct: &FakeCiphertext, pt: &i64) -> FakeCiphertext {
        self.charge(self.provider.costs.hom_op);
        FakeCiphertext {
            masked: ct.masked - pt,
            weight: ct.weight,
        }
    }

    fn hom_mul(&self, ct: &FakeCiphertext, pt: &i64) -> FakeCiphertext {
        self.charge(self.provider.costs.hom_op);
        FakeCiphertext {
            masked: ct.masked * pt,
            weight: ct.weight * pt,
        }
    }

    fn hom_negate(&self, ct: &FakeCiphertext) -> FakeCiphertext {
        self.charge(self.provider.costs.hom_op);
        FakeCiphertext {
            masked: -ct.masked,
            weight: -ct.weight,
        }
    }

    fn precompute_decrypt_table(&mut self) -> Result<()> {
        self.provider.tables_built.set(self.provider.tables_built.get() + 1);
        self.table = true;
        Ok(())
    }

    fn save_table(&self, writer: &mut dyn Write) -> Result<()> {
        if !self.table {
            return Err(LheError::MissingTable);
        }
        writer.write_all(FAKE_TABLE)?;
        Ok(())
    }

    fn load_table(&mut self, reader: &mut dyn Read) -> Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        if bytes != FAKE_TABLE {
            return Err(LheError::BadMagic);
        }
        self.charge(self.provider.costs.load_table);
        self.table = true;
        Ok(())
    }
}
