//! Harness configuration.
//!
//! Values come from an optional `lhe_bench.{toml,json,yaml}` in the working
//! directory, overridden by `LHE_BENCH_*` environment variables. Nested keys
//! use `__`, e.g. `LHE_BENCH_TABLE__BABY_BITS=20`.

use std::path::PathBuf;

use config::{Config, Environment, File, Source};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::table::TableParams;

/// Table location when none is configured.
pub const DEFAULT_TABLE_PATH: &str = "decrypt_table.dat";
/// Optional config file stem, any format `config` understands.
pub const CONFIG_FILE: &str = "lhe_bench";
/// Prefix of the environment overrides.
pub const ENV_PREFIX: &str = "LHE_BENCH";

/// Runtime settings of the benchmark binary.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Location of the persisted decryption table.
    pub table_path: PathBuf,
    /// Decryption table shape.
    pub table: TableParams,
    /// Also write the per-case statistics here, when set.
    pub csv_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            table: TableParams::default(),
            csv_path: None,
        }
    }
}

impl HarnessConfig {
    /// Read the config file and environment, then validate the table parameters.
    pub fn load() -> Result<Self> {
        Self::load_with(File::with_name(CONFIG_FILE).required(false), ENV_PREFIX)
    }

    fn load_with<S>(file: S, env_prefix: &str) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let env = Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true);
        let conf: Self = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;
        conf.table.validate()?;
        debug!(?conf, "loaded configuration");
        Ok(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LheError;

    const NO_ENV: &str = "LHE_BENCH_UNIT_TEST_UNSET";

    #[test]
    fn test_defaults_without_sources() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let conf = HarnessConfig::load_with(File::from(missing).required(false), NO_ENV).unwrap();
        assert_eq!(conf, HarnessConfig::default());
        assert_eq!(conf.table_path, PathBuf::from("decrypt_table.dat"));
    }

    #[test]
    fn test_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(
            &path,
            concat!(
                "table_path = \"cache/table.bin\"\n",
                "csv_path = \"results.csv\"\n\n",
                "[table]\nbaby_bits = 16\n",
            ),
        )
        .unwrap();

        let conf = HarnessConfig::load_with(File::from(path), NO_ENV).unwrap();
        assert_eq!(conf.table_path, PathBuf::from("cache/table.bin"));
        assert_eq!(conf.csv_path, Some(PathBuf::from("results.csv")));
        assert_eq!(conf.table, TableParams::new(16, 32));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.toml");
        std::fs::write(&path, "[table]\nbaby_bits = 20\nrange_bits = 20\n").unwrap();

        let err = HarnessConfig::load_with(File::from(path), NO_ENV).unwrap_err();
        assert!(matches!(err, LheError::InvalidParams(_)));
    }
}
