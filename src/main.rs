//! Prime the decryption table cache, then benchmark every LHE25519 primitive.

use std::error::Error;

use lhe_bench::{
    report, suite, CaseContext, FileStorage, HarnessConfig, Lhe25519Provider, MonotonicClock,
    TableCache,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let conf = HarnessConfig::load()?;
    info!(path = %conf.table_path.display(), params = ?conf.table, "starting");

    let storage = FileStorage::new(&conf.table_path);
    let provider = Lhe25519Provider::new(conf.table);
    TableCache::new(&storage, &provider).ensure()?;

    let registry = suite::standard_cases();
    let ctx = CaseContext {
        provider: &provider,
        storage: &storage,
    };
    let reports = registry.run_all(&ctx, &MonotonicClock::new())?;

    println!("{}", report::render_table(&reports));
    if let Some(path) = &conf.csv_path {
        report::write_csv_file(&reports, path)?;
        info!(path = %path.display(), "wrote csv report");
    }
    Ok(())
}
