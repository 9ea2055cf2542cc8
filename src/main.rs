use std::sync::Arc;

use batch_core::{InMemoryJobRepository, JobRepository};
use batchflow::demo::run_demo;
use batchflow::{AppConfig, AppError};
use log::{error, info, warn};

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let config = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run_in_memory(&config) {
        error!("[DEMO] {e}");
    }

    if cfg!(feature = "pg_demo") {
        maybe_run_pg_demo(&config);
    }
}

fn run_in_memory(config: &AppConfig) -> Result<(), AppError> {
    let repository: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    info!("[DEMO] registros válidos");
    run_demo(config, Arc::clone(&repository), "orders-ok.csv", vec![3, 5, 8, 13, 21])?;
    info!("[DEMO] registros con inválidos");
    run_demo(config, repository, "orders-bad.csv", vec![3, -5, 8])?;
    Ok(())
}

fn maybe_run_pg_demo(config: &AppConfig) {
    // Ejecutar sólo si hay DATABASE_URL y aplicar mitigación para GSS por defecto.
    if let Ok(url) = std::env::var("DATABASE_URL") {
        if !url.to_lowercase().contains("gssencmode=") && std::env::var("PGGSSENCMODE").is_err() {
            std::env::set_var("PGGSSENCMODE", "disable");
            warn!("[PG DEMO] PGGSSENCMODE=disable (auto) para evitar issues GSS/libpq");
        }
    } else {
        warn!("[PG DEMO] DATABASE_URL no definido; omitiendo demo PG");
        return;
    }
    if let Err(e) = run_pg(config) {
        error!("[PG DEMO] Error: {e}");
    }
}

fn run_pg(config: &AppConfig) -> Result<(), AppError> {
    use batch_persistence::{build_dev_pool_from_env, PgJobRepository, PoolProvider};

    let pool = build_dev_pool_from_env()?;
    let repository: Arc<dyn JobRepository> = Arc::new(PgJobRepository::new(PoolProvider { pool }));
    let input = format!("orders-{}.csv", chrono::Utc::now().timestamp());
    let execution = run_demo(config, repository, &input, vec![1, 2, 3])?;
    info!("[PG DEMO] execution id={} status={}", execution.id(), execution.status());
    Ok(())
}
