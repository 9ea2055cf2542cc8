//! batch-persistence
//!
//! Implementación Postgres (Diesel + r2d2) del contrato `JobRepository` de
//! `batch-core`.
//!
//! Módulos:
//! - `pg`: `PgJobRepository`, pool de conexiones y retry de lecturas.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PersistenceError;
pub use pg::{build_dev_pool_from_env, build_pool, ConnectionProvider, PgJobRepository, PgPool, PoolProvider};
