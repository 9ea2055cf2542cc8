//! batchflow
//!
//! Fachada de la aplicación sobre `batch-core` y `batch-persistence`:
//! - `config`: configuración desde variables de entorno.
//! - `errors`: error de nivel aplicación.
//! - `demo`: job condicional de demostración usado por `batch-demo`.

pub mod config;
pub mod demo;
pub mod errors;

pub use config::AppConfig;
pub use errors::AppError;
