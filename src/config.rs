//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable.
//! La conexión a Postgres se configura aparte (`batch_persistence::DbConfig`).
use std::env;

use once_cell::sync::Lazy;

use crate::errors::AppError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenvy::dotenv();
});

/// Configuración de la aplicación de demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Límite de arranques por step; `None` = sin límite.
    pub default_start_limit: Option<usize>,
    /// Nombre del job lanzado por `batch-demo`.
    pub demo_job_name: String,
    /// Si es `false` el job no admite restart de una instancia existente.
    pub restart_on_failure: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { default_start_limit: None,
               demo_job_name: "demo-job".to_string(),
               restart_on_failure: true }
    }
}

impl AppConfig {
    /// Lee `BATCH_DEFAULT_START_LIMIT`, `BATCH_DEMO_JOB_NAME` y
    /// `BATCH_RESTART_ON_FAILURE` del entorno (previa carga de `.env`).
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let default_start_limit = match lookup("BATCH_DEFAULT_START_LIMIT") {
            Some(raw) => {
                let limit = raw.trim()
                               .parse::<usize>()
                               .map_err(|e| AppError::Config(format!("BATCH_DEFAULT_START_LIMIT='{raw}': {e}")))?;
                if limit == 0 {
                    return Err(AppError::Config("BATCH_DEFAULT_START_LIMIT must be at least 1".into()));
                }
                Some(limit)
            }
            None => defaults.default_start_limit,
        };
        let demo_job_name = lookup("BATCH_DEMO_JOB_NAME").filter(|v| !v.trim().is_empty())
                                                         .unwrap_or(defaults.demo_job_name);
        let restart_on_failure = match lookup("BATCH_RESTART_ON_FAILURE") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                                              AppError::Config(format!("BATCH_RESTART_ON_FAILURE='{raw}' is not a boolean"))
                                          })?,
            None => defaults.restart_on_failure,
        };
        Ok(Self { default_start_limit,
                  demo_job_name,
                  restart_on_failure })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
