use log::warn;

use crate::constants::RUN_ID_KEY;
use crate::model::{JobParameters, JobParametersBuilder};

/// Deriva los parámetros de la siguiente instancia a partir de los de la
/// última ejecución (o `None` si el job nunca corrió).
pub trait JobParametersIncrementer: Send + Sync {
    fn next(&self, previous: Option<&JobParameters>) -> JobParameters;
}

/// Incrementa un parámetro `long` identificador (por defecto `run.id`).
#[derive(Debug, Clone)]
pub struct RunIdIncrementer {
    key: String,
}

impl RunIdIncrementer {
    pub fn new() -> Self {
        Self { key: RUN_ID_KEY.to_string() }
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for RunIdIncrementer {
    fn default() -> Self {
        Self::new()
    }
}

impl JobParametersIncrementer for RunIdIncrementer {
    fn next(&self, previous: Option<&JobParameters>) -> JobParameters {
        let base = previous.cloned().unwrap_or_default();
        let previous_id = base.get_long(&self.key).unwrap_or(0);
        if previous_id == i64::MAX {
            warn!("Parameter '{}' reached i64::MAX, it cannot be incremented further", self.key);
        }
        let id = previous_id.saturating_add(1);
        JobParametersBuilder::from(&base).add_long(self.key.clone(), id).build()
    }
}
