use serde::{Deserialize, Serialize};

/// Identidad lógica de un job: (`job_name`, `job_key`). Puede tener varias
/// ejecuciones (intentos); sólo la última es candidata a restart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobInstance {
    pub id: i64,
    pub job_name: String,
    /// Hash de los parámetros identificadores.
    pub job_key: String,
}

impl JobInstance {
    pub fn new(id: i64, job_name: impl Into<String>, job_key: impl Into<String>) -> Self {
        Self { id,
               job_name: job_name.into(),
               job_key: job_key.into() }
    }
}
