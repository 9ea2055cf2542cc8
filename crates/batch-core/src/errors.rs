//! Errores del core.
//!
//! `BatchError` es a la vez el canal de control (`Interrupted` modela la
//! petición de stop) y el registro de fallos: se guarda en las listas de
//! `failure_exceptions` de `JobExecution`/`StepExecution`, por eso es `Clone`
//! y serializable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::BatchStatus;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum BatchError {
    /// Petición de stop. Lleva el status terminal solicitado (STOPPED por
    /// defecto).
    #[error("job interrupted: {message}")]
    Interrupted { message: String, status: BatchStatus },
    #[error("restart not possible: {0}")]
    Restart(String),
    #[error("start limit exceeded for step '{step}' (limit {limit})")]
    StartLimitExceeded { step: String, limit: usize },
    #[error("job execution already running: {0}")]
    AlreadyRunning(String),
    #[error("job instance already complete: {0}")]
    InstanceAlreadyComplete(String),
    #[error("invalid job parameters: {0}")]
    InvalidParameters(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("next step not found for step '{step}' and exit code '{exit_code}'")]
    NextStepNotFound { step: String, exit_code: String },
    #[error("repository error: {0}")]
    Repository(String),
    #[error("step failed: {0}")]
    Step(String),
    #[error("listener failed: {0}")]
    Listener(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl BatchError {
    /// Interrupción con el status por defecto (STOPPED).
    pub fn interrupted(message: impl Into<String>) -> Self {
        Self::Interrupted { message: message.into(),
                            status: BatchStatus::Stopped }
    }

    /// Interrupción solicitando un status terminal concreto.
    pub fn interrupted_with_status(message: impl Into<String>, status: BatchStatus) -> Self {
        Self::Interrupted { message: message.into(),
                            status }
    }

    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}

/// Clasificación gruesa de errores, usada para logging y por la capa de
/// persistencia al guardar fallos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Interruption,
    Restart,
    Policy,
    Configuration,
    Resolution,
    Infrastructure,
    Failure,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::Interruption => "interruption",
            ErrorClass::Restart => "restart",
            ErrorClass::Policy => "policy",
            ErrorClass::Configuration => "configuration",
            ErrorClass::Resolution => "resolution",
            ErrorClass::Infrastructure => "infrastructure",
            ErrorClass::Failure => "failure",
        }
    }
}

pub fn classify_error(err: &BatchError) -> ErrorClass {
    match err {
        BatchError::Interrupted { .. } => ErrorClass::Interruption,
        BatchError::Restart(_) | BatchError::AlreadyRunning(_) | BatchError::InstanceAlreadyComplete(_) => {
            ErrorClass::Restart
        }
        BatchError::StartLimitExceeded { .. } => ErrorClass::Policy,
        BatchError::InvalidParameters(_) | BatchError::Configuration(_) => ErrorClass::Configuration,
        BatchError::NextStepNotFound { .. } => ErrorClass::Resolution,
        BatchError::Repository(_) => ErrorClass::Infrastructure,
        BatchError::Step(_) | BatchError::Listener(_) | BatchError::Internal(_) => ErrorClass::Failure,
    }
}
