//! `StepExecution`: un intento de ejecutar un step dentro de un `JobExecution`.
//!
//! La referencia al job es débil (ids), sólo sirve para chequeos de
//! pertenencia y búsquedas en el repositorio.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::BatchError;
use crate::model::{BatchStatus, ExecutionContext, ExitStatus};

/// Señal cooperativa de stop. Las copias de un mismo `StepExecution`
/// comparten la bandera, así un stop marcado sobre la copia registrada en el
/// `JobExecution` llega al step que está corriendo.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl PartialEq for StopSignal {
    fn eq(&self, other: &Self) -> bool {
        self.is_raised() == other.is_raised()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExecution {
    /// Asignado por el repositorio en `add_step_execution`.
    pub id: Option<i64>,
    pub step_name: String,
    pub job_execution_id: i64,
    pub job_instance_id: i64,
    pub status: BatchStatus,
    pub exit_status: ExitStatus,
    pub execution_context: ExecutionContext,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub read_count: u64,
    pub write_count: u64,
    pub filter_count: u64,
    pub commit_count: u64,
    pub rollback_count: u64,
    pub read_skip_count: u64,
    pub process_skip_count: u64,
    pub write_skip_count: u64,
    /// El step debe terminar en cuanto la observe. No se persiste.
    #[serde(skip)]
    terminate_only: StopSignal,
    pub failure_exceptions: Vec<BatchError>,
}

impl StepExecution {
    pub fn new(step_name: impl Into<String>, job_execution_id: i64, job_instance_id: i64) -> Self {
        Self { id: None,
               step_name: step_name.into(),
               job_execution_id,
               job_instance_id,
               status: BatchStatus::Starting,
               exit_status: ExitStatus::executing(),
               execution_context: ExecutionContext::new(),
               start_time: None,
               end_time: None,
               last_updated: None,
               read_count: 0,
               write_count: 0,
               filter_count: 0,
               commit_count: 0,
               rollback_count: 0,
               read_skip_count: 0,
               process_skip_count: 0,
               write_skip_count: 0,
               terminate_only: StopSignal::default(),
               failure_exceptions: Vec::new() }
    }

    pub fn upgrade_status(&mut self, status: BatchStatus) {
        self.status = self.status.upgrade_to(status);
    }

    pub fn skip_count(&self) -> u64 {
        self.read_skip_count + self.process_skip_count + self.write_skip_count
    }

    pub fn add_failure_exception(&mut self, err: BatchError) {
        self.failure_exceptions.push(err);
    }

    /// ¿Pertenece a la ejecución de job indicada?
    pub fn belongs_to(&self, job_execution_id: i64) -> bool {
        self.job_execution_id == job_execution_id
    }

    pub fn set_terminate_only(&self) {
        self.terminate_only.raise();
    }

    pub fn is_terminate_only(&self) -> bool {
        self.terminate_only.is_raised()
    }

    /// Resumen de una línea para logs.
    pub fn summary(&self) -> String {
        format!("StepExecution: id={}, name={}, status={}, exitStatus={}, readCount={}, filterCount={}, writeCount={}, \
                 readSkipCount={}, writeSkipCount={}, processSkipCount={}, commitCount={}, rollbackCount={}",
                self.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                self.step_name,
                self.status,
                self.exit_status.exit_code(),
                self.read_count,
                self.filter_count,
                self.write_count,
                self.read_skip_count,
                self.write_skip_count,
                self.process_skip_count,
                self.commit_count,
                self.rollback_count)
    }
}
