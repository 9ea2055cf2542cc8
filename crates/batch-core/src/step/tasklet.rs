//! `TaskletStep`: implementación de referencia de `Step`.
//!
//! Ejecuta un `Tasklet` en bucle hasta que devuelve `Finished`, contando un
//! commit por iteración y persistiendo el `StepExecution` tras cada una. Se
//! encarga del ciclo de vida completo del step (STARTED → terminal).

use std::sync::Arc;

use chrono::Utc;
use log::{error, warn};

use crate::constants::DEFAULT_START_LIMIT;
use crate::errors::BatchError;
use crate::model::{BatchStatus, ExitStatus, StepExecution};
use crate::repo::JobRepository;
use crate::step::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatStatus {
    Continuable,
    Finished,
}

/// Lógica de negocio de un step. Puede leer/escribir el contexto y los
/// contadores del `StepExecution`.
pub trait Tasklet: Send + Sync {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<RepeatStatus, BatchError>;
}

impl<F> Tasklet for F where F: Fn(&mut StepExecution) -> Result<RepeatStatus, BatchError> + Send + Sync
{
    fn execute(&self, step_execution: &mut StepExecution) -> Result<RepeatStatus, BatchError> {
        self(step_execution)
    }
}

pub struct TaskletStep {
    name: String,
    repository: Arc<dyn JobRepository>,
    tasklet: Box<dyn Tasklet>,
    start_limit: usize,
    allow_start_if_complete: bool,
}

impl TaskletStep {
    pub fn new(name: impl Into<String>, repository: Arc<dyn JobRepository>, tasklet: impl Tasklet + 'static) -> Self {
        Self { name: name.into(),
               repository,
               tasklet: Box::new(tasklet),
               start_limit: DEFAULT_START_LIMIT,
               allow_start_if_complete: false }
    }

    pub fn with_start_limit(mut self, limit: usize) -> Self {
        self.start_limit = limit;
        self
    }

    pub fn allow_start_if_complete(mut self, allow: bool) -> Self {
        self.allow_start_if_complete = allow;
        self
    }

    fn run_tasklet(&self, se: &mut StepExecution) -> Result<(), BatchError> {
        loop {
            if se.is_terminate_only() {
                return Err(BatchError::interrupted("JobExecution interrupted."));
            }
            let repeat = self.tasklet.execute(se)?;
            se.commit_count += 1;
            self.repository.update_step_execution_context(se)?;
            self.repository.update_step_execution(se)?;
            if repeat == RepeatStatus::Finished {
                return Ok(());
            }
        }
    }
}

impl Step for TaskletStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_limit(&self) -> usize {
        self.start_limit
    }

    fn is_allow_start_if_complete(&self) -> bool {
        self.allow_start_if_complete
    }

    fn execute(&self, se: &mut StepExecution) -> Result<(), BatchError> {
        se.start_time = Some(Utc::now());
        se.status = BatchStatus::Started;
        self.repository.update_step_execution(se)?;

        match self.run_tasklet(se) {
            Ok(()) => {
                se.upgrade_status(BatchStatus::Completed);
                se.exit_status = ExitStatus::completed().and(&se.exit_status);
            }
            Err(BatchError::Interrupted { message, status }) => {
                warn!("Step '{}' interrupted: {}", self.name, message);
                se.status = status;
                se.exit_status = ExitStatus::stopped().add_exit_description(&message);
            }
            Err(err) => {
                error!("Encountered an error executing step '{}': {}", self.name, err);
                se.upgrade_status(BatchStatus::Failed);
                se.exit_status = ExitStatus::failed().add_exit_description_from_error(&err);
                se.add_failure_exception(err);
            }
        }

        se.end_time = Some(Utc::now());
        if let Err(err) = self.repository.update_step_execution(se) {
            error!("Failed to persist final state of step '{}': {}", self.name, err);
            se.status = BatchStatus::Unknown;
            se.exit_status = se.exit_status.and(&ExitStatus::unknown()).add_exit_description_from_error(&err);
            se.add_failure_exception(err);
        }
        Ok(())
    }
}
