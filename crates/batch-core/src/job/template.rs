//! Template de ejecución de un job.
//!
//! `BatchJob` fija el ciclo de vida de un `JobExecution` y delega la
//! elección de steps en un `JobFlow`. Es la única frontera de errores:
//! `execute` nunca devuelve error, todo resultado (incluidos los fallos)
//! queda expresado como datos en el `JobExecution` (status, exit status y
//! lista de fallos).
//!
//! Ciclo:
//! 1. validar parámetros;
//! 2. si ya está STOPPING → STOPPED / COMPLETED con nota, directo a
//!    finalización;
//! 3. STARTED + `before_job` + `flow.do_execute`;
//! 4. interrupción → STOPPED (o el status pedido); otro error → FAILED;
//! 5. finalización: nota NOOP si no corrió ningún step, persistir,
//!    `after_job` (errores sólo se loguean), persistir de nuevo.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info};

use super::{CompositeJobExecutionListener, DefaultJobParametersValidator, Job, JobExecutionListener,
            JobParametersIncrementer, JobParametersValidator};
use crate::constants::{NOOP_DESCRIPTION, STOPPED_BEFORE_START_DESCRIPTION};
use crate::errors::{classify_error, BatchError};
use crate::flow::{ConditionalFlow, JobFlow, SimpleFlow, StepTransition};
use crate::model::{BatchStatus, ExitStatus, JobExecution};
use crate::repo::JobRepository;
use crate::step::{SimpleStepHandler, Step, StepHandler};

pub struct BatchJob<F: JobFlow> {
    name: String,
    restartable: bool,
    flow: F,
    repository: Arc<dyn JobRepository>,
    step_handler: Box<dyn StepHandler>,
    listener: CompositeJobExecutionListener,
    validator: Box<dyn JobParametersValidator>,
    incrementer: Option<Box<dyn JobParametersIncrementer>>,
}

/// Job secuencial.
pub type SimpleJob = BatchJob<SimpleFlow>;
/// Job con branching por exit code.
pub type ConditionalJob = BatchJob<ConditionalFlow>;

impl<F: JobFlow> BatchJob<F> {
    pub fn new(name: impl Into<String>, flow: F, repository: Arc<dyn JobRepository>) -> Self {
        let step_handler = Box::new(SimpleStepHandler::new(Arc::clone(&repository)));
        Self { name: name.into(),
               restartable: true,
               flow,
               repository,
               step_handler,
               listener: CompositeJobExecutionListener::new(),
               validator: Box::new(DefaultJobParametersValidator::default()),
               incrementer: None }
    }

    pub fn restartable(mut self, restartable: bool) -> Self {
        self.restartable = restartable;
        self
    }

    pub fn with_step_handler(mut self, handler: impl StepHandler + 'static) -> Self {
        self.step_handler = Box::new(handler);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn JobExecutionListener>) -> Self {
        self.listener.register(listener);
        self
    }

    pub fn with_validator(mut self, validator: impl JobParametersValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_incrementer(mut self, incrementer: impl JobParametersIncrementer + 'static) -> Self {
        self.incrementer = Some(Box::new(incrementer));
        self
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    fn run_flow(&self, execution: &JobExecution) -> Result<(), BatchError> {
        self.validator.validate(execution.parameters())?;

        if execution.status() == BatchStatus::Stopping {
            info!("Job [{}] execution {} was stopped before it started", self.name, execution.id());
            execution.set_status(BatchStatus::Stopped);
            execution.set_exit_status(ExitStatus::completed().add_exit_description(STOPPED_BEFORE_START_DESCRIPTION));
            return Ok(());
        }

        execution.set_start_time(Utc::now());
        execution.upgrade_status(BatchStatus::Started);
        execution.set_exit_status(ExitStatus::executing());
        self.repository.update_job_execution(execution)?;

        self.listener.before_job(execution)?;
        let last = self.flow.do_execute(execution, self.step_handler.as_ref())?;
        if let Some(se) = &last {
            debug!("Last step of job [{}]: {}", self.name, se.summary());
        }
        Ok(())
    }

    fn record_failure(&self, execution: &JobExecution, err: BatchError) {
        match &err {
            BatchError::Interrupted { status, .. } => {
                info!("Job [{}] interrupted: {}", self.name, err);
                execution.set_exit_status(ExitStatus::stopped().add_exit_description_from_error(&err));
                execution.set_status(BatchStatus::Stopped.upgrade_to(*status));
            }
            _ => {
                error!("Encountered {} error executing job [{}]: {}",
                       classify_error(&err).as_str(),
                       self.name,
                       err);
                execution.set_exit_status(ExitStatus::failed().add_exit_description_from_error(&err));
                execution.set_status(BatchStatus::Failed);
            }
        }
        execution.add_failure_exception(err);
    }

    fn finalize(&self, execution: &JobExecution) {
        let status = execution.status();
        if (status <= BatchStatus::Stopped || status == BatchStatus::Completed) && execution.step_execution_count() == 0 {
            execution.merge_exit_status(&ExitStatus::noop().add_exit_description(NOOP_DESCRIPTION));
        }
        execution.set_end_time(Utc::now());
        self.persist(execution);

        if let Err(err) = self.listener.after_job(execution) {
            error!("Exception encountered in afterJob callback of job [{}]: {}", self.name, err);
        }
        self.persist(execution);
    }

    fn persist(&self, execution: &JobExecution) {
        if let Err(err) = self.repository.update_job_execution(execution) {
            error!("Failed to persist job execution {} of job [{}]: {}", execution.id(), self.name, err);
            execution.upgrade_status(BatchStatus::Unknown);
            execution.merge_exit_status(&ExitStatus::unknown().add_exit_description_from_error(&err));
            execution.add_failure_exception(err);
        }
    }
}

impl SimpleJob {
    pub fn sequential(name: impl Into<String>, steps: Vec<Arc<dyn Step>>, repository: Arc<dyn JobRepository>) -> Self {
        BatchJob::new(name, SimpleFlow::new(steps), repository)
    }
}

impl ConditionalJob {
    pub fn conditional(name: impl Into<String>,
                       transitions: Vec<StepTransition>,
                       repository: Arc<dyn JobRepository>)
                       -> Result<Self, BatchError> {
        Ok(BatchJob::new(name, ConditionalFlow::new(transitions)?, repository))
    }
}

impl<F: JobFlow> Job for BatchJob<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_restartable(&self) -> bool {
        self.restartable
    }

    fn parameters_incrementer(&self) -> Option<&dyn JobParametersIncrementer> {
        self.incrementer.as_deref()
    }

    fn parameters_validator(&self) -> &dyn JobParametersValidator {
        self.validator.as_ref()
    }

    fn step_names(&self) -> Vec<String> {
        self.flow.step_names()
    }

    fn execute(&self, execution: &JobExecution) {
        debug!("Job [{}] execution starting: {}", self.name, execution.id());
        if let Err(err) = self.run_flow(execution) {
            self.record_failure(execution, err);
        }
        self.finalize(execution);
        debug!("Job [{}] execution complete: status={}, exit={}",
               self.name,
               execution.status(),
               execution.exit_status());
    }
}
