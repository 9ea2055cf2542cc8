//! `StepHandler`: compuerta por step.
//!
//! Decide si un step debe (re)ejecutarse, prepara su `StepExecution`
//! (contexto heredado en restarts), lo persiste ANTES de ejecutar y escala
//! las interrupciones al `JobExecution`.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use crate::constants::STEP_COMPLETE_KEY;
use crate::errors::BatchError;
use crate::model::{BatchStatus, ExecutionContext, JobExecution, StepExecution};
use crate::repo::JobRepository;
use crate::step::Step;

pub trait StepHandler: Send + Sync {
    /// Ejecuta (o salta) el step y devuelve el `StepExecution` resultante.
    /// Un step saltado devuelve el intento previo sin cambios.
    fn handle_step(&self, step: &dyn Step, execution: &JobExecution) -> Result<StepExecution, BatchError>;
}

pub struct SimpleStepHandler {
    repository: Arc<dyn JobRepository>,
    execution_context: ExecutionContext,
}

impl SimpleStepHandler {
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        Self { repository,
               execution_context: ExecutionContext::new() }
    }

    /// Contexto base con el que arrancan los steps que no son restart.
    pub fn with_execution_context(mut self, ctx: ExecutionContext) -> Self {
        self.execution_context = ctx;
        self
    }

    /// Política de arranque. `Ok(false)` significa saltar el step y sólo
    /// ocurre cuando existe un intento previo.
    pub fn should_start(&self,
                        last: Option<&StepExecution>,
                        execution: &JobExecution,
                        step: &dyn Step)
                        -> Result<bool, BatchError> {
        let status = last.map(|se| se.status).unwrap_or(BatchStatus::Starting);
        if status == BatchStatus::Unknown {
            return Err(BatchError::Restart(format!("cannot restart step '{}' from UNKNOWN status: the last execution \
                                                    failed and could not be rolled back, manual intervention is \
                                                    required",
                                                   step.name())));
        }
        if (status == BatchStatus::Completed && !step.is_allow_start_if_complete()) || status == BatchStatus::Abandoned {
            return Ok(false);
        }
        let count = self.repository.get_step_execution_count(execution.job_instance(), step.name())?;
        if count < step.start_limit() {
            Ok(true)
        } else {
            Err(BatchError::StartLimitExceeded { step: step.name().to_string(),
                                                 limit: step.start_limit() })
        }
    }

    fn seed_context(&self, last: Option<&StepExecution>) -> ExecutionContext {
        match last {
            Some(prior) if prior.status != BatchStatus::Completed => {
                let mut ctx = prior.execution_context.clone();
                ctx.remove(STEP_COMPLETE_KEY);
                ctx
            }
            _ => self.execution_context.clone(),
        }
    }
}

impl StepHandler for SimpleStepHandler {
    fn handle_step(&self, step: &dyn Step, execution: &JobExecution) -> Result<StepExecution, BatchError> {
        if execution.is_stopping() {
            return Err(BatchError::interrupted("JobExecution interrupted."));
        }

        let mut last = self.repository.get_last_step_execution(execution.job_instance(), step.name())?;
        if last.as_ref().is_some_and(|prior| prior.belongs_to(execution.id())) {
            info!("Duplicate step [{}] detected in execution of job=[{}]. If either step fails, both will be \
                   executed again on restart.",
                  step.name(),
                  execution.job_name());
            last = None;
        }

        if !self.should_start(last.as_ref(), execution, step)? {
            if let Some(prior) = last {
                info!("Step already complete or not restartable, so no action to execute: {}", prior.summary());
                return Ok(prior);
            }
        }

        let mut current = execution.create_step_execution(step.name());
        current.execution_context = self.seed_context(last.as_ref());
        current.start_time = Some(Utc::now());
        self.repository.add_step_execution(&mut current)?;
        execution.add_step_execution(current.clone());
        if execution.is_stopping() {
            // Stop pedido antes del registro: `request_stop` no vio esta copia.
            current.set_terminate_only();
        }

        info!("Executing step: [{}]", step.name());
        if let Err(err) = step.execute(&mut current) {
            if err.is_interruption() {
                // Los demás steps deben observar la petición de stop.
                execution.set_status(BatchStatus::Stopping);
            }
            execution.add_step_execution(current);
            return Err(err);
        }
        debug!("{}", current.summary());

        current.execution_context.put(STEP_COMPLETE_KEY, true);
        self.repository.update_step_execution_context(&current)?;
        self.repository.update_execution_context(execution)?;
        execution.add_step_execution(current.clone());

        if matches!(current.status, BatchStatus::Stopping | BatchStatus::Stopped) || execution.is_stopping() {
            execution.set_status(BatchStatus::Stopping);
            return Err(BatchError::interrupted("Job interrupted by step execution"));
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExitStatus, JobParameters};
    use crate::repo::InMemoryJobRepository;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingStep {
        name: String,
        calls: AtomicUsize,
        limit: usize,
        outcome: BatchStatus,
    }

    impl CountingStep {
        fn new(name: &str, outcome: BatchStatus) -> Self {
            Self { name: name.into(),
                   calls: AtomicUsize::new(0),
                   limit: usize::MAX,
                   outcome }
        }
    }

    impl Step for CountingStep {
        fn name(&self) -> &str {
            &self.name
        }

        fn start_limit(&self) -> usize {
            self.limit
        }

        fn execute(&self, se: &mut StepExecution) -> Result<(), BatchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            se.status = self.outcome;
            se.exit_status = ExitStatus::new(self.outcome.as_str());
            Ok(())
        }
    }

    /// Completa normalmente, pero pide stop del job mientras corre.
    struct StopsItsJob<'a> {
        execution: &'a JobExecution,
        saw_stop: AtomicBool,
    }

    impl Step for StopsItsJob<'_> {
        fn name(&self) -> &str {
            "a"
        }

        fn execute(&self, se: &mut StepExecution) -> Result<(), BatchError> {
            self.execution.request_stop();
            self.saw_stop.store(se.is_terminate_only(), Ordering::SeqCst);
            se.status = BatchStatus::Completed;
            se.exit_status = ExitStatus::completed();
            Ok(())
        }
    }

    fn setup() -> (Arc<InMemoryJobRepository>, SimpleStepHandler, JobExecution) {
        let repo = Arc::new(InMemoryJobRepository::new());
        let handler = SimpleStepHandler::new(repo.clone());
        let je = repo.create_job_execution("job", &JobParameters::new()).unwrap();
        (repo, handler, je)
    }

    #[test]
    fn stopping_job_is_rejected_before_lookup() {
        let (_repo, handler, je) = setup();
        je.set_status(BatchStatus::Stopping);
        let step = CountingStep::new("a", BatchStatus::Completed);
        let err = handler.handle_step(&step, &je).unwrap_err();
        assert!(err.is_interruption());
        assert_eq!(step.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn completion_marker_is_written() {
        let (repo, handler, je) = setup();
        let step = CountingStep::new("a", BatchStatus::Completed);
        let se = handler.handle_step(&step, &je).unwrap();
        assert_eq!(se.execution_context.get_bool(STEP_COMPLETE_KEY), Some(true));
        let stored = repo.get_last_step_execution(je.job_instance(), "a").unwrap().unwrap();
        assert_eq!(stored.execution_context.get_bool(STEP_COMPLETE_KEY), Some(true));
        assert_eq!(je.step_execution_count(), 1);
    }

    #[test]
    fn stopped_step_escalates_to_job() {
        let (_repo, handler, je) = setup();
        je.set_status(BatchStatus::Started);
        let step = CountingStep::new("a", BatchStatus::Stopped);
        let err = handler.handle_step(&step, &je).unwrap_err();
        assert_eq!(err, BatchError::interrupted("Job interrupted by step execution"));
        assert_eq!(je.status(), BatchStatus::Stopping);
    }

    #[test]
    fn unknown_prior_status_is_a_restart_error() {
        let (repo, handler, je) = setup();
        let mut prior = je.create_step_execution("a");
        prior.status = BatchStatus::Unknown;
        repo.add_step_execution(&mut prior).unwrap();
        let other = repo.save_job_execution(je.job_instance(), &JobParameters::new(), ExecutionContext::new())
                        .unwrap();
        let step = CountingStep::new("a", BatchStatus::Completed);
        assert!(matches!(handler.handle_step(&step, &other), Err(BatchError::Restart(_))));
    }

    #[test]
    fn duplicate_name_in_same_execution_runs_again() {
        let (_repo, handler, je) = setup();
        let step = CountingStep::new("a", BatchStatus::Completed);
        handler.handle_step(&step, &je).unwrap();
        handler.handle_step(&step, &je).unwrap();
        assert_eq!(step.calls.load(Ordering::SeqCst), 2);
        assert_eq!(je.step_execution_count(), 2);
    }

    #[test]
    fn stop_requested_while_running_reaches_the_step_and_the_job() {
        let (_repo, handler, je) = setup();
        je.set_status(BatchStatus::Started);
        let step = StopsItsJob { execution: &je,
                                 saw_stop: AtomicBool::new(false) };
        let err = handler.handle_step(&step, &je).unwrap_err();
        assert!(step.saw_stop.load(Ordering::SeqCst));
        assert_eq!(err, BatchError::interrupted("Job interrupted by step execution"));
        assert_eq!(je.status(), BatchStatus::Stopping);
    }

    #[test]
    fn new_attempt_is_stamped_before_it_runs() {
        let (repo, handler, je) = setup();
        let step = CountingStep::new("a", BatchStatus::Completed);
        handler.handle_step(&step, &je).unwrap();
        let stored = repo.get_last_step_execution(je.job_instance(), "a").unwrap().unwrap();
        assert!(stored.start_time.is_some());
    }
}
