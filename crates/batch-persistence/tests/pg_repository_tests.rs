
use std::sync::Arc;

use batch_core::constants::STEP_COMPLETE_KEY;
use batch_core::{BatchError, BatchStatus, ExitStatus, JobParameters, JobParametersBuilder, JobRepository,
                 SimpleJob, SimpleJobLauncher, Step, StepExecution};
use chrono::Utc;
use test_support::{repository, unique_job_name};

fn params(file: &str) -> JobParameters {
    JobParametersBuilder::new().add_string("file", file).build()
}

#[test]
fn instance_is_created_once_per_identifying_key() {
    let Some(repo) = repository() else {
        eprintln!("DATABASE_URL not set - skipping");
        return;
    };
    let name = unique_job_name("instance");
    let a = repo.create_job_instance(&name, &params("a.csv")).unwrap();
    let again = repo.create_job_instance(&name, &params("a.csv")).unwrap();
    let b = repo.create_job_instance(&name, &params("b.csv")).unwrap();
    assert_eq!(a, again);
    assert_ne!(a.id, b.id);
    assert!(repo.is_job_instance_exists(&name, &params("a.csv")).unwrap());
    assert_eq!(repo.get_last_job_instance(&name).unwrap(), Some(b));
}

#[test]
fn job_execution_round_trips_status_context_and_failures() {
    let Some(repo) = repository() else {
        eprintln!("DATABASE_URL not set - skipping");
        return;
    };
    let name = unique_job_name("execution");
    let execution = repo.create_job_execution(&name, &params("a.csv")).unwrap();
    execution.set_start_time(Utc::now());
    execution.set_status(BatchStatus::Failed);
    execution.set_exit_status(ExitStatus::with_description("FAILED", "boom"));
    execution.with_execution_context_mut(|ctx| ctx.put("offset", 42));
    execution.add_failure_exception(BatchError::Step("boom".into()));
    repo.update_job_execution(&execution).unwrap();

    let stored = repo.get_last_job_execution(execution.job_instance()).unwrap().unwrap();
    assert_eq!(stored.id(), execution.id());
    assert_eq!(stored.status(), BatchStatus::Failed);
    assert_eq!(stored.exit_status().exit_description(), "boom");
    assert_eq!(stored.execution_context().get_i64("offset"), Some(42));
    assert_eq!(stored.failure_exceptions(), vec![BatchError::Step("boom".into())]);
    assert_eq!(stored.parameters().get_string("file"), Some("a.csv"));

    // Restart: hereda el contexto de la ejecución anterior.
    let second = repo.create_job_execution(&name, &params("a.csv")).unwrap();
    assert_eq!(second.execution_context().get_i64("offset"), Some(42));
    assert_eq!(repo.find_job_executions(execution.job_instance()).unwrap().len(), 2);
}

#[test]
fn step_executions_are_counted_and_attached() {
    let Some(repo) = repository() else {
        eprintln!("DATABASE_URL not set - skipping");
        return;
    };
    let name = unique_job_name("steps");
    let je = repo.create_job_execution(&name, &params("a.csv")).unwrap();
    let mut first = je.create_step_execution("load");
    first.start_time = Some(Utc::now());
    repo.add_step_execution(&mut first).unwrap();
    first.status = BatchStatus::Failed;
    first.read_count = 12;
    repo.update_step_execution(&mut first).unwrap();

    // El intento más reciente gana aunque todavía no tenga start_time.
    let mut second = je.create_step_execution("load");
    repo.add_step_execution(&mut second).unwrap();
    second.execution_context.put(STEP_COMPLETE_KEY, true);
    repo.update_step_execution_context(&second).unwrap();

    let last = repo.get_last_step_execution(je.job_instance(), "load").unwrap().unwrap();
    assert_eq!(last.id, second.id);
    assert_eq!(last.execution_context.get_bool(STEP_COMPLETE_KEY), Some(true));
    assert_eq!(repo.get_step_execution_count(je.job_instance(), "load").unwrap(), 2);

    let executions = repo.find_job_executions(je.job_instance()).unwrap();
    let attached = executions[0].step_executions();
    assert_eq!(attached.len(), 2);
    assert_eq!(attached[0].read_count, 12);
    assert_eq!(attached[0].status, BatchStatus::Failed);
}

#[test]
fn update_of_unsaved_step_fails() {
    let Some(repo) = repository() else {
        eprintln!("DATABASE_URL not set - skipping");
        return;
    };
    let mut se = StepExecution::new("orphan", 1, 1);
    assert!(matches!(repo.update_step_execution(&mut se), Err(BatchError::Repository(_))));
}

struct PersistingStep {
    name: &'static str,
    repository: Arc<dyn JobRepository>,
}

impl Step for PersistingStep {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&self, se: &mut StepExecution) -> Result<(), BatchError> {
        se.start_time = Some(Utc::now());
        se.status = BatchStatus::Completed;
        se.exit_status = ExitStatus::completed();
        se.end_time = Some(Utc::now());
        self.repository.update_step_execution(se)
    }
}

#[test]
fn launcher_runs_job_end_to_end_on_postgres() {
    let Some(repo) = repository() else {
        eprintln!("DATABASE_URL not set - skipping");
        return;
    };
    let repo: Arc<dyn JobRepository> = Arc::new(repo);
    let name = unique_job_name("launch");
    let steps: Vec<Arc<dyn Step>> = vec![Arc::new(PersistingStep { name: "extract",
                                                                   repository: repo.clone() }),
                                         Arc::new(PersistingStep { name: "load",
                                                                   repository: repo.clone() })];
    let job = SimpleJob::sequential(&name, steps, repo.clone());
    let launcher = SimpleJobLauncher::new(repo.clone());

    let execution = launcher.run(&job, &params("a.csv")).unwrap();
    assert_eq!(execution.status(), BatchStatus::Completed);

    let stored = repo.get_last_job_execution(execution.job_instance()).unwrap().unwrap();
    assert_eq!(stored.status(), BatchStatus::Completed);
    assert_eq!(stored.step_execution_count(), 2);
    assert!(stored.end_time().is_some());
    assert!(matches!(launcher.run(&job, &params("a.csv")), Err(BatchError::InstanceAlreadyComplete(_))));
}
