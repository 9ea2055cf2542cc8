use std::sync::Arc;

use batch_core::{BatchError, BatchStatus, InMemoryJobRepository, JobExecution, JobRepository};
use batchflow::demo::{run_demo, INVALID_EXIT_CODE, OFFSET_KEY};
use batchflow::{AppConfig, AppError};

fn repository() -> Arc<dyn JobRepository> {
    Arc::new(InMemoryJobRepository::new())
}

fn step_names(execution: &JobExecution) -> Vec<String> {
    execution.step_executions().into_iter().map(|se| se.step_name).collect()
}

#[test]
fn valid_records_take_the_load_branch() {
    let execution = run_demo(&AppConfig::default(), repository(), "ok.csv", vec![1, 2, 3, 4, 5]).unwrap();

    assert_eq!(execution.status(), BatchStatus::Completed);
    assert_eq!(step_names(&execution), vec!["extract", "validate", "load"]);
    let steps = execution.step_executions();
    assert_eq!(steps[0].read_count, 5);
    assert_eq!(steps[0].commit_count, 3);
    assert_eq!(steps[0].execution_context.get_i64(OFFSET_KEY), Some(5));
    assert_eq!(steps[2].write_count, 5);
}

#[test]
fn invalid_records_are_quarantined() {
    let execution = run_demo(&AppConfig::default(), repository(), "bad.csv", vec![1, -2, 3]).unwrap();

    assert_eq!(execution.status(), BatchStatus::Completed);
    assert_eq!(step_names(&execution), vec!["extract", "validate", "quarantine"]);
    let steps = execution.step_executions();
    assert_eq!(steps[1].exit_status.exit_code(), INVALID_EXIT_CODE);
    assert_eq!(steps[2].write_skip_count, 1);
}

#[test]
fn completed_instance_cannot_be_relaunched() {
    let repo = repository();
    run_demo(&AppConfig::default(), repo.clone(), "once.csv", vec![1]).unwrap();
    let err = run_demo(&AppConfig::default(), repo, "once.csv", vec![1]).unwrap_err();
    assert!(matches!(err, AppError::Batch(BatchError::InstanceAlreadyComplete(_))));
}

#[test]
fn configured_job_name_is_used() {
    let config = AppConfig { demo_job_name: "nightly".into(),
                             ..AppConfig::default() };
    let execution = run_demo(&config, repository(), "n.csv", vec![]).unwrap();
    assert_eq!(execution.job_name(), "nightly");
    assert_eq!(execution.status(), BatchStatus::Completed);
}
