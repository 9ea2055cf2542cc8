
use std::sync::Arc;

use batch_core::{BatchError, BatchStatus, ConditionalFlow, ConditionalJob, InMemoryJobRepository, Job, JobExecution,
                 JobParameters, JobRepository, Step, StepTransition};
use test_support::StubStep;

fn repository() -> Arc<dyn JobRepository> {
    Arc::new(InMemoryJobRepository::new())
}

fn stub(repo: &Arc<dyn JobRepository>, name: &str, exit_code: &str) -> Arc<dyn Step> {
    Arc::new(StubStep::with_outcome(repo, name, BatchStatus::Completed, exit_code))
}

fn run(job: &ConditionalJob, repo: &Arc<dyn JobRepository>) -> JobExecution {
    let execution = repo.create_job_execution(job.name(), &JobParameters::new()).unwrap();
    job.execute(&execution);
    execution
}

fn executed_names(execution: &JobExecution) -> Vec<String> {
    execution.step_executions().into_iter().map(|se| se.step_name).collect()
}

#[test]
fn empty_transition_set_is_rejected() {
    assert!(matches!(ConditionalFlow::new(vec![]), Err(BatchError::Configuration(_))));
}

#[test]
fn next_step_must_be_defined() {
    let repo = repository();
    let transitions = vec![StepTransition::new(stub(&repo, "step", "COMPLETED"), "*", "foo"),
                           StepTransition::end(stub(&repo, "other", "COMPLETED"), "*")];
    let err = ConditionalFlow::new(transitions).err().unwrap();
    assert!(err.to_string().contains("'foo'"));
}

#[test]
fn graph_without_end_transition_is_rejected() {
    let repo = repository();
    let s = stub(&repo, "step", "FAILED");
    assert!(ConditionalFlow::new(vec![StepTransition::new(s, "FAILED", "step")]).is_err());
}

#[test]
fn self_loop_without_entry_needs_explicit_start() {
    let repo = repository();
    let s = stub(&repo, "step", "COMPLETED");
    let transitions = || vec![StepTransition::new(s.clone(), "FAILED", "step"), StepTransition::end(s.clone(), "*")];
    assert!(ConditionalFlow::new(transitions()).is_err());

    let flow = ConditionalFlow::with_start_step(transitions(), "step").unwrap();
    assert_eq!(flow.start_step(), "step");
    let job = ConditionalJob::new("job", flow, repo.clone());
    let execution = run(&job, &repo);
    assert_eq!(execution.status(), BatchStatus::Completed);
    assert_eq!(execution.step_execution_count(), 1);
}

#[test]
fn two_unreferenced_steps_make_start_ambiguous() {
    let repo = repository();
    let transitions = vec![StepTransition::end(stub(&repo, "step1", "COMPLETED"), "*"),
                           StepTransition::end(stub(&repo, "step2", "COMPLETED"), "*")];
    let err = ConditionalFlow::new(transitions).err().unwrap();
    assert!(matches!(err, BatchError::Configuration(_)));
    assert!(err.to_string().contains("ambiguous"));
}

#[test]
fn unknown_start_step_is_rejected() {
    let repo = repository();
    let res = ConditionalFlow::with_start_step(vec![StepTransition::end(stub(&repo, "a", "COMPLETED"), "*")], "zzz");
    assert!(res.is_err());
}

#[test]
fn specificity_orders_literal_before_question_marks_before_star() {
    let run_with = |code: &str| {
        let repo = repository();
        let start = stub(&repo, "start", code);
        let job = ConditionalJob::conditional("job",
                                              vec![StepTransition::new(start.clone(), "*", "star"),
                                                   StepTransition::new(start.clone(), "FOO", "foo"),
                                                   StepTransition::new(start, "F??", "questions"),
                                                   StepTransition::end(stub(&repo, "star", "COMPLETED"), "*"),
                                                   StepTransition::end(stub(&repo, "foo", "COMPLETED"), "*"),
                                                   StepTransition::end(stub(&repo, "questions", "COMPLETED"), "*")],
                                              repo.clone()).unwrap();
        executed_names(&run(&job, &repo))
    };

    assert_eq!(run_with("FOO"), vec!["start", "foo"]);
    assert_eq!(run_with("FAZ"), vec!["start", "questions"]);
    assert_eq!(run_with("BAR"), vec!["start", "star"]);
}

#[test]
fn branching_prefers_exact_exit_code() {
    let repo = repository();
    let step1 = stub(&repo, "step1", "COMPLETED");
    let job = ConditionalJob::conditional("job",
                                          vec![StepTransition::new(step1.clone(), "*", "step2"),
                                               StepTransition::new(step1, "COMPLETED", "step3"),
                                               StepTransition::end(stub(&repo, "step2", "COMPLETED"), "*"),
                                               StepTransition::end(stub(&repo, "step3", "COMPLETED"), "*")],
                                          repo.clone()).unwrap();
    let execution = run(&job, &repo);
    assert_eq!(executed_names(&execution), vec!["step1", "step3"]);
    assert_eq!(execution.status(), BatchStatus::Completed);
    assert_eq!(execution.exit_status().exit_code(), "COMPLETED");
}

#[test]
fn failed_step_can_branch_to_recovery() {
    let repo = repository();
    let failing: Arc<dyn Step> = Arc::new(StubStep::with_outcome(&repo, "step1", BatchStatus::Failed, "FAILED"));
    let job = ConditionalJob::conditional("job",
                                          vec![StepTransition::new(failing, "*", "step2"),
                                               StepTransition::end(stub(&repo, "step2", "COMPLETED"), "*")],
                                          repo.clone()).unwrap();
    let execution = run(&job, &repo);
    assert_eq!(execution.step_execution_count(), 2);
    assert_eq!(execution.status(), BatchStatus::Completed);
}

#[test]
fn unmatched_exit_code_fails_the_job() {
    let repo = repository();
    let job = ConditionalJob::conditional("job",
                                          vec![StepTransition::new(stub(&repo, "step1", "COMPLETED"), "FOO", "step2"),
                                               StepTransition::end(stub(&repo, "step2", "COMPLETED"), "*")],
                                          repo.clone()).unwrap();
    let execution = run(&job, &repo);
    assert_eq!(execution.status(), BatchStatus::Failed);
    assert_eq!(execution.exit_status().exit_code(), "FAILED");
    let failures = execution.failure_exceptions();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].to_string().to_lowercase().contains("next step not found"));
}

#[test]
fn stopping_step_halts_the_graph() {
    let repo = repository();
    let job = ConditionalJob::conditional("job",
                                          vec![StepTransition::new(Arc::new(StubStep::with_outcome(&repo,
                                                                                                   "step1",
                                                                                                   BatchStatus::Stopping,
                                                                                                   "STOPPED")),
                                                                   "*",
                                                                   "step2"),
                                               StepTransition::end(stub(&repo, "step2", "COMPLETED"), "*")],
                                          repo.clone()).unwrap();
    let execution = run(&job, &repo);
    assert_eq!(execution.step_execution_count(), 1);
    assert_eq!(execution.status(), BatchStatus::Stopped);
    assert_eq!(execution.exit_status().exit_code(), "STOPPED");
}
