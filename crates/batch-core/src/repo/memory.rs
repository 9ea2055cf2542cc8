//! Repositorio en memoria (tests y ejecuciones efímeras).
//!
//! Guarda snapshots: nunca comparte el `JobExecution` vivo con el llamador,
//! de modo que una lectura del repositorio refleja sólo lo persistido.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use dashmap::DashMap;

use super::JobRepository;
use crate::errors::BatchError;
use crate::model::{ExecutionContext, JobExecution, JobExecutionSnapshot, JobInstance, JobParameters, StepExecution};

pub struct InMemoryJobRepository {
    instances: DashMap<(String, String), JobInstance>,
    job_executions: DashMap<i64, JobExecutionSnapshot>,
    step_executions: DashMap<i64, StepExecution>,
    instance_seq: AtomicI64,
    job_execution_seq: AtomicI64,
    step_execution_seq: AtomicI64,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self { instances: DashMap::new(),
               job_executions: DashMap::new(),
               step_executions: DashMap::new(),
               instance_seq: AtomicI64::new(1),
               job_execution_seq: AtomicI64::new(1),
               step_execution_seq: AtomicI64::new(1) }
    }

    fn steps_of(&self, job_execution_id: i64) -> Vec<StepExecution> {
        let mut steps: Vec<StepExecution> = self.step_executions
                                                .iter()
                                                .filter(|e| e.value().job_execution_id == job_execution_id)
                                                .map(|e| e.value().clone())
                                                .collect();
        steps.sort_by_key(|se| se.id);
        steps
    }

    fn rebuild(&self, mut snapshot: JobExecutionSnapshot) -> JobExecution {
        snapshot.step_executions = self.steps_of(snapshot.id);
        JobExecution::from_snapshot(snapshot)
    }

    /// Cantidad de `StepExecution` persistidos (todas las instancias).
    pub fn step_execution_total(&self) -> usize {
        self.step_executions.len()
    }
}

impl Default for InMemoryJobRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_id(what: &str) -> BatchError {
    BatchError::Repository(format!("{what} has no id; it must be added before it can be updated"))
}

impl JobRepository for InMemoryJobRepository {
    fn get_job_instance(&self, job_name: &str, params: &JobParameters) -> Result<Option<JobInstance>, BatchError> {
        let key = (job_name.to_string(), params.to_identifying_key());
        Ok(self.instances.get(&key).map(|e| e.value().clone()))
    }

    fn create_job_instance(&self, job_name: &str, params: &JobParameters) -> Result<JobInstance, BatchError> {
        let job_key = params.to_identifying_key();
        let entry = self.instances
                        .entry((job_name.to_string(), job_key.clone()))
                        .or_insert_with(|| {
                            let id = self.instance_seq.fetch_add(1, Ordering::SeqCst);
                            JobInstance::new(id, job_name, job_key)
                        });
        Ok(entry.value().clone())
    }

    fn get_last_job_instance(&self, job_name: &str) -> Result<Option<JobInstance>, BatchError> {
        Ok(self.instances
               .iter()
               .filter(|e| e.value().job_name == job_name)
               .map(|e| e.value().clone())
               .max_by_key(|inst| inst.id))
    }

    fn find_job_executions(&self, instance: &JobInstance) -> Result<Vec<JobExecution>, BatchError> {
        let mut snapshots: Vec<JobExecutionSnapshot> = self.job_executions
                                                           .iter()
                                                           .filter(|e| e.value().job_instance.id == instance.id)
                                                           .map(|e| e.value().clone())
                                                           .collect();
        snapshots.sort_by_key(|s| s.id);
        Ok(snapshots.into_iter().map(|s| self.rebuild(s)).collect())
    }

    fn save_job_execution(&self,
                          instance: &JobInstance,
                          params: &JobParameters,
                          context: ExecutionContext)
                          -> Result<JobExecution, BatchError> {
        let id = self.job_execution_seq.fetch_add(1, Ordering::SeqCst);
        let execution = JobExecution::new(id, instance.clone(), params.clone());
        execution.set_execution_context(context);
        execution.set_last_updated(Utc::now());
        self.job_executions.insert(id, execution.snapshot());
        Ok(execution)
    }

    fn update_job_execution(&self, execution: &JobExecution) -> Result<(), BatchError> {
        if !self.job_executions.contains_key(&execution.id()) {
            return Err(BatchError::Repository(format!("job execution {} not found", execution.id())));
        }
        execution.set_last_updated(Utc::now());
        self.job_executions.insert(execution.id(), execution.snapshot());
        Ok(())
    }

    fn update_execution_context(&self, execution: &JobExecution) -> Result<(), BatchError> {
        let mut stored =
            self.job_executions
                .get_mut(&execution.id())
                .ok_or_else(|| BatchError::Repository(format!("job execution {} not found", execution.id())))?;
        stored.execution_context = execution.execution_context();
        Ok(())
    }

    fn add_step_execution(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let id = self.step_execution_seq.fetch_add(1, Ordering::SeqCst);
        step_execution.id = Some(id);
        step_execution.last_updated = Some(Utc::now());
        self.step_executions.insert(id, step_execution.clone());
        Ok(())
    }

    fn update_step_execution(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let id = step_execution.id.ok_or_else(|| missing_id("step execution"))?;
        step_execution.last_updated = Some(Utc::now());
        self.step_executions.insert(id, step_execution.clone());
        Ok(())
    }

    fn update_step_execution_context(&self, step_execution: &StepExecution) -> Result<(), BatchError> {
        let id = step_execution.id.ok_or_else(|| missing_id("step execution"))?;
        let mut stored = self.step_executions
                             .get_mut(&id)
                             .ok_or_else(|| BatchError::Repository(format!("step execution {id} not found")))?;
        stored.execution_context = step_execution.execution_context.clone();
        Ok(())
    }

    fn get_last_step_execution(&self, instance: &JobInstance, step_name: &str) -> Result<Option<StepExecution>, BatchError> {
        Ok(self.step_executions
               .iter()
               .filter(|e| e.value().job_instance_id == instance.id && e.value().step_name == step_name)
               .map(|e| e.value().clone())
               .max_by_key(|se| se.id))
    }

    fn get_step_execution_count(&self, instance: &JobInstance, step_name: &str) -> Result<usize, BatchError> {
        Ok(self.step_executions
               .iter()
               .filter(|e| e.value().job_instance_id == instance.id && e.value().step_name == step_name)
               .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BatchStatus, JobParametersBuilder};

    fn params(file: &str) -> JobParameters {
        JobParametersBuilder::new().add_string("file", file).build()
    }

    #[test]
    fn create_or_get_instance_is_keyed_by_identifying_params() {
        let repo = InMemoryJobRepository::new();
        let a = repo.create_job_instance("job", &params("a")).unwrap();
        let again = repo.create_job_instance("job", &params("a")).unwrap();
        let b = repo.create_job_instance("job", &params("b")).unwrap();
        assert_eq!(a, again);
        assert_ne!(a.id, b.id);
        assert!(repo.is_job_instance_exists("job", &params("a")).unwrap());
        assert!(!repo.is_job_instance_exists("other", &params("a")).unwrap());
        assert_eq!(repo.get_last_job_instance("job").unwrap(), Some(b));
    }

    #[test]
    fn restart_inherits_context_of_last_execution() {
        let repo = InMemoryJobRepository::new();
        let first = repo.create_job_execution("job", &params("a")).unwrap();
        first.with_execution_context_mut(|ctx| ctx.put("offset", 10));
        first.set_status(BatchStatus::Failed);
        repo.update_job_execution(&first).unwrap();

        let second = repo.create_job_execution("job", &params("a")).unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(second.job_instance(), first.job_instance());
        assert_eq!(second.execution_context().get_i64("offset"), Some(10));
        assert_eq!(repo.find_job_executions(first.job_instance()).unwrap().len(), 2);
    }

    #[test]
    fn running_execution_blocks_new_one() {
        let repo = InMemoryJobRepository::new();
        let first = repo.create_job_execution("job", &params("a")).unwrap();
        first.set_status(BatchStatus::Started);
        repo.update_job_execution(&first).unwrap();
        assert!(matches!(repo.create_job_execution("job", &params("a")), Err(BatchError::AlreadyRunning(_))));
    }

    #[test]
    fn step_lookups_span_executions_of_the_instance() {
        let repo = InMemoryJobRepository::new();
        let je = repo.create_job_execution("job", &params("a")).unwrap();
        let mut s1 = je.create_step_execution("load");
        s1.start_time = Some(Utc::now());
        repo.add_step_execution(&mut s1).unwrap();
        let mut s2 = je.create_step_execution("load");
        s2.start_time = s1.start_time;
        repo.add_step_execution(&mut s2).unwrap();
        s2.execution_context.put("k", 1);
        repo.update_step_execution_context(&s2).unwrap();

        let last = repo.get_last_step_execution(je.job_instance(), "load").unwrap().unwrap();
        assert_eq!(last.id, s2.id);
        assert_eq!(last.execution_context.get_i64("k"), Some(1));
        assert_eq!(repo.get_step_execution_count(je.job_instance(), "load").unwrap(), 2);
        assert_eq!(repo.get_step_execution_count(je.job_instance(), "other").unwrap(), 0);
        assert_eq!(repo.find_job_executions(je.job_instance()).unwrap()[0].step_execution_count(), 2);
    }

    #[test]
    fn latest_attempt_wins_even_without_start_time() {
        let repo = InMemoryJobRepository::new();
        let je = repo.create_job_execution("job", &params("a")).unwrap();
        let mut older = je.create_step_execution("load");
        older.start_time = Some(Utc::now());
        repo.add_step_execution(&mut older).unwrap();
        let mut newer = je.create_step_execution("load");
        repo.add_step_execution(&mut newer).unwrap();

        let last = repo.get_last_step_execution(je.job_instance(), "load").unwrap().unwrap();
        assert_eq!(last.id, newer.id);
        assert!(last.start_time.is_none());
    }

    #[test]
    fn update_without_id_fails() {
        let repo = InMemoryJobRepository::new();
        let mut se = StepExecution::new("s", 1, 1);
        assert!(matches!(repo.update_step_execution(&mut se), Err(BatchError::Repository(_))));
    }
}
