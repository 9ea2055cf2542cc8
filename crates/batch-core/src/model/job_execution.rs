//! `JobExecution`: un intento de ejecutar un `JobInstance`.
//!
//! Es el estado mutable compartido entre el template del job, el
//! `StepHandler`, los listeners y cualquier hilo de monitoreo. Por eso toda
//! mutación pasa por `&self` con locks finos:
//! - el estado escalar (status, exit status, tiempos, contexto) bajo un
//!   `RwLock`;
//! - la lista de `StepExecution` bajo su propio `RwLock` (lecturas devuelven
//!   copias estables, nunca la lista viva);
//! - la lista de fallos bajo un `Mutex` (append concurrente sin pérdidas).
//!
//! Un lock envenenado no aborta: se recupera el guard interno, ya que cada
//! sección crítica deja el estado consistente antes de cualquier panic
//! posible.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::BatchError;
use crate::model::{BatchStatus, ExecutionContext, ExitStatus, JobInstance, JobParameters, StepExecution};

#[derive(Debug, Clone)]
struct ExecutionState {
    status: BatchStatus,
    exit_status: ExitStatus,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
    execution_context: ExecutionContext,
}

/// Copia serializable de un `JobExecution` (lo que guardan los repositorios).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExecutionSnapshot {
    pub id: i64,
    pub job_instance: JobInstance,
    pub parameters: JobParameters,
    pub status: BatchStatus,
    pub exit_status: ExitStatus,
    pub create_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub execution_context: ExecutionContext,
    pub step_executions: Vec<StepExecution>,
    pub failure_exceptions: Vec<BatchError>,
}

#[derive(Debug)]
pub struct JobExecution {
    id: i64,
    job_instance: JobInstance,
    parameters: JobParameters,
    create_time: DateTime<Utc>,
    state: RwLock<ExecutionState>,
    step_executions: RwLock<Vec<StepExecution>>,
    failure_exceptions: Mutex<Vec<BatchError>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl JobExecution {
    pub fn new(id: i64, job_instance: JobInstance, parameters: JobParameters) -> Self {
        Self { id,
               job_instance,
               parameters,
               create_time: Utc::now(),
               state: RwLock::new(ExecutionState { status: BatchStatus::Starting,
                                                   exit_status: ExitStatus::unknown(),
                                                   start_time: None,
                                                   end_time: None,
                                                   last_updated: None,
                                                   execution_context: ExecutionContext::new() }),
               step_executions: RwLock::new(Vec::new()),
               failure_exceptions: Mutex::new(Vec::new()) }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn job_instance(&self) -> &JobInstance {
        &self.job_instance
    }

    pub fn job_name(&self) -> &str {
        &self.job_instance.job_name
    }

    pub fn parameters(&self) -> &JobParameters {
        &self.parameters
    }

    pub fn create_time(&self) -> DateTime<Utc> {
        self.create_time
    }

    pub fn status(&self) -> BatchStatus {
        read(&self.state).status
    }

    /// Reseteo explícito (administrativo); no respeta el orden de upgrade.
    pub fn set_status(&self, status: BatchStatus) {
        write(&self.state).status = status;
    }

    pub fn upgrade_status(&self, status: BatchStatus) {
        let mut state = write(&self.state);
        state.status = state.status.upgrade_to(status);
    }

    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    pub fn is_stopping(&self) -> bool {
        self.status() == BatchStatus::Stopping
    }

    /// Petición cooperativa de stop: pasa a STOPPING y marca los steps en
    /// curso como `terminate_only`. La marca llega también a la copia que
    /// tiene el step en ejecución.
    pub fn request_stop(&self) {
        self.set_status(BatchStatus::Stopping);
        for se in read(&self.step_executions).iter() {
            if se.status.is_running() {
                se.set_terminate_only();
            }
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        read(&self.state).exit_status.clone()
    }

    pub fn set_exit_status(&self, exit_status: ExitStatus) {
        write(&self.state).exit_status = exit_status;
    }

    /// Merge `and` atómico sobre el exit status actual.
    pub fn merge_exit_status(&self, other: &ExitStatus) {
        let mut state = write(&self.state);
        state.exit_status = state.exit_status.and(other);
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        read(&self.state).start_time
    }

    pub fn set_start_time(&self, t: DateTime<Utc>) {
        write(&self.state).start_time = Some(t);
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        read(&self.state).end_time
    }

    pub fn set_end_time(&self, t: DateTime<Utc>) {
        write(&self.state).end_time = Some(t);
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        read(&self.state).last_updated
    }

    pub fn set_last_updated(&self, t: DateTime<Utc>) {
        write(&self.state).last_updated = Some(t);
    }

    pub fn execution_context(&self) -> ExecutionContext {
        read(&self.state).execution_context.clone()
    }

    pub fn set_execution_context(&self, ctx: ExecutionContext) {
        write(&self.state).execution_context = ctx;
    }

    pub fn with_execution_context_mut<R>(&self, f: impl FnOnce(&mut ExecutionContext) -> R) -> R {
        f(&mut write(&self.state).execution_context)
    }

    /// Crea un `StepExecution` ligado a esta ejecución. No lo registra: el
    /// handler lo agrega tras persistirlo.
    pub fn create_step_execution(&self, step_name: &str) -> StepExecution {
        StepExecution::new(step_name, self.id, self.job_instance.id)
    }

    /// Registra (o reemplaza por id) un `StepExecution`.
    pub fn add_step_execution(&self, step_execution: StepExecution) {
        let mut list = write(&self.step_executions);
        if let Some(id) = step_execution.id {
            if let Some(existing) = list.iter_mut().find(|se| se.id == Some(id)) {
                *existing = step_execution;
                return;
            }
        }
        list.push(step_execution);
    }

    /// Copia estable de los steps registrados.
    pub fn step_executions(&self) -> Vec<StepExecution> {
        read(&self.step_executions).clone()
    }

    pub fn step_execution_count(&self) -> usize {
        read(&self.step_executions).len()
    }

    pub fn add_failure_exception(&self, err: BatchError) {
        lock(&self.failure_exceptions).push(err);
    }

    pub fn failure_exceptions(&self) -> Vec<BatchError> {
        lock(&self.failure_exceptions).clone()
    }

    /// Fallos del job seguidos de los fallos de cada step.
    pub fn all_failure_exceptions(&self) -> Vec<BatchError> {
        let mut all = self.failure_exceptions();
        for se in read(&self.step_executions).iter() {
            all.extend(se.failure_exceptions.iter().cloned());
        }
        all
    }

    pub fn snapshot(&self) -> JobExecutionSnapshot {
        let state = read(&self.state).clone();
        JobExecutionSnapshot { id: self.id,
                               job_instance: self.job_instance.clone(),
                               parameters: self.parameters.clone(),
                               status: state.status,
                               exit_status: state.exit_status,
                               create_time: self.create_time,
                               start_time: state.start_time,
                               end_time: state.end_time,
                               last_updated: state.last_updated,
                               execution_context: state.execution_context,
                               step_executions: self.step_executions(),
                               failure_exceptions: self.failure_exceptions() }
    }

    pub fn from_snapshot(snapshot: JobExecutionSnapshot) -> Self {
        Self { id: snapshot.id,
               job_instance: snapshot.job_instance,
               parameters: snapshot.parameters,
               create_time: snapshot.create_time,
               state: RwLock::new(ExecutionState { status: snapshot.status,
                                                   exit_status: snapshot.exit_status,
                                                   start_time: snapshot.start_time,
                                                   end_time: snapshot.end_time,
                                                   last_updated: snapshot.last_updated,
                                                   execution_context: snapshot.execution_context }),
               step_executions: RwLock::new(snapshot.step_executions),
               failure_exceptions: Mutex::new(snapshot.failure_exceptions) }
    }
}

impl Clone for JobExecution {
    fn clone(&self) -> Self {
        Self::from_snapshot(self.snapshot())
    }
}
