//! Implementación Postgres (Diesel) de `JobRepository`.
//!
//! Paridad con `InMemoryJobRepository`:
//! - `JobInstance` único por (`job_name`, `job_key`); create-or-get con
//!   `ON CONFLICT DO NOTHING` seguido de lectura.
//! - Ids asignados por la base (BIGSERIAL), monotónicos por tabla.
//! - Contextos, parámetros y listas de fallos se guardan como JSONB.
//! - Las lecturas se reintentan con backoff corto ante errores transitorios;
//!   las escrituras no (un fallo de escritura aborta el intento en curso).

use batch_core::{BatchError, BatchStatus, ExecutionContext, ExitStatus, JobExecution, JobInstance, JobParameters,
                 JobRepository, StepExecution};
use batch_core::model::JobExecutionSnapshot;
use chrono::{DateTime, SubsecRound, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use log::{debug, warn};
use serde_json::Value;

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::{batch_job_execution, batch_job_instance, batch_step_execution};

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// Al construirlo con `build_pool` se corre el set de migraciones pendientes
/// (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Contrato: devuelve una conexión válida o `PersistenceError::TransientIo`
/// en caso de error.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

#[derive(Queryable, Debug)]
pub struct JobInstanceRow {
    pub id: i64,
    pub job_name: String,
    pub job_key: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = batch_job_instance)]
struct NewJobInstanceRow<'a> {
    job_name: &'a str,
    job_key: &'a str,
}

/// Fila de `batch_job_execution` (orden de columnas igual al schema).
#[derive(Queryable, Debug)]
pub struct JobExecutionRow {
    pub id: i64,
    pub job_instance_id: i64,
    pub parameters: Value,
    pub status: String,
    pub exit_code: String,
    pub exit_description: String,
    pub create_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub execution_context: Value,
    pub failures: Value,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = batch_job_execution)]
struct NewJobExecutionRow<'a> {
    job_instance_id: i64,
    parameters: &'a Value,
    status: &'a str,
    exit_code: &'a str,
    exit_description: &'a str,
    create_time: DateTime<Utc>,
    last_updated: Option<DateTime<Utc>>,
    execution_context: &'a Value,
    failures: &'a Value,
}

#[derive(AsChangeset, Debug)]
#[diesel(table_name = batch_job_execution)]
#[diesel(treat_none_as_null = true)]
struct JobExecutionChanges<'a> {
    status: &'a str,
    exit_code: &'a str,
    exit_description: &'a str,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
    execution_context: &'a Value,
    failures: &'a Value,
}

/// Fila de `batch_step_execution` (orden de columnas igual al schema).
#[derive(Queryable, Debug)]
pub struct StepExecutionRow {
    pub id: i64,
    pub job_execution_id: i64,
    pub job_instance_id: i64,
    pub step_name: String,
    pub status: String,
    pub exit_code: String,
    pub exit_description: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub read_count: i64,
    pub write_count: i64,
    pub filter_count: i64,
    pub commit_count: i64,
    pub rollback_count: i64,
    pub read_skip_count: i64,
    pub process_skip_count: i64,
    pub write_skip_count: i64,
    pub execution_context: Value,
    pub failures: Value,
}

/// Columnas mutables de un step; se usa tanto para insertar como para
/// actualizar.
#[derive(Insertable, AsChangeset, Debug)]
#[diesel(table_name = batch_step_execution)]
#[diesel(treat_none_as_null = true)]
struct StepExecutionValues<'a> {
    job_execution_id: i64,
    job_instance_id: i64,
    step_name: &'a str,
    status: &'a str,
    exit_code: &'a str,
    exit_description: &'a str,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
    read_count: i64,
    write_count: i64,
    filter_count: i64,
    commit_count: i64,
    rollback_count: i64,
    read_skip_count: i64,
    process_skip_count: i64,
    write_skip_count: i64,
    execution_context: &'a Value,
    failures: &'a Value,
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict => true,
        PersistenceError::TransientIo(_) => true,
        // Algunos drivers reportan desconexiones como Unknown con texto.
        PersistenceError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("could not serialize access due to concurrent update")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry simple con backoff lineal corto (hasta 3 reintentos: 15ms, 30ms,
/// 45ms). Sólo se usa en lecturas.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

fn parse_status(raw: &str) -> Result<BatchStatus, PersistenceError> {
    raw.parse::<BatchStatus>()
       .map_err(|e| PersistenceError::Corrupt(format!("status '{raw}': {e}")))
}

// Postgres guarda microsegundos; truncamos antes de escribir para que el
// valor en memoria coincida con el leído.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn to_count(v: i64) -> u64 {
    v.max(0) as u64
}

fn failures_json(failures: &[BatchError]) -> Result<Value, PersistenceError> {
    Ok(serde_json::to_value(failures)?)
}

fn step_from_row(row: StepExecutionRow) -> Result<StepExecution, PersistenceError> {
    let mut se = StepExecution::new(row.step_name, row.job_execution_id, row.job_instance_id);
    se.id = Some(row.id);
    se.status = parse_status(&row.status)?;
    se.exit_status = ExitStatus::with_description(row.exit_code, row.exit_description);
    se.execution_context = ExecutionContext::from_json(&row.execution_context);
    se.start_time = row.start_time;
    se.end_time = row.end_time;
    se.last_updated = row.last_updated;
    se.read_count = to_count(row.read_count);
    se.write_count = to_count(row.write_count);
    se.filter_count = to_count(row.filter_count);
    se.commit_count = to_count(row.commit_count);
    se.rollback_count = to_count(row.rollback_count);
    se.read_skip_count = to_count(row.read_skip_count);
    se.process_skip_count = to_count(row.process_skip_count);
    se.write_skip_count = to_count(row.write_skip_count);
    se.failure_exceptions = serde_json::from_value(row.failures)?;
    Ok(se)
}

fn execution_from_row(instance: &JobInstance,
                      row: JobExecutionRow,
                      steps: Vec<StepExecution>)
                      -> Result<JobExecution, PersistenceError> {
    let snapshot = JobExecutionSnapshot { id: row.id,
                                          job_instance: instance.clone(),
                                          parameters: serde_json::from_value(row.parameters)?,
                                          status: parse_status(&row.status)?,
                                          exit_status: ExitStatus::with_description(row.exit_code,
                                                                                    row.exit_description),
                                          create_time: row.create_time,
                                          start_time: row.start_time,
                                          end_time: row.end_time,
                                          last_updated: row.last_updated,
                                          execution_context: ExecutionContext::from_json(&row.execution_context),
                                          step_executions: steps,
                                          failure_exceptions: serde_json::from_value(row.failures)? };
    Ok(JobExecution::from_snapshot(snapshot))
}

/// Implementación Postgres del contrato `JobRepository`.
pub struct PgJobRepository<P: ConnectionProvider> {
    pub provider: P,
}

impl<P: ConnectionProvider> PgJobRepository<P> {
    /// Crea un `PgJobRepository` a partir de un `ConnectionProvider`
    /// (generalmente `PoolProvider`).
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    fn step_values<'a>(se: &'a StepExecution,
                       context: &'a Value,
                       failures: &'a Value)
                       -> StepExecutionValues<'a> {
        StepExecutionValues { job_execution_id: se.job_execution_id,
                              job_instance_id: se.job_instance_id,
                              step_name: &se.step_name,
                              status: se.status.as_str(),
                              exit_code: se.exit_status.exit_code(),
                              exit_description: se.exit_status.exit_description(),
                              start_time: se.start_time,
                              end_time: se.end_time,
                              last_updated: se.last_updated,
                              read_count: se.read_count as i64,
                              write_count: se.write_count as i64,
                              filter_count: se.filter_count as i64,
                              commit_count: se.commit_count as i64,
                              rollback_count: se.rollback_count as i64,
                              read_skip_count: se.read_skip_count as i64,
                              process_skip_count: se.process_skip_count as i64,
                              write_skip_count: se.write_skip_count as i64,
                              execution_context: context,
                              failures }
    }

    fn load_executions(&self, instance: &JobInstance) -> Result<Vec<JobExecution>, PersistenceError> {
        let (rows, step_rows): (Vec<JobExecutionRow>, Vec<StepExecutionRow>) = with_retry(|| {
            let mut conn = self.provider.connection()?;
            let rows: Vec<JobExecutionRow> =
                batch_job_execution::table.filter(batch_job_execution::job_instance_id.eq(instance.id))
                                          .order(batch_job_execution::id.asc())
                                          .load(&mut conn)?;
            let step_rows: Vec<StepExecutionRow> =
                batch_step_execution::table.filter(batch_step_execution::job_instance_id.eq(instance.id))
                                           .order(batch_step_execution::id.asc())
                                           .load(&mut conn)?;
            Ok((rows, step_rows))
        })?;

        let mut steps = Vec::with_capacity(step_rows.len());
        for row in step_rows {
            steps.push(step_from_row(row)?);
        }
        let mut executions = Vec::with_capacity(rows.len());
        for row in rows {
            let own: Vec<StepExecution> = steps.iter().filter(|se| se.belongs_to(row.id)).cloned().collect();
            executions.push(execution_from_row(instance, row, own)?);
        }
        debug!("find_job_executions instance={} count={}", instance.id, executions.len());
        Ok(executions)
    }
}

impl<P: ConnectionProvider> JobRepository for PgJobRepository<P> {
    fn get_job_instance(&self, job_name: &str, params: &JobParameters) -> Result<Option<JobInstance>, BatchError> {
        let job_key = params.to_identifying_key();
        let row: Option<JobInstanceRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            batch_job_instance::table.filter(batch_job_instance::job_name.eq(job_name))
                                     .filter(batch_job_instance::job_key.eq(&job_key))
                                     .first(&mut conn)
                                     .optional()
                                     .map_err(PersistenceError::from)
        })?;
        Ok(row.map(|r| JobInstance::new(r.id, r.job_name, r.job_key)))
    }

    fn create_job_instance(&self, job_name: &str, params: &JobParameters) -> Result<JobInstance, BatchError> {
        let job_key = params.to_identifying_key();
        let mut conn = self.provider.connection()?;
        let row: JobInstanceRow = conn.transaction::<_, diesel::result::Error, _>(|tx| {
            diesel::insert_into(batch_job_instance::table)
                .values(NewJobInstanceRow { job_name,
                                            job_key: &job_key })
                .on_conflict((batch_job_instance::job_name, batch_job_instance::job_key))
                .do_nothing()
                .execute(tx)?;
            batch_job_instance::table.filter(batch_job_instance::job_name.eq(job_name))
                                     .filter(batch_job_instance::job_key.eq(&job_key))
                                     .first(tx)
        })
        .map_err(PersistenceError::from)?;
        debug!("create_job_instance name={job_name} id={}", row.id);
        Ok(JobInstance::new(row.id, row.job_name, row.job_key))
    }

    fn get_last_job_instance(&self, job_name: &str) -> Result<Option<JobInstance>, BatchError> {
        let row: Option<JobInstanceRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            batch_job_instance::table.filter(batch_job_instance::job_name.eq(job_name))
                                     .order(batch_job_instance::id.desc())
                                     .first(&mut conn)
                                     .optional()
                                     .map_err(PersistenceError::from)
        })?;
        Ok(row.map(|r| JobInstance::new(r.id, r.job_name, r.job_key)))
    }

    fn find_job_executions(&self, instance: &JobInstance) -> Result<Vec<JobExecution>, BatchError> {
        Ok(self.load_executions(instance)?)
    }

    fn save_job_execution(&self,
                          instance: &JobInstance,
                          params: &JobParameters,
                          context: ExecutionContext)
                          -> Result<JobExecution, BatchError> {
        let now = now_micros();
        let status = BatchStatus::Starting;
        let exit = ExitStatus::unknown();
        let params_json = serde_json::to_value(params).map_err(PersistenceError::from)?;
        let context_json = context.to_json();
        let failures = Value::Array(Vec::new());

        let mut conn = self.provider.connection()?;
        let id: i64 = diesel::insert_into(batch_job_execution::table)
            .values(NewJobExecutionRow { job_instance_id: instance.id,
                                         parameters: &params_json,
                                         status: status.as_str(),
                                         exit_code: exit.exit_code(),
                                         exit_description: exit.exit_description(),
                                         create_time: now,
                                         last_updated: Some(now),
                                         execution_context: &context_json,
                                         failures: &failures })
            .returning(batch_job_execution::id)
            .get_result(&mut conn)
            .map_err(PersistenceError::from)?;
        debug!("save_job_execution instance={} id={id}", instance.id);

        let snapshot = JobExecutionSnapshot { id,
                                              job_instance: instance.clone(),
                                              parameters: params.clone(),
                                              status,
                                              exit_status: exit,
                                              create_time: now,
                                              start_time: None,
                                              end_time: None,
                                              last_updated: Some(now),
                                              execution_context: context,
                                              step_executions: Vec::new(),
                                              failure_exceptions: Vec::new() };
        Ok(JobExecution::from_snapshot(snapshot))
    }

    fn update_job_execution(&self, execution: &JobExecution) -> Result<(), BatchError> {
        let now = now_micros();
        execution.set_last_updated(now);
        let snapshot = execution.snapshot();
        let context_json = snapshot.execution_context.to_json();
        let failures = failures_json(&snapshot.failure_exceptions)?;
        let changes = JobExecutionChanges { status: snapshot.status.as_str(),
                                            exit_code: snapshot.exit_status.exit_code(),
                                            exit_description: snapshot.exit_status.exit_description(),
                                            start_time: snapshot.start_time,
                                            end_time: snapshot.end_time,
                                            last_updated: snapshot.last_updated,
                                            execution_context: &context_json,
                                            failures: &failures };
        let mut conn = self.provider.connection()?;
        let updated = diesel::update(batch_job_execution::table.find(snapshot.id)).set(&changes)
                                                                                 .execute(&mut conn)
                                                                                 .map_err(PersistenceError::from)?;
        if updated == 0 {
            return Err(BatchError::Repository(format!("job execution {} not found", snapshot.id)));
        }
        debug!("update_job_execution id={} status={}", snapshot.id, snapshot.status);
        Ok(())
    }

    fn update_execution_context(&self, execution: &JobExecution) -> Result<(), BatchError> {
        let context_json = execution.execution_context().to_json();
        let mut conn = self.provider.connection()?;
        let updated = diesel::update(batch_job_execution::table.find(execution.id()))
            .set(batch_job_execution::execution_context.eq(&context_json))
            .execute(&mut conn)
            .map_err(PersistenceError::from)?;
        if updated == 0 {
            return Err(BatchError::Repository(format!("job execution {} not found", execution.id())));
        }
        Ok(())
    }

    fn add_step_execution(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        step_execution.last_updated = Some(now_micros());
        let context_json = step_execution.execution_context.to_json();
        let failures = failures_json(&step_execution.failure_exceptions)?;
        let mut conn = self.provider.connection()?;
        let id: i64 = diesel::insert_into(batch_step_execution::table)
            .values(Self::step_values(step_execution, &context_json, &failures))
            .returning(batch_step_execution::id)
            .get_result(&mut conn)
            .map_err(PersistenceError::from)?;
        step_execution.id = Some(id);
        debug!("add_step_execution step={} id={id}", step_execution.step_name);
        Ok(())
    }

    fn update_step_execution(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let id = step_execution.id
                               .ok_or_else(|| BatchError::Repository("step execution has no id; it must be added before it can be updated".into()))?;
        step_execution.last_updated = Some(now_micros());
        let context_json = step_execution.execution_context.to_json();
        let failures = failures_json(&step_execution.failure_exceptions)?;
        let mut conn = self.provider.connection()?;
        let updated = diesel::update(batch_step_execution::table.find(id))
            .set(Self::step_values(step_execution, &context_json, &failures))
            .execute(&mut conn)
            .map_err(PersistenceError::from)?;
        if updated == 0 {
            return Err(BatchError::Repository(format!("step execution {id} not found")));
        }
        Ok(())
    }

    fn update_step_execution_context(&self, step_execution: &StepExecution) -> Result<(), BatchError> {
        let id = step_execution.id
                               .ok_or_else(|| BatchError::Repository("step execution has no id; it must be added before it can be updated".into()))?;
        let context_json = step_execution.execution_context.to_json();
        let mut conn = self.provider.connection()?;
        let updated = diesel::update(batch_step_execution::table.find(id))
            .set(batch_step_execution::execution_context.eq(&context_json))
            .execute(&mut conn)
            .map_err(PersistenceError::from)?;
        if updated == 0 {
            return Err(BatchError::Repository(format!("step execution {id} not found")));
        }
        Ok(())
    }

    fn get_last_step_execution(&self, instance: &JobInstance, step_name: &str) -> Result<Option<StepExecution>, BatchError> {
        let row: Option<StepExecutionRow> = with_retry(|| {
            let mut conn = self.provider.connection()?;
            batch_step_execution::table.filter(batch_step_execution::job_instance_id.eq(instance.id))
                                       .filter(batch_step_execution::step_name.eq(step_name))
                                       .order(batch_step_execution::id.desc())
                                       .first(&mut conn)
                                       .optional()
                                       .map_err(PersistenceError::from)
        })?;
        Ok(row.map(step_from_row).transpose()?)
    }

    fn get_step_execution_count(&self, instance: &JobInstance, step_name: &str) -> Result<usize, BatchError> {
        let count: i64 = with_retry(|| {
            let mut conn = self.provider.connection()?;
            batch_step_execution::table.filter(batch_step_execution::job_instance_id.eq(instance.id))
                                       .filter(batch_step_execution::step_name.eq(step_name))
                                       .count()
                                       .get_result(&mut conn)
                                       .map_err(PersistenceError::from)
        })?;
        Ok(count.max(0) as usize)
    }
}

/// Construye un pool r2d2 y ejecuta migraciones pendientes.
///
/// Comportamiento:
/// - Tamaños 0 se tratan como 1; si `min_size > max_size`, usa `min = max`.
/// - Devuelve `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({} > {}), ajustando min=max", validated_min, validated_max);
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee configuración (DATABASE_URL,
/// tamaños) y construye un pool ya migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_errors_are_retried() {
        assert!(is_retryable(&PersistenceError::SerializationConflict));
        assert!(is_retryable(&PersistenceError::TransientIo("pool".into())));
        assert!(is_retryable(&PersistenceError::Unknown("Connection refused (os error 111)".into())));
        assert!(!is_retryable(&PersistenceError::UniqueViolation("dup".into())));
        assert!(!is_retryable(&PersistenceError::NotFound));
    }

    #[test]
    fn with_retry_gives_up_after_three_retries() {
        let mut calls = 0;
        let res: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::TransientIo("down".into()))
        });
        assert!(res.is_err());
        assert_eq!(calls, 4);
    }

    #[test]
    fn with_retry_does_not_repeat_permanent_errors() {
        let mut calls = 0;
        let res: Result<(), _> = with_retry(|| {
            calls += 1;
            Err(PersistenceError::CheckViolation("status".into()))
        });
        assert!(matches!(res, Err(PersistenceError::CheckViolation(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn step_row_maps_back_to_step_execution() {
        let row = StepExecutionRow { id: 7,
                                     job_execution_id: 3,
                                     job_instance_id: 1,
                                     step_name: "load".into(),
                                     status: "FAILED".into(),
                                     exit_code: "FAILED".into(),
                                     exit_description: "boom".into(),
                                     start_time: None,
                                     end_time: None,
                                     last_updated: None,
                                     read_count: 10,
                                     write_count: 9,
                                     filter_count: 0,
                                     commit_count: 2,
                                     rollback_count: 1,
                                     read_skip_count: 1,
                                     process_skip_count: 0,
                                     write_skip_count: -1,
                                     execution_context: serde_json::json!({"offset": 500}),
                                     failures: serde_json::to_value(vec![BatchError::Step("boom".into())]).unwrap() };
        let se = step_from_row(row).unwrap();
        assert_eq!(se.id, Some(7));
        assert_eq!(se.status, BatchStatus::Failed);
        assert_eq!(se.exit_status.exit_description(), "boom");
        assert_eq!(se.execution_context.get_i64("offset"), Some(500));
        assert_eq!(se.write_skip_count, 0);
        assert_eq!(se.failure_exceptions, vec![BatchError::Step("boom".into())]);
    }

    #[test]
    fn unknown_status_text_is_reported_as_corrupt() {
        assert!(matches!(parse_status("RUNNING"), Err(PersistenceError::Corrupt(_))));
    }
}
