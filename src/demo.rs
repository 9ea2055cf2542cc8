//! Job de demostración: extracción por chunks, validación y ramificación
//! condicional según el exit code de la validación.
//!
//! ```text
//! extract ──*──▶ validate ──COMPLETED──▶ load (fin)
//!                        └──INVALID*───▶ quarantine (fin)
//! ```

use std::sync::Arc;

use batch_core::{BatchError, ConditionalJob, DefaultJobParametersValidator, ExitStatus, JobExecution, JobParameters,
                 JobParametersBuilder, JobRepository, RepeatStatus, SimpleJobLauncher, Step, StepExecution,
                 StepTransition, TaskletStep};
use log::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Exit code de `validate` cuando hay registros inválidos.
pub const INVALID_EXIT_CODE: &str = "INVALID";

/// Clave de contexto con el offset de lectura de `extract`.
pub const OFFSET_KEY: &str = "extract.offset";

pub const CHUNK_SIZE: usize = 2;

fn tasklet_step(name: &str,
                config: &AppConfig,
                repository: &Arc<dyn JobRepository>,
                tasklet: impl Fn(&mut StepExecution) -> Result<RepeatStatus, BatchError> + Send + Sync + 'static)
                -> Arc<dyn Step> {
    let mut step = TaskletStep::new(name, Arc::clone(repository), tasklet);
    if let Some(limit) = config.default_start_limit {
        step = step.with_start_limit(limit);
    }
    Arc::new(step)
}

/// Construye el job condicional sobre los registros dados (negativos =
/// inválidos).
pub fn build_job(config: &AppConfig,
                 repository: Arc<dyn JobRepository>,
                 records: Vec<i64>)
                 -> Result<ConditionalJob, AppError> {
    let records = Arc::new(records);

    let data = Arc::clone(&records);
    let extract = tasklet_step("extract", config, &repository, move |se| {
        let offset = (se.execution_context.get_i64(OFFSET_KEY).unwrap_or(0).max(0) as usize).min(data.len());
        let end = (offset + CHUNK_SIZE).min(data.len());
        se.read_count += (end - offset) as u64;
        se.execution_context.put(OFFSET_KEY, end as i64);
        Ok(if end >= data.len() { RepeatStatus::Finished } else { RepeatStatus::Continuable })
    });

    let data = Arc::clone(&records);
    let validate = tasklet_step("validate", config, &repository, move |se| {
        let invalid = data.iter().filter(|v| **v < 0).count();
        se.filter_count = invalid as u64;
        if invalid > 0 {
            se.exit_status = ExitStatus::with_description(INVALID_EXIT_CODE, format!("{invalid} invalid records"));
        }
        Ok(RepeatStatus::Finished)
    });

    let data = Arc::clone(&records);
    let load = tasklet_step("load", config, &repository, move |se| {
        se.write_count = data.iter().filter(|v| **v >= 0).count() as u64;
        Ok(RepeatStatus::Finished)
    });

    let data = Arc::clone(&records);
    let quarantine = tasklet_step("quarantine", config, &repository, move |se| {
        se.write_skip_count = data.iter().filter(|v| **v < 0).count() as u64;
        Ok(RepeatStatus::Finished)
    });

    let transitions = vec![StepTransition::new(extract, "*", "validate"),
                           StepTransition::new(validate.clone(), "COMPLETED", "load"),
                           StepTransition::new(validate, "INVALID*", "quarantine"),
                           StepTransition::end(load, "*"),
                           StepTransition::end(quarantine, "*")];
    let validator = DefaultJobParametersValidator::new(["input"], Vec::<String>::new())?;
    Ok(ConditionalJob::conditional(config.demo_job_name.clone(), transitions, repository)?.restartable(config.restart_on_failure)
                                                                                           .with_validator(validator))
}

/// Parámetros de la demo: `input` identifica la instancia; `correlation.id`
/// es sólo informativo.
pub fn demo_parameters(input: &str) -> JobParameters {
    JobParametersBuilder::new().add_string("input", input)
                               .add_string_with("correlation.id", Uuid::new_v4().to_string(), false)
                               .build()
}

/// Lanza la demo y registra el resumen de cada step.
pub fn run_demo(config: &AppConfig,
                repository: Arc<dyn JobRepository>,
                input: &str,
                records: Vec<i64>)
                -> Result<JobExecution, AppError> {
    let job = build_job(config, Arc::clone(&repository), records)?;
    let launcher = SimpleJobLauncher::new(repository);
    let execution = launcher.run(&job, &demo_parameters(input))?;
    for se in execution.step_executions() {
        info!("{}", se.summary());
    }
    info!("Job [{}] finished: status={} {}",
          config.demo_job_name,
          execution.status(),
          execution.exit_status());
    Ok(execution)
}
