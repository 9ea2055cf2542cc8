//! Launcher síncrono: valida la elegibilidad de restart, crea la ejecución
//! en el repositorio y corre el job en el hilo actual.

use std::sync::Arc;

use log::info;

use super::Job;
use crate::errors::BatchError;
use crate::model::{BatchStatus, JobExecution, JobParameters};
use crate::repo::JobRepository;

pub struct SimpleJobLauncher {
    repository: Arc<dyn JobRepository>,
}

fn describe(params: &JobParameters) -> String {
    serde_json::to_string(params).unwrap_or_else(|_| format!("{} parameters", params.len()))
}

impl SimpleJobLauncher {
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        Self { repository }
    }

    /// Lanza `job`. Los errores sólo reflejan que la ejecución no pudo
    /// crearse; el resultado del job se lee en el `JobExecution` devuelto.
    pub fn run(&self, job: &dyn Job, params: &JobParameters) -> Result<JobExecution, BatchError> {
        if let Some(instance) = self.repository.get_job_instance(job.name(), params)? {
            if let Some(last) = self.repository.get_last_job_execution(&instance)? {
                if !job.is_restartable() {
                    return Err(BatchError::Restart(format!("job instance already exists and is not restartable: {}",
                                                           job.name())));
                }
                if let Some(se) = last.step_executions().iter().find(|se| se.status == BatchStatus::Unknown) {
                    return Err(BatchError::Restart(format!("step [{}] is of status UNKNOWN", se.step_name)));
                }
            }
        }

        job.parameters_validator().validate(params)?;
        let execution = self.repository.create_job_execution(job.name(), params)?;

        info!("Job: [{}] launched with the following parameters: [{}]", job.name(), describe(params));
        job.execute(&execution);
        info!("Job: [{}] completed with the following parameters: [{}] and the following status: [{}]",
              job.name(),
              describe(params),
              execution.status());
        Ok(execution)
    }

    /// Lanza una instancia nueva derivando los parámetros con el
    /// incrementer del job a partir de la última ejecución conocida.
    pub fn run_next_instance(&self, job: &dyn Job) -> Result<JobExecution, BatchError> {
        let incrementer = job.parameters_incrementer().ok_or_else(|| {
                                                          BatchError::Configuration(format!("job '{}' has no parameters incrementer",
                                                                                            job.name()))
                                                      })?;
        let previous = match self.repository.get_last_job_instance(job.name())? {
            Some(instance) => self.repository
                                  .get_last_job_execution(&instance)?
                                  .map(|je| je.parameters().clone()),
            None => None,
        };
        let next = incrementer.next(previous.as_ref());
        self.run(job, &next)
    }
}
