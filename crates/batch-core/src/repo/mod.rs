//! Contrato de persistencia del motor.
//!
//! `JobRepository` es la única frontera con el almacenamiento: el core nunca
//! toca storage directamente. Todas las operaciones son falibles y un error
//! de repositorio aborta el intento en curso (esta capa no reintenta).

pub mod memory;

pub use memory::InMemoryJobRepository;

use crate::errors::BatchError;
use crate::model::{BatchStatus, ExecutionContext, JobExecution, JobInstance, JobParameters, StepExecution};

pub trait JobRepository: Send + Sync {
    fn is_job_instance_exists(&self, job_name: &str, params: &JobParameters) -> Result<bool, BatchError> {
        Ok(self.get_job_instance(job_name, params)?.is_some())
    }

    fn get_job_instance(&self, job_name: &str, params: &JobParameters) -> Result<Option<JobInstance>, BatchError>;

    /// Create-or-get: devuelve la instancia existente para (nombre, clave)
    /// o crea una nueva.
    fn create_job_instance(&self, job_name: &str, params: &JobParameters) -> Result<JobInstance, BatchError>;

    fn get_last_job_instance(&self, job_name: &str) -> Result<Option<JobInstance>, BatchError>;

    /// Ejecuciones de la instancia en orden ascendente de id, con sus
    /// `StepExecution` adjuntos.
    fn find_job_executions(&self, instance: &JobInstance) -> Result<Vec<JobExecution>, BatchError>;

    fn get_last_job_execution(&self, instance: &JobInstance) -> Result<Option<JobExecution>, BatchError> {
        Ok(self.find_job_executions(instance)?
               .into_iter()
               .max_by_key(|je| (je.create_time(), je.id())))
    }

    /// Persiste una nueva ejecución (asigna id) para una instancia ya
    /// existente, con el contexto inicial indicado.
    fn save_job_execution(&self,
                          instance: &JobInstance,
                          params: &JobParameters,
                          context: ExecutionContext)
                          -> Result<JobExecution, BatchError>;

    /// Crea una ejecución aplicando la política de restart. En un restart la
    /// nueva ejecución hereda el contexto de la última.
    fn create_job_execution(&self, job_name: &str, params: &JobParameters) -> Result<JobExecution, BatchError> {
        let (instance, context) = match self.get_job_instance(job_name, params)? {
            Some(instance) => {
                let executions = self.find_job_executions(&instance)?;
                check_restart_policy(&instance, &executions, params)?;
                let context = executions.iter()
                                        .max_by_key(|je| (je.create_time(), je.id()))
                                        .map(|je| je.execution_context())
                                        .unwrap_or_default();
                (instance, context)
            }
            None => (self.create_job_instance(job_name, params)?, ExecutionContext::new()),
        };
        self.save_job_execution(&instance, params, context)
    }

    /// Actualización completa de la fila; fija `last_updated`.
    fn update_job_execution(&self, execution: &JobExecution) -> Result<(), BatchError>;

    /// Sólo persiste el contexto del job (escritura más barata).
    fn update_execution_context(&self, execution: &JobExecution) -> Result<(), BatchError>;

    /// Persiste un step nuevo y le asigna id.
    fn add_step_execution(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;

    fn update_step_execution(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;

    fn update_step_execution_context(&self, step_execution: &StepExecution) -> Result<(), BatchError>;

    /// Último intento del step dentro de la instancia (por start time y id).
    fn get_last_step_execution(&self, instance: &JobInstance, step_name: &str) -> Result<Option<StepExecution>, BatchError>;

    fn get_step_execution_count(&self, instance: &JobInstance, step_name: &str) -> Result<usize, BatchError>;
}

/// Reglas para crear una nueva ejecución sobre una instancia existente:
/// - ejecución en curso → `AlreadyRunning`;
/// - status UNKNOWN → `Restart` (requiere intervención manual);
/// - COMPLETED/ABANDONED con parámetros identificadores → `InstanceAlreadyComplete`.
pub fn check_restart_policy(instance: &JobInstance,
                            executions: &[JobExecution],
                            params: &JobParameters)
                            -> Result<(), BatchError> {
    for execution in executions {
        let status = execution.status();
        if status.is_running() {
            return Err(BatchError::AlreadyRunning(format!("job '{}' execution {} is {}",
                                                          instance.job_name,
                                                          execution.id(),
                                                          status)));
        }
        if status == BatchStatus::Unknown {
            return Err(BatchError::Restart(format!("cannot restart job '{}': execution {} has UNKNOWN status",
                                                   instance.job_name,
                                                   execution.id())));
        }
        if matches!(status, BatchStatus::Completed | BatchStatus::Abandoned) && params.has_identifying() {
            return Err(BatchError::InstanceAlreadyComplete(format!("job '{}' instance {} already {} for these parameters",
                                                                   instance.job_name,
                                                                   instance.id,
                                                                   status)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobParametersBuilder;

    fn params() -> JobParameters {
        JobParametersBuilder::new().add_string("file", "a.csv").build()
    }

    fn execution_with(status: BatchStatus) -> JobExecution {
        let je = JobExecution::new(1, JobInstance::new(1, "job", "k"), params());
        je.set_status(status);
        je
    }

    #[test]
    fn policy_rejects_running_unknown_and_complete() {
        let inst = JobInstance::new(1, "job", "k");
        assert!(matches!(check_restart_policy(&inst, &[execution_with(BatchStatus::Started)], &params()),
                         Err(BatchError::AlreadyRunning(_))));
        assert!(matches!(check_restart_policy(&inst, &[execution_with(BatchStatus::Unknown)], &params()),
                         Err(BatchError::Restart(_))));
        assert!(matches!(check_restart_policy(&inst, &[execution_with(BatchStatus::Completed)], &params()),
                         Err(BatchError::InstanceAlreadyComplete(_))));
        assert!(check_restart_policy(&inst, &[execution_with(BatchStatus::Failed)], &params()).is_ok());
        assert!(check_restart_policy(&inst, &[execution_with(BatchStatus::Completed)], &JobParameters::new()).is_ok());
    }
}
