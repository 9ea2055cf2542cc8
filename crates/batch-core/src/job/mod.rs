//! Jobs: contrato `Job`, template de ejecución y colaboradores
//! (listeners, validación e incremento de parámetros, launcher).

pub mod incrementer;
pub mod launcher;
pub mod listener;
pub mod template;
pub mod validator;

pub use incrementer::{JobParametersIncrementer, RunIdIncrementer};
pub use launcher::SimpleJobLauncher;
pub use listener::{CompositeJobExecutionListener, JobExecutionListener};
pub use template::{BatchJob, ConditionalJob, SimpleJob};
pub use validator::{DefaultJobParametersValidator, JobParametersValidator};

use crate::model::JobExecution;

pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    fn is_restartable(&self) -> bool;

    fn parameters_incrementer(&self) -> Option<&dyn JobParametersIncrementer>;

    fn parameters_validator(&self) -> &dyn JobParametersValidator;

    fn step_names(&self) -> Vec<String>;

    /// Ejecuta el job sobre `execution`. No devuelve error: el resultado se
    /// inspecciona en el status, exit status y fallos de la ejecución.
    fn execute(&self, execution: &JobExecution);
}
