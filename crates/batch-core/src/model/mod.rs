//! Modelo de ejecución: instancias, ejecuciones, status y contexto.

pub mod context;
pub mod exit_status;
pub mod instance;
pub mod job_execution;
pub mod parameters;
pub mod status;
pub mod step_execution;

pub use context::ExecutionContext;
pub use exit_status::{DefaultSeverity, ExitCodeSeverity, ExitStatus};
pub use instance::JobInstance;
pub use job_execution::{JobExecution, JobExecutionSnapshot};
pub use parameters::{JobParameter, JobParameters, JobParametersBuilder, ParameterValue};
pub use status::BatchStatus;
pub use step_execution::StepExecution;
