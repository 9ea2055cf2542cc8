//! batch-core: motor de orquestación de jobs batch.
//!
//! Modelo de ejecución (instancia → ejecución de job → ejecución de step),
//! compuerta por step con semántica de restart, flujos secuencial y
//! condicional, y el template de ejecución de un job. La persistencia se
//! consume a través del contrato `JobRepository`.
pub mod constants;
pub mod errors;
pub mod flow;
pub mod hashing;
pub mod job;
pub mod model;
pub mod repo;
pub mod step;

pub use errors::{classify_error, BatchError, ErrorClass};
pub use flow::{ConditionalFlow, JobFlow, SimpleFlow, StepTransition, TransitionTable};
pub use job::{BatchJob, CompositeJobExecutionListener, ConditionalJob, DefaultJobParametersValidator, Job,
              JobExecutionListener, JobParametersIncrementer, JobParametersValidator, RunIdIncrementer, SimpleJob,
              SimpleJobLauncher};
pub use model::{BatchStatus, ExecutionContext, ExitStatus, JobExecution, JobInstance, JobParameters,
                JobParametersBuilder, StepExecution};
pub use repo::{InMemoryJobRepository, JobRepository};
pub use step::{RepeatStatus, SimpleStepHandler, Step, StepHandler, Tasklet, TaskletStep};
