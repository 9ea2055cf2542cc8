//! Controladores de flujo: deciden qué step corre a continuación.
//!
//! - `SimpleFlow`: lista ordenada, corta en el primer step no COMPLETED.
//! - `ConditionalFlow`: grafo de `StepTransition` resuelto por exit code.

pub mod conditional;
pub mod pattern;
pub mod simple;
pub mod transition;

pub use conditional::ConditionalFlow;
pub use simple::SimpleFlow;
pub use transition::{StepTransition, TransitionTable};

use crate::errors::BatchError;
use crate::model::{JobExecution, StepExecution};
use crate::step::StepHandler;

pub trait JobFlow: Send + Sync {
    /// Ejecuta los steps del flujo. Devuelve el último `StepExecution`
    /// producido (o `None` si no corrió ninguno). Los errores suben hasta el
    /// template del job.
    fn do_execute(&self, execution: &JobExecution, handler: &dyn StepHandler) -> Result<Option<StepExecution>, BatchError>;

    fn step_names(&self) -> Vec<String>;
}
