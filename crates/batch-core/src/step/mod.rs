//! Steps: contrato `Step`, compuerta `StepHandler` y `TaskletStep`.

pub mod definition;
pub mod handler;
pub mod tasklet;

pub use definition::Step;
pub use handler::{SimpleStepHandler, StepHandler};
pub use tasklet::{RepeatStatus, Tasklet, TaskletStep};
