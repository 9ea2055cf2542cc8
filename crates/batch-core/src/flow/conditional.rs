use log::debug;

use super::{JobFlow, StepTransition, TransitionTable};
use crate::errors::BatchError;
use crate::model::{BatchStatus, ExitStatus, JobExecution, StepExecution};
use crate::step::StepHandler;

/// Flujo condicional: tras cada step, el exit code elige la siguiente
/// transición. Toda la validación del grafo ocurre al construirlo.
///
/// A diferencia de `SimpleFlow`, no acumula el status del último step en el
/// job: llegar a una transición de fin completa el job.
pub struct ConditionalFlow {
    table: TransitionTable,
    start_step: String,
}

impl ConditionalFlow {
    /// Infere el step inicial (el único que no es destino de ninguna
    /// transición).
    pub fn new(transitions: Vec<StepTransition>) -> Result<Self, BatchError> {
        let table = TransitionTable::new(transitions)?;
        let start_step = table.infer_start_step()?;
        Self::checked(table, start_step)
    }

    pub fn with_start_step(transitions: Vec<StepTransition>, start_step: impl Into<String>) -> Result<Self, BatchError> {
        let table = TransitionTable::new(transitions)?;
        let start_step = start_step.into();
        if !table.contains_step(&start_step) {
            return Err(BatchError::Configuration(format!("start step '{start_step}' is not defined by any transition")));
        }
        Self::checked(table, start_step)
    }

    fn checked(table: TransitionTable, start_step: String) -> Result<Self, BatchError> {
        if !table.reaches_end(&start_step) {
            return Err(BatchError::Configuration(format!("no end transition is reachable from start step '{start_step}'")));
        }
        Ok(Self { table, start_step })
    }

    pub fn start_step(&self) -> &str {
        &self.start_step
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }
}

impl JobFlow for ConditionalFlow {
    fn do_execute(&self, execution: &JobExecution, handler: &dyn StepHandler) -> Result<Option<StepExecution>, BatchError> {
        let mut last: Option<StepExecution> = None;
        let mut current = Some(self.start_step.as_str());
        while let Some(name) = current {
            let step = self.table
                           .step(name)
                           .ok_or_else(|| BatchError::Internal(format!("step '{name}' missing from transition table")))?;
            let se = handler.handle_step(step.as_ref(), execution)?;
            current = self.table.resolve(name, se.exit_status.exit_code())?;
            debug!("Step [{}] exited with [{}], next: {:?}", name, se.exit_status.exit_code(), current);
            last = Some(se);
        }
        if execution.status() <= BatchStatus::Started {
            execution.upgrade_status(BatchStatus::Completed);
            execution.merge_exit_status(&ExitStatus::completed());
        }
        Ok(last)
    }

    fn step_names(&self) -> Vec<String> {
        self.table.step_names()
    }
}
