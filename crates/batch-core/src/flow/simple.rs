use std::sync::Arc;

use log::debug;

use super::JobFlow;
use crate::errors::BatchError;
use crate::model::{BatchStatus, ExitStatus, JobExecution, StepExecution};
use crate::step::{Step, StepHandler};

/// Flujo secuencial. El status y exit status del job se "suben" al del
/// último step ejecutado (nunca se sobrescriben con algo más débil). Un step
/// que termina en STARTED deja al job en STARTED.
pub struct SimpleFlow {
    steps: Vec<Arc<dyn Step>>,
}

impl SimpleFlow {
    pub fn new(steps: Vec<Arc<dyn Step>>) -> Self {
        Self { steps }
    }

    pub fn add_step(&mut self, step: Arc<dyn Step>) {
        self.steps.push(step);
    }
}

impl JobFlow for SimpleFlow {
    fn do_execute(&self, execution: &JobExecution, handler: &dyn StepHandler) -> Result<Option<StepExecution>, BatchError> {
        let mut last: Option<StepExecution> = None;
        for step in &self.steps {
            let se = handler.handle_step(step.as_ref(), execution)?;
            let completed = se.status == BatchStatus::Completed;
            last = Some(se);
            if !completed {
                break;
            }
        }
        match &last {
            Some(se) => {
                debug!("Upgrading JobExecution status: {}", se.summary());
                execution.upgrade_status(se.status);
                execution.merge_exit_status(&se.exit_status);
            }
            // Sin steps: nada pendiente, el template lo marca NOOP.
            None => {
                execution.upgrade_status(BatchStatus::Completed);
                execution.merge_exit_status(&ExitStatus::completed());
            }
        }
        Ok(last)
    }

    fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name().to_string()).collect()
    }
}
