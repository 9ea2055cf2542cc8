//! Listeners de ciclo de vida del job.
//!
//! Registro explícito en construcción (sin descubrimiento dinámico). El
//! compuesto invoca `before_job` en orden de registro y `after_job` en orden
//! inverso.

use std::sync::Arc;

use log::warn;

use crate::errors::BatchError;
use crate::model::JobExecution;

pub trait JobExecutionListener: Send + Sync {
    fn before_job(&self, _execution: &JobExecution) -> Result<(), BatchError> {
        Ok(())
    }

    /// Los errores se registran en el log y nunca alteran el resultado del
    /// job.
    fn after_job(&self, _execution: &JobExecution) -> Result<(), BatchError> {
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct CompositeJobExecutionListener {
    listeners: Vec<Arc<dyn JobExecutionListener>>,
}

impl CompositeJobExecutionListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Arc<dyn JobExecutionListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl JobExecutionListener for CompositeJobExecutionListener {
    fn before_job(&self, execution: &JobExecution) -> Result<(), BatchError> {
        for listener in &self.listeners {
            listener.before_job(execution)?;
        }
        Ok(())
    }

    /// Llama a todos aunque alguno falle; devuelve el primer error.
    fn after_job(&self, execution: &JobExecution) -> Result<(), BatchError> {
        let mut first: Option<BatchError> = None;
        for listener in self.listeners.iter().rev() {
            if let Err(err) = listener.after_job(execution) {
                warn!("afterJob listener failed: {err}");
                first.get_or_insert(err);
            }
        }
        first.map_or(Ok(()), Err)
    }
}
