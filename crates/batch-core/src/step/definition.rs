use crate::constants::DEFAULT_START_LIMIT;
use crate::errors::BatchError;
use crate::model::StepExecution;

/// Unidad de trabajo nombrada dentro de un job.
///
/// `execute` recibe el `StepExecution` ya persistido por el handler y es
/// responsable de dejarlo en un estado terminal (y persistirlo) antes de
/// retornar. Sólo debe devolver `Err` para interrupciones o fallos de
/// infraestructura; un fallo de negocio se expresa como status FAILED.
pub trait Step: Send + Sync {
    /// Nombre estable del step (clave de restart dentro de la instancia).
    fn name(&self) -> &str;

    /// Máximo de intentos permitidos para este step dentro de un `JobInstance`.
    fn start_limit(&self) -> usize {
        DEFAULT_START_LIMIT
    }

    /// Si es `true` el step se vuelve a ejecutar en un restart aunque su
    /// último intento haya sido COMPLETED.
    fn is_allow_start_if_complete(&self) -> bool {
        false
    }

    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;
}
