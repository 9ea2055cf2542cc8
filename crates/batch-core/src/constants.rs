//! Constantes del motor core.
//!
//! Claves reservadas del `ExecutionContext` y descripciones de salida que el
//! motor escribe en los `ExitStatus`. Cambiar estas claves rompe la
//! compatibilidad con ejecuciones ya persistidas (un restart no reconocería el
//! marcador de finalización de una versión anterior).

/// Marcador que el `StepHandler` escribe en el contexto de un step cuando
/// `Step::execute` retorna normalmente. En un restart se elimina para que la
/// lógica del step sepa que debe reanudar.
pub const STEP_COMPLETE_KEY: &str = "batch.step.complete";

/// Clave por defecto del `RunIdIncrementer`.
pub const RUN_ID_KEY: &str = "run.id";

/// Límite de arranques por defecto de un step (sin límite efectivo).
pub const DEFAULT_START_LIMIT: usize = usize::MAX;

/// Nota agregada al exit status cuando un job termina sin ejecutar steps.
pub const NOOP_DESCRIPTION: &str = "No steps executed: all steps already completed or no steps configured for this job.";

/// Nota agregada cuando un job ya estaba en STOPPING antes de arrancar.
pub const STOPPED_BEFORE_START_DESCRIPTION: &str = "Job execution was stopped before it started.";
