use std::collections::BTreeSet;

use crate::errors::BatchError;
use crate::model::JobParameters;

/// Validación de parámetros, invocada una única vez al inicio de
/// `Job::execute` (antes de pasar a STARTED) y por el launcher.
pub trait JobParametersValidator: Send + Sync {
    fn validate(&self, params: &JobParameters) -> Result<(), BatchError>;
}

/// Claves requeridas y opcionales. Si no hay claves opcionales declaradas
/// se acepta cualquier clave adicional.
#[derive(Debug, Clone, Default)]
pub struct DefaultJobParametersValidator {
    required_keys: BTreeSet<String>,
    optional_keys: BTreeSet<String>,
}

impl DefaultJobParametersValidator {
    pub fn new<R, O>(required: R, optional: O) -> Result<Self, BatchError>
        where R: IntoIterator,
              R::Item: Into<String>,
              O: IntoIterator,
              O::Item: Into<String>
    {
        let required_keys: BTreeSet<String> = required.into_iter().map(Into::into).collect();
        let optional_keys: BTreeSet<String> = optional.into_iter().map(Into::into).collect();
        let overlap: Vec<&str> = required_keys.intersection(&optional_keys).map(String::as_str).collect();
        if !overlap.is_empty() {
            return Err(BatchError::Configuration(format!("optional keys cannot be required: {}", overlap.join(", "))));
        }
        Ok(Self { required_keys,
                  optional_keys })
    }
}

impl JobParametersValidator for DefaultJobParametersValidator {
    fn validate(&self, params: &JobParameters) -> Result<(), BatchError> {
        let missing: Vec<&str> = self.required_keys
                                     .iter()
                                     .filter(|k| !params.contains_key(k))
                                     .map(String::as_str)
                                     .collect();
        if !missing.is_empty() {
            return Err(BatchError::InvalidParameters(format!("missing required keys: [{}]", missing.join(", "))));
        }
        if !self.optional_keys.is_empty() {
            let unexpected: Vec<&str> = params.keys()
                                              .filter(|k| !self.required_keys.contains(*k) && !self.optional_keys.contains(*k))
                                              .map(String::as_str)
                                              .collect();
            if !unexpected.is_empty() {
                return Err(BatchError::InvalidParameters(format!("keys are neither required nor optional: [{}]",
                                                                 unexpected.join(", "))));
            }
        }
        Ok(())
    }
}
