use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::BatchError;

pub const UNKNOWN: &str = "UNKNOWN";
pub const EXECUTING: &str = "EXECUTING";
pub const COMPLETED: &str = "COMPLETED";
pub const NOOP: &str = "NOOP";
pub const FAILED: &str = "FAILED";
pub const STOPPED: &str = "STOPPED";

/// Ranking de severidad de códigos de salida. `and` conserva el código del
/// status más severo.
pub trait ExitCodeSeverity {
    fn severity(&self, status: &ExitStatus) -> u8;
}

/// Ranking por defecto: EXECUTING(1) < COMPLETED(2) < NOOP(3) < STOPPED(4) <
/// FAILED(5) < UNKNOWN(6) < códigos propios(7). Se compara por prefijo, así
/// `COMPLETED_WITH_SKIPS` pesa como `COMPLETED`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSeverity;

impl ExitCodeSeverity for DefaultSeverity {
    fn severity(&self, status: &ExitStatus) -> u8 {
        let code = status.exit_code();
        [EXECUTING, COMPLETED, NOOP, STOPPED, FAILED, UNKNOWN].iter()
                                                               .position(|known| code.starts_with(known))
                                                               .map(|idx| idx as u8 + 1)
                                                               .unwrap_or(7)
    }
}

/// Código de salida + descripción legible. Es la única señal usada para el
/// branching condicional.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitStatus {
    exit_code: String,
    exit_description: String,
}

impl ExitStatus {
    pub fn new(exit_code: impl Into<String>) -> Self {
        Self::with_description(exit_code, "")
    }

    pub fn with_description(exit_code: impl Into<String>, exit_description: impl Into<String>) -> Self {
        Self { exit_code: exit_code.into(),
               exit_description: exit_description.into() }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN)
    }

    pub fn executing() -> Self {
        Self::new(EXECUTING)
    }

    pub fn completed() -> Self {
        Self::new(COMPLETED)
    }

    pub fn noop() -> Self {
        Self::new(NOOP)
    }

    pub fn failed() -> Self {
        Self::new(FAILED)
    }

    pub fn stopped() -> Self {
        Self::new(STOPPED)
    }

    pub fn exit_code(&self) -> &str {
        &self.exit_code
    }

    pub fn exit_description(&self) -> &str {
        &self.exit_description
    }

    pub fn severity(&self) -> u8 {
        DefaultSeverity.severity(self)
    }

    /// Combina dos status: se queda con el código más severo y concatena
    /// descripciones.
    pub fn and(&self, other: &ExitStatus) -> ExitStatus {
        self.and_ranked(other, &DefaultSeverity)
    }

    pub fn and_ranked(&self, other: &ExitStatus, ranking: &dyn ExitCodeSeverity) -> ExitStatus {
        let result = self.add_exit_description(&other.exit_description);
        if compare_ranked(self, other, ranking) == Ordering::Less {
            return result.replace_exit_code(&other.exit_code);
        }
        result
    }

    /// Orden por severidad y, a igual severidad, por código.
    pub fn compare_severity(&self, other: &ExitStatus) -> Ordering {
        compare_ranked(self, other, &DefaultSeverity)
    }

    pub fn replace_exit_code(&self, code: &str) -> ExitStatus {
        Self::with_description(code, self.exit_description.clone())
    }

    /// Agrega una descripción separada por `"; "`. Descripciones vacías o
    /// repetidas no cambian nada.
    pub fn add_exit_description(&self, description: &str) -> ExitStatus {
        if description.is_empty() || description == self.exit_description {
            return self.clone();
        }
        let joined = if self.exit_description.is_empty() {
            description.to_string()
        } else {
            format!("{}; {}", self.exit_description, description)
        };
        Self::with_description(self.exit_code.clone(), joined)
    }

    pub fn add_exit_description_from_error(&self, err: &BatchError) -> ExitStatus {
        self.add_exit_description(&err.to_string())
    }

    pub fn is_running(&self) -> bool {
        self.exit_code == EXECUTING || self.exit_code == UNKNOWN
    }
}

fn compare_ranked(a: &ExitStatus, b: &ExitStatus, ranking: &dyn ExitCodeSeverity) -> Ordering {
    ranking.severity(a)
           .cmp(&ranking.severity(b))
           .then_with(|| a.exit_code.cmp(&b.exit_code))
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exitCode={};exitDescription={}", self.exit_code, self.exit_description)
    }
}
