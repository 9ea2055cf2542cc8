use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::BatchError;

/// Estado del ciclo de vida de una ejecución (job o step).
///
/// El orden de declaración ES el orden total usado por `upgrade_to`:
/// `Starting < Started < Stopping < Stopped < Failed < Completed < Abandoned
/// < Unknown`. Un status sólo se mueve hacia arriba salvo reseteos
/// explícitos (`set_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Starting,
    Started,
    Stopping,
    Stopped,
    Failed,
    Completed,
    Abandoned,
    /// Centinela: el estado durable es desconocido (p.ej. falló el rollback).
    Unknown,
}

impl BatchStatus {
    pub const ALL: [BatchStatus; 8] = [BatchStatus::Starting,
                                       BatchStatus::Started,
                                       BatchStatus::Stopping,
                                       BatchStatus::Stopped,
                                       BatchStatus::Failed,
                                       BatchStatus::Completed,
                                       BatchStatus::Abandoned,
                                       BatchStatus::Unknown];

    /// Devuelve el mayor de ambos status; nunca degrada.
    pub fn upgrade_to(self, other: BatchStatus) -> BatchStatus {
        self.max(other)
    }

    pub fn is_running(self) -> bool {
        matches!(self, BatchStatus::Starting | BatchStatus::Started | BatchStatus::Stopping)
    }

    pub fn is_unsuccessful(self) -> bool {
        matches!(self, BatchStatus::Failed | BatchStatus::Abandoned | BatchStatus::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Starting => "STARTING",
            BatchStatus::Started => "STARTED",
            BatchStatus::Stopping => "STOPPING",
            BatchStatus::Stopped => "STOPPED",
            BatchStatus::Failed => "FAILED",
            BatchStatus::Completed => "COMPLETED",
            BatchStatus::Abandoned => "ABANDONED",
            BatchStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BatchStatus::ALL.iter()
                        .copied()
                        .find(|st| st.as_str() == s)
                        .ok_or_else(|| BatchError::Internal(format!("unknown batch status '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrade_of_any_permutation_ends_at_maximum() {
        // Permutaciones deterministas: rotaciones y reversas del conjunto.
        let base = BatchStatus::ALL;
        for shift in 0..base.len() {
            let mut seq: Vec<BatchStatus> = base.iter().cycle().skip(shift).take(base.len()).copied().collect();
            for _ in 0..2 {
                let mut current = BatchStatus::Starting;
                let mut seen_max = BatchStatus::Starting;
                for s in &seq {
                    current = current.upgrade_to(*s);
                    seen_max = seen_max.max(*s);
                    assert!(current >= *s);
                    assert_eq!(current, seen_max);
                }
                assert_eq!(current, BatchStatus::Unknown);
                seq.reverse();
            }
        }
    }

    #[test]
    fn upgrade_never_downgrades() {
        assert_eq!(BatchStatus::Failed.upgrade_to(BatchStatus::Started), BatchStatus::Failed);
        assert_eq!(BatchStatus::Started.upgrade_to(BatchStatus::Stopping), BatchStatus::Stopping);
        assert_eq!(BatchStatus::Stopped.upgrade_to(BatchStatus::Completed), BatchStatus::Completed);
    }

    #[test]
    fn running_and_unsuccessful_sets() {
        assert!(BatchStatus::Starting.is_running());
        assert!(BatchStatus::Stopping.is_running());
        assert!(!BatchStatus::Stopped.is_running());
        assert!(BatchStatus::Abandoned.is_unsuccessful());
        assert!(!BatchStatus::Completed.is_unsuccessful());
    }

    #[test]
    fn parse_and_display_agree() {
        for s in BatchStatus::ALL {
            assert_eq!(s.to_string().parse::<BatchStatus>().unwrap(), s);
        }
        assert!("RUNNING".parse::<BatchStatus>().is_err());
        assert_eq!(serde_json::to_string(&BatchStatus::Stopping).unwrap(), "\"STOPPING\"");
    }
}
