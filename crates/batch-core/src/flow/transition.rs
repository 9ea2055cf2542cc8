//! Transiciones condicionales y su resolución.
//!
//! Una `StepTransition` liga (step de origen, patrón sobre el exit code,
//! step siguiente o fin de job). La `TransitionTable` agrupa las
//! transiciones por step, ordenadas por especificidad (menos `*`, luego
//! menos `?`, luego lexicográfico por patrón), y valida el grafo al
//! construirse para que los errores de configuración nunca aparezcan a
//! mitad de una ejecución.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use super::pattern::{self, wildcard_counts};
use crate::errors::BatchError;
use crate::step::Step;

#[derive(Clone)]
pub struct StepTransition {
    step: Arc<dyn Step>,
    pattern: String,
    next: Option<String>,
}

impl StepTransition {
    /// Transición hacia `next`. Un patrón vacío equivale a `*`.
    pub fn new(step: Arc<dyn Step>, pattern: impl Into<String>, next: impl Into<String>) -> Self {
        Self::build(step, pattern.into(), Some(next.into()))
    }

    /// Transición terminal (fin de job).
    pub fn end(step: Arc<dyn Step>, pattern: impl Into<String>) -> Self {
        Self::build(step, pattern.into(), None)
    }

    fn build(step: Arc<dyn Step>, pattern: String, next: Option<String>) -> Self {
        let pattern = if pattern.is_empty() { "*".to_string() } else { pattern };
        Self { step, pattern, next }
    }

    pub fn step(&self) -> &Arc<dyn Step> {
        &self.step
    }

    pub fn step_name(&self) -> &str {
        self.step.name()
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn is_end(&self) -> bool {
        self.next.is_none()
    }

    pub fn matches(&self, exit_code: &str) -> bool {
        pattern::matches(&self.pattern, exit_code)
    }

    fn sort_key(&self) -> (usize, usize, &str, &str, Option<&str>) {
        let (stars, questions) = wildcard_counts(&self.pattern);
        (stars, questions, self.pattern.as_str(), self.step_name(), self.next())
    }
}

impl PartialEq for StepTransition {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for StepTransition {}

impl PartialOrd for StepTransition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StepTransition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for StepTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "StepTransition: step={}, pattern={}, next={}",
               self.step_name(),
               self.pattern,
               self.next.as_deref().unwrap_or("<end>"))
    }
}

impl fmt::Debug for StepTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Transiciones indexadas por nombre de step, ya ordenadas por especificidad.
pub struct TransitionTable {
    transitions: BTreeMap<String, Vec<StepTransition>>,
    steps: BTreeMap<String, Arc<dyn Step>>,
}

impl TransitionTable {
    /// Indexa y valida la forma del grafo (no la elección del step inicial).
    pub fn new(transitions: Vec<StepTransition>) -> Result<Self, BatchError> {
        if transitions.is_empty() {
            return Err(BatchError::Configuration("at least one step transition is required".into()));
        }
        let mut by_step: BTreeMap<String, Vec<StepTransition>> = BTreeMap::new();
        let mut steps: BTreeMap<String, Arc<dyn Step>> = BTreeMap::new();
        for t in transitions {
            let name = t.step_name().to_string();
            let list = by_step.entry(name.clone()).or_default();
            if list.iter().any(|existing| existing.pattern == t.pattern) {
                return Err(BatchError::Configuration(format!("duplicate transition pattern '{}' for step '{}'",
                                                             t.pattern, name)));
            }
            steps.entry(name).or_insert_with(|| Arc::clone(&t.step));
            list.push(t);
        }
        for list in by_step.values_mut() {
            list.sort();
        }
        let table = Self { transitions: by_step,
                           steps };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), BatchError> {
        if !self.all().any(StepTransition::is_end) {
            return Err(BatchError::Configuration("no end transition: at least one transition must end the job".into()));
        }
        for t in self.all() {
            if let Some(next) = t.next() {
                if !self.steps.contains_key(next) {
                    return Err(BatchError::Configuration(format!("next step '{}' of {} is not defined by any transition",
                                                                 next, t)));
                }
            }
        }
        Ok(())
    }

    fn all(&self) -> impl Iterator<Item = &StepTransition> {
        self.transitions.values().flatten()
    }

    /// Step inicial: el único que nunca es destino de otra transición.
    pub fn infer_start_step(&self) -> Result<String, BatchError> {
        // Un self-loop también cuenta como destino.
        let targets: BTreeSet<&str> = self.all().filter_map(StepTransition::next).collect();
        let candidates: Vec<&str> = self.steps
                                        .keys()
                                        .map(String::as_str)
                                        .filter(|name| !targets.contains(name))
                                        .collect();
        match candidates.as_slice() {
            [single] => Ok(single.to_string()),
            [] => Err(BatchError::Configuration("no start step: every step is the target of some transition".into())),
            many => Err(BatchError::Configuration(format!("ambiguous start step, candidates: {}", many.join(", ")))),
        }
    }

    /// ¿Existe un camino desde `start` hasta una transición terminal?
    pub fn reaches_end(&self, start: &str) -> bool {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([start]);
        while let Some(name) = queue.pop_front() {
            if !seen.insert(name) {
                continue;
            }
            for t in self.transitions.get(name).into_iter().flatten() {
                match t.next() {
                    None => return true,
                    Some(next) => queue.push_back(next),
                }
            }
        }
        false
    }

    /// Siguiente step para `exit_code`; `Ok(None)` es fin de job.
    pub fn resolve(&self, step_name: &str, exit_code: &str) -> Result<Option<&str>, BatchError> {
        self.transitions
            .get(step_name)
            .into_iter()
            .flatten()
            .find(|t| t.matches(exit_code))
            .map(StepTransition::next)
            .ok_or_else(|| BatchError::NextStepNotFound { step: step_name.to_string(),
                                                          exit_code: exit_code.to_string() })
    }

    pub fn step(&self, name: &str) -> Option<&Arc<dyn Step>> {
        self.steps.get(name)
    }

    pub fn contains_step(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub fn step_names(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    /// Transiciones de un step en orden de resolución.
    pub fn transitions_for(&self, step_name: &str) -> &[StepTransition] {
        self.transitions.get(step_name).map(Vec::as_slice).unwrap_or_default()
    }
}
