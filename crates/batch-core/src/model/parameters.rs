//! Parámetros de job.
//!
//! Los parámetros identificadores determinan la identidad de un
//! `JobInstance`: dos lanzamientos con los mismos parámetros identificadores
//! pertenecen a la misma instancia (y por lo tanto son un restart). El resto
//! viaja con la ejecución sin afectar la identidad.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::hashing::hash_value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ParameterValue {
    String(String),
    Long(i64),
    Double(f64),
    Date(DateTime<Utc>),
}

impl ParameterValue {
    fn to_json(&self) -> Value {
        match self {
            ParameterValue::String(s) => json!({"type": "string", "value": s}),
            ParameterValue::Long(v) => json!({"type": "long", "value": v}),
            ParameterValue::Double(v) => json!({"type": "double", "value": v}),
            ParameterValue::Date(d) => json!({"type": "date", "value": d.to_rfc3339()}),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameter {
    pub value: ParameterValue,
    pub identifying: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobParameters {
    params: IndexMap<String, JobParameter>,
}

impl JobParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&JobParameter> {
        self.params.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.params.get(key).map(|p| &p.value) {
            Some(ParameterValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.params.get(key).map(|p| &p.value) {
            Some(ParameterValue::Long(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        match self.params.get(key).map(|p| &p.value) {
            Some(ParameterValue::Double(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_date(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.params.get(key).map(|p| &p.value) {
            Some(ParameterValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.params.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JobParameter)> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn identifying_parameters(&self) -> JobParameters {
        Self { params: self.params
                           .iter()
                           .filter(|(_, p)| p.identifying)
                           .map(|(k, p)| (k.clone(), p.clone()))
                           .collect() }
    }

    pub fn has_identifying(&self) -> bool {
        self.params.values().any(|p| p.identifying)
    }

    /// Clave estable (blake3 sobre JSON canónico) de los parámetros
    /// identificadores. Independiente del orden de inserción.
    pub fn to_identifying_key(&self) -> String {
        let map: Map<String, Value> = self.params
                                          .iter()
                                          .filter(|(_, p)| p.identifying)
                                          .map(|(k, p)| (k.clone(), p.value.to_json()))
                                          .collect();
        hash_value(&Value::Object(map))
    }
}

/// Builder fluido de `JobParameters`. Los `add_*` sin sufijo registran el
/// parámetro como identificador.
#[derive(Debug, Clone, Default)]
pub struct JobParametersBuilder {
    params: IndexMap<String, JobParameter>,
}

impl JobParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(params: &JobParameters) -> Self {
        Self { params: params.params.clone() }
    }

    pub fn add(mut self, key: impl Into<String>, value: ParameterValue, identifying: bool) -> Self {
        self.params.insert(key.into(), JobParameter { value, identifying });
        self
    }

    pub fn add_string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, ParameterValue::String(value.into()), true)
    }

    pub fn add_string_with(self, key: impl Into<String>, value: impl Into<String>, identifying: bool) -> Self {
        self.add(key, ParameterValue::String(value.into()), identifying)
    }

    pub fn add_long(self, key: impl Into<String>, value: i64) -> Self {
        self.add(key, ParameterValue::Long(value), true)
    }

    pub fn add_long_with(self, key: impl Into<String>, value: i64, identifying: bool) -> Self {
        self.add(key, ParameterValue::Long(value), identifying)
    }

    pub fn add_double(self, key: impl Into<String>, value: f64) -> Self {
        self.add(key, ParameterValue::Double(value), true)
    }

    pub fn add_double_with(self, key: impl Into<String>, value: f64, identifying: bool) -> Self {
        self.add(key, ParameterValue::Double(value), identifying)
    }

    pub fn add_date(self, key: impl Into<String>, value: DateTime<Utc>) -> Self {
        self.add(key, ParameterValue::Date(value), true)
    }

    pub fn add_date_with(self, key: impl Into<String>, value: DateTime<Utc>, identifying: bool) -> Self {
        self.add(key, ParameterValue::Date(value), identifying)
    }

    pub fn build(self) -> JobParameters {
        JobParameters { params: self.params }
    }
}
