//! `ExecutionContext`: bolsa clave/valor ordenada y persistible.
//!
//! Se adjunta a un job o a un step y transporta el estado reanudable (offset
//! leído, cursores, marcadores) entre restarts. El orden de inserción se
//! conserva para que la serialización sea estable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    entries: IndexMap<String, Value>,
    #[serde(skip)]
    dirty: bool,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construye un contexto a partir de pares ya existentes (no queda sucio).
    pub fn from_entries<I, K>(entries: I) -> Self
        where I: IntoIterator<Item = (K, Value)>,
              K: Into<String>
    {
        Self { entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
               dirty: false }
    }

    /// Inserta o reemplaza un valor. Sólo marca el contexto como sucio si el
    /// valor cambia.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        let key = key.into();
        if self.entries.get(&key) != Some(&value) {
            self.entries.insert(key, value);
            self.dirty = true;
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.entries.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.entries.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.entries.get(key).and_then(Value::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.shift_remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Representación JSON (objeto) usada por los repositorios.
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_entries(map.iter().map(|(k, v)| (k.clone(), v.clone()))),
            _ => Self::new(),
        }
    }
}

impl PartialEq for ExecutionContext {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_accessors() {
        let mut ctx = ExecutionContext::new();
        ctx.put("offset", 42);
        ctx.put("file", "input.csv");
        ctx.put("ratio", 0.5);
        ctx.put("done", false);
        assert_eq!(ctx.get_i64("offset"), Some(42));
        assert_eq!(ctx.get_string("file"), Some("input.csv"));
        assert_eq!(ctx.get_f64("ratio"), Some(0.5));
        assert_eq!(ctx.get_bool("done"), Some(false));
        assert_eq!(ctx.get_string("offset"), None);
        assert_eq!(ctx.len(), 4);
    }

    #[test]
    fn dirty_only_on_change() {
        let mut ctx = ExecutionContext::from_entries([("a", json!(1))]);
        assert!(!ctx.is_dirty());
        ctx.put("a", 1);
        assert!(!ctx.is_dirty());
        ctx.put("a", 2);
        assert!(ctx.is_dirty());
        ctx.clear_dirty();
        assert_eq!(ctx.remove("missing"), None);
        assert!(!ctx.is_dirty());
        assert_eq!(ctx.remove("a"), Some(json!(2)));
        assert!(ctx.is_dirty());
    }

    #[test]
    fn insertion_order_is_preserved_in_json() {
        let mut ctx = ExecutionContext::new();
        ctx.put("z", 1);
        ctx.put("a", 2);
        let text = serde_json::to_string(&ctx).unwrap();
        assert_eq!(text, r#"{"z":1,"a":2}"#);
        let back: ExecutionContext = serde_json::from_str(&text).unwrap();
        assert_eq!(back, ctx);
        assert_eq!(ExecutionContext::from_json(&ctx.to_json()), ctx);
    }
}
