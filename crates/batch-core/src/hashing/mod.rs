//! Módulo de hashing y canonicalización JSON.
//!
//! Se usa para derivar la clave estable (`job_key`) de un `JobInstance` a
//! partir de sus parámetros identificadores.

pub mod canonical_json;
pub mod hash;

pub use canonical_json::to_canonical_json;
pub use hash::{hash_str, hash_value};
