// src/models/mod.rs

pub mod enums;
pub mod equipment;
pub mod laboratory;
pub mod loan;
pub mod reservation;
pub mod user;

pub use enums::*;
pub use equipment::*;
pub use laboratory::*;
pub use loan::*;
pub use reservation::*;
pub use user::*;

use serde_json::Value;

// ==================== FIELD ACCESS ====================

/// Read access to a record's fields by their wire name.
///
/// Aggregation and document rendering address fields this way, so one
/// grouping routine serves every collection. `None` means the field is
/// absent or null.
pub trait Record {
    fn field(&self, name: &str) -> Option<String>;
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<String> {
        (**self).field(name)
    }
}

pub(crate) fn opt_string(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
