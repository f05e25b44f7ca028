//! Record and repository seams.
//!
//! The data-access layer is provided by the host application; the binding
//! only looks records up by primary key and reads named attributes.

use serde::Serialize;
use serde_json::Value;
use websess_core::{Result, UserId};

/// A user record with a primary key and named attributes.
pub trait Record: Send + Sync {
    /// Primary key, used as the session's user ID.
    fn primary_key(&self) -> UserId;

    /// Read a named attribute; unknown attributes are `None`.
    fn attribute(&self, name: &str) -> Option<Value>;
}

/// Lookup of user records by ID.
pub trait RecordRepository: Send + Sync + 'static {
    /// Record type returned by lookups.
    type Record: Record + 'static;

    /// Extra filter applied to every lookup (a SQL condition, a scope
    /// list, ...). Forwarded verbatim from configuration.
    type Criteria: Send + Sync + 'static;

    /// Find the record with the given ID that also matches `criteria`.
    ///
    /// A missing record is `Ok(None)`, not an error.
    fn find_by_id(&self, id: &UserId, criteria: &Self::Criteria) -> Result<Option<Self::Record>>;
}

/// Read a named field of a serializable record.
///
/// Convenience for implementing [`Record::attribute`] on plain structs.
pub fn serialized_attribute<T: Serialize>(record: &T, name: &str) -> Option<Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(mut fields)) => fields.remove(name),
        _ => None,
    }
}
