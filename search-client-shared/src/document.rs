//! The open-ended document representation.

use serde_json::{Map, Value};

/// A document as stored in a collection: field name to JSON value.
///
/// The client enforces no schema. Callers with their own document structs can
/// pass them to any write operation as long as they serialize to a JSON object.
pub type Document = Map<String, Value>;
