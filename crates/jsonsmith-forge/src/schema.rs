//! Record schema model the generator consumes.
//!
//! Schemas are built by the host-source parser (an external collaborator)
//! and arrive here complete: field order is emission order and every field
//! already carries its pre-escaped JSON key.

use thiserror::Error;

/// Semantic kind of a field. Closed set — the emitter matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    /// Pointer-sized unsigned integer.
    Usize,
    Float32,
    Float64,
    Bool,
    String,
    /// Raw byte sequence; encodes as an array of numbers.
    Bytes,
    /// Array or slice of the element kind.
    Seq(Box<Kind>),
    /// Mapping from string keys to the element kind. Routed through the
    /// fallback encoder.
    Map(Box<Kind>),
    /// Nested record by value, named so round membership can be checked.
    Record(String),
    /// Nullable indirection to the pointee kind.
    Ptr(Box<Kind>),
    /// Anything the generator cannot specialize; falls back to the
    /// general-purpose encoder.
    Any,
    /// The type declares its own `marshal_json` entry point.
    Marshaler,
    /// The type declares the buffer-taking `marshal_json_buf` entry point.
    FastMarshaler,
}

/// One field of a record schema.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    /// Field name in the host source; emitted code reads `self.<name>`.
    pub name: String,
    /// JSON key already quoted, escaped, and suffixed with `:`; the emitter
    /// inlines it verbatim.
    pub json_key: String,
    pub kind: Kind,
    /// Omit the member entirely when the value is the kind's zero.
    ///
    /// Nested records and delegate-encoded kinds have no zero test; their
    /// guard degenerates to always-true and the member is always written.
    pub omit_empty: bool,
    /// Encode a primitive inside a JSON string. A force-string string is
    /// escaped twice.
    pub force_string: bool,
    /// The field is `Option<T>`; `None` encodes as `null`.
    pub pointer: bool,
}

impl FieldSchema {
    /// A plain field whose JSON key is the field name.
    pub fn new(name: &str, kind: Kind) -> Self {
        Self {
            name: name.to_owned(),
            json_key: pre_escape_key(name),
            kind,
            omit_empty: false,
            force_string: false,
            pointer: false,
        }
    }
}

/// Builds the pre-escaped key form `"name":` for a JSON member name.
pub fn pre_escape_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len() + 3);
    key.push('"');
    for c in name.chars() {
        match c {
            '"' => key.push_str("\\\""),
            '\\' => key.push_str("\\\\"),
            '\n' => key.push_str("\\n"),
            '\r' => key.push_str("\\r"),
            '\t' => key.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                key.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => key.push(c),
        }
    }
    key.push_str("\":");
    key
}

/// A named record shape: emission order is field order.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    /// Rust type name the emitted impl blocks target.
    pub name: String,
    pub fields: Vec<FieldSchema>,
    /// Shallow size of the record value in bytes; feeds the grow hint.
    pub base_size: u32,
}

impl RecordSchema {
    pub fn new(name: &str, fields: Vec<FieldSchema>, base_size: u32) -> Self {
        Self {
            name: name.to_owned(),
            fields,
            base_size,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), SchemaError> {
        for (i, f) in self.fields.iter().enumerate() {
            if !f.json_key.starts_with('"') || !f.json_key.ends_with("\":") {
                return Err(SchemaError::MalformedKey {
                    record: self.name.clone(),
                    field: f.name.clone(),
                    key: f.json_key.clone(),
                });
            }
            if self.fields[..i].iter().any(|g| g.json_key == f.json_key) {
                return Err(SchemaError::DuplicateKey {
                    record: self.name.clone(),
                    key: f.json_key.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Schema validation failures reported before any emission.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("record {record}: duplicate JSON key {key}")]
    DuplicateKey {
        record: String,
        key: String,
    },
    #[error("record {record}: field {field} carries malformed pre-escaped key {key:?}")]
    MalformedKey {
        record: String,
        field: String,
        key: String,
    },
}
