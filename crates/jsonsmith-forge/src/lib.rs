//! The "inception" engine: a small compiler from record schemas to
//! specialized JSON marshaling routines.
//!
//! Input is a batch of [`RecordSchema`]s describing record shapes — field
//! order, pre-escaped JSON keys, semantic kinds, per-field flags. Output is
//! Rust source text: for each record, a `marshal_json` convenience wrapper
//! that pre-grows a buffer by a power-of-two hint, and a `marshal_json_buf`
//! routine of straight-line writes against the `jsonsmith` runtime, with no
//! runtime type inspection left.
//!
//! Literal output (braces, pre-escaped keys, commas, folded booleans) is
//! batched through a [`DeferredQueue`] so adjacent constants collapse into
//! a single emitted write call. Schemas in one [`Forge`] round recognize
//! each other: fields of an in-round record type compile to a direct
//! fast-path call instead of a fallback encode.
//!
//! Discovering schemas from host sources, rendering templates, and writing
//! the artifact to disk are the caller's business; [`Forge::finish`] hands
//! back the assembled source text and nothing else.

mod encoder;
mod forge;
mod queue;
mod schema;

pub use forge::{Forge, ForgeOptions};
pub use queue::DeferredQueue;
pub use schema::{FieldSchema, Kind, RecordSchema, SchemaError};
