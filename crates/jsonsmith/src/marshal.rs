//! Entry-point traits implemented by generated marshal routines.

use crate::{buffer::EncodingBuffer, error::Error};

/// Convenience entry point: marshal into a freshly grown buffer and hand
/// back the bytes.
///
/// Generated implementations pre-grow by the schema's grow hint and
/// delegate to [`MarshalFast`].
pub trait Marshal {
    fn marshal_json(&self) -> Result<Vec<u8>, Error>;
}

/// Buffer-taking entry point.
///
/// Every record in a generation round gets one, and a hand-written type can
/// implement it directly to join the fast path: in-round fields of that
/// type are emitted as a direct call rather than a fallback encode.
pub trait MarshalFast {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), Error>;
}
