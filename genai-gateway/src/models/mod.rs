//! Request-scoped content types sent to the generative model.

pub mod content;

pub use content::{ContentEnvelope, InlineMediaPart, Part, INLINE_IMAGE_MIME_TYPE, USER_ROLE};
