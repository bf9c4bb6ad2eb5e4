//! Assembly of the user turn sent to the model.

use crate::models::{ContentEnvelope, InlineMediaPart, Part};

/// Build a `user` envelope holding the media part (if any) followed by the
/// prompt (if any).
///
/// An empty prompt counts as absent. Both inputs missing yields an envelope
/// with no parts; rejecting that is left to the model API.
pub fn build_envelope(media: Option<InlineMediaPart>, prompt: Option<String>) -> ContentEnvelope {
    let mut parts = Vec::with_capacity(2);

    if let Some(inline_data) = media {
        parts.push(Part::InlineData { inline_data });
    }

    if let Some(text) = prompt.filter(|p| !p.is_empty()) {
        parts.push(Part::Text { text });
    }

    ContentEnvelope::user(parts)
}
