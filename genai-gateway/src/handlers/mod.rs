//! HTTP handlers for the gateway endpoints.

pub mod generate;

pub use generate::{generate_image_from_url, generate_image_text, generate_text};
