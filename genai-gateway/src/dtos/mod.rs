pub mod generate;

pub use generate::{GenerateFromUrlRequest, GenerateTextRequest, GenerationResponse};
