pub mod media;
pub mod payload;
pub mod providers;
pub mod uploads;

pub use media::MediaError;
pub use uploads::{StagedUpload, UploadStore};
