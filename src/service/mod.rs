pub mod uploads;

pub use uploads::{StoredImage, UploadStore};
