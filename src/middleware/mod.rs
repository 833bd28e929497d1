pub mod json_form;
pub mod upload;

pub use json_form::JsonForm;
pub use upload::{IMAGE_FIELD, UploadForm};
