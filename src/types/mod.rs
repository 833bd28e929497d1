//! Request and response records for the HTTP surface.

pub mod payloads;
pub mod responses;

pub use payloads::{MessageFields, ProjectFields, SkillFields};
pub use responses::{CreatedResponse, DeleteSkillResponse, ErrorResponse, MessageResponse};
