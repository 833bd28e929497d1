pub mod messages;
pub mod projects;
pub mod skills;
