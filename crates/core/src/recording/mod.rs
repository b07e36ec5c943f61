pub mod coordinator;
pub mod domain;
pub mod infrastructure;
