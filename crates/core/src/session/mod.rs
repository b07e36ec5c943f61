pub mod error;
pub mod phase;
pub mod runner;
pub mod state_machine;
