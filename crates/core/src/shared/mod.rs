pub mod clock;
pub mod config;
pub mod detection;
pub mod frame;
pub mod mode;
pub mod stage;
