pub mod recorder_backend;
