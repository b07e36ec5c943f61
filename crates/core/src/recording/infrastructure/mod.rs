pub mod memory_recorder;
