pub mod feedback;
pub mod frame_validator;
