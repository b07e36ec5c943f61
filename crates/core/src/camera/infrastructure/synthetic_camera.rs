use crate::camera::domain::camera_source::{
    AcquisitionError, CameraConstraints, CameraSource, FrameSource,
};
use crate::shared::frame::Frame;

/// Camera that produces solid-color frames at the requested geometry.
///
/// Stands in for real hardware in the CLI simulation and in tests;
/// detection runs off a script there, so frame content is irrelevant.
pub struct SyntheticCamera {
    fill: [u8; 3],
}

impl SyntheticCamera {
    pub fn new(fill: [u8; 3]) -> Self {
        Self { fill }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new([32, 32, 32])
    }
}

impl CameraSource for SyntheticCamera {
    fn acquire(
        &mut self,
        constraints: &CameraConstraints,
    ) -> Result<Box<dyn FrameSource>, AcquisitionError> {
        Ok(Box::new(SyntheticFrameSource {
            width: constraints.ideal_width,
            height: constraints.ideal_height,
            fill: self.fill,
            released: false,
        }))
    }
}

struct SyntheticFrameSource {
    width: u32,
    height: u32,
    fill: [u8; 3],
    released: bool,
}

impl FrameSource for SyntheticFrameSource {
    fn current_frame(&mut self) -> Result<Frame, AcquisitionError> {
        if self.released {
            return Err(AcquisitionError::Unavailable(
                "frame source already released".into(),
            ));
        }
        Ok(Frame::solid(self.width, self.height, self.fill))
    }

    fn release(&mut self) {
        self.released = true;
    }
}
