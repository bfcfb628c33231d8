use log::{error, trace};
use std::sync::Arc;

use crate::audio::frame::FramePool;
use crate::element::{BusMessage, Shared};
use crate::error::Result;

/// Flags carried by a media buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferFlags {
    /// Silence placeholder without real payload.
    pub gap: bool,
}

impl BufferFlags {
    pub const NONE: Self = Self { gap: false };
    pub const GAP: Self = Self { gap: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Processing disabled; buffer untouched.
    Passthrough,
    /// Gap buffer; untouched.
    Gap,
    Processed { frames: usize },
}

/// Per-buffer entry point, owned by the streaming thread.
pub struct StreamProcessor {
    shared: Arc<Shared>,
    pool: FramePool,
}

impl StreamProcessor {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            pool: FramePool::new(),
        }
    }

    /// Process a mapped buffer of native-endian interleaved stereo f32 in place.
    pub fn transform_in_place(&mut self, data: &mut [u8], flags: BufferFlags) -> Result<Transform> {
        if let Some(skip) = self.bypass(flags) {
            return Ok(skip);
        }

        self.pool.input.fill_from_bytes(data)?;
        let frames = self.run_engine()?;
        self.pool.output.write_to_bytes(data);

        trace!("Processed {frames} frames");
        Ok(Transform::Processed { frames })
    }

    /// Same as [`transform_in_place`](Self::transform_in_place) for an already typed buffer.
    pub fn transform_samples(
        &mut self,
        samples: &mut [f32],
        flags: BufferFlags,
    ) -> Result<Transform> {
        if let Some(skip) = self.bypass(flags) {
            return Ok(skip);
        }

        self.pool.input.fill_from_samples(samples)?;
        let frames = self.run_engine()?;
        for (dst, src) in samples.iter_mut().zip(self.pool.output.samples()) {
            *dst = *src;
        }

        Ok(Transform::Processed { frames })
    }

    /// Frames the pool can hold without reallocating.
    pub fn pooled_frames(&self) -> usize {
        self.pool
            .input
            .capacity_frames()
            .min(self.pool.output.capacity_frames())
    }

    fn bypass(&self, flags: BufferFlags) -> Option<Transform> {
        if !self.shared.is_enabled() {
            return Some(Transform::Passthrough);
        }
        if flags.gap {
            return Some(Transform::Gap);
        }
        None
    }

    fn run_engine(&mut self) -> Result<usize> {
        self.pool.prepare_output();

        let result = {
            let mut inner = self.shared.lock();
            inner.session.process(&self.pool.input, &mut self.pool.output)
        };

        if let Err(e) = result {
            error!("Buffer processing failed: {e}");
            self.shared.post(BusMessage::Error {
                message: e.to_string(),
            });
            return Err(e);
        }

        Ok(self.pool.output.frame_count())
    }
}
