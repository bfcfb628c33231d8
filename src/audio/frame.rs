use crate::error::{FxError, Result};

pub const CHANNELS: usize = 2;
pub const BYTES_PER_SAMPLE: usize = std::mem::size_of::<f32>();
pub const BYTES_PER_FRAME: usize = BYTES_PER_SAMPLE * CHANNELS;

/// Number of stereo f32 frames in a mapped buffer of `byte_len` bytes.
pub fn frame_count(byte_len: usize) -> Result<usize> {
    if byte_len % BYTES_PER_FRAME != 0 {
        return Err(FxError::MalformedBuffer { len: byte_len });
    }
    Ok(byte_len / BYTES_PER_FRAME)
}

/// Interleaved stereo f32 block handed to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioFrame {
    frame_count: usize,
    samples: Vec<f32>,
}

impl AudioFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(frames: usize) -> Self {
        Self {
            frame_count: frames,
            samples: vec![0.0; frames * CHANNELS],
        }
    }

    /// Build from interleaved samples; the length must be even.
    pub fn from_interleaved(samples: Vec<f32>) -> Result<Self> {
        if samples.len() % CHANNELS != 0 {
            return Err(FxError::MalformedBuffer {
                len: samples.len() * BYTES_PER_SAMPLE,
            });
        }
        Ok(Self {
            frame_count: samples.len() / CHANNELS,
            samples,
        })
    }

    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Resize to `frames`, reusing the existing allocation when it is large enough.
    pub fn resize(&mut self, frames: usize) {
        self.frame_count = frames;
        self.samples.resize(frames * CHANNELS, 0.0);
    }

    pub fn capacity_frames(&self) -> usize {
        self.samples.capacity() / CHANNELS
    }

    /// Copy native-endian f32 samples out of a mapped byte buffer.
    pub fn fill_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let frames = frame_count(bytes.len())?;
        self.resize(frames);
        for (dst, src) in self
            .samples
            .iter_mut()
            .zip(bytes.chunks_exact(BYTES_PER_SAMPLE))
        {
            *dst = f32::from_ne_bytes([src[0], src[1], src[2], src[3]]);
        }
        Ok(())
    }

    pub fn fill_from_samples(&mut self, samples: &[f32]) -> Result<()> {
        if samples.len() % CHANNELS != 0 {
            return Err(FxError::MalformedBuffer {
                len: samples.len() * BYTES_PER_SAMPLE,
            });
        }
        self.resize(samples.len() / CHANNELS);
        self.samples.copy_from_slice(samples);
        Ok(())
    }

    /// Overwrite `bytes` with every sample of this frame, zeros included.
    pub fn write_to_bytes(&self, bytes: &mut [u8]) {
        for (dst, src) in bytes
            .chunks_exact_mut(BYTES_PER_SAMPLE)
            .zip(self.samples.iter())
        {
            dst.copy_from_slice(&src.to_ne_bytes());
        }
    }
}

/// Input/output frames reused across buffers so the streaming path stops
/// allocating once it has seen its largest buffer.
#[derive(Debug, Default)]
pub struct FramePool {
    pub input: AudioFrame,
    pub output: AudioFrame,
}

impl FramePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(frames: usize) -> Self {
        Self {
            input: AudioFrame::with_frames(frames),
            output: AudioFrame::with_frames(frames),
        }
    }

    /// Size the output to match the already filled input.
    pub fn prepare_output(&mut self) {
        self.output.resize(self.input.frame_count());
    }
}
