// Enable pedantic lints globally, then allow the noisy ones we're not fixing.
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]
// Sample and opcode conversions are range-checked by the parameter table
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_wrap
)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
#![allow(
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::new_without_default
)]
#![allow(clippy::redundant_pub_crate, clippy::significant_drop_tightening)]

//! Real-time bridge between control-rate property writes and an opaque DSP
//! effect engine, plus the in-place stereo f32 buffer transform around it.

pub mod audio;
pub mod element;
pub mod engine;
pub mod error;
pub mod params;
pub mod settings;

pub use audio::{BufferFlags, StreamProcessor, Transform};
pub use element::{AudioFormat, BusMessage, Jdspfx, SampleFormat};
pub use engine::{
    Command, EffectEngine, PassthroughEngine, Payload, RecordingEngine, SessionState,
};
pub use error::{EngineError, FxError, Result};
pub use params::{EqualizerBands, ParamId, ParamValue, ParameterStore, PropertyValue};
