//! Command ABI of the DSP engine and the translation from control values to commands.
//!
//! The numeric codes here are the wire contract with the engine and must not change.

use std::fmt;

use crate::params::{EqualizerBands, ParamId, ParamValue, ParameterStore, Target};

pub const EFFECT_CMD_INIT: u32 = 0;
pub const EFFECT_CMD_SET_CONFIG: u32 = 1;
pub const EFFECT_CMD_RESET: u32 = 2;
pub const EFFECT_CMD_ENABLE: u32 = 3;
pub const EFFECT_CMD_SET_PARAM: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Int16(i16),
    Bool(bool),
    Bands(EqualizerBands),
}

impl From<ParamValue> for Payload {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Bool(b) => Self::Bool(b),
            // every integer range in the table fits in 16 bits
            ParamValue::Int(v) => Self::Int16(v.clamp(i16::MIN.into(), i16::MAX.into()) as i16),
            ParamValue::Bands(bands) => Self::Bands(bands),
        }
    }
}

/// One-shot "set current value" message for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Init,
    SetConfig { sample_rate: u32 },
    Reset,
    Enable,
    SetParam { opcode: i32, payload: Payload },
}

impl Command {
    /// Engine command code this message is delivered under.
    pub const fn code(&self) -> u32 {
        match self {
            Self::Init => EFFECT_CMD_INIT,
            Self::SetConfig { .. } => EFFECT_CMD_SET_CONFIG,
            Self::Reset => EFFECT_CMD_RESET,
            Self::Enable => EFFECT_CMD_ENABLE,
            Self::SetParam { .. } => EFFECT_CMD_SET_PARAM,
        }
    }

    pub const fn opcode(&self) -> Option<i32> {
        match self {
            Self::SetParam { opcode, .. } => Some(*opcode),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("INIT"),
            Self::SetConfig { sample_rate } => write!(f, "SET_CONFIG rate={sample_rate}"),
            Self::Reset => f.write_str("RESET"),
            Self::Enable => f.write_str("ENABLE"),
            Self::SetParam { opcode, payload } => match payload {
                Payload::Int16(v) => write!(f, "SET_PARAM {opcode} = {v}"),
                Payload::Bool(b) => write!(f, "SET_PARAM {opcode} = {}", u8::from(*b)),
                Payload::Bands(bands) => write!(f, "SET_PARAM {opcode} = [{bands}]"),
            },
        }
    }
}

/// Map a control and its validated value to the engine command that applies it.
///
/// The global switch only gates the stream processor, so the engine always
/// hears ENABLE for it whatever the stored value.
pub fn translate(id: ParamId, value: ParamValue) -> Command {
    match id.spec().target {
        Target::Gate => Command::Enable,
        Target::Param(opcode) => Command::SetParam {
            opcode,
            payload: value.into(),
        },
    }
}

/// Commands that make the engine mirror `store`, in table order (equalizer last).
pub fn resync(store: &ParameterStore) -> impl Iterator<Item = Command> + '_ {
    store.iter().map(|(id, value)| translate(id, value))
}
