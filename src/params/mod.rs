pub mod equalizer;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FxError, Result};
pub use equalizer::{BAND_COUNT, BandsError, EqualizerBands};

/// Every control the element exposes, in engine resync order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamId {
    Enable,
    TubeDrive,
    TubeEnable,
    BassMode,
    BassFilterType,
    BassFreq,
    BassEnable,
    ReverbPreset,
    ReverbEnable,
    StereoWideMode,
    StereoWideEnable,
    Bs2bMode,
    Bs2bEnable,
    CompressorPregain,
    CompressorThreshold,
    CompressorKnee,
    CompressorRatio,
    CompressorAttack,
    CompressorRelease,
    CompressorEnable,
    EqBands,
    EqFilterType,
    EqEnable,
}

pub const PARAM_COUNT: usize = 23;

impl ParamId {
    pub const ALL: [Self; PARAM_COUNT] = [
        Self::Enable,
        Self::TubeDrive,
        Self::TubeEnable,
        Self::BassMode,
        Self::BassFilterType,
        Self::BassFreq,
        Self::BassEnable,
        Self::ReverbPreset,
        Self::ReverbEnable,
        Self::StereoWideMode,
        Self::StereoWideEnable,
        Self::Bs2bMode,
        Self::Bs2bEnable,
        Self::CompressorPregain,
        Self::CompressorThreshold,
        Self::CompressorKnee,
        Self::CompressorRatio,
        Self::CompressorAttack,
        Self::CompressorRelease,
        Self::CompressorEnable,
        Self::EqBands,
        Self::EqFilterType,
        Self::EqEnable,
    ];

    pub fn spec(self) -> &'static ParamSpec {
        &PARAMS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up a control by its property name, e.g. `"bass-freq"`.
    pub fn from_name(name: &str) -> Option<Self> {
        PARAMS.iter().find(|p| p.name == name).map(|p| p.id)
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Global,
    AnalogModelling,
    BassBoost,
    Reverb,
    StereoWide,
    Bs2b,
    Compressor,
    Equalizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int { min: i32, max: i32 },
    Bands,
}

/// Where a control's value goes on the engine side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Gates the stream processor only; the engine gets a plain ENABLE on resync.
    Gate,
    /// SET_PARAM with this opcode.
    Param(i32),
}

/// A validated control value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Bands(EqualizerBands),
}

impl ParamValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bands(&self) -> Option<&EqualizerBands> {
        match self {
            Self::Bands(b) => Some(b),
            _ => None,
        }
    }
}

/// Raw value as written by the host, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Str(String),
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<ParamValue> for PropertyValue {
    fn from(v: ParamValue) -> Self {
        match v {
            ParamValue::Bool(b) => Self::Bool(b),
            ParamValue::Int(i) => Self::Int(i),
            ParamValue::Bands(bands) => Self::Str(bands.to_string()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub group: Group,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub target: Target,
}

impl ParamSpec {
    /// Check a raw host value against this control's kind and range.
    pub fn validate(&self, raw: &PropertyValue) -> Result<ParamValue> {
        match (self.kind, raw) {
            (ParamKind::Bool, PropertyValue::Bool(b)) => Ok(ParamValue::Bool(*b)),
            (ParamKind::Int { min, max }, PropertyValue::Int(v)) => {
                if (min..=max).contains(v) {
                    Ok(ParamValue::Int(*v))
                } else {
                    Err(FxError::invalid(
                        self.name,
                        format!("{v} outside [{min}, {max}]"),
                    ))
                }
            }
            (ParamKind::Bands, PropertyValue::Str(text)) => EqualizerBands::parse(text)
                .map(ParamValue::Bands)
                .map_err(|e| FxError::invalid(self.name, e.to_string())),
            (kind, _) => Err(FxError::TypeMismatch {
                property: self.name,
                expected: match kind {
                    ParamKind::Bool => "boolean",
                    ParamKind::Int { .. } => "integer",
                    ParamKind::Bands => "string",
                },
            }),
        }
    }
}

const fn switch(id: ParamId, name: &'static str, group: Group, target: Target) -> ParamSpec {
    ParamSpec {
        id,
        name,
        group,
        kind: ParamKind::Bool,
        default: ParamValue::Bool(false),
        target,
    }
}

const fn int(
    id: ParamId,
    name: &'static str,
    group: Group,
    (min, max, default): (i32, i32, i32),
    opcode: i32,
) -> ParamSpec {
    ParamSpec {
        id,
        name,
        group,
        kind: ParamKind::Int { min, max },
        default: ParamValue::Int(default),
        target: Target::Param(opcode),
    }
}

/// Immutable control table: names, ranges, initial values and engine opcodes.
///
/// Indexed by `ParamId as usize`; the order is also the resync order.
pub static PARAMS: [ParamSpec; PARAM_COUNT] = {
    use Group::*;
    use ParamId::*;
    [
        switch(Enable, "enable", Global, Target::Gate),
        int(TubeDrive, "analogmodelling-tubedrive", AnalogModelling, (0, 12000, 0), 1206),
        switch(TubeEnable, "analogmodelling-enable", AnalogModelling, Target::Param(150)),
        int(BassMode, "bass-mode", BassBoost, (0, 3000, 0), 112),
        int(BassFilterType, "bass-filtertype", BassBoost, (0, 1, 0), 113),
        int(BassFreq, "bass-freq", BassBoost, (30, 300, 55), 114),
        switch(BassEnable, "bass-enable", BassBoost, Target::Param(1201)),
        int(ReverbPreset, "headset-preset", Reverb, (0, 18, 0), 128),
        switch(ReverbEnable, "headset-enable", Reverb, Target::Param(1203)),
        int(StereoWideMode, "stereowide-mode", StereoWide, (0, 4, 0), 137),
        switch(StereoWideEnable, "stereowide-enable", StereoWide, Target::Param(1204)),
        int(Bs2bMode, "bs2b-mode", Bs2b, (0, 2, 0), 188),
        switch(Bs2bEnable, "bs2b-enable", Bs2b, Target::Param(1208)),
        int(CompressorPregain, "compression-pregain", Compressor, (0, 24, 12), 100),
        int(CompressorThreshold, "compression-threshold", Compressor, (-80, 0, -60), 101),
        int(CompressorKnee, "compression-knee", Compressor, (0, 40, 30), 102),
        int(CompressorRatio, "compression-ratio", Compressor, (-20, 20, 12), 103),
        int(CompressorAttack, "compression-attack", Compressor, (1, 1000, 1), 104),
        int(CompressorRelease, "compression-release", Compressor, (1, 1000, 24), 105),
        switch(CompressorEnable, "compression-enable", Compressor, Target::Param(1200)),
        ParamSpec {
            id: EqBands,
            name: "tone-eq",
            group: Equalizer,
            kind: ParamKind::Bands,
            default: ParamValue::Bands(EqualizerBands::FLAT),
            target: Target::Param(115),
        },
        int(EqFilterType, "tone-filtertype", Equalizer, (0, 1, 0), 151),
        switch(EqEnable, "tone-enable", Equalizer, Target::Param(1202)),
    ]
};

/// Current validated value of every control.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    values: [ParamValue; PARAM_COUNT],
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ParameterStore {
    pub fn defaults() -> Self {
        Self {
            values: std::array::from_fn(|i| PARAMS[i].default),
        }
    }

    pub fn get(&self, id: ParamId) -> ParamValue {
        self.values[id as usize]
    }

    /// Validate and store. On error the previous value is kept.
    pub fn set(&mut self, id: ParamId, raw: &PropertyValue) -> Result<ParamValue> {
        let value = id.spec().validate(raw)?;
        self.values[id as usize] = value;
        Ok(value)
    }

    pub fn enabled(&self) -> bool {
        self.get(ParamId::Enable).as_bool().unwrap_or(false)
    }

    pub fn bands(&self) -> EqualizerBands {
        self.get(ParamId::EqBands)
            .as_bands()
            .copied()
            .unwrap_or_default()
    }

    /// All `(id, value)` pairs in resync order.
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, ParamValue)> + '_ {
        ParamId::ALL.iter().map(|&id| (id, self.get(id)))
    }
}
