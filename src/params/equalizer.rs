use std::fmt;
use std::str::FromStr;

pub const BAND_COUNT: usize = 15;
/// Gain limit per band in hundredths of a dB (±12 dB).
pub const BAND_LIMIT: i16 = 1200;
/// Longest accepted serialized form; 64 bytes and above are rejected.
pub const MAX_TEXT_LEN: usize = 63;

/// Gains of the 15-band equalizer, in hundredths of a decibel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EqualizerBands([i16; BAND_COUNT]);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BandsError {
    TooLong(usize),
    WrongCount(usize),
    NotAnInteger(String),
    OutOfRange { band: usize, gain: i32 },
}

impl fmt::Display for BandsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(len) => write!(
                f,
                "equalizer string is {len} bytes, at most {MAX_TEXT_LEN} allowed"
            ),
            Self::WrongCount(n) => write!(f, "expected {BAND_COUNT} bands, got {n}"),
            Self::NotAnInteger(tok) => write!(f, "band gain '{tok}' is not an integer"),
            Self::OutOfRange { band, gain } => write!(
                f,
                "band {band} gain {gain} outside [-{BAND_LIMIT}, {BAND_LIMIT}]"
            ),
        }
    }
}

impl std::error::Error for BandsError {}

impl EqualizerBands {
    pub const FLAT: Self = Self([0; BAND_COUNT]);

    pub fn new(gains: [i16; BAND_COUNT]) -> Result<Self, BandsError> {
        for (band, &gain) in gains.iter().enumerate() {
            if !(-BAND_LIMIT..=BAND_LIMIT).contains(&gain) {
                return Err(BandsError::OutOfRange {
                    band,
                    gain: gain.into(),
                });
            }
        }
        Ok(Self(gains))
    }

    pub const fn gains(&self) -> &[i16; BAND_COUNT] {
        &self.0
    }

    /// Parse `"g0;g1;...;g14"`. Nothing is applied unless all 15 gains are valid.
    pub fn parse(text: &str) -> Result<Self, BandsError> {
        if text.len() > MAX_TEXT_LEN {
            return Err(BandsError::TooLong(text.len()));
        }

        let tokens: Vec<&str> = text.split(';').collect();
        if tokens.len() != BAND_COUNT {
            return Err(BandsError::WrongCount(tokens.len()));
        }

        let mut gains = [0i16; BAND_COUNT];
        for (band, (slot, token)) in gains.iter_mut().zip(tokens).enumerate() {
            let token = token.trim();
            let gain: i32 = token
                .parse()
                .map_err(|_| BandsError::NotAnInteger(token.to_string()))?;
            if !(-i32::from(BAND_LIMIT)..=i32::from(BAND_LIMIT)).contains(&gain) {
                return Err(BandsError::OutOfRange { band, gain });
            }
            *slot = gain as i16;
        }

        Ok(Self(gains))
    }
}

impl FromStr for EqualizerBands {
    type Err = BandsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EqualizerBands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gain) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{gain}")?;
        }
        Ok(())
    }
}
