use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the twelve zodiac signs stored in the `astrological_signs` reference table.
///
/// Serialized by its display name (`"Aries"`, `"Taurus"`, ...), which is also
/// the value of the table's unique `sign_name` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AstrologicalSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl AstrologicalSign {
    /// All signs, in seeding order.
    pub const ALL: &'static [AstrologicalSign] = &[
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }
}

impl fmt::Display for AstrologicalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sign name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown astrological sign: {invalid}")]
pub struct ParseSignError {
    pub invalid: String,
}

impl FromStr for AstrologicalSign {
    type Err = ParseSignError;

    /// Names are matched exactly; `"aries"` is not a sign.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|sign| sign.as_str() == s)
            .ok_or_else(|| ParseSignError {
                invalid: s.to_string(),
            })
    }
}
