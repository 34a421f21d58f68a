use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::opinion_schema::{self, ValidationErrors};

/// A validated opinion document.
///
/// The field set mirrors [`opinion_schema::OPINION_SCHEMA`]; values only ever
/// reach this type through [`OpinionDocument::from_value`], which runs the
/// schema check first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpinionDocument {
    pub core: CoreTraits,
    pub dating: DatingTraits,
}

/// Personality ratings, each 1-5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreTraits {
    pub openness: u8,
    pub conscientiousness: u8,
    pub extraversion: u8,
    pub agreeableness: u8,
    pub neuroticism: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatingTraits {
    pub oscar_worthy_actress: bool,
    pub witness_protection: bool,
    pub hole_in_one: bool,
    pub raw_dog: bool,
    pub miss_leading: bool,
    pub grab_and_ghost: GrabAndGhost,
    pub victim_mentality: bool,
    pub yes_means_no: bool,
    pub catches_flights: bool,
    pub alpha_widow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrabAndGhost {
    pub flag: bool,
    /// Only meaningful when `flag` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

/// Why a stored document could not be turned back into an [`OpinionDocument`].
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("stored opinion data is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("stored opinion data violates the schema: {0}")]
    Invalid(#[from] ValidationErrors),
}

impl OpinionDocument {
    /// Validate an arbitrary JSON value and convert it into a typed document.
    pub fn from_value(value: Value) -> Result<Self, ValidationErrors> {
        opinion_schema::validate(&value)?;
        serde_json::from_value(value)
            .map_err(|e| ValidationErrors::single("opinion_data", e.to_string()))
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "core": &self.core,
            "dating": &self.dating,
        })
    }

    /// Serialized form written to the `opinion_data` column.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a value read from the `opinion_data` column.
    pub fn from_json_str(raw: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(value)?)
    }
}
