//! Shape and range rules for opinion documents.
//!
//! An opinion document is a JSON object with exactly two sections, `core` and
//! `dating`. Each section has a fixed set of traits described by the tables
//! below, and [`validate`] walks those tables with one generic routine instead
//! of special-casing traits. Unknown keys are violations at every level.
//!
//! Validation collects every violation it finds; callers get the full list in
//! one pass, in schema order followed by unknown keys.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Upper bound for `dating.grab_and_ghost.amount`.
pub const MAX_GHOST_AMOUNT: u64 = 100_000_000;

/// Key holding the boolean half of a [`TraitKind::FlagWithAmount`] trait.
pub const FLAG_KEY: &str = "flag";
/// Key holding the numeric half of a [`TraitKind::FlagWithAmount`] trait.
pub const AMOUNT_KEY: &str = "amount";

/// Value shape accepted for a single trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitKind {
    /// Integer rating in `min..=max`.
    Scale { min: i64, max: i64 },
    /// Plain boolean.
    Flag,
    /// `{flag, amount}` object. `amount` is an integer in `0..=max_amount`,
    /// required when `flag` is true and range-checked whenever present.
    FlagWithAmount { max_amount: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct TraitSpec {
    pub name: &'static str,
    pub kind: TraitKind,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub name: &'static str,
    pub traits: &'static [TraitSpec],
}

const fn scale(name: &'static str) -> TraitSpec {
    TraitSpec {
        name,
        kind: TraitKind::Scale { min: 1, max: 5 },
    }
}

const fn flag(name: &'static str) -> TraitSpec {
    TraitSpec {
        name,
        kind: TraitKind::Flag,
    }
}

pub const CORE_TRAITS: &[TraitSpec] = &[
    scale("openness"),
    scale("conscientiousness"),
    scale("extraversion"),
    scale("agreeableness"),
    scale("neuroticism"),
];

pub const DATING_TRAITS: &[TraitSpec] = &[
    flag("oscar_worthy_actress"),
    flag("witness_protection"),
    flag("hole_in_one"),
    flag("raw_dog"),
    flag("miss_leading"),
    TraitSpec {
        name: "grab_and_ghost",
        kind: TraitKind::FlagWithAmount {
            max_amount: MAX_GHOST_AMOUNT,
        },
    },
    flag("victim_mentality"),
    flag("yes_means_no"),
    flag("catches_flights"),
    flag("alpha_widow"),
];

/// The complete opinion document schema, in section order.
pub const OPINION_SCHEMA: &[SectionSpec] = &[
    SectionSpec {
        name: "core",
        traits: CORE_TRAITS,
    },
    SectionSpec {
        name: "dating",
        traits: DATING_TRAITS,
    },
];

/// A single field-level problem, addressed by a dotted path such as
/// `core.openness` or `dating.grab_and_ghost.amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every violation found while validating one input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_violations(.0))]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    /// Wrap a non-empty list. Returns `None` for an empty list.
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        (!violations.is_empty()).then_some(Self(violations))
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![Violation::new(field, message)])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.0
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// True if any violation is reported for exactly `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

impl FromIterator<Violation> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = Violation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Check a candidate opinion document against [`OPINION_SCHEMA`].
pub fn validate(document: &Value) -> Result<(), ValidationErrors> {
    let mut violations = Vec::new();

    match document.as_object() {
        Some(root) => {
            for section in OPINION_SCHEMA {
                match root.get(section.name) {
                    Some(value) => validate_section(section, value, &mut violations),
                    None => violations.push(Violation::new(section.name, "is required")),
                }
            }
            reject_unknown_keys(
                root,
                None,
                |key| OPINION_SCHEMA.iter().any(|s| s.name == key),
                &mut violations,
            );
        }
        None => violations.push(Violation::new("opinion_data", "must be an object")),
    }

    match ValidationErrors::from_violations(violations) {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}

fn validate_section(section: &SectionSpec, value: &Value, violations: &mut Vec<Violation>) {
    let Some(fields) = value.as_object() else {
        violations.push(Violation::new(section.name, "must be an object"));
        return;
    };

    for spec in section.traits {
        let path = format!("{}.{}", section.name, spec.name);
        match fields.get(spec.name) {
            Some(value) => validate_trait(&path, spec.kind, value, violations),
            None => violations.push(Violation::new(path, "is required")),
        }
    }

    reject_unknown_keys(
        fields,
        Some(section.name),
        |key| section.traits.iter().any(|t| t.name == key),
        violations,
    );
}

fn validate_trait(path: &str, kind: TraitKind, value: &Value, violations: &mut Vec<Violation>) {
    match kind {
        TraitKind::Scale { min, max } => match value.as_i64() {
            Some(n) if (min..=max).contains(&n) => {}
            _ => violations.push(Violation::new(
                path,
                format!("must be an integer between {min} and {max}"),
            )),
        },
        TraitKind::Flag => {
            if !value.is_boolean() {
                violations.push(Violation::new(path, "must be a boolean"));
            }
        }
        TraitKind::FlagWithAmount { max_amount } => {
            validate_flag_with_amount(path, max_amount, value, violations)
        }
    }
}

fn validate_flag_with_amount(
    path: &str,
    max_amount: u64,
    value: &Value,
    violations: &mut Vec<Violation>,
) {
    let Some(fields) = value.as_object() else {
        violations.push(Violation::new(
            path,
            format!("must be an object with `{FLAG_KEY}` and `{AMOUNT_KEY}`"),
        ));
        return;
    };

    let flag_path = format!("{path}.{FLAG_KEY}");
    let flag = match fields.get(FLAG_KEY) {
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            violations.push(Violation::new(flag_path, "must be a boolean"));
            None
        }
        None => {
            violations.push(Violation::new(flag_path, "is required"));
            None
        }
    };

    let amount_path = format!("{path}.{AMOUNT_KEY}");
    match fields.get(AMOUNT_KEY) {
        Some(amount) => match amount.as_u64() {
            Some(n) if n <= max_amount => {}
            _ => violations.push(Violation::new(
                amount_path,
                format!("must be an integer between 0 and {max_amount}"),
            )),
        },
        None if flag == Some(true) => violations.push(Violation::new(
            amount_path,
            format!("is required when `{FLAG_KEY}` is true"),
        )),
        None => {}
    }

    reject_unknown_keys(
        fields,
        Some(path),
        |key| key == FLAG_KEY || key == AMOUNT_KEY,
        violations,
    );
}

fn reject_unknown_keys(
    fields: &Map<String, Value>,
    parent: Option<&str>,
    is_known: impl Fn(&str) -> bool,
    violations: &mut Vec<Violation>,
) {
    for key in fields.keys().filter(|key| !is_known(key)) {
        let path = match parent {
            Some(parent) => format!("{parent}.{key}"),
            None => key.clone(),
        };
        violations.push(Violation::new(path, "is not a recognized field"));
    }
}
