pub mod opinion;
pub mod opinion_schema;
pub mod sign;

pub use opinion::{CoreTraits, DatingTraits, DocumentError, GrabAndGhost, OpinionDocument};
pub use opinion_schema::{ValidationErrors, Violation};
pub use sign::{AstrologicalSign, ParseSignError};
