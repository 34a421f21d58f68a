pub mod astrological_sign;
pub mod migration;
pub mod opinion;
pub mod person_of_interest;
pub mod review;
pub mod user;
