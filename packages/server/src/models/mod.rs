pub mod opinion;
pub mod poi;
