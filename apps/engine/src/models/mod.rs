pub mod prediction;
pub mod roles;
