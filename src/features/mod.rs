pub mod artifacts;
pub mod profiles;
