mod artifact_dto;

pub use artifact_dto::*;
