pub mod artifact_handler;
pub mod download_handler;
mod staged_upload;

pub use artifact_handler::*;
pub use download_handler::*;
