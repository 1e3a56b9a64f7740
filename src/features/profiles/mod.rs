//! User profiles: display name, email and an optional avatar artifact.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/profiles` | List all profiles |
//! | POST | `/api/profiles` | Create a profile |
//! | GET | `/api/profiles/{id}` | Get one profile |
//! | PUT | `/api/profiles/{id}` | Merge-patch email, display name or avatar |
//! | DELETE | `/api/profiles/{id}` | Delete a profile |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ProfileService;
