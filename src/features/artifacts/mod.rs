//! Image artifacts: upload, listing, likes and streamed downloads.
//!
//! Bytes live in the blob store; metadata and like state live in Postgres.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/artifacts` | Paginated listing (`page`, `size`, `sortBy`) |
//! | POST | `/api/artifacts` | Multipart upload (`file`, `fileName`) |
//! | GET | `/api/artifacts/{id}` | Artifact metadata |
//! | DELETE | `/api/artifacts/{id}` | Delete blob and metadata |
//! | POST | `/api/artifacts/{id}/like` | Anonymous like |
//! | DELETE | `/api/artifacts/{id}/like` | Anonymous unlike |
//! | POST | `/api/artifacts/{id}/toggle-like` | Per-user like toggle (`userId`) |
//! | GET | `/api/artifacts/{id}/liked` | Per-user like check (`userId`) |
//! | GET | `/api/artifacts/search` | Name substring search (`fileName`) |
//! | GET | `/api/artifacts/by-type` | Exact content type filter (`contentType`) |
//! | GET | `/api/download/{id}` | Bytes as attachment |
//! | GET | `/api/view/{id}` | Bytes inline |
//! | GET | `/api/thumbnail/{id}` | Same as view |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::ArtifactService;
