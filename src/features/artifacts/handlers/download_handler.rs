use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::core::error::{AppError, Result};
use crate::features::artifacts::handlers::artifact_handler::parse_artifact_id;
use crate::features::artifacts::services::ArtifactService;
use crate::shared::types::ErrorResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

/// Build a `Content-Disposition` value with an ASCII fallback name and an RFC 5987 `filename*`
fn content_disposition_value(disposition: Disposition, filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => String::from(b as char),
            b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~' => {
                String::from(b as char)
            }
            _ => format!("%{:02X}", b),
        })
        .collect();

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition.as_str(),
        ascii_name,
        encoded
    )
}

async fn stream_artifact(
    service: &ArtifactService,
    raw_id: &str,
    disposition: Disposition,
) -> Result<Response> {
    let id = parse_artifact_id(raw_id)?;
    let stream = service.open_file_stream(id).await?;
    let artifact = stream.artifact;

    let body = Body::from_stream(ReaderStream::new(stream.reader));

    Response::builder()
        .header(header::CONTENT_TYPE, &artifact.content_type)
        .header(header::CONTENT_LENGTH, artifact.file_size)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(disposition, &artifact.file_name),
        )
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}

/// Download the stored bytes as an attachment
#[utoipa::path(
    get,
    path = "/api/download/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "File bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Artifact or its file not found", body = ErrorResponse)
    )
)]
pub async fn download_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
) -> Result<Response> {
    stream_artifact(&service, &id, Disposition::Attachment).await
}

/// Serve the stored bytes for display in the browser
#[utoipa::path(
    get,
    path = "/api/view/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "File bytes, inline", content_type = "image/*"),
        (status = 404, description = "Artifact or its file not found", body = ErrorResponse)
    )
)]
pub async fn view_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
) -> Result<Response> {
    stream_artifact(&service, &id, Disposition::Inline).await
}

/// Thumbnail of an artifact; currently the original bytes served inline
#[utoipa::path(
    get,
    path = "/api/thumbnail/{id}",
    tag = "downloads",
    params(("id" = String, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Thumbnail bytes, inline", content_type = "image/*"),
        (status = 404, description = "Artifact or its file not found", body = ErrorResponse)
    )
)]
pub async fn thumbnail_artifact(
    State(service): State<Arc<ArtifactService>>,
    Path(id): Path<String>,
) -> Result<Response> {
    stream_artifact(&service, &id, Disposition::Inline).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{artifacts_router, reader_from};
    use axum_test::TestServer;
    use uuid::Uuid;

    #[test]
    fn test_content_disposition_value() {
        assert_eq!(
            content_disposition_value(Disposition::Attachment, "cat.png"),
            "attachment; filename=\"cat.png\"; filename*=UTF-8''cat.png"
        );
        assert_eq!(
            content_disposition_value(Disposition::Inline, "my \"cat\".png"),
            "inline; filename=\"mycat.png\"; filename*=UTF-8''my%20%22cat%22.png"
        );
        assert_eq!(
            content_disposition_value(Disposition::Inline, "猫"),
            "inline; filename=\"download\"; filename*=UTF-8''%E7%8C%AB"
        );
    }

    #[tokio::test]
    async fn test_download_streams_bytes_with_headers() {
        let (router, service, _) = artifacts_router();
        let bytes = b"\x89PNG\r\n\x1a\nrest".to_vec();
        let artifact = service
            .upload(reader_from(bytes.clone()), "cat.png", "image/png", bytes.len() as i64)
            .await
            .unwrap();
        let server = TestServer::new(router).unwrap();

        let response = server.get(&format!("/api/download/{}", artifact.id)).await;

        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "image/png");
        assert_eq!(
            response.header(header::CONTENT_LENGTH),
            bytes.len().to_string().as_str()
        );
        assert!(response
            .header(header::CONTENT_DISPOSITION)
            .to_str()
            .unwrap()
            .starts_with("attachment;"));
        assert_eq!(response.as_bytes().to_vec(), bytes);
    }

    #[tokio::test]
    async fn test_view_and_thumbnail_are_inline() {
        let (router, service, _) = artifacts_router();
        let artifact = service
            .upload(reader_from(b"gif".to_vec()), "dance.gif", "image/gif", 3)
            .await
            .unwrap();
        let server = TestServer::new(router).unwrap();

        for prefix in ["/api/view", "/api/thumbnail"] {
            let response = server.get(&format!("{}/{}", prefix, artifact.id)).await;
            response.assert_status_ok();
            assert!(response
                .header(header::CONTENT_DISPOSITION)
                .to_str()
                .unwrap()
                .starts_with("inline;"));
            assert_eq!(&response.as_bytes()[..], &b"gif"[..]);
        }
    }

    #[tokio::test]
    async fn test_download_missing_blob_or_record_is_not_found() {
        let (router, service, blob_store) = artifacts_router();
        let artifact = service
            .upload(reader_from(b"png".to_vec()), "cat.png", "image/png", 3)
            .await
            .unwrap();
        blob_store.remove(&artifact.blob_ref);
        let server = TestServer::new(router).unwrap();

        server
            .get(&format!("/api/download/{}", artifact.id))
            .await
            .assert_status_not_found();
        server
            .get(&format!("/api/download/{}", Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}
