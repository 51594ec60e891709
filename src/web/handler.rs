//! Request routing and handlers for the web front end

use crate::downloader::progress::ProgressReporter;
use crate::downloader::{DownloadRequest, Downloader, OutputMode};
use crate::extractor::models::{mime_for, StreamInfo};
use crate::extractor::validate_url;
use crate::selector::{available_resolutions, Criterion};
use crate::utils::error::{Result, TubegrabError};
use crate::web::page::INDEX_HTML;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Response body: small in-memory payloads or a streamed media file
pub type ResponseBody = UnsyncBoxBody<Bytes, std::io::Error>;

/// State shared by every connection
pub struct WebState {
    pub downloader: Arc<Downloader>,
    /// Parent of the per-request download directories
    pub scratch_dir: PathBuf,
    /// Quality used when a request names none
    pub default_quality: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: &'a str,
}

#[derive(Serialize)]
struct StreamsBody<'a> {
    id: &'a str,
    title: &'a str,
    uploader: Option<&'a str>,
    duration_secs: Option<u64>,
    duration: Option<String>,
    view_count: Option<u64>,
    thumbnail: Option<&'a str>,
    resolutions: Vec<String>,
    streams: &'a [StreamInfo],
}

/// Route one request
///
/// Never fails at the transport level; errors become JSON responses.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<WebState>,
) -> std::result::Result<Response<ResponseBody>, Infallible> {
    let query = parse_query(req.uri().query());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    drop(req);
    debug!("{} {}", method, path);

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/") | (&Method::GET, "/index.html") => html(INDEX_HTML),
        (&Method::GET, "/api/streams") => match streams(&state, &query).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        },
        (&Method::GET, "/api/download") => match download(&state, &query).await {
            Ok(response) => response,
            Err(e) => error_response(&e),
        },
        (_, "/") | (_, "/api/streams") | (_, "/api/download") => plain_error(
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed",
            "method_not_allowed",
        ),
        _ => plain_error(StatusCode::NOT_FOUND, "not found", "not_found"),
    };
    Ok(response)
}

async fn streams(state: &WebState, query: &HashMap<String, String>) -> Result<Response<ResponseBody>> {
    let url = required_url(query)?;
    let video = state.downloader.video(&url).await?;

    let body = StreamsBody {
        id: &video.id,
        title: &video.title,
        uploader: video.uploader.as_deref(),
        duration_secs: video.duration_secs,
        duration: video.duration_label(),
        view_count: video.view_count,
        thumbnail: video.thumbnail.as_deref(),
        resolutions: available_resolutions(&video.streams),
        streams: &video.streams,
    };
    json(StatusCode::OK, &body)
}

async fn download(state: &WebState, query: &HashMap<String, String>) -> Result<Response<ResponseBody>> {
    let url = required_url(query)?;
    let criterion: Criterion = query
        .get("quality")
        .map(String::as_str)
        .filter(|q| !q.trim().is_empty())
        .unwrap_or(state.default_quality.as_str())
        .parse()?;
    let video_only = query.get("video_only").map(|v| is_truthy(v)).unwrap_or(false);

    let scratch = ScratchDir(state.scratch_dir.join(Uuid::new_v4().to_string()));
    let request = DownloadRequest {
        video_url: url,
        criterion: criterion.clone(),
        destination: scratch.0.clone(),
        output: if video_only {
            OutputMode::VideoOnly
        } else {
            OutputMode::Combined
        },
    };

    let path = state
        .downloader
        .download(&request, &ProgressReporter::disabled())
        .await?;
    serve_file(scratch, &path, &criterion).await
}

/// Stream the finished file; the scratch directory goes away with the body
async fn serve_file(
    scratch: ScratchDir,
    path: &Path,
    criterion: &Criterion,
) -> Result<Response<ResponseBody>> {
    let file = File::open(path).await?;
    let length = file.metadata().await?.len();
    info!("Serving {} ({} bytes)", path.display(), length);

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mime = mime_for(&extension, *criterion != Criterion::AudioOnly);

    let stream = ScratchFileStream {
        inner: ReaderStream::new(file),
        _scratch: scratch,
    };
    let body = StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync();

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, header_value(&mime));
    headers.insert(CONTENT_DISPOSITION, header_value(&content_disposition(path)));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    Ok(response)
}

/// Per-request download directory, removed on drop
struct ScratchDir(PathBuf);

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove scratch directory {}: {}", self.0.display(), e);
            }
        }
    }
}

/// File chunks that keep their scratch directory alive until the body is dropped
struct ScratchFileStream {
    inner: ReaderStream<File>,
    _scratch: ScratchDir,
}

impl Stream for ScratchFileStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

fn full(data: Bytes) -> ResponseBody {
    Full::new(data).map_err(|never| match never {}).boxed_unsync()
}

fn required_url(query: &HashMap<String, String>) -> Result<String> {
    let url = query
        .get("url")
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| TubegrabError::InvalidUrl("missing url parameter".to_string()))?;
    validate_url(url)?;
    Ok(url.to_string())
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// HTTP status for each error kind
pub fn status_for(error: &TubegrabError) -> StatusCode {
    match error {
        TubegrabError::InvalidUrl(_) | TubegrabError::InvalidQuality(_) => StatusCode::BAD_REQUEST,
        TubegrabError::NoMatchingStream(_) => StatusCode::NOT_FOUND,
        TubegrabError::DestinationExists(_) => StatusCode::CONFLICT,
        TubegrabError::Fetch(_) | TubegrabError::Network(_) => StatusCode::BAD_GATEWAY,
        TubegrabError::MergeUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &TubegrabError) -> Response<ResponseBody> {
    let status = status_for(error);
    if status.is_server_error() {
        warn!("Request failed: {}", error);
    } else {
        debug!("Request rejected: {}", error);
    }
    plain_error(status, &error.user_message(), error.kind())
}

fn plain_error(status: StatusCode, message: &str, kind: &str) -> Response<ResponseBody> {
    let body = ErrorBody {
        error: message.to_string(),
        kind,
    };
    json(status, &body).unwrap_or_else(|_| {
        let mut response = Response::new(full(Bytes::from_static(b"internal error")));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Response<ResponseBody>> {
    let data = serde_json::to_vec(body)?;
    let mut response = Response::new(full(Bytes::from(data)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

fn html(page: &'static str) -> Response<ResponseBody> {
    let mut response = Response::new(full(Bytes::from_static(page.as_bytes())));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

/// `attachment` header with an ASCII fallback name and the UTF-8 original
fn content_disposition(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "download".to_string());
    let ascii: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(&name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&TubegrabError::InvalidUrl("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&TubegrabError::NoMatchingStream("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&TubegrabError::DestinationExists(PathBuf::from("a"))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&TubegrabError::Fetch("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&TubegrabError::MergeUnavailable("x".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&TubegrabError::Config("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_parse_query_decodes() {
        let query = parse_query(Some(
            "url=https%3A%2F%2Fyoutu.be%2Fabc&quality=720p&video_only=on",
        ));
        assert_eq!(query.get("url").unwrap(), "https://youtu.be/abc");
        assert_eq!(query.get("quality").unwrap(), "720p");
        assert!(is_truthy(query.get("video_only").unwrap()));
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_content_disposition_encodes_unicode() {
        let header = content_disposition(Path::new("/tmp/x/Café \"live\".mp4"));
        assert!(header.starts_with("attachment; filename=\"Caf_ _live_.mp4\""));
        assert!(header.ends_with("filename*=UTF-8''Caf%C3%A9%20%22live%22.mp4"));
        assert!(HeaderValue::from_str(&header).is_ok());
    }
}
