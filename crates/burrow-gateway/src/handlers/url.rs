use crate::error::{AppError, Result};
use crate::model::{
    ListUrlsQuery, ListUrlsResponse, MessageResponse, ShortenRequest, ShortenResponse,
    StatsResponse,
};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::{ShortCode, Shortener};
use tracing::debug;
use ::url::Url;

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_OFFSET: i64 = 0;

/// Parses `raw` and returns its serialized form, which is what gets stored.
///
/// Serialization strips tab and newline characters and percent-encodes the
/// rest, so the stored URL is always a valid `Location` header value.
fn normalize_url(raw: &str) -> Result<String> {
    let parsed =
        Url::parse(raw).map_err(|e| AppError::Validation(format!("Invalid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "URL scheme must be http or https, got '{}'",
            parsed.scheme()
        )));
    }
    if parsed.host().is_none() {
        return Err(AppError::Validation("URL must have a host".to_string()));
    }
    Ok(parsed.into())
}

/// An absent or empty custom code means "generate one".
fn parse_custom_code(raw: Option<&str>) -> Result<Option<ShortCode>> {
    match raw {
        None | Some("") => Ok(None),
        Some(code) => Ok(Some(ShortCode::new(code)?)),
    }
}

fn parse_page_param(raw: Option<&str>, default: i64, name: &str) -> Result<i64> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid {name} parameter"))),
    }
}

pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>)> {
    let Json(request) =
        payload.map_err(|e| AppError::Validation(format!("Invalid request: {}", e.body_text())))?;

    let original_url = normalize_url(&request.url)?;
    let custom_code = parse_custom_code(request.custom_code.as_deref())?;

    let record = state.shortener().shorten(original_url, custom_code).await?;

    let response = ShortenResponse {
        short_url: record.short_code.to_url(state.base_url()),
        short_code: record.short_code.into_inner(),
        original_url: record.original_url,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let record = state
        .shortener()
        .resolve(&ShortCode::new_unchecked(code))
        .await?;

    debug!(code = %record.short_code, clicks = record.clicks, "redirecting");
    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, record.original_url)],
    )
        .into_response())
}

pub async fn stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>> {
    let record = state
        .shortener()
        .stats(&ShortCode::new_unchecked(code))
        .await?;
    Ok(Json(record.into()))
}

pub async fn list_urls_handler(
    Query(query): Query<ListUrlsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListUrlsResponse>> {
    let limit = parse_page_param(query.limit.as_deref(), DEFAULT_LIMIT, "limit")?;
    let offset = parse_page_param(query.offset.as_deref(), DEFAULT_OFFSET, "offset")?;

    let urls = state.shortener().list(limit, offset).await?;

    Ok(Json(ListUrlsResponse {
        count: urls.len(),
        urls,
        limit,
        offset,
    }))
}

pub async fn delete_url_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>> {
    state
        .shortener()
        .remove(&ShortCode::new_unchecked(code))
        .await?;
    Ok(Json(MessageResponse {
        message: "URL deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_urls() {
        assert_eq!(
            normalize_url("https://example.com/path?q=1").unwrap(),
            "https://example.com/path?q=1"
        );
        assert_eq!(
            normalize_url("http://localhost:8080").unwrap(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn normalized_urls_are_header_safe() {
        assert_eq!(
            normalize_url("https://example.com/a\nb").unwrap(),
            "https://example.com/ab"
        );
        assert_eq!(
            normalize_url("https://example.com/\tpath with space").unwrap(),
            "https://example.com/path%20with%20space"
        );
        assert_eq!(
            normalize_url("https://bücher.example/").unwrap(),
            "https://xn--bcher-kva.example/"
        );
        for raw in [
            "https://example.com/a\nb",
            "https://example.com/\r\nSet-Cookie: x=1",
            "https://bücher.example/ü",
        ] {
            let normalized = normalize_url(raw).unwrap();
            assert!(
                axum::http::HeaderValue::from_str(&normalized).is_ok(),
                "{normalized}"
            );
        }
    }

    #[test]
    fn rejects_malformed_urls() {
        for raw in ["", "not a url", "example.com", "ftp://example.com", "mailto:a@b.c"] {
            assert!(
                matches!(normalize_url(raw), Err(AppError::Validation(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn empty_custom_code_means_generate() {
        assert!(parse_custom_code(None).unwrap().is_none());
        assert!(parse_custom_code(Some("")).unwrap().is_none());
        assert_eq!(
            parse_custom_code(Some("my-code")).unwrap().unwrap().as_str(),
            "my-code"
        );
    }

    #[test]
    fn invalid_custom_code_is_a_validation_error() {
        assert!(matches!(
            parse_custom_code(Some("a!")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn page_params() {
        assert_eq!(parse_page_param(None, 10, "limit").unwrap(), 10);
        assert_eq!(parse_page_param(Some("-3"), 10, "limit").unwrap(), -3);
        assert!(parse_page_param(Some("ten"), 10, "limit").is_err());
    }
}
