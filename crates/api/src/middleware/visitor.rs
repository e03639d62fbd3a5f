//! Anonymous visitor identity extractor.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};

use crate::error::AppError;

/// Cookie carrying the visitor's stable anonymous id.
pub const VISITOR_COOKIE: &str = "visitor_uuid";

/// Header alternative to the cookie, for non-browser clients.
pub const VISITOR_HEADER: &str = "x-visitor-id";

/// Longest visitor id accepted from a client.
const MAX_VISITOR_ID_LEN: usize = 128;

/// Cookie lifetime: effectively permanent (10 years).
const COOKIE_MAX_AGE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Submitter identity resolved from the request.
///
/// The id comes from the `visitor_uuid` cookie or `X-Visitor-Id` header.
/// When neither is present a fresh UUID is minted and `is_new` is set; the
/// handler should then return the extractor as a response part so the
/// cookie is issued:
///
/// ```ignore
/// async fn handler(visitor: Visitor) -> AppResult<impl IntoResponse> {
///     Ok((visitor.cookie(), Json(...)))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Visitor {
    pub id: String,
    /// First `X-Forwarded-For` entry, else the socket peer address.
    pub ip_address: Option<String>,
    pub is_new: bool,
}

impl Visitor {
    /// Response part that sets the identity cookie for new visitors only.
    pub fn cookie(&self) -> VisitorCookie {
        VisitorCookie(self.is_new.then(|| self.id.clone()))
    }
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        let ip_address = forwarded_for(&parts.headers).or(peer);

        let existing = cookie_value(&parts.headers, VISITOR_COOKIE).or_else(|| {
            parts
                .headers
                .get(VISITOR_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        });

        let visitor = match existing.filter(|id| is_acceptable_id(id)) {
            Some(id) => Visitor {
                id,
                ip_address,
                is_new: false,
            },
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                tracing::debug!(visitor_id = %id, "Issued new visitor id");
                Visitor {
                    id,
                    ip_address,
                    is_new: true,
                }
            }
        };
        Ok(visitor)
    }
}

/// Optional `Set-Cookie` for a newly issued visitor id.
#[derive(Debug, Clone)]
pub struct VisitorCookie(Option<String>);

impl IntoResponseParts for VisitorCookie {
    type Error = AppError;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(id) = self.0 {
            let cookie = format!(
                "{VISITOR_COOKIE}={id}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; HttpOnly; SameSite=Lax"
            );
            let value = HeaderValue::from_str(&cookie)
                .map_err(|e| AppError::InternalError(format!("invalid cookie value: {e}")))?;
            res.headers_mut().append(SET_COOKIE, value);
        }
        Ok(res)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_acceptable_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_VISITOR_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Find a cookie by name across all `Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
}

/// First address in `X-Forwarded-For`, if present.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
