//! HTMX request detection.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, request::Parts},
};

/// Header HTMX sets on every request it issues.
pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");

/// Response header asking HTMX to do a full page navigation.
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");

/// Response header firing a client-side event after the swap.
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

/// Whether the request was issued by HTMX (and wants a fragment back).
#[must_use]
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Extractor wrapping [`is_htmx_request`].
#[derive(Debug, Clone, Copy)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(is_htmx_request(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_is_htmx_request() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx_request(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("false"));
        assert!(!is_htmx_request(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        assert!(is_htmx_request(&headers));
    }
}
