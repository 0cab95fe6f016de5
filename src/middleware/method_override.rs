use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Router;

pub trait MethodOverrideExt<S> {
    fn with_method_override(self) -> Self;
}

impl<S> MethodOverrideExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Let HTML forms reach PUT/PATCH/DELETE routes through a hidden
    /// `_method` field on an ordinary POST.
    fn with_method_override(self) -> Router<S> {
        self.layer(axum::middleware::from_fn(rewrite_method))
    }
}

async fn rewrite_method(req: Request, next: Next) -> Response {
    if req.method() != Method::POST || !is_urlencoded_form(&req) {
        return next.run(req).await;
    }

    // the body has to be buffered to look at the form fields; the buffered
    // bytes are handed back to the inner extractors afterwards
    let (mut parts, body) = req.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::BAD_REQUEST.into_response(),
    };

    if let Some(method) = form_method(&bytes) {
        parts.method = method;
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn is_urlencoded_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn form_method(bytes: &[u8]) -> Option<Method> {
    let body = std::str::from_utf8(bytes).ok()?;
    let spoofed = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("_method="))?;
    match spoofed.to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_up_the_spoofed_method() {
        assert_eq!(form_method(b"_method=PUT&title=x"), Some(Method::PUT));
        assert_eq!(form_method(b"title=x&_method=delete"), Some(Method::DELETE));
        assert_eq!(form_method(b"_method=PATCH"), Some(Method::PATCH));
    }

    #[test]
    fn leaves_everything_else_alone() {
        assert_eq!(form_method(b"title=x&content=y"), None);
        assert_eq!(form_method(b"_method=GET"), None);
        assert_eq!(form_method(b"_method=TRACE"), None);
    }
}
