//! HTTP request builder for testing handlers

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::{test, HttpRequest};

use crate::session::cookie::DEFAULT_COOKIE_NAME;

/// Fluent builder for `HttpRequest` values used in unit tests
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    cookies: Vec<Cookie<'static>>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Create a new request builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: "/".to_string(),
            headers: Vec::new(),
            cookies: Vec::new(),
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the request URI
    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_string();
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add forwarded-proto/host headers as a fronting proxy would
    #[must_use]
    pub fn forwarded(self, proto: &str, host: &str) -> Self {
        self.header("X-Forwarded-Proto", proto)
            .header("X-Forwarded-Host", host)
    }

    /// Add a cookie to the request
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Add a session cookie with the provided value
    #[must_use]
    pub fn with_session_cookie(self, session_value: String) -> Self {
        let cookie = Cookie::build(DEFAULT_COOKIE_NAME, session_value)
            .path("/")
            .finish();
        self.with_cookie(cookie)
    }

    /// Build the `HttpRequest`
    #[must_use]
    pub fn to_http_request(self) -> HttpRequest {
        let mut request = test::TestRequest::default()
            .method(self.method)
            .uri(&self.uri);
        for (name, value) in self.headers {
            request = request.insert_header((name, value));
        }
        for cookie in self.cookies {
            request = request.cookie(cookie);
        }
        request.to_http_request()
    }
}
