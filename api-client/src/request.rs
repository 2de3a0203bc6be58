//! Request builder and request extension traits.

use std::time::Duration;

use http::{header::HeaderValue, HeaderName, Uri};

use crate::error::Error;
use crate::response::Response;
use crate::uri::UriExtension as _;
use crate::ApiClient;

/// Extension trait for HTTP requests and request builders.
pub trait RequestExt {
    /// Get a copy of the request head, without the body.
    fn parts(&self) -> http::request::Parts;
}

impl<B> RequestExt for http::Request<B> {
    fn parts(&self) -> http::request::Parts {
        let mut builder = http::request::Request::builder()
            .uri(self.uri().clone())
            .method(self.method().clone());

        if let Some(headers) = builder.headers_mut() {
            *headers = self.headers().clone();
        }

        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }
}

impl RequestExt for http::request::Builder {
    fn parts(&self) -> http::request::Parts {
        let mut builder = http::request::Request::builder()
            .uri(self.uri_ref().expect("valid request").clone())
            .method(self.method_ref().expect("valid request").clone());

        if let Some(headers) = builder.headers_mut() {
            *headers = self.headers_ref().expect("valid request").clone();
        }

        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }
}

/// Builder for a single API request.
#[derive(Debug)]
pub struct RequestBuilder {
    req: http::request::Builder,
    client: ApiClient,
    body: Option<hyperdriver::Body>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    /// Create a new request builder for the given client, URI and method.
    pub fn new(client: ApiClient, uri: Uri, method: http::Method) -> Self {
        Self {
            req: http::Request::builder().method(method).uri(uri),
            client,
            body: None,
            timeout: None,
        }
    }

    /// Append a header to the request.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.req = self.req.header(key, value);
        self
    }

    /// Append a set of headers to the request.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        for (key, value) in headers {
            self.req = self.req.header(key, value);
        }

        self
    }

    /// Get a mutable reference to the request headers, if the request is still valid.
    pub fn headers_mut(&mut self) -> Option<&mut http::header::HeaderMap> {
        self.req.headers_mut()
    }

    /// Set the query string of the request from a serializable value.
    pub fn query<T>(mut self, query: &T) -> Result<Self, Error>
    where
        T: serde::Serialize + ?Sized,
    {
        let params = serde_urlencoded::to_string(query).map_err(Error::Query)?;

        if let Some(uri) = self.req.uri_ref().cloned() {
            self.req = self.req.uri(uri.with_query(&params));
        }

        Ok(self)
    }

    /// Set a timeout for the request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the body of the request.
    pub fn body<B: Into<hyperdriver::Body>>(self, body: B) -> Self {
        Self {
            body: Some(body.into()),
            ..self
        }
    }

    /// Construct the request without sending it.
    pub fn build(self) -> Result<http::Request<hyperdriver::Body>, Error> {
        self.req
            .body(self.body.unwrap_or_else(hyperdriver::Body::empty))
            .map_err(Error::Build)
    }

    /// Send the request and wait for the response.
    pub async fn send(self) -> Result<Response, Error> {
        let req = self
            .req
            .body(self.body.unwrap_or_else(hyperdriver::Body::empty))
            .map_err(Error::Build)?;

        if let Some(timeout) = self.timeout {
            match tokio::time::timeout(timeout, self.client.execute(req)).await {
                Ok(res) => res,
                Err(_) => Err(Error::Timeout(timeout)),
            }
        } else {
            self.client.execute(req).await
        }
    }
}
