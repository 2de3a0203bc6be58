use http::header;
use http::HeaderValue;
use http::Method;
use http::Uri;
use hyperdriver::client::conn::transport::tcp::TcpTransportConfig;
use hyperdriver::service::SharedService;
use hyperdriver::Client;
use tower::ServiceExt;

pub mod error;
pub mod request;
pub mod response;
mod retry;
pub mod uri;

pub use self::error::{Error, HttpResponseError};
pub use self::request::RequestBuilder;
pub use self::request::RequestExt;
pub use self::response::Response;
pub use self::retry::Backoff;
use self::uri::UriExtension as _;

const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// A client for accessing APIs over HTTP / HTTPS
///
/// Useful inner object to wrap for individual API clients.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Uri,
    inner: hyperdriver::client::SharedClientService<hyperdriver::Body>,
}

impl ApiClient {
    /// Create a new API Client from a base URL.
    ///
    /// The client asks for JSON responses and identifies itself with the
    /// given `User-Agent` header.
    pub fn new(base: Uri, user_agent: &str) -> Self {
        let tcp = TcpTransportConfig {
            connect_timeout: Some(CONNECT_TIMEOUT),
            ..Default::default()
        };

        let inner = Client::builder()
            .layer(
                tower_http::set_header::SetRequestHeaderLayer::if_not_present(
                    header::ACCEPT,
                    HeaderValue::from_static("application/json"),
                ),
            )
            .with_tcp(tcp)
            .with_auto_http()
            .with_user_agent(user_agent.to_owned())
            .with_timeout(TIMEOUT)
            .build_service();

        ApiClient { base, inner }
    }

    /// Wrap the client's transport in a retry middleware using the given
    /// backoff policy. Only requests with cloneable bodies are retried.
    pub fn with_retries(self, policy: Backoff) -> Self {
        let inner = tower::ServiceBuilder::new()
            .layer(SharedService::layer())
            .layer(tower::retry::RetryLayer::new(policy))
            .service(self.inner);

        ApiClient {
            base: self.base,
            inner,
        }
    }

    /// Create a new API Client with a custom inner service, useful for tests.
    pub fn new_with_inner_service<S>(base: Uri, inner: S) -> Self
    where
        S: tower::Service<
                hyperdriver::body::Request,
                Response = hyperdriver::body::Response,
                Error = hyperdriver::client::Error,
            > + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        let service = tower::ServiceBuilder::new()
            .layer(SharedService::layer())
            .service(inner);

        ApiClient {
            base,
            inner: service,
        }
    }

    /// The base URI which endpoints are joined onto.
    pub fn base(&self) -> &Uri {
        &self.base
    }

    /// Get a reference to the inner service.
    pub fn inner(&self) -> &hyperdriver::client::SharedClientService<hyperdriver::Body> {
        &self.inner
    }

    /// Build a GET request for an endpoint relative to the base URI.
    pub fn get(&self, endpoint: &str) -> RequestBuilder {
        let url = self.base.clone().join(endpoint);
        RequestBuilder::new(self.clone(), url, Method::GET)
    }

    /// Build a PUT request for an endpoint relative to the base URI.
    pub fn put(&self, endpoint: &str) -> RequestBuilder {
        let url = self.base.clone().join(endpoint);
        RequestBuilder::new(self.clone(), url, Method::PUT)
    }

    /// Build a POST request for an endpoint relative to the base URI.
    pub fn post(&self, endpoint: &str) -> RequestBuilder {
        let url = self.base.clone().join(endpoint);
        RequestBuilder::new(self.clone(), url, Method::POST)
    }

    /// Build a DELETE request for an endpoint relative to the base URI.
    pub fn delete(&self, endpoint: &str) -> RequestBuilder {
        let url = self.base.clone().join(endpoint);
        RequestBuilder::new(self.clone(), url, Method::DELETE)
    }

    /// Send a request through the inner service.
    pub async fn execute(&self, req: hyperdriver::body::Request) -> Result<Response, Error> {
        let parts = req.parts();

        let response = self
            .inner
            .clone()
            .oneshot(req)
            .await
            .map_err(Error::Request)?;
        Ok(Response::new(parts, response))
    }
}

/// Canned responses for driving API clients in tests.
pub mod mock {
    use bytes::Bytes;
    use http::response;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// A single canned response, keyed by request path.
    #[derive(Debug, Clone)]
    pub struct MockResponse {
        status: http::StatusCode,
        headers: http::HeaderMap,
        body: Vec<u8>,
    }

    impl MockResponse {
        /// Create a new canned response.
        pub fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
            Self {
                status,
                headers,
                body,
            }
        }
    }

    /// A service which serves canned responses and records the requests it
    /// has seen. Clones share the request log.
    #[derive(Debug, Default, Clone)]
    pub struct MockService {
        responses: HashMap<String, MockResponse>,
        hits: Arc<Mutex<HashMap<String, usize>>>,
    }

    impl MockService {
        /// Create a new mock service with no responses configured.
        pub fn new() -> Self {
            Self {
                responses: Default::default(),
                hits: Default::default(),
            }
        }

        /// Configure a canned response for a path.
        pub fn add(
            &mut self,
            path: &str,
            status: http::StatusCode,
            headers: http::HeaderMap,
            body: Vec<u8>,
        ) {
            let response = MockResponse::new(status, headers, body);
            self.responses.insert(path.to_owned(), response);
        }

        /// The number of requests seen for a path.
        pub fn hits(&self, path: &str) -> usize {
            self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
        }

        /// The total number of requests seen by this service.
        pub fn requests(&self) -> usize {
            self.hits.lock().unwrap().values().sum()
        }
    }

    impl tower::Service<hyperdriver::body::Request> for MockService {
        type Response = hyperdriver::body::Response;
        type Error = hyperdriver::client::Error;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(
            &mut self,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<Result<(), Self::Error>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: hyperdriver::body::Request) -> Self::Future {
            let path = req.uri().path().to_owned();
            *self.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

            let response = self.responses.get(&path).unwrap_or_else(|| {
                panic!(
                    "No response configured for path: {path}",
                    path = req.uri().path()
                )
            });

            let mut builder = response::Builder::new()
                .status(response.status)
                .version(http::Version::HTTP_11);

            for (key, value) in response.headers.iter() {
                builder = builder.header(key, value);
            }

            let response = builder
                .body(hyperdriver::Body::from(Bytes::from(response.body.clone())))
                .unwrap();

            std::future::ready(Ok(response))
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn builders_produce_send_futures() {
        let client = ApiClient::new(
            "http://httpbin.org/get/".parse().unwrap(),
            "api-client-tests/0.1",
        );
        let builder = client.get("frobulator");

        fn assert_send<T: Send>(_t: T) {}

        let fut = builder.send();
        assert_send(fut);
    }

    #[tokio::test]
    async fn mock_client_works() {
        let mut mock = crate::mock::MockService::new();
        mock.add(
            "/get/",
            http::StatusCode::OK,
            http::HeaderMap::new(),
            b"frobulator".to_vec(),
        );

        let client =
            ApiClient::new_with_inner_service("http://httpbin.org/get/".parse().unwrap(), mock.clone());

        let response = client.get("").send().await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(mock.hits("/get/"), 1);
        assert_eq!(mock.requests(), 1);
    }

    #[tokio::test]
    async fn query_parameters_are_appended() {
        let mut mock = crate::mock::MockService::new();
        mock.add(
            "/search",
            http::StatusCode::OK,
            http::HeaderMap::new(),
            b"[]".to_vec(),
        );

        let client =
            ApiClient::new_with_inner_service("http://registry.test".parse().unwrap(), mock.clone());

        let response = client
            .get("search")
            .query(&[("query", "frobulator")])
            .unwrap()
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(response.uri().query(), Some("query=frobulator"));
        assert_eq!(mock.hits("/search"), 1);
    }
}
