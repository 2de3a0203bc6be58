use http::StatusCode;
use hyperdriver::Body;
use tower::retry::Policy;

/// A policy for retrying requests with exponential backoff
#[derive(Debug, Clone)]
pub struct Backoff {
    /// The initial delay for the backoff
    pub delay: std::time::Duration,

    /// The exponent to increase the delay by
    pub exponent: u32,

    /// The maximum delay for the backoff
    pub max_delay: std::time::Duration,
}

impl Backoff {
    /// Create a new backoff policy.
    pub fn new(delay: std::time::Duration, exponent: u32, max_delay: std::time::Duration) -> Self {
        Self {
            delay,
            exponent,
            max_delay,
        }
    }

    /// Increment the backoff delay
    pub fn increment(&self) -> Option<Self> {
        let delay = self.delay.checked_mul(self.exponent)?;

        if delay >= self.max_delay {
            return None;
        }

        Some(Self {
            delay,
            exponent: self.exponent,
            max_delay: self.max_delay,
        })
    }

    /// Create a new backoff policy when the server has rate limited the request
    /// with a specific delay. The policy will continue as normal after the delay.
    pub fn rate_limited(&self, delay: std::time::Duration) -> Self {
        Self {
            delay,
            exponent: self.exponent,
            max_delay: self.max_delay,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(
            std::time::Duration::from_millis(500),
            2,
            std::time::Duration::from_secs(30),
        )
    }
}

impl<E> Policy<http::Request<Body>, http::Response<Body>, E> for Backoff {
    type Future = BackoffFuture;

    fn retry(
        &mut self,
        req: &mut http::Request<Body>,
        result: &mut Result<http::Response<Body>, E>,
    ) -> Option<Self::Future> {
        let backoff = self.increment()?;
        // Step the policy so the next attempt waits longer.
        *self = backoff.clone();
        match result {
            Ok(res) => match res.status() {
                StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => {
                    tracing::debug!("retrying request to {} due to timeout", req.uri());
                    Some(BackoffFuture::new(backoff))
                }
                status if status.is_server_error() => {
                    tracing::debug!("retrying request to {} due to server error", req.uri());
                    Some(BackoffFuture::new(backoff))
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    tracing::debug!("retrying request to {} due to rate limit", req.uri());
                    Some(BackoffFuture::new(
                        res.headers()
                            .get(http::header::RETRY_AFTER)
                            .and_then(|value| {
                                value.to_str().ok().and_then(|value| {
                                    value.parse::<u64>().ok().map(|value| {
                                        let delay = std::time::Duration::from_secs(value);
                                        self.rate_limited(delay)
                                    })
                                })
                            })
                            .unwrap_or(backoff),
                    ))
                }
                _ => None,
            },
            Err(_) => {
                tracing::warn!("retrying request to {} due to error", req.uri());
                Some(BackoffFuture::new(backoff))
            }
        }
    }

    fn clone_request(&mut self, req: &http::Request<Body>) -> Option<http::Request<Body>> {
        try_clone_request(req)
    }
}

fn try_clone_request(req: &http::Request<Body>) -> Option<http::Request<Body>> {
    let body = req.body().try_clone()?;

    let mut next = http::Request::builder()
        .method(req.method().clone())
        .uri(req.uri().clone())
        .version(req.version())
        .body(body)
        .unwrap();

    *next.extensions_mut() = req.extensions().clone();
    *next.headers_mut() = req.headers().clone();

    Some(next)
}

/// Future which delays the retried request until the backoff has elapsed.
#[derive(Debug)]
#[pin_project::pin_project]
pub struct BackoffFuture {
    #[pin]
    sleep: tokio::time::Sleep,
}

impl BackoffFuture {
    /// Create a new future from a backoff policy.
    pub fn new(backoff: Backoff) -> Self {
        Self {
            sleep: tokio::time::sleep(backoff.delay),
        }
    }
}

impl std::future::Future for BackoffFuture {
    type Output = ();

    fn poll(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        let this = self.project();
        this.sleep.poll(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_increments_until_max() {
        let backoff = Backoff::new(
            std::time::Duration::from_millis(100),
            2,
            std::time::Duration::from_millis(500),
        );

        let next = backoff.increment().unwrap();
        assert_eq!(next.delay, std::time::Duration::from_millis(200));

        let next = next.increment().unwrap();
        assert_eq!(next.delay, std::time::Duration::from_millis(400));

        assert!(next.increment().is_none());
    }

    #[test]
    fn rate_limited_overrides_delay() {
        let backoff = Backoff::default();
        let limited = backoff.rate_limited(std::time::Duration::from_secs(7));
        assert_eq!(limited.delay, std::time::Duration::from_secs(7));
        assert_eq!(limited.max_delay, backoff.max_delay);
    }

    #[tokio::test]
    async fn persistent_server_errors_stop_retrying() {
        let mut backoff = Backoff::new(
            std::time::Duration::from_millis(100),
            2,
            std::time::Duration::from_millis(500),
        );

        let mut req = http::Request::builder()
            .uri("http://registry.test/v1/package-search")
            .body(Body::empty())
            .unwrap();
        let mut result: Result<http::Response<Body>, hyperdriver::client::Error> = Ok(
            http::Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty())
                .unwrap(),
        );

        let mut retries = 0;
        while backoff.retry(&mut req, &mut result).is_some() {
            retries += 1;
        }

        assert_eq!(retries, 2);
    }
}
