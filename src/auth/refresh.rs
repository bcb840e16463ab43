//! Keeps a browser-style session alive by calling the console's refresh
//! endpoint on the interval it asks for, and logs out on the first failure.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{event, Level};

use super::error::RefreshError;
use super::session::COOKIE_NAME;
use super::{LOGOUT_ROUTE, REFRESH_ROUTE};
use crate::core::types::RedirectUri;

/// Shortest wait between two refreshes, in milliseconds.
pub const MIN_INTERVAL_MS: u64 = 10_000;

/// Body of a successful `/auth/refresh` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RefreshInterval {
    /// Milliseconds until the next refresh.
    pub interval: u64,
}

impl RefreshInterval {
    /// Reads a refresh body as sent by any server. The interval may be any
    /// JSON number and never comes back shorter than [`MIN_INTERVAL_MS`].
    pub fn parse(body: &str) -> Result<Duration, RefreshError> {
        #[derive(serde::Deserialize)]
        struct Raw {
            interval: f64,
        }

        let raw: Raw = serde_json::from_str(body).map_err(|e| RefreshError::Body(e.to_string()))?;
        let ms = raw.interval.max(MIN_INTERVAL_MS as f64);
        Ok(Duration::from_millis(ms as u64))
    }
}

#[async_trait]
pub trait RefreshTransport: Send + Sync {
    async fn refresh(&self) -> Result<Duration, RefreshError>;
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, url: &str);
}

/// Owner of at most one running refresh loop.
#[derive(Debug, Default)]
pub struct RefreshHandle {
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the loop unless this handle already did. Returns whether a loop
    /// was started by this call.
    pub fn start<T, N>(&mut self, origin: &RedirectUri, transport: T, navigator: N) -> bool
    where
        T: RefreshTransport + 'static,
        N: Navigator + 'static,
    {
        if self.task.is_some() {
            event!(Level::DEBUG, "Refresh loop already running");
            return false;
        }
        let logout_url = origin.join(LOGOUT_ROUTE);
        self.task = Some(tokio::spawn(run(transport, navigator, logout_url)));
        true
    }

    pub fn is_started(&self) -> bool {
        self.task.is_some()
    }

    /// Waits for the loop to end, which only happens after a failed refresh.
    pub async fn join(self) {
        if let Some(task) = self.task {
            if let Err(e) = task.await {
                event!(Level::ERROR, error = %e, "Refresh loop panicked");
            }
        }
    }
}

pub async fn run<T, N>(transport: T, navigator: N, logout_url: String)
where
    T: RefreshTransport,
    N: Navigator,
{
    loop {
        match transport.refresh().await {
            Ok(interval) => {
                let interval_ms = interval.as_millis() as u64;
                event!(Level::TRACE, interval_ms, "Session refreshed");
                tokio::time::sleep(interval).await;
            }
            Err(e) => {
                event!(Level::INFO, error = %e, "Error when refreshing access token. Ending session");
                navigator.navigate(&logout_url).await;
                return;
            }
        }
    }
}

fn cookie_header(cookie: &Mutex<String>) -> String {
    let value = cookie.lock().map(|c| c.clone()).unwrap_or_default();
    format!("{}={}", COOKIE_NAME, value)
}

/// Calls `{origin}/auth/refresh` carrying the session cookie, and keeps the
/// cookie the server hands back.
pub struct HttpRefreshTransport {
    client: reqwest::Client,
    url: String,
    cookie: Arc<Mutex<String>>,
}

impl HttpRefreshTransport {
    pub fn new(client: reqwest::Client, origin: &RedirectUri, session: String) -> Self {
        Self {
            client,
            url: origin.join(REFRESH_ROUTE),
            cookie: Arc::new(Mutex::new(session)),
        }
    }

    /// A navigator presenting whatever session this transport holds last.
    pub fn navigator(&self) -> HttpNavigator {
        HttpNavigator {
            client: self.client.clone(),
            cookie: self.cookie.clone(),
        }
    }

    fn remember(&self, response: &reqwest::Response) {
        let renewed = response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| cookie::Cookie::parse(v.to_string()).ok())
            .find(|c| c.name() == COOKIE_NAME && !c.value().is_empty());

        if let (Some(renewed), Ok(mut cookie)) = (renewed, self.cookie.lock()) {
            *cookie = renewed.value().to_string();
        }
    }
}

#[async_trait]
impl RefreshTransport for HttpRefreshTransport {
    async fn refresh(&self) -> Result<Duration, RefreshError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::COOKIE, cookie_header(&self.cookie))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Status(status.as_u16()));
        }
        self.remember(&response);

        let body = response.text().await?;
        RefreshInterval::parse(&body)
    }
}

/// Follows the logout redirect once, presenting the session so the console
/// can end it at the identity provider too.
pub struct HttpNavigator {
    client: reqwest::Client,
    cookie: Arc<Mutex<String>>,
}

#[async_trait]
impl Navigator for HttpNavigator {
    async fn navigate(&self, url: &str) {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::COOKIE, cookie_header(&self.cookie));
        match request.send().await {
            Ok(r) => event!(Level::INFO, status = r.status().as_u16(), url = %url, "Logged out"),
            Err(e) => event!(Level::WARN, error = %e, url = %url, "Logout navigation failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    #[derive(Clone, Default)]
    struct Scripted {
        replies: Arc<Mutex<VecDeque<Result<u64, u16>>>>,
        calls: Arc<Mutex<Vec<Instant>>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<u64, u16>>) -> Self {
            Self {
                replies: Arc::new(Mutex::new(replies.into())),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RefreshTransport for Scripted {
        async fn refresh(&self) -> Result<Duration, RefreshError> {
            self.calls.lock().unwrap().push(Instant::now());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(ms)) => Ok(Duration::from_millis(ms)),
                Some(Err(status)) => Err(RefreshError::Status(status)),
                None => Err(RefreshError::Body("script exhausted".to_string())),
            }
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl Navigator for Recorder {
        async fn navigate(&self, url: &str) {
            self.0.lock().unwrap().push(url.to_string());
        }
    }

    fn origin() -> RedirectUri {
        RedirectUri::new("https://console.example.com")
    }

    #[tokio::test(start_paused = true)]
    async fn reschedules_on_the_server_interval_until_a_failure() {
        let transport = Scripted::new(vec![Ok(5000), Ok(5000), Err(500)]);
        let navigator = Recorder::default();

        let mut handle = RefreshHandle::new();
        assert!(handle.start(&origin(), transport.clone(), navigator.clone()));
        handle.join().await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(5000));
        }
        assert_eq!(
            *navigator.0.lock().unwrap(),
            vec!["https://console.example.com/auth/redirect-logout".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn a_rejected_refresh_logs_out_once_and_stops() {
        let transport = Scripted::new(vec![Err(401), Ok(5000)]);
        let navigator = Recorder::default();

        let mut handle = RefreshHandle::new();
        handle.start(&origin(), transport.clone(), navigator.clone());
        handle.join().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(transport.calls().len(), 1);
        assert_eq!(navigator.0.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn a_handle_starts_at_most_one_loop() {
        let transport = Scripted::new(vec![Err(401)]);
        let navigator = Recorder::default();

        let mut first = RefreshHandle::new();
        assert!(first.start(&origin(), transport.clone(), navigator.clone()));
        assert!(!first.start(&origin(), transport.clone(), navigator.clone()));
        first.join().await;
        assert_eq!(transport.calls().len(), 1);

        let mut second = RefreshHandle::new();
        assert!(!second.is_started());
        assert!(second.start(&origin(), Scripted::new(vec![Err(401)]), navigator.clone()));
        second.join().await;
        assert_eq!(navigator.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn http_transport_reads_the_interval_and_keeps_the_renewed_cookie() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/refresh"))
            .and(header("cookie", "__session=old"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "__session=new; Path=/; HttpOnly")
                    .set_body_json(serde_json::json!({"interval": 5000})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpRefreshTransport::new(
            reqwest::Client::new(),
            &RedirectUri::new(&server.uri()),
            "old".to_string(),
        );
        assert_eq!(transport.refresh().await.unwrap(), Duration::from_millis(5000));
        assert_eq!(cookie_header(&transport.cookie), "__session=new");
    }

    #[tokio::test]
    async fn http_transport_treats_non_json_as_failure() {
        use wiremock::matchers::path;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let transport = HttpRefreshTransport::new(
            reqwest::Client::new(),
            &RedirectUri::new(&server.uri()),
            "old".to_string(),
        );
        assert!(matches!(transport.refresh().await, Err(RefreshError::Body(_))));
    }

    #[test]
    fn intervals_are_floored_and_may_be_fractional() {
        assert_eq!(
            RefreshInterval::parse(r#"{"interval": 0}"#).unwrap(),
            Duration::from_millis(MIN_INTERVAL_MS)
        );
        assert_eq!(
            RefreshInterval::parse(r#"{"interval": -5}"#).unwrap(),
            Duration::from_millis(MIN_INTERVAL_MS)
        );
        assert_eq!(
            RefreshInterval::parse(r#"{"interval": 30000.7}"#).unwrap(),
            Duration::from_millis(30000)
        );
        assert!(matches!(
            RefreshInterval::parse(r#"{"interval": "soon"}"#),
            Err(RefreshError::Body(_))
        ));
    }

    #[tokio::test]
    async fn forced_logout_presents_the_session() {
        use wiremock::matchers::{header, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/auth/redirect-logout"))
            .and(header("cookie", "__session=sealed"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let origin = RedirectUri::new(&server.uri());
        let transport = HttpRefreshTransport::new(reqwest::Client::new(), &origin, "sealed".to_string());
        let navigator = transport.navigator();

        let mut handle = RefreshHandle::new();
        handle.start(&origin, transport, navigator);
        handle.join().await;

        let requests = server.received_requests().await.unwrap();
        let logout = requests
            .iter()
            .find(|r| r.url.path() == "/auth/redirect-logout")
            .unwrap();
        assert_eq!(logout.headers.get("cookie").unwrap(), "__session=sealed");
    }

    #[tokio::test]
    async fn logout_uses_the_latest_renewed_session() {
        use wiremock::matchers::{header, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "__session=renewed; Path=/")
                    .set_body_json(serde_json::json!({"interval": 60000})),
            )
            .mount(&server)
            .await;
        Mock::given(path("/auth/redirect-logout"))
            .and(header("cookie", "__session=renewed"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let origin = RedirectUri::new(&server.uri());
        let transport = HttpRefreshTransport::new(reqwest::Client::new(), &origin, "first".to_string());
        transport.refresh().await.unwrap();
        transport.navigator().navigate(&origin.join(LOGOUT_ROUTE)).await;
    }
}
