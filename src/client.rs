//! Mandrill async client implementation.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::models::Variable;
use crate::{ApiError, Error, Message, Result, SendResult};

const BASE_URL: &str = "https://mandrillapp.com/api/1.0";
const USER_AGENT_VALUE: &str = concat!("mandrill-client-rs/", env!("CARGO_PKG_VERSION"));

const PING_PATH: &str = "/users/ping";
const SEND_PATH: &str = "/messages/send";
const SEND_TEMPLATE_PATH: &str = "/messages/send-template";

/// Async client for the Mandrill transactional email API.
///
/// Holds the API key and connection settings; cheap to share between tasks
/// by reference. Use [`Client::new`] for defaults or [`Client::builder`] to
/// override the endpoint, timeout, proxy or user agent.
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    proxy: Option<String>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Create a client with default settings.
    ///
    /// # Examples
    /// ```no_run
    /// # use mandrill_client::Client;
    /// # fn main() -> Result<(), mandrill_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// The API base URL requests are sent to, unless overridden per call.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// Validate the API key.
    ///
    /// Returns `Ok(())` when Mandrill accepts the key. No email is sent.
    ///
    /// # Examples
    /// ```no_run
    /// # use mandrill_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mandrill_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// client.ping().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn ping(&self) -> Result<()> {
        self.ping_with(&RequestOptions::default()).await
    }

    /// [`ping`](Self::ping) with per-call options.
    #[instrument(skip_all)]
    pub async fn ping_with(&self, options: &RequestOptions) -> Result<()> {
        let request = PingRequest { key: &self.api_key };
        self.post(PING_PATH, &request, options).await?;
        Ok(())
    }

    /// Send a message.
    ///
    /// # Arguments
    /// * `message` - The message to send
    /// * `async_send` - Ask Mandrill to queue the message instead of sending inline;
    ///   results then report `queued`
    ///
    /// # Returns
    /// One [`SendResult`] per recipient. Rejected recipients are reported
    /// here, not as errors.
    ///
    /// # Examples
    /// ```no_run
    /// # use mandrill_client::{Client, Message};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mandrill_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// let msg = Message::with_recipient("someone@example.com", "Someone")
    ///     .subject("Hello")
    ///     .from_email("noreply@example.com")
    ///     .text("Hi there");
    /// for result in client.send(&msg, false).await? {
    ///     println!("{}: {:?}", result.email, result.status);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send(&self, message: &Message, async_send: bool) -> Result<Vec<SendResult>> {
        self.send_with(message, async_send, &RequestOptions::default())
            .await
    }

    /// [`send`](Self::send) with per-call options.
    #[instrument(skip_all, fields(recipients = message.to.len(), async_send = async_send))]
    pub async fn send_with(
        &self,
        message: &Message,
        async_send: bool,
        options: &RequestOptions,
    ) -> Result<Vec<SendResult>> {
        let request = SendRequest {
            key: &self.api_key,
            message,
            async_send,
        };
        let body = self.post(SEND_PATH, &request, options).await?;
        parse_results(&body)
    }

    /// Send a message rendered from a stored template.
    ///
    /// # Arguments
    /// * `message` - The message; its content fields override the template's
    /// * `template_name` - Slug or name of the template in Mandrill
    /// * `content` - Editable region name to HTML content
    /// * `async_send` - Ask Mandrill to queue the message
    ///
    /// # Examples
    /// ```no_run
    /// # use mandrill_client::{Client, Message};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), mandrill_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// let msg = Message::with_recipient("someone@example.com", "Someone");
    /// let results = client
    ///     .send_template(&msg, "welcome", [("main", "<p>Welcome!</p>")], false)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_template<I, K, V>(
        &self,
        message: &Message,
        template_name: &str,
        content: I,
        async_send: bool,
    ) -> Result<Vec<SendResult>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.send_template_with(
            message,
            template_name,
            content,
            async_send,
            &RequestOptions::default(),
        )
        .await
    }

    /// [`send_template`](Self::send_template) with per-call options.
    #[instrument(
        skip_all,
        fields(template = template_name, recipients = message.to.len(), async_send = async_send)
    )]
    pub async fn send_template_with<I, K, V>(
        &self,
        message: &Message,
        template_name: &str,
        content: I,
        async_send: bool,
        options: &RequestOptions,
    ) -> Result<Vec<SendResult>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let template_content = Variable::from_pairs(content.into_iter().map(|(k, v)| {
            let v: String = v.into();
            (k, v)
        }));
        let request = SendTemplateRequest {
            key: &self.api_key,
            template_name,
            template_content,
            message,
            async_send,
        };
        let body = self.post(SEND_TEMPLATE_PATH, &request, options).await?;
        parse_results(&body)
    }

    /// POST a JSON envelope and return the body of a 200 response.
    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        request: &T,
        options: &RequestOptions,
    ) -> Result<Vec<u8>> {
        let base = options.base_url.as_deref().unwrap_or(&self.base_url);
        let url = format!("{}{}", base.trim_end_matches('/'), path);

        debug!(endpoint = path, "sending Mandrill request");
        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(endpoint = path, %status, len = body.len(), "received Mandrill response");

        if status != StatusCode::OK {
            return Err(match serde_json::from_slice::<ApiError>(&body) {
                Ok(err) => {
                    warn!(endpoint = path, code = err.code, name = %err.name, "Mandrill returned an error");
                    Error::Api(err)
                }
                Err(_) => {
                    warn!(endpoint = path, %status, "Mandrill returned an unrecognized error body");
                    Error::UnknownResponse {
                        status,
                        body: String::from_utf8_lossy(&body).into_owned(),
                    }
                }
            });
        }

        Ok(body.to_vec())
    }
}

/// An empty body is an empty result list.
fn parse_results(body: &[u8]) -> Result<Vec<SendResult>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(body).map_err(Into::into)
}

#[derive(Serialize)]
struct PingRequest<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    key: &'a str,
    message: &'a Message,
    #[serde(rename = "async")]
    async_send: bool,
}

#[derive(Serialize)]
struct SendTemplateRequest<'a> {
    key: &'a str,
    template_name: &'a str,
    template_content: Vec<Variable>,
    message: &'a Message,
    #[serde(rename = "async")]
    async_send: bool,
}

/// Per-call overrides for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    base_url: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send this request to a different API base URL, e.g. a local stub server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Builder for configuring a Mandrill client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    proxy: Option<String>,
    timeout: Option<Duration>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Mandrill's public API endpoint
    /// - No proxy
    /// - No request timeout beyond reqwest's own
    /// - `danger_accept_invalid_certs = false`
    /// - `mandrill-client-rs/<version>` user agent
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            proxy: None,
            timeout: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
        }
    }

    /// Override the API base URL.
    ///
    /// Useful for testing against a stub server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:1080").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Total timeout for each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Control whether to accept invalid TLS certificates (default: false).
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client. No network request is made.
    ///
    /// # Examples
    /// ```no_run
    /// # use std::time::Duration;
    /// # use mandrill_client::Client;
    /// # fn main() -> Result<(), mandrill_client::Error> {
    /// let client = Client::builder("my-api-key")
    ///     .timeout(Duration::from_secs(10))
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs)
            .user_agent(self.user_agent);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Client {
            http: builder.build()?,
            api_key: self.api_key,
            base_url: self.base_url,
            proxy: self.proxy,
        })
    }
}
