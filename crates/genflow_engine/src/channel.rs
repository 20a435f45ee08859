use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use url::Url;

use crate::ChannelError;

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            // Generation and scoring calls hold the connection open while they compute.
            request_timeout: Duration::from_secs(180),
        }
    }
}

/// One way of reaching the remote operations.
#[async_trait::async_trait]
pub trait Channel: Send + Sync {
    fn label(&self) -> &str;

    async fn invoke(&self, operation: &str, payload: &Value) -> Result<Value, ChannelError>;

    async fn probe(&self) -> Result<(), ChannelError>;
}

/// How operation names map onto URLs under the channel's base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Edge-function RPC: `{base}/functions/v1/{operation}`.
    Rpc,
    /// Direct HTTP API: `{base}/api/{operation}`.
    Http,
}

impl Route {
    fn path(self, operation: &str) -> String {
        match self {
            Route::Rpc => format!("functions/v1/{operation}"),
            Route::Http => format!("api/{operation}"),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Route::Rpc => "rpc",
            Route::Http => "http",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestChannel {
    route: Route,
    base: Url,
    auth: Option<HeaderValue>,
    client: reqwest::Client,
}

impl ReqwestChannel {
    pub fn new(
        route: Route,
        base_url: &str,
        token: Option<&str>,
        settings: &ChannelSettings,
    ) -> Result<Self, ChannelError> {
        let mut base = Url::parse(base_url)
            .map_err(|err| ChannelError::InvalidEndpoint(format!("{base_url}: {err}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let auth = token
            .map(|token| {
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|err| ChannelError::InvalidEndpoint(format!("auth header: {err}")))
            })
            .transpose()?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ChannelError::Network(err.to_string()))?;
        Ok(Self {
            route,
            base,
            auth,
            client,
        })
    }

    pub fn rpc(base_url: &str, token: Option<&str>, settings: &ChannelSettings) -> Result<Self, ChannelError> {
        Self::new(Route::Rpc, base_url, token, settings)
    }

    pub fn http(base_url: &str, token: Option<&str>, settings: &ChannelSettings) -> Result<Self, ChannelError> {
        Self::new(Route::Http, base_url, token, settings)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ChannelError> {
        self.base
            .join(path)
            .map_err(|err| ChannelError::InvalidEndpoint(err.to_string()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(value) => request.header(AUTHORIZATION, value.clone()),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl Channel for ReqwestChannel {
    fn label(&self) -> &str {
        self.route.label()
    }

    async fn invoke(&self, operation: &str, payload: &Value) -> Result<Value, ChannelError> {
        let url = self.endpoint(&self.route.path(operation))?;
        let body = serde_json::to_vec(payload).map_err(|err| ChannelError::Decode(err.to_string()))?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|err| ChannelError::Decode(err.to_string()))
    }

    async fn probe(&self) -> Result<(), ChannelError> {
        let url = self.endpoint("health")?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ChannelError::HttpStatus(status.as_u16()))
        }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ChannelError {
    if err.is_timeout() {
        return ChannelError::Timeout;
    }
    ChannelError::Network(err.to_string())
}
