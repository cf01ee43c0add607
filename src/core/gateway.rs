use crate::core::{ConfigProvider, SessionStore};
use crate::utils::error::Result;
use crate::utils::validation::validate_url;
use reqwest::{Client, Method, RequestBuilder};
use std::sync::Arc;
use url::Url;

/// HTTP client bound to one base URL. Every request built here carries the
/// current session token as a bearer header when one exists.
#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiGateway {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        validate_url("api.base_url", base_url)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::new(config.base_url(), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Ok(Url::parse(&url)?)
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        tracing::debug!("Building {} request to: {}", method, url);

        let builder = self.client.request(method, url);

        // 每次請求都重新讀取 token，不做快取
        match self.session.token().filter(|token| !token.is_empty()) {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => {
                tracing::debug!("No session token, sending request unauthenticated");
                Ok(builder)
            }
        }
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::POST, path)
    }
}
