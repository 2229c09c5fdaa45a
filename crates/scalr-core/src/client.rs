//! HTTP client for the Scalr API
//!
//! [`ScalrClient`] owns the transport: bearer auth, JSON:API media types,
//! static headers, and mapping of error responses onto [`ScalrError`].
//! It issues exactly one request per call; there is no retry layer.

use crate::context::Context;
use crate::error::{Result, ScalrError};
use crate::jsonapi::{Document, ErrorDocument, MEDIA_TYPE, RequestDocument, Resource, ResourceObject};
use crate::pagination::{ListQuery, Page};
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Default service address
pub const DEFAULT_ADDRESS: &str = "https://scalr.io";

/// Default API root path
pub const DEFAULT_BASE_PATH: &str = "/api/iacp/v3/";

/// User agent string for scalrctl HTTP requests
pub const USER_AGENT: &str = concat!("scalrctl/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the service address
pub const ADDRESS_ENV: &str = "SCALR_ADDRESS";

/// Environment variable holding the API root path
pub const BASE_PATH_ENV: &str = "SCALR_BASE_PATH";

/// Environment variable holding the bearer token
pub const TOKEN_ENV: &str = "SCALR_TOKEN";

/// Settings used to construct a [`ScalrClient`]
///
/// ```rust
/// use scalr_core::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_address("https://example.scalr.io")
///     .with_token("secret")
///     .with_header("Prefer", "profile=preview");
/// assert_eq!(config.base_path, "/api/iacp/v3/");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `https://example.scalr.io`
    pub address: String,
    /// API root path appended to the address
    pub base_path: String,
    /// Bearer credential
    pub token: String,
    /// Additional static headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Transport-level timeout for each request
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            token: String::new(),
            headers: BTreeMap::new(),
            timeout: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("address", &self.address)
            .field("base_path", &self.base_path)
            .field("token", &"<redacted>")
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Defaults overridden by `SCALR_ADDRESS`, `SCALR_BASE_PATH` and `SCALR_TOKEN`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(address) = std::env::var(ADDRESS_ENV) {
            config.address = address;
        }
        if let Ok(base_path) = std::env::var(BASE_PATH_ENV) {
            config.base_path = base_path;
        }
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            config.token = token;
        }
        config
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Client for the Scalr API
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ScalrClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ScalrClient {
    /// Build a client, validating the configuration
    ///
    /// Fails with [`ScalrError::Configuration`] when the token is empty,
    /// the address is not an absolute http(s) URL, or a header is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(ScalrError::Configuration(format!(
                "API token is required (set it in the profile or via {TOKEN_ENV})"
            )));
        }

        let address = Url::parse(config.address.trim()).map_err(|e| {
            ScalrError::Configuration(format!("Invalid address '{}': {}", config.address, e))
        })?;
        if !matches!(address.scheme(), "http" | "https") || address.host_str().is_none() {
            return Err(ScalrError::Configuration(format!(
                "Invalid address '{}': expected an http(s) URL with a host",
                config.address
            )));
        }
        let base_url = join_base_path(&address, &config.base_path);

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|_| ScalrError::Configuration("API token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                ScalrError::Configuration(format!("Invalid header name '{}': {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ScalrError::Configuration(format!("Invalid value for header '{}': {}", name, e))
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            ScalrError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        debug!(base_url = %base_url, "Created Scalr client");
        Ok(Self { http, base_url })
    }

    /// Root URL all resource paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ScalrError::Configuration(format!("Invalid request path '{}': {}", path, e)))
    }

    /// Send one request and return the body of a successful response
    async fn execute(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&RequestDocument>,
    ) -> Result<String> {
        let url = self.url(path)?;
        let payload = body.map(serde_json::to_vec).transpose()?;

        ctx.run(async move {
            debug!(%method, %url, "Sending request");
            let mut request = self.http.request(method.clone(), url.clone());
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(payload) = payload {
                request = request
                    .header(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE))
                    .body(payload);
            }

            let response = request.send().await?;
            let status = response.status();
            let text = response.text().await?;
            trace!(%method, %url, status = status.as_u16(), body = %text, "Received response");

            if status.is_success() {
                Ok(text)
            } else {
                let fallback = status.canonical_reason().unwrap_or("Request failed");
                let (message, details) = ErrorDocument::summarize(&text, fallback);
                debug!(%method, %url, status = status.as_u16(), %message, "Request rejected");
                Err(ScalrError::from_status(status.as_u16(), message, details))
            }
        })
        .await
    }

    /// GET a single resource
    pub async fn get<T: Resource>(
        &self,
        ctx: &Context,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        let body = self.execute(ctx, Method::GET, path, query, None).await?;
        let document: Document<ResourceObject> = serde_json::from_str(&body)?;
        document.into_resource()
    }

    /// GET exactly one page of a collection
    pub async fn list_page<T: Resource, Q: ListQuery>(
        &self,
        ctx: &Context,
        path: &str,
        query: &Q,
    ) -> Result<Page<T>> {
        let body = self
            .execute(ctx, Method::GET, path, &query.to_query(), None)
            .await?;
        let document: Document<Vec<ResourceObject>> = serde_json::from_str(&body)?;
        let (items, meta) = document.into_resources()?;
        let page = Page::new(items, meta.pagination, query.list_options());
        debug!(
            path,
            page = page.current_page(),
            items = page.len(),
            total = page.total_count(),
            "Fetched page"
        );
        Ok(page)
    }

    /// Walk every page of a collection starting at the query's page number
    pub async fn list_all<T: Resource, Q: ListQuery>(
        &self,
        ctx: &Context,
        path: &str,
        query: &Q,
    ) -> Result<Vec<T>> {
        let mut query = query.clone();
        let mut items = Vec::new();
        loop {
            let requested = query.list_options().page_number.unwrap_or(1);
            let page: Page<T> = self.list_page(ctx, path, &query).await?;
            // The service must honor page[number] for the walk to end
            if page.current_page() != requested {
                return Err(ScalrError::Decode(format!(
                    "{path}: requested page {requested} but received page {}",
                    page.current_page()
                )));
            }
            let next = page.next_page();
            items.extend(page.into_items());
            match next {
                Some(next) => query.list_options_mut().page_number = Some(next),
                None => break,
            }
        }
        Ok(items)
    }

    /// POST a new resource
    pub async fn create<T: Resource>(
        &self,
        ctx: &Context,
        path: &str,
        object: ResourceObject,
    ) -> Result<T> {
        let document = RequestDocument { data: object };
        let body = self
            .execute(ctx, Method::POST, path, &[], Some(&document))
            .await?;
        let document: Document<ResourceObject> = serde_json::from_str(&body)?;
        document.into_resource()
    }

    /// PATCH an existing resource with the attributes set on `object`
    pub async fn update<T: Resource>(
        &self,
        ctx: &Context,
        path: &str,
        object: ResourceObject,
    ) -> Result<T> {
        let document = RequestDocument { data: object };
        let body = self
            .execute(ctx, Method::PATCH, path, &[], Some(&document))
            .await?;
        let document: Document<ResourceObject> = serde_json::from_str(&body)?;
        document.into_resource()
    }

    /// DELETE a resource
    pub async fn delete(&self, ctx: &Context, path: &str) -> Result<()> {
        self.execute(ctx, Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}

fn join_base_path(address: &Url, base_path: &str) -> Url {
    let mut url = address.clone();
    let prefix = address.path().trim_end_matches('/');
    let suffix = base_path.trim_matches('/');
    let path = if suffix.is_empty() {
        format!("{prefix}/")
    } else {
        format!("{prefix}/{suffix}/")
    };
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Reject ids that are empty or could change the request path
pub(crate) fn validate_id(kind: &'static str, id: &str) -> Result<()> {
    let allowed = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if id.is_empty() || !allowed || id.chars().all(|c| c == '.') {
        return Err(ScalrError::InvalidId {
            kind,
            id: id.to_string(),
        });
    }
    Ok(())
}
