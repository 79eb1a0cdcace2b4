use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use shared::{
    domain::{Bookmark, BookmarkId, NewBookmark, OAuthProvider, UserId},
    error::{ApiError, ErrorCode},
    protocol::AuthUser,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

use crate::{
    error::{ClientError, Operation, Result},
    realtime,
    remote::{AuthBackend, BookmarkTable, ChangeFeed, Subscription},
};

const BOOKMARKS_TABLE: &str = "bookmarks";
const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub project_url: Url,
    pub anon_key: String,
    pub redirect_to: Option<String>,
    pub heartbeat_interval: Duration,
}

impl SupabaseConfig {
    pub fn new(project_url: &str, anon_key: impl Into<String>) -> Result<Self> {
        let project_url = Url::parse(project_url.trim())
            .map_err(|err| ClientError::Config(format!("project url {project_url:?}: {err}")))?;
        if !matches!(project_url.scheme(), "http" | "https") {
            return Err(ClientError::Config(
                "project url must start with http:// or https://".to_string(),
            ));
        }
        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(ClientError::Config("anon key is empty".to_string()));
        }
        Ok(Self {
            project_url,
            anon_key,
            redirect_to: None,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        })
    }

    pub fn with_redirect_to(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = Some(redirect_to.into());
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.project_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone)]
struct AuthTokens {
    access_token: String,
    refresh_token: Option<String>,
}

/// Hosted-store client: auth, the `bookmarks` rows and the realtime feed.
pub struct SupabaseClient {
    http: Client,
    config: SupabaseConfig,
    tokens: RwLock<Option<AuthTokens>>,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            http: Client::new(),
            config,
            tokens: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Installs an access token obtained out of band.
    pub async fn set_access_token(&self, access_token: impl Into<String>) {
        *self.tokens.write().await = Some(AuthTokens {
            access_token: access_token.into(),
            refresh_token: None,
        });
    }

    pub async fn has_session(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    async fn bearer(&self) -> String {
        match self.tokens.read().await.as_ref() {
            Some(tokens) => tokens.access_token.clone(),
            None => self.config.anon_key.clone(),
        }
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(self.bearer().await)
    }

    fn rest(&self, table: &str) -> String {
        self.config.endpoint(&format!("rest/v1/{table}"))
    }
}

async fn check(operation: Operation, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::remote(
        operation,
        ApiError::from_response(status.as_u16(), &body),
    ))
}

/// Reads the tokens from an implicit-grant redirect. The provider puts them in
/// the fragment; some proxies move them to the query string.
pub(crate) fn parse_callback(callback: &Url) -> Result<(String, Option<String>)> {
    let mut pairs: Vec<(String, String)> = callback
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if let Some(fragment) = callback.fragment() {
        pairs.extend(
            url::form_urlencoded::parse(fragment.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned())),
        );
    }
    let lookup = |name: &str| {
        pairs
            .iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.clone())
    };

    if let Some(error) = lookup("error") {
        let description = lookup("error_description").unwrap_or(error);
        return Err(ClientError::Callback(description));
    }
    if lookup("code").is_some() && lookup("access_token").is_none() {
        return Err(ClientError::Callback(
            "authorization code redirects are not supported; enable the implicit flow"
                .to_string(),
        ));
    }
    let access_token = lookup("access_token")
        .ok_or_else(|| ClientError::Callback("redirect carries no access_token".to_string()))?;
    Ok((access_token, lookup("refresh_token")))
}

#[async_trait]
impl AuthBackend for SupabaseClient {
    async fn get_user(&self) -> Result<Option<AuthUser>> {
        if !self.has_session().await {
            return Ok(None);
        }
        let request = self.http.get(self.config.endpoint("auth/v1/user"));
        let response = self
            .authorized(request)
            .await
            .send()
            .await
            .map_err(ClientError::transport(Operation::GetUser))?;
        let user = check(Operation::GetUser, response)
            .await?
            .json::<AuthUser>()
            .await
            .map_err(ClientError::transport(Operation::GetUser))?;
        Ok(Some(user))
    }

    async fn sign_in_with_oauth(&self, provider: OAuthProvider) -> Result<Url> {
        let mut url = Url::parse(&self.config.endpoint("auth/v1/authorize"))
            .map_err(|err| ClientError::Config(err.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider.as_str());
            if let Some(redirect_to) = &self.config.redirect_to {
                query.append_pair("redirect_to", redirect_to);
            }
        }
        Ok(url)
    }

    async fn complete_oauth(&self, callback: &Url) -> Result<()> {
        let (access_token, refresh_token) = parse_callback(callback)?;
        *self.tokens.write().await = Some(AuthTokens {
            access_token,
            refresh_token,
        });
        info!("auth: session tokens installed from oauth redirect");
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        let Some(tokens) = self.tokens.write().await.take() else {
            return Ok(());
        };
        debug!(
            has_refresh_token = tokens.refresh_token.is_some(),
            "auth: revoking session"
        );
        let response = self
            .http
            .post(self.config.endpoint("auth/v1/logout"))
            .query(&[("scope", "global")])
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(ClientError::transport(Operation::SignOut))?;
        match check(Operation::SignOut, response).await {
            // The session was already gone remotely.
            Err(err)
                if matches!(
                    err.remote_code(),
                    Some(ErrorCode::Unauthorized | ErrorCode::Forbidden | ErrorCode::NotFound)
                ) =>
            {
                Ok(())
            }
            result => result.map(|_| ()),
        }
    }
}

#[async_trait]
impl BookmarkTable for SupabaseClient {
    async fn list(&self, owner: UserId) -> Result<Vec<Bookmark>> {
        let request = self.http.get(self.rest(BOOKMARKS_TABLE)).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{owner}")),
            ("order", "id.desc".to_string()),
        ]);
        let response = self
            .authorized(request)
            .await
            .send()
            .await
            .map_err(ClientError::transport(Operation::Load))?;
        check(Operation::Load, response)
            .await?
            .json::<Vec<Bookmark>>()
            .await
            .map_err(ClientError::transport(Operation::Load))
    }

    async fn insert(&self, bookmark: &NewBookmark) -> Result<Bookmark> {
        let request = self
            .http
            .post(self.rest(BOOKMARKS_TABLE))
            .header("Prefer", "return=representation")
            .header(header::ACCEPT, "application/vnd.pgrst.object+json")
            .json(bookmark);
        let response = self
            .authorized(request)
            .await
            .send()
            .await
            .map_err(ClientError::transport(Operation::Add))?;
        check(Operation::Add, response)
            .await?
            .json::<Bookmark>()
            .await
            .map_err(ClientError::transport(Operation::Add))
    }

    async fn delete(&self, id: BookmarkId) -> Result<()> {
        let request = self
            .http
            .delete(self.rest(BOOKMARKS_TABLE))
            .query(&[("id", format!("eq.{id}"))]);
        let response = self
            .authorized(request)
            .await
            .send()
            .await
            .map_err(ClientError::transport(Operation::Remove))?;
        check(Operation::Remove, response).await?;
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for SupabaseClient {
    async fn subscribe(&self, owner: UserId) -> Result<Subscription> {
        let socket_url = realtime::socket_url(&self.config)?;
        let access_token = self.bearer().await;
        realtime::subscribe(
            &socket_url,
            &access_token,
            owner,
            self.config.heartbeat_interval,
        )
        .await
    }
}

#[cfg(test)]
#[path = "tests/supabase_tests.rs"]
mod tests;
