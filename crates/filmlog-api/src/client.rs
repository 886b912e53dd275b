//! `FilmlogClient` - movie review backend client implementation.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::cookie::Jar;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::{LocalAuthApi, LocalLikeApi, LocalMemberApi, LocalMovieApi, LocalPostApi};
use super::error::ApiError;
use super::types::{
    ApiMessage, AuthCheck, ErrorBody, LikeUpdate, LoginRequest, Member, MemberMessage,
    MemberUpdate, Movie, MovieEntry, MovieImage, NewPost, NicknameCheck, PasswordCheck, Post,
    SocialJoinForm, Video,
};

/// Default base URL (the reverse-proxied backend in local development).
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";

/// Path of the logout endpoint, also hit by the blacklist interceptor.
const LOGOUT_PATH: &str = "member/logout";

/// Receives the forced logout triggered by a blacklisted access token.
pub trait SessionHook: Send + Sync + fmt::Debug {
    /// Called once per blacklisted response, after the logout request.
    fn on_forced_logout(&self);
}

/// Movie review backend client.
///
/// Every request carries the session cookie held in the shared jar.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FilmlogClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL ending in `/api/`.
    base_url: Url,
    /// Session cookie store.
    cookie_jar: Arc<Jar>,
    /// Notified when the interceptor logs the session out.
    session_hook: Option<Arc<dyn SessionHook>>,
}

/// Builder for `FilmlogClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct FilmlogClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    cookie_jar: Option<Arc<Jar>>,
    session_hook: Option<Arc<dyn SessionHook>>,
}

impl FilmlogClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            cookie_jar: None,
            session_hook: None,
        }
    }

    /// Overrides the base URL (deployment host, or wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Shares an existing cookie jar (e.g. one restored from disk).
    #[must_use]
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Registers the target of forced logouts.
    #[must_use]
    pub fn session_hook(mut self, hook: Arc<dyn SessionHook>) -> Self {
        self.session_hook = Some(hook);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<FilmlogClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let mut base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };
        // `Url::join` drops the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let cookie_jar = self.cookie_jar.unwrap_or_default();

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .cookie_provider(Arc::clone(&cookie_jar))
            .build()
            .context("failed to build HTTP client")?;

        Ok(FilmlogClient {
            http_client,
            base_url,
            cookie_jar,
            session_hook: self.session_hook,
        })
    }
}

impl FilmlogClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> FilmlogClientBuilder {
        FilmlogClientBuilder::new()
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session cookie store shared with the HTTP client.
    #[must_use]
    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.cookie_jar)
    }

    /// Resolves a backend path against the base URL.
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("failed to join URL path: {path}"))
    }

    /// Sends a request and applies the response interceptor.
    ///
    /// Non-success statuses become `ApiError::Status`. A 401 carrying the
    /// blacklist marker additionally logs the session out before the error
    /// is returned to the caller.
    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        let request = request
            .build()
            .with_context(|| format!("failed to build request: {path}"))?;

        tracing::debug!(method = %request.method(), url = %request.url(), "API request");

        let result = self.http_client.execute(request).await;
        let response = result
            .map_err(ApiError::from)
            .with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<failed to read body>"));
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|parsed| parsed.text().map(String::from))
            .unwrap_or(body);

        let error = ApiError::Status { status, message };
        if error.is_blacklisted() {
            self.force_logout().await;
        }

        Err(anyhow::Error::new(error).context(format!("{path} returned HTTP {status}")))
    }

    /// Logs the session out after a blacklisted-token response.
    ///
    /// Bypasses `send` so a failing logout cannot re-enter the interceptor.
    async fn force_logout(&self) {
        tracing::warn!("Access token is blacklisted. Logging out...");

        match self.url(LOGOUT_PATH) {
            Ok(url) => {
                let result = self
                    .http_client
                    .post(url)
                    .json(&serde_json::json!({}))
                    .send()
                    .await;
                match result {
                    Ok(response) if !response.status().is_success() => {
                        tracing::error!(status = %response.status(), "Error logging out");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "Error logging out"),
                }
            }
            Err(err) => tracing::error!(error = %err, "Error logging out"),
        }

        if let Some(hook) = &self.session_hook {
            hook.on_forced_logout();
        }
    }

    /// Decodes a JSON response body.
    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
        let body = response
            .text()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("failed to read response body: {path}"))?;
        let parsed = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: String::from(path),
            source,
        })?;
        Ok(parsed)
    }

    /// Decodes a body whose shape the backend does not pin down.
    ///
    /// Empty bodies become `null`, non-JSON text becomes a JSON string.
    async fn decode_loose(response: Response, path: &str) -> Result<serde_json::Value> {
        let body = response
            .text()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("failed to read response body: {path}"))?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body)))
    }

    /// Sends a GET request with query params and decodes the JSON body.
    #[instrument(skip_all)]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path)?;
        let response = self.send(self.http_client.get(url).query(query), path).await?;
        Self::decode(response, path).await
    }

    /// Sends a JSON body with the given method and returns the raw response.
    async fn send_json<B: serde::Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        let url = self.url(path)?;
        self.send(self.http_client.request(method, url).json(body), path)
            .await
    }
}

impl LocalAuthApi for FilmlogClient {
    #[instrument(skip_all)]
    async fn login(&self, username: &str, password: &str) -> Result<serde_json::Value> {
        let body = LoginRequest {
            username: String::from(username),
            password: String::from(password),
        };
        let response = self
            .send_json(reqwest::Method::POST, "login", &body)
            .await?;
        Self::decode_loose(response, "login").await
    }

    #[instrument(skip_all)]
    async fn logout(&self) -> Result<()> {
        self.send_json(reqwest::Method::POST, LOGOUT_PATH, &serde_json::json!({}))
            .await
            .inspect_err(|err| tracing::error!(error = %err, "Error logging out"))?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn check_auth(&self) -> Result<AuthCheck> {
        self.get_json("member/check_auth", &[]).await
    }

    #[instrument(skip_all)]
    async fn refresh_token(&self) -> Result<serde_json::Value> {
        let path = "member/check_auth/refresh";
        let response = self
            .send_json(reqwest::Method::POST, path, &serde_json::json!({}))
            .await
            .context("Failed to refresh token")?;
        Self::decode_loose(response, path).await
    }
}

impl LocalMemberApi for FilmlogClient {
    #[instrument(skip_all)]
    async fn profile(&self) -> Result<Member> {
        self.get_json("member/profile", &[])
            .await
            .inspect_err(|err| tracing::error!(error = %err, "failed to fetch profile"))
    }

    #[instrument(skip_all)]
    async fn update_member(&self, update: &MemberUpdate) -> Result<MemberMessage> {
        let path = "member/update";
        let response = self
            .send_json(reqwest::Method::PUT, path, update)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "member update rejected"))
            .context("개인정보 수정 중 오류가 발생했습니다.")?;
        Self::decode(response, path).await
    }

    #[instrument(skip_all)]
    async fn check_nickname(&self, nickname: &str) -> Result<bool> {
        let query = [("nickname", String::from(nickname))];
        let check: NicknameCheck = self.get_json("member/checkNickname", &query).await?;
        Ok(check.is_duplicate)
    }

    #[instrument(skip_all)]
    async fn verify_password(&self, password: &str) -> Result<bool> {
        let path = "member/verifyPw";
        let response = self
            .send_json(
                reqwest::Method::POST,
                path,
                &serde_json::json!({ "password": password }),
            )
            .await?;
        let check: PasswordCheck = Self::decode(response, path).await?;
        Ok(check.is_valid)
    }

    #[instrument(skip_all)]
    async fn other_profile(&self, nickname: &str) -> Result<Member> {
        let query = [("nickname", String::from(nickname))];
        self.get_json("member/otherProfile", &query)
            .await
            .inspect_err(|err| tracing::error!(error = %err, nickname, "failed to fetch profile"))
    }

    #[instrument(skip_all)]
    async fn social_join(&self, form: &SocialJoinForm) -> Result<MemberMessage> {
        let path = "member/socialJoin";
        let response = self
            .send_json(reqwest::Method::PUT, path, form)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "social join rejected"))
            .context("소셜 회원가입 중 오류가 발생했습니다.")?;
        Self::decode(response, path).await
    }

    #[instrument(skip_all)]
    async fn delete_member(&self, member_no: u64) -> Result<ApiMessage> {
        let path = format!("member/delete/{member_no}");
        let url = self.url(&path)?;
        let response = self
            .send(self.http_client.delete(url), &path)
            .await
            .inspect_err(|err| tracing::error!(error = %err, member_no, "member delete rejected"))
            .context("멤버 삭제 중 오류가 발생했습니다.")?;
        Self::decode(response, &path).await
    }

    #[instrument(skip_all)]
    async fn member_image(&self, member_no: u64) -> Result<Option<Vec<u8>>> {
        let path = format!("image/read/{member_no}");
        let url = self.url(&path)?;
        let response = match self.send(self.http_client.get(url), &path).await {
            Ok(response) => response,
            Err(err) if ApiError::from_anyhow(&err).is_some_and(ApiError::is_not_found) => {
                tracing::info!(member_no, "member has no profile image");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let bytes = response
            .bytes()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("failed to read image body: {path}"))?;
        Ok((!bytes.is_empty()).then(|| bytes.to_vec()))
    }

    #[instrument(skip_all)]
    async fn delete_member_image(&self, member_no: u64) -> Result<()> {
        let path = format!("image/delete/{member_no}");
        let url = self.url(&path)?;
        self.send(self.http_client.delete(url), &path).await?;
        Ok(())
    }
}

impl LocalMovieApi for FilmlogClient {
    #[instrument(skip_all)]
    async fn now_playing(&self) -> Result<Vec<MovieEntry>> {
        self.get_json("movies/now_playing", &[]).await
    }

    #[instrument(skip_all)]
    async fn top_rated(&self) -> Result<Vec<MovieEntry>> {
        self.get_json("movies/top_rated", &[]).await
    }

    #[instrument(skip_all)]
    async fn top_liked(&self) -> Result<Vec<MovieEntry>> {
        self.get_json("movies/top_liked", &[]).await
    }

    #[instrument(skip_all)]
    async fn movie(&self, movie_id: u64) -> Result<Movie> {
        self.get_json(&format!("movies/{movie_id}"), &[]).await
    }

    #[instrument(skip_all)]
    async fn videos(&self, movie_id: u64) -> Result<Vec<Video>> {
        self.get_json(&format!("movies/videos/{movie_id}"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn images(&self, movie_id: u64) -> Result<Vec<MovieImage>> {
        self.get_json(&format!("movies/images/{movie_id}"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn liked_movies(&self, member_no: u64) -> Result<Vec<u64>> {
        self.get_json(&format!("movies/likes/{member_no}"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn search(&self, keyword: &str, page: u32) -> Result<Vec<Movie>> {
        let query = [
            ("keyword", String::from(keyword)),
            ("page", page.to_string()),
        ];
        self.get_json("movies/search", &query).await
    }
}

impl LocalPostApi for FilmlogClient {
    #[instrument(skip_all)]
    async fn posts_by_movie(&self, movie_id: u64) -> Result<Vec<Post>> {
        self.get_json(&format!("posts/movie/{movie_id}"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn posts_by_member(&self, member_no: u64) -> Result<Vec<Post>> {
        self.get_json(&format!("posts/{member_no}"), &[]).await
    }

    #[instrument(skip_all)]
    async fn average_rating(&self, movie_id: u64) -> Result<f64> {
        self.get_json(&format!("posts/average-rating/{movie_id}"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn register_post(&self, post: &NewPost) -> Result<()> {
        self.send_json(reqwest::Method::POST, "posts/register", post)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "Error submitting post"))?;
        tracing::info!(movie_id = post.movie_id, "Post submitted successfully");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn delete_post(&self, post_id: u64) -> Result<()> {
        let path = format!("posts/delete/{post_id}");
        let url = self.url(&path)?;
        self.send(self.http_client.delete(url), &path)
            .await
            .inspect_err(|err| tracing::error!(error = %err, post_id, "Failed to delete post"))?;
        Ok(())
    }
}

impl LocalLikeApi for FilmlogClient {
    #[instrument(skip_all)]
    async fn like_status(&self, member_no: u64, movie_id: u64) -> Result<bool> {
        let query = [
            ("memberNo", member_no.to_string()),
            ("movieId", movie_id.to_string()),
        ];
        self.get_json("likes/status", &query).await
    }

    #[instrument(skip_all)]
    async fn like_count(&self, movie_id: u64) -> Result<u64> {
        let query = [("movieId", movie_id.to_string())];
        self.get_json("likes/likesMovie", &query).await
    }

    #[instrument(skip_all)]
    async fn update_like(&self, update: &LikeUpdate) -> Result<()> {
        self.send_json(reqwest::Method::POST, "likes/update", update)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "Error updating like status"))?;
        Ok(())
    }
}
