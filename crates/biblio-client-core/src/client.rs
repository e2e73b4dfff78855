use biblio_shared::{const_config::client::CLIENT_DEFAULT_API_URL, token::AuthToken};
use closure_traits::{ChannelCallBack, ChannelCallBackOutput};
use futures::channel::oneshot;
use reqwest::{
    header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode,
};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    image::resolve_image_url,
    storage::{MemoryStorage, SessionStorage},
    ApiError, SessionStore,
};

mod api;
pub mod options;

use options::{RequestBody, RequestOptions};

/// The only way the application talks to the backend
///
/// Attaches the current credential to every request, normalizes every error
/// into [`ApiError`] and ends the session when the backend stops accepting
/// its token. Clones share the same session.
#[derive(Debug, Clone)]
pub struct Client {
    api_client: reqwest::Client,
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    base_url: String,
    session: SessionStore,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(CLIENT_DEFAULT_API_URL.to_string(), MemoryStorage::new())
    }
}

impl ClientInner {
    #[tracing::instrument(skip(session))]
    fn new(base_url: String, session: SessionStore) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url, session }
    }
}

impl Client {
    /// Restores any persisted session from `storage` before returning
    #[tracing::instrument(name = "NEW CLIENT-CORE", skip(storage))]
    pub fn new<S: SessionStorage + 'static>(base_url: String, storage: S) -> Self {
        Self::with_session(base_url, SessionStore::new(storage))
    }

    pub fn with_session(base_url: String, session: SessionStore) -> Self {
        Self {
            api_client: reqwest::Client::new(),
            inner: Arc::new(ClientInner::new(base_url, session)),
        }
    }

    /// Builds a client persisting its session in the configured folder
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_config(config: &crate::ClientConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            crate::storage::FileStorage::new(config.session_dir.clone()),
        )
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Resolves a cover image path returned by the backend into a usable URL
    pub fn image_url(&self, path: Option<&str>) -> String {
        resolve_image_url(self.base_url(), path)
    }

    /// Sends a request to `path` (relative to the base URL) and returns the
    /// decoded JSON body
    ///
    /// An empty success body is returned as [`Value::Null`]
    // WARNING: Must skip options as the body may contain sensitive info
    #[tracing::instrument(skip(self, options, ui_notify), fields(method = %options.method))]
    pub fn request<F>(
        &self,
        path: &str,
        options: RequestOptions,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<Value, ApiError>>
    where
        F: UiCallBack,
    {
        self.send_request_expect_json(path, options, ui_notify)
    }

    /// Same as [`Self::request`] but decodes the body into `U`
    #[tracing::instrument(skip(self, options, ui_notify), fields(method = %options.method))]
    pub fn request_json<F, U>(
        &self,
        path: &str,
        options: RequestOptions,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<U, ApiError>>
    where
        F: UiCallBack,
        U: Send + Debug + serde::de::DeserializeOwned + 'static,
    {
        self.send_request_expect_json(path, options, ui_notify)
    }

    fn send_request_expect_json<F, U>(
        &self,
        path: &str,
        options: RequestOptions,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<U, ApiError>>
    where
        F: UiCallBack,
        U: Send + Debug + serde::de::DeserializeOwned + 'static,
    {
        let (tx, rx) = oneshot::channel();
        // Snapshot so a 401 can be matched against the token actually sent
        let token = self.session().token();
        let caller_sets_credential = options.headers.contains_key(AUTHORIZATION);
        let request = self.build_request(path, options, token.as_ref());
        // A rejection of the caller's own credential says nothing about the session
        let token = token.filter(|_| !caller_sets_credential);
        let session = self.session().clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_json_body(resp, &session, token.as_ref()).await;
            send_outcome(tx, msg);
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }

    fn build_request(
        &self,
        path: &str,
        options: RequestOptions,
        token: Option<&AuthToken>,
    ) -> reqwest::RequestBuilder {
        let RequestOptions {
            method,
            body,
            headers,
        } = options;
        let needs_json_default =
            method != Method::GET && body.defaults_to_json() && !headers.contains_key(CONTENT_TYPE);
        let mut request = self.api_client.request(method, self.path_to_url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token.expose());
        }
        // Must come before the body so reqwest does not add a second one
        if needs_json_default {
            request = request.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Form(fields) => request.form(&fields),
            RequestBody::Multipart(form) => request.multipart(form),
            RequestBody::Text(text) => request.body(text),
        };
        // Caller supplied headers replace anything set above
        request.headers(headers)
    }

    fn initiate_request<F, O>(&self, request: reqwest::RequestBuilder, on_done: F)
    where
        F: ChannelCallBack<O>,
        O: ChannelCallBackOutput,
    {
        reqwest_cross::fetch(request, on_done)
    }

    #[tracing::instrument(ret, skip(self))]
    fn path_to_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url())
        } else {
            format!("{}/{path}", self.base_url())
        }
    }
}

#[tracing::instrument(ret, err(Debug), skip(session, token_used))]
async fn process_json_body<T>(
    response: reqwest::Result<reqwest::Response>,
    session: &SessionStore,
    token_used: Option<&AuthToken>,
) -> Result<T, ApiError>
where
    T: Debug + serde::de::DeserializeOwned,
{
    let (response, status) = extract_response(response)?;
    if status.is_success() {
        return decode_json(response).await;
    }
    let error = handle_error(response).await;
    if error.is_unauthorized() {
        if let Some(token) = token_used {
            session.expire(token);
        }
    }
    Err(error)
}

async fn decode_json<T>(response: reqwest::Response) -> Result<T, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    let body = response.bytes().await.map_err(|e| {
        warn!(?e, "failed to read response body");
        ApiError::transport()
    })?;
    let decoded = if body.is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(&body)
    };
    decoded.map_err(|e| {
        warn!(?e, "failed to parse result as json");
        ApiError::invalid_response()
    })
}

#[tracing::instrument(ret)]
async fn handle_error(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(?e, "failed to get response body");
            String::new()
        }
    };
    ApiError::from_response_body(status, &body)
}

/// Provides a way to standardize the error message
#[tracing::instrument(ret, err(Debug))]
fn extract_response(
    response: reqwest::Result<reqwest::Response>,
) -> Result<(reqwest::Response, StatusCode), ApiError> {
    let response = response.map_err(|e| {
        info!("Response is err: {e:#?}");
        ApiError::transport()
    })?;
    let status = response.status();
    Ok((response, status))
}

fn send_outcome<T>(tx: oneshot::Sender<T>, outcome: T) {
    if tx.send(outcome).is_err() {
        debug!("receiver dropped before the outcome was delivered");
    }
}

pub trait UiCallBack: 'static + Send + FnOnce() {}
impl<T> UiCallBack for T where T: 'static + Send + FnOnce() {}

#[cfg(not(target_arch = "wasm32"))]
pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + Send + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> + Send {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> + Send {}
}

#[cfg(target_arch = "wasm32")]
pub mod closure_traits {
    pub trait ChannelCallBack<O>:
        'static + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    impl<T, O> ChannelCallBack<O> for T where
        T: 'static + FnOnce(reqwest::Result<reqwest::Response>) -> O
    {
    }
    pub trait ChannelCallBackOutput: futures::Future<Output = ()> {}
    impl<T> ChannelCallBackOutput for T where T: futures::Future<Output = ()> {}
}
