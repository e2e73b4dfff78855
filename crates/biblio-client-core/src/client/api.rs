use std::sync::Arc;

use biblio_shared::{
    const_config::path::{PATH_AUTH_LOGIN, PATH_AUTH_ME, PATH_MEMBER_PREFIX},
    errors::NotLoggedInError,
    req_args::LoginReqArgs,
    uac::{Identity, LoginResponse, ProfileResponse},
};
use futures::channel::oneshot;
use serde_json::Value;
use tracing::warn;

use super::{
    decode_json, extract_response, handle_error, process_json_body, send_outcome, Client,
    RequestOptions, UiCallBack,
};
use crate::ApiError;

impl Client {
    /// Exchanges the credentials for a token, fetches the profile it belongs
    /// to and only then activates the session
    ///
    /// On any failure the current session (if any) is left untouched
    #[tracing::instrument(skip(self, ui_notify))]
    pub fn login<F>(
        &self,
        args: LoginReqArgs,
        ui_notify: F,
    ) -> oneshot::Receiver<Result<Arc<Identity>, ApiError>>
    where
        F: UiCallBack,
    {
        let (tx, rx) = oneshot::channel();
        let options = RequestOptions::new(PATH_AUTH_LOGIN.method).form(args.to_form_fields());
        // Never send the credential of a previous session along
        let request = self.build_request(PATH_AUTH_LOGIN.path, options, None);
        let client = self.clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_login(resp, &client).await;
            send_outcome(tx, msg);
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }

    /// Ends the session locally, the backend keeps no session state
    #[tracing::instrument(skip(self))]
    pub fn logout(&self) {
        self.session().logout();
    }

    /// Deletes the account of the logged in user then logs out
    #[tracing::instrument(skip(self, ui_notify))]
    pub fn delete_own_account<F>(&self, ui_notify: F) -> oneshot::Receiver<Result<(), ApiError>>
    where
        F: UiCallBack,
    {
        let (tx, rx) = oneshot::channel();
        let Some(session) = self.session().session() else {
            send_outcome(tx, Err(NotLoggedInError.into()));
            ui_notify();
            return rx;
        };
        let path = PATH_MEMBER_PREFIX.with_segment(session.identity.id);
        let request = self.build_request(
            &path,
            RequestOptions::new(PATH_MEMBER_PREFIX.method),
            Some(&session.token),
        );
        let store = self.session().clone();
        let on_done = move |resp: reqwest::Result<reqwest::Response>| async move {
            let msg = process_json_body::<Value>(resp, &store, Some(&session.token))
                .await
                .map(|_| store.logout());
            send_outcome(tx, msg);
            ui_notify();
        };
        self.initiate_request(request, on_done);
        rx
    }
}

#[tracing::instrument(ret, err(Debug), skip(client))]
async fn process_login(
    response: reqwest::Result<reqwest::Response>,
    client: &Client,
) -> Result<Arc<Identity>, ApiError> {
    let (response, status) = extract_response(response)?;
    if !status.is_success() {
        return Err(handle_error(response).await.into_login_failure());
    }
    let login: LoginResponse = decode_json(response).await?;

    let profile_request = client.build_request(
        PATH_AUTH_ME.path,
        RequestOptions::new(PATH_AUTH_ME.method),
        Some(&login.access_token),
    );
    let (response, status) = extract_response(profile_request.send().await)?;
    if !status.is_success() {
        return Err(handle_error(response).await.into_login_failure());
    }
    let profile: ProfileResponse = decode_json(response).await?;

    let identity = Identity::compose(&login, profile).map_err(|e| {
        warn!(?e, "unable to build identity from login response");
        ApiError::invalid_response()
    })?;
    client.session().establish(login.access_token, identity)
}
