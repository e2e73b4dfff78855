use biblio_client_core::{RequestOptions, SessionEvent};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use biblio_shared::const_config::storage::{STORAGE_KEY_TOKEN, STORAGE_KEY_USER};
use futures::future::join_all;

use crate::helpers::{drain, member, no_cb, spawn_app, staff};

#[tokio::test]
async fn rejected_token_ends_session() {
    // Arrange
    let app = spawn_app().await;
    app.login_as(member()).await.unwrap();
    let mut events = app.core_client.session().subscribe();
    app.backend.revoke_all_tokens();

    // Act
    let outcome = app
        .core_client
        .request("/protected", RequestOptions::get(), no_cb)
        .await
        .unwrap();

    // Assert
    let error = outcome.unwrap_err();
    assert!(error.is_unauthorized(), "{error:?}");
    assert_eq!(error.to_string(), "Token invalide ou expiré");
    assert!(!app.core_client.session().is_authenticated());
    assert!(!app.storage.contains_key(STORAGE_KEY_TOKEN));
    assert!(!app.storage.contains_key(STORAGE_KEY_USER));
    assert_eq!(drain(&mut events), vec![SessionEvent::Expired]);
}

#[tokio::test]
async fn concurrent_rejections_expire_once() {
    // Arrange
    let app = spawn_app().await;
    app.login_as(member()).await.unwrap();
    let mut events = app.core_client.session().subscribe();
    app.backend.revoke_all_tokens();

    // Act
    let receivers: Vec<_> = (0..5)
        .map(|_| {
            app.core_client
                .request("/protected", RequestOptions::get(), no_cb)
        })
        .collect();
    let outcomes = join_all(receivers).await;

    // Assert
    for outcome in outcomes {
        assert!(outcome.unwrap().unwrap_err().is_unauthorized());
    }
    assert_eq!(drain(&mut events), vec![SessionEvent::Expired]);
    assert!(!app.core_client.session().is_authenticated());
}

#[tokio::test]
async fn anonymous_rejection_is_not_an_expiry() {
    // Arrange
    let app = spawn_app().await;
    let mut events = app.core_client.session().subscribe();

    // Act
    let outcome = app
        .core_client
        .request("/protected", RequestOptions::get(), no_cb)
        .await
        .unwrap();

    // Assert
    assert!(outcome.unwrap_err().is_unauthorized());
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn stale_rejection_keeps_newer_session() {
    // Arrange - A request is in flight with the first token
    let app = spawn_app().await;
    app.login_as(member()).await.unwrap();
    let in_flight = app
        .core_client
        .request("/stale", RequestOptions::get(), no_cb);

    // Act - Log in again before the rejection arrives
    app.core_client.logout();
    let identity = app.login_as(staff()).await.unwrap();
    let mut events = app.core_client.session().subscribe();
    app.backend.release_stale.notify_one();
    let outcome = in_flight.await.unwrap();

    // Assert
    assert!(outcome.unwrap_err().is_unauthorized());
    assert_eq!(app.core_client.session().identity(), Some(identity));
    assert!(app.storage.contains_key(STORAGE_KEY_TOKEN));
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn new_login_after_expiry_works() {
    // Arrange
    let app = spawn_app().await;
    app.login_as(member()).await.unwrap();
    app.backend.revoke_all_tokens();
    let _ = app
        .core_client
        .request("/protected", RequestOptions::get(), no_cb)
        .await
        .unwrap();

    // Act
    app.login_as(member()).await.unwrap();
    let outcome = app
        .core_client
        .request("/protected", RequestOptions::get(), no_cb)
        .await
        .unwrap();

    // Assert
    assert_eq!(outcome.unwrap()["email"], "membre@demo.fr");
}

#[tokio::test]
async fn rejected_caller_credential_keeps_session() {
    // Arrange
    let app = spawn_app().await;
    let identity = app.login_as(member()).await.unwrap();
    let mut events = app.core_client.session().subscribe();
    let options = RequestOptions::get()
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer not-issued"));

    // Act
    let outcome = app
        .core_client
        .request("/protected", options, no_cb)
        .await
        .unwrap();

    // Assert
    assert!(outcome.unwrap_err().is_unauthorized());
    assert_eq!(app.core_client.session().identity(), Some(identity));
    assert!(app.storage.contains_key(STORAGE_KEY_TOKEN));
    assert!(drain(&mut events).is_empty());
}
