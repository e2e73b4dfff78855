use biblio_client_core::{ApiError, SessionEvent};
use biblio_shared::{
    const_config::storage::{STORAGE_KEY_TOKEN, STORAGE_KEY_USER},
    errors::NotLoggedInError,
    uac::Role,
};
use rstest::rstest;
use std::sync::atomic::Ordering;

use crate::helpers::{
    administrator, drain, login_args, member, no_cb, spawn_app, staff, DemoUser,
};

#[tokio::test]
async fn login_logout_round_trip() {
    // Arrange
    let app = spawn_app().await;
    let mut events = app.core_client.session().subscribe();

    // Assert - Ensure not logged in
    assert!(!app.core_client.session().is_authenticated());
    assert_eq!(app.core_client.session().role(), Role::Anonymous);

    // Act - Login
    let identity = app.login_as(member()).await.unwrap();

    // Assert - Login successful and identity stored
    assert_eq!(u64::from(identity.id), 7);
    assert_eq!(identity.email, "membre@demo.fr");
    assert_eq!(identity.role, Role::Member);
    assert_eq!(identity.display_name(), "Alice Durand");
    assert!(app.core_client.session().is_authenticated());
    assert_eq!(app.core_client.session().identity(), Some(identity.clone()));
    assert!(app.storage.contains_key(STORAGE_KEY_TOKEN));
    assert!(app.storage.contains_key(STORAGE_KEY_USER));
    assert_eq!(drain(&mut events), vec![SessionEvent::LoggedIn(identity)]);

    // Act - Logout
    app.core_client.logout();

    // Assert - Session and storage cleared
    assert!(!app.core_client.session().is_authenticated());
    assert!(app.storage.is_empty());
    assert_eq!(drain(&mut events), vec![SessionEvent::LoggedOut]);
}

#[rstest]
#[case::member(member(), Role::Member)]
#[case::staff(staff(), Role::Staff)]
#[case::administrator(administrator(), Role::Administrator)]
#[tokio::test]
async fn backend_role_spellings_normalized(#[case] user: &'static DemoUser, #[case] expected: Role) {
    // Arrange
    let app = spawn_app().await;

    // Act
    let identity = app.login_as(user).await.unwrap();

    // Assert
    assert_eq!(identity.role, expected);
    assert_eq!(app.core_client.session().role(), expected);
}

#[tokio::test]
async fn login_failure_invalid_password() {
    // Arrange
    let app = spawn_app().await;
    let mut events = app.core_client.session().subscribe();
    let args = login_args(member()).secret("wrong".to_string().into());

    // Act
    let outcome = app.core_client.login(args, no_cb).await.unwrap();

    // Assert
    assert_eq!(
        outcome.unwrap_err(),
        ApiError::LoginRejected {
            message: "Identifiants incorrects".to_string()
        }
    );
    assert!(!app.core_client.session().is_authenticated());
    assert!(app.storage.is_empty());
    assert!(drain(&mut events).is_empty(), "a rejected login is not an expiry");
}

#[tokio::test]
async fn failed_login_keeps_existing_session() {
    // Arrange
    let app = spawn_app().await;
    let identity = app.login_as(member()).await.unwrap();
    let token = app.core_client.session().token();
    let args = login_args(staff()).secret("wrong".to_string().into());

    // Act
    let outcome = app.core_client.login(args, no_cb).await.unwrap();

    // Assert
    assert!(outcome.is_err());
    assert_eq!(app.core_client.session().identity(), Some(identity));
    assert_eq!(app.core_client.session().token(), token);
}

#[tokio::test]
async fn profile_failure_does_not_half_login() {
    // Arrange
    let app = spawn_app().await;
    app.backend.profile_fails.store(true, Ordering::SeqCst);

    // Act
    let outcome = app.login_as(member()).await;

    // Assert
    let error = outcome.unwrap_err();
    assert_eq!(error.status(), Some(500));
    assert_eq!(error.to_string(), "Profil indisponible");
    assert!(!app.core_client.session().is_authenticated());
    assert!(app.core_client.session().token().is_none());
    assert!(app.storage.is_empty());
}

#[rstest]
#[case::unknown("pirate")]
#[case::anonymous("guest")]
#[tokio::test]
async fn unusable_profile_role_rejects_login(#[case] role: &str) {
    // Arrange
    let app = spawn_app().await;
    *app.backend.profile_role_override.lock().unwrap() = Some(role.to_string());

    // Act
    let outcome = app.login_as(member()).await;

    // Assert
    assert!(
        matches!(outcome, Err(ApiError::InvalidResponse { .. })),
        "{outcome:?}"
    );
    assert!(!app.core_client.session().is_authenticated());
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn relogin_replaces_session() {
    // Arrange
    let app = spawn_app().await;
    app.login_as(member()).await.unwrap();

    // Act
    let identity = app.login_as(staff()).await.unwrap();

    // Assert
    assert_eq!(identity.role, Role::Staff);
    assert_eq!(app.core_client.session().identity(), Some(identity));
}

#[tokio::test]
async fn session_restored_after_restart() {
    // Arrange
    let app = spawn_app().await;
    let identity = app.login_as(member()).await.unwrap();
    let token = app.core_client.session().token();

    // Act
    let restarted = app.restart_client();

    // Assert
    assert!(!restarted.session().is_loading());
    assert_eq!(restarted.session().identity(), Some(identity));
    assert_eq!(restarted.session().token(), token);

    // Assert - Restored token is usable
    let outcome = restarted
        .request("/protected", Default::default(), no_cb)
        .await
        .unwrap();
    assert_eq!(outcome.unwrap()["email"], "membre@demo.fr");
}

#[tokio::test]
async fn delete_own_account_logs_out() {
    // Arrange
    let app = spawn_app().await;
    app.login_as(member()).await.unwrap();
    let mut events = app.core_client.session().subscribe();

    // Act
    let outcome = app.core_client.delete_own_account(no_cb).await.unwrap();

    // Assert
    assert_eq!(outcome, Ok(()));
    assert_eq!(*app.backend.deleted_members.lock().unwrap(), vec![7]);
    assert!(!app.core_client.session().is_authenticated());
    assert!(app.storage.is_empty());
    assert_eq!(drain(&mut events), vec![SessionEvent::LoggedOut]);
}

#[tokio::test]
async fn delete_own_account_requires_login() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let outcome = app.core_client.delete_own_account(no_cb).await.unwrap();

    // Assert
    assert_eq!(outcome, Err(ApiError::NotLoggedIn(NotLoggedInError)));
    assert!(app.backend.deleted_members.lock().unwrap().is_empty());
}
