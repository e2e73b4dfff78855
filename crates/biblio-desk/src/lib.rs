#![warn(unused_crate_dependencies)]

mod commands;

pub mod cli;
pub mod tracing;

use anyhow::Context as _;
use biblio_client_core::{get_configuration, Client, SessionEvent};
use biblio_shared::const_config::error::ERROR_SESSION_EXPIRED_MSG;

pub fn create_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("unable to create runtime")
}

/// Executes the selected command against the configured backend
pub async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let config = get_configuration().context("failed to read configuration")?;
    ::tracing::info!(?config);
    let client = Client::from_config(&config);
    let mut events = client.session().subscribe();

    let result = commands::execute(&client, cli.command).await;

    while let Ok(Some(event)) = events.try_next() {
        on_session_event(&event);
    }
    result
}

/// What the UI shell would do when the session changes
fn on_session_event(event: &SessionEvent) {
    ::tracing::info!(event = event.name(), "session event");
    if event.is_expired() {
        eprintln!("{ERROR_SESSION_EXPIRED_MSG}");
    }
}
