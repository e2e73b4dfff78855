use std::io::BufRead as _;
use std::str::FromStr as _;

use anyhow::{bail, Context as _};
use biblio_client_core::{Client, RequestOptions};
use biblio_shared::{req_args::LoginReqArgs, uac::Role};
use secrecy::SecretString;

use crate::cli::Command;

fn no_cb() {}

// WARNING: Must skip args as the command may hold a password
#[tracing::instrument(skip_all)]
pub async fn execute(client: &Client, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login {
            identifier,
            password,
        } => {
            let secret = match password {
                Some(password) => SecretString::from(password),
                None => read_password()?,
            };
            let identity = client
                .login(LoginReqArgs::new(identifier, secret), no_cb)
                .await
                .context("login did not complete")??;
            println!("Logged in as {identity} ({})", identity.role);
        }
        Command::Logout => {
            client.logout();
            println!("Logged out");
        }
        Command::Whoami => match client.session().identity() {
            Some(identity) => println!(
                "{identity} <{}> id={} role={} home={}",
                identity.email,
                identity.id,
                identity.role,
                home_section(identity.role)
            ),
            None => println!("Not logged in"),
        },
        Command::Request {
            path,
            method,
            json,
            form,
        } => {
            let method = reqwest::Method::from_str(&method.to_uppercase())
                .with_context(|| format!("invalid method: {method:?}"))?;
            let mut options = RequestOptions::new(method);
            if let Some(json) = json {
                let body = serde_json::from_str(&json).context("--json is not valid JSON")?;
                options = options.json_value(body);
            } else if !form.is_empty() {
                options = options.form(form);
            }
            let response = client
                .request(&path, options, no_cb)
                .await
                .context("request did not complete")??;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::ImageUrl { path } => println!("{}", client.image_url(path.as_deref())),
        Command::DeleteAccount => {
            client
                .delete_own_account(no_cb)
                .await
                .context("account deletion did not complete")??;
            println!("Account deleted");
        }
    }
    Ok(())
}

/// Section of the front-end a role lands on after logging in
fn home_section(role: Role) -> &'static str {
    if role.is_administrator() {
        "administration"
    } else if role.is_staff_or_above() {
        "desk"
    } else {
        "catalogue"
    }
}

fn read_password() -> anyhow::Result<SecretString> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        bail!("no password provided");
    }
    Ok(SecretString::from(password.to_string()))
}
