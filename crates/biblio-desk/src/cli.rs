use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(
        short = 's',
        long = "stdout",
        action,
        help = "Controls if it logs to stdout/stderr instead of to a file"
    )]
    pub is_to_std_out: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Log in with an email or username and keep the session for later calls
    Login {
        identifier: String,

        /// Read from stdin if not provided
        #[arg(short, long)]
        password: Option<String>,
    },

    Logout,

    /// Show who is logged in
    Whoami,

    /// Send a request through the gateway and print the JSON response
    Request {
        /// Relative to the base URL, for example `/livres/`
        path: String,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// JSON body
        #[arg(long, conflicts_with = "form")]
        json: Option<String>,

        /// Url encoded field as `key=value`, may be repeated
        #[arg(long, value_parser = parse_key_value)]
        form: Vec<(String, String)>,
    },

    /// Resolve a cover image path into a full URL
    ImageUrl { path: Option<String> },

    /// Delete the account of the logged in user
    DeleteAccount,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `key=value` but got {s:?}"))?;
    Ok((key.to_string(), value.to_string()))
}
