#![warn(clippy::all, rust_2018_idioms)]

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = biblio_desk::cli::Cli::parse();

    if let Err(e) = biblio_desk::tracing::init(&args) {
        eprintln!("Failed to start tracing: {e}");
    }

    let rt = biblio_desk::create_runtime()?;
    rt.block_on(biblio_desk::run(args))
}
