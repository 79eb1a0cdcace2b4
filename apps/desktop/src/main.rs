mod command;
mod config;
mod shell;
mod view;

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{BookmarkApp, SupabaseClient};
use shared::domain::OAuthProvider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::shell::{Flow, Shell};

#[derive(Parser, Debug)]
#[command(name = "smart-bookmark", about = "Bookmarks that follow you, synced live")]
struct Args {
    /// Settings file with flat `key = "value"` entries.
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    supabase_url: Option<String>,
    #[arg(long)]
    anon_key: Option<String>,
    #[arg(long)]
    provider: Option<OAuthProvider>,
    #[arg(long)]
    redirect_to: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(v) = args.supabase_url {
        settings.supabase_url = Some(v);
    }
    if let Some(v) = args.anon_key {
        settings.supabase_anon_key = Some(v);
    }
    if let Some(v) = args.provider {
        settings.oauth_provider = v;
    }
    if let Some(v) = args.redirect_to {
        settings.redirect_to = v;
    }

    let supabase_config = settings
        .to_supabase_config()
        .context("remote configuration is incomplete")?;
    info!(project = %supabase_config.project_url, "starting");
    let client = Arc::new(SupabaseClient::new(supabase_config));
    let mut shell = Shell::new(BookmarkApp::with_backend(client), settings.oauth_provider);
    shell.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        draw(&shell)?;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                match command::parse(&line) {
                    Ok(Some(command)) => {
                        if shell.handle(command).await == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => shell.error(format!("{err:#}")),
                }
            }
            event = shell.app_mut().next_change() => shell.on_feed(event).await,
        }
    }

    Ok(())
}

fn draw(shell: &Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "\n{}\n", shell.render())?;
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}
