/*
 * pop3_fetch.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of pop3_core, the POP3 client engine of Tagliacarte.
 *
 * pop3_core is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * pop3_core is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with pop3_core.  If not, see <http://www.gnu.org/licenses/>.
 */

//! pop3-fetch: log in to a POP3 maildrop and walk through the basic commands.
//!
//! Credentials come from the environment (`POP3_USER`, `POP3_PASSWORD`).
//! Nothing is deleted for good: the DELE is undone by RSET before QUIT.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use pop3_core::protocol::pop3::{Pop3Session, Response, TracingObserver};
use pop3_core::Pop3Config;

const USER_KEY: &str = "POP3_USER";
const PASSWORD_KEY: &str = "POP3_PASSWORD";

#[derive(Parser)]
#[command(name = "pop3-fetch")]
#[command(about = "Inspect a POP3 maildrop", long_about = None)]
struct Cli {
    /// Server address, host:port (e.g. pop.gmail.com:995)
    #[arg(short, long, required_unless_present = "config")]
    address: Option<String>,

    /// Use implicit TLS
    #[arg(short, long)]
    tls: bool,

    /// Read settings from an XML file with a <pop3/> element
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Message to retrieve, mark and unmark
    #[arg(short, long, default_value = "1")]
    message: String,

    /// Log every protocol line
    #[arg(short, long)]
    verbose: bool,
}

fn print_response(response: &Response) {
    for line in response.lines() {
        println!("{}", line);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "pop3_core=trace" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = match (&cli.config, &cli.address) {
        (Some(path), _) => Pop3Config::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(address)) => Pop3Config::new(address.clone(), cli.tls),
        (None, None) => bail!("either --address or --config is required"),
    };

    let username = std::env::var(USER_KEY).with_context(|| format!("{} is not set", USER_KEY))?;
    let password =
        std::env::var(PASSWORD_KEY).with_context(|| format!("{} is not set", PASSWORD_KEY))?;

    let mut session = Pop3Session::connect_with(&config, None, Box::new(TracingObserver))
        .await
        .with_context(|| format!("connecting to {}", config.address))?;
    println!("{}", session.greeting());
    println!("authorized: {}", session.is_authorized());
    println!("encrypted: {}", session.is_encrypted());

    println!("{}", session.user(&username).await?);
    let pass = session.pass(&password).await?;
    println!("{}", pass);
    if !pass.is_ok() {
        session.quit().await?;
        bail!("login rejected: {}", pass.text());
    }

    let stat = session.stat().await?;
    println!("{}", stat);
    if let Some(stat) = stat.stat() {
        println!("{} messages, {} octets", stat.count, stat.total_size);
    }

    print_response(&session.list(None).await?);
    print_response(&session.list(Some(1)).await?);
    println!("{}", session.noop().await?);

    match session.retr(&cli.message).await? {
        Response::Multi(message) => {
            println!("{}", message.status_line());
            println!("({} lines)", message.body().len());
        }
        Response::Single(reply) => println!("{}", reply),
    }

    println!("{}", session.dele(&cli.message).await?);
    println!("{}", session.rset().await?);
    println!("{}", session.quit().await?);
    Ok(())
}
