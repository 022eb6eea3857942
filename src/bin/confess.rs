//!
//! confess terminal client
//! ------------------------
//! Reads and writes the confession board over HTTP.

use std::env;

use anyhow::{anyhow, bail, Result};
use chrono::Utc;

use confessions::client::format::terminal_width;
use confessions::client::{render_confession, render_page, ConfessionClient, DEFAULT_BASE_URL};
use confessions::confessions::{DEFAULT_LIMIT, DEFAULT_PAGE};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--url <base>] [--token <token>] <command>\n\nCommands:\n  list [--page N] [--limit N]   show a page of confessions, newest first\n  show <id>                     show one confession\n  post <text>                   post a new confession\n  edit <id> <text>              replace the text of your confession\n  delete <id>                   delete your confession\n\nFlags:\n  --url <base>      API base URL (env: CONFESS_URL, default {DEFAULT_BASE_URL})\n  --token <token>   Bearer token (env: CONFESS_TOKEN); required for post, edit and delete\n  -h, --help        Show this help"
    );
}

/// Remove `flag <value>` from `args`, returning the value.
fn take_value(args: &mut Vec<String>, flag: &str) -> Result<Option<String>> {
    let Some(i) = args.iter().position(|a| a == flag) else { return Ok(None) };
    if i + 1 >= args.len() {
        bail!("{flag} needs a value");
    }
    let value = args.remove(i + 1);
    args.remove(i);
    Ok(Some(value))
}

fn take_number(args: &mut Vec<String>, flag: &str, default: u64) -> Result<u64> {
    match take_value(args, flag)? {
        Some(raw) => raw.parse().map_err(|_| anyhow!("{flag} expects a positive number, got {raw:?}")),
        None => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().collect();
    let program = if args.is_empty() { "confess".to_string() } else { args.remove(0) };

    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage(&program);
        return Ok(());
    }

    let url = take_value(&mut args, "--url")?
        .or_else(|| env::var("CONFESS_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let token = take_value(&mut args, "--token")?.or_else(|| env::var("CONFESS_TOKEN").ok());
    let client = ConfessionClient::new(&url, token)?;
    let width = terminal_width();

    let command = args.remove(0);
    match command.as_str() {
        "list" => {
            let page = take_number(&mut args, "--page", DEFAULT_PAGE)?;
            let limit = take_number(&mut args, "--limit", DEFAULT_LIMIT)?;
            let result = client.list(page, limit).await?;
            print!("{}", render_page(&result, Utc::now(), width));
        }
        "show" => {
            let [id] = args.as_slice() else { bail!("usage: {program} show <id>") };
            let c = client.get(id).await?;
            print!("{}", render_confession(&c, Utc::now(), width));
        }
        "post" => {
            if args.is_empty() {
                bail!("usage: {program} post <text>");
            }
            let c = client.create(&args.join(" ")).await?;
            println!("Posted {}", c.id);
        }
        "edit" => {
            if args.len() < 2 {
                bail!("usage: {program} edit <id> <text>");
            }
            let id = args.remove(0);
            let c = client.update(&id, &args.join(" ")).await?;
            print!("{}", render_confession(&c, Utc::now(), width));
        }
        "delete" => {
            let [id] = args.as_slice() else { bail!("usage: {program} delete <id>") };
            client.delete(id).await?;
            println!("Confession deleted successfully");
        }
        other => {
            print_usage(&program);
            bail!("unknown command {other:?}");
        }
    }
    Ok(())
}
