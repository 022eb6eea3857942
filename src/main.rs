//!
//! confessions server binary
//! --------------------------
//! Starts the confession board HTTP API. Configuration comes from environment
//! variables; `--port` and `--data-dir` override them.

use std::env;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use confessions::config::Config;

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].as_str());
        }
        i += 1;
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn print_help() {
    println!(
        "Confession API Server\n\nUSAGE:\n  confessions_server [--port N] [--data-dir PATH]\n\nOPTIONS:\n  --port N           HTTP port (env: PORT, default 5000)\n  --data-dir PATH    Persist confessions under PATH (env: CONFESSIONS_DATA_DIR). Omit to keep them in memory.\n\nENVIRONMENT:\n  CONFESSIONS_ENV               development | production (default development)\n  FRONTEND_URL                  Allowed browser origin in production\n  CONFESSIONS_ALLOWED_ORIGINS   Comma-separated origin list, overrides the defaults\n  CONFESSIONS_AUTH_SECRET       HS256 secret for bearer JWTs\n  CONFESSIONS_AUTH_ISSUER       Required JWT issuer\n  CONFESSIONS_DEV_TOKENS        token=subject pairs, development only\n  RUST_LOG                      Log filter (default info)\n"
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_help();
        return Ok(());
    }

    let mut config = Config::from_env()?;
    if let Some(raw) = arg_value(&args, "--port") {
        config.port = raw.parse().map_err(|e| anyhow::anyhow!("invalid --port {raw:?}: {e}"))?;
    }
    if let Some(dir) = arg_value(&args, "--data-dir") {
        config.data_dir = Some(PathBuf::from(dir));
    }

    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "startup", "Confession API starting: RUST_LOG='{}', port={}", rust_log, config.port);

    confessions::server::run(config).await
}
