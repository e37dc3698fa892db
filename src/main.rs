//!
//! filedrop binary
//! ---------------
//! Command-line entry point for the file-drop server. Supports
//! configuration via CLI flags and environment variables; flags override
//! the environment.

use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use filedrop::security::{self, Credentials};
use filedrop::server::{self, ServerConfig};
use filedrop::funnel;

fn parse_port_env(name: &str) -> Option<u16> {
    match env::var(name) {
        Ok(val) => val.parse::<u16>().ok(),
        Err(_) => None,
    }
}

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag
            && i + 1 < args.len() {
                return args[i + 1].parse::<u16>().ok();
            }
        i += 1;
    }
    None
}

fn parse_string_arg(args: &[String], flag: &str) -> Option<String> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            if i + 1 < args.len() { return Some(args[i + 1].clone()); }
            return None;
        }
        i += 1;
    }
    None
}

fn parse_bool_env(name: &str) -> Option<bool> {
    match env::var(name) {
        Ok(v) => {
            let s = v.to_lowercase();
            match s.as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" => Some(false),
                _ => None,
            }
        }
        Err(_) => None,
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[tokio::main]
async fn main() -> Result<()> {
    println!(r"   _____ __        __
  / __(_) /__  ____/ /________  ____
 / /_/ / / _ \/ __  / ___/ __ \/ __ \
/ __/ / /  __/ /_/ / /  / /_/ / /_/ /
/_/ /_/_/\___/\__,_/_/   \____/ .___/
                             /_/     ");

    // Initialize tracing subscriber with env filter if provided
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .unwrap();
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let args: Vec<String> = env::args().collect();

    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("filedrop\n\nUSAGE:\n  filedrop [--port N] [--dir PATH] [--auth] [--no-funnel]\n\nOPTIONS:\n  --port N      HTTP port (env: FILEDROP_PORT, default 8080)\n  --dir PATH    Directory to serve and save files (env: FILEDROP_DIR, default .)\n  --auth        Enable HTTP basic authentication (env: FILEDROP_AUTH)\n  --no-funnel   Do not spawn the Tailscale funnel helper\n");
        return Ok(());
    }

    // Defaults
    let default_port: u16 = 8080;
    let default_dir: &str = ".";

    // Environment variables, then CLI overrides
    let env_port = parse_port_env("FILEDROP_PORT");
    let env_dir = env::var("FILEDROP_DIR").ok();
    let env_auth = parse_bool_env("FILEDROP_AUTH");

    let port = parse_port_arg(&args, "--port").or(env_port).unwrap_or(default_port);
    let dir = parse_string_arg(&args, "--dir")
        .or(env_dir)
        .unwrap_or_else(|| default_dir.to_string());
    let use_auth = has_flag(&args, "--auth") || env_auth.unwrap_or(false);
    let use_funnel = !has_flag(&args, "--no-funnel");

    let serve_dir = PathBuf::from(&dir);
    if !serve_dir.is_dir() {
        bail!("Directory does not exist: {}", serve_dir.display());
    }
    let serve_dir = serve_dir.canonicalize()?;

    let credentials = if use_auth {
        let password = security::generate_password(12);
        println!("Generated credentials:");
        println!("  Username: user");
        println!("  Password: {}", password);
        Some(Credentials { username: "user".to_string(), password })
    } else {
        None
    };

    info!("filedrop starting: port={}, dir={}, auth={}, funnel={}",
        port, serve_dir.display(), use_auth, use_funnel);

    // The funnel handle is owned here and released on ctrl-c; the HTTP
    // server keeps serving locally if the funnel cannot start.
    let funnel_handle = if use_funnel {
        match funnel::start(port).await {
            Ok(h) => Some(h),
            Err(e) => {
                warn!("funnel unavailable, serving locally only: {}", e);
                None
            }
        }
    } else {
        None
    };

    let config = ServerConfig { serve_dir, credentials };
    let server_task = tokio::spawn(server::run_with_ports(port, config));

    tokio::select! {
        res = server_task => {
            match res {
                Ok(inner) => inner?,
                Err(e) => bail!("server task failed: {e}"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nStopping server and funnel...");
        }
    }

    if let Some(handle) = funnel_handle {
        handle.shutdown().await;
    }

    Ok(())
}
