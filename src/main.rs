// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Meomeokno CLI - native shell for the meomeokno web app
//!
//! Runs the shell headless against a simulated platform, and exposes the
//! CORS proxy and the location delivery script for inspection.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};

use meomeokno::host::{PromptAnswer, SimulatedPermissions, SimulatedPlatform};
use meomeokno::{
    delivery_script, HttpClient, InterceptAction, InterceptedRequest, LocationResult, PollConfig,
    Shell, ShellConfig,
};

/// Seoul City Hall, used when no fix is given
const DEFAULT_FIX: (f64, f64) = (37.5665, 126.9780);

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("meomeokno=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "run" => match RunOptions::parse(&args[2..]) {
            Ok(options) => run_shell(options).await,
            Err(e) => Err(e),
        },
        "proxy" => {
            if args.len() < 3 {
                eprintln!("Usage: meomeokno proxy <url> [--method <METHOD>]");
                return ExitCode::from(1);
            }
            let method = flag_value(&args[3..], "--method").unwrap_or("GET");
            proxy_request(&args[2], method).await
        }
        "script" => {
            if args.len() < 4 {
                eprintln!("Usage: meomeokno script <lat> <lng>");
                return ExitCode::from(1);
            }
            print_script(&args[2], &args[3])
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("meomeokno {}", meomeokno::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Meomeokno - native shell for the meomeokno web app

USAGE:
    meomeokno <COMMAND> [OPTIONS]

COMMANDS:
    run             Open the start page with a simulated device
    proxy <url>     Push one request through the interceptors and show the result
    script <lat> <lng>
                    Print the location delivery script
    help            Show this help message
    version         Show version information

RUN OPTIONS:
    --url <URL>         Start page (default: $MEOMEOKNO_URL or https://meomeokno.vercel.app/)
    --deny              Deny the location permission prompt
    --no-fix            Device has no last known location
    --lat <LAT>         Latitude of the simulated fix
    --lng <LNG>         Longitude of the simulated fix
    --request           Call requestLocation() once the page has loaded
    --wait-ms <MS>      Keep the page running this long (default: 3000)

EXAMPLES:
    meomeokno run --request --lat 37.5 --lng 127.0
    meomeokno proxy "https://maps.googleapis.com/maps/api/place/details/json?place_id=abc&key=..."
    meomeokno script 37.5 127.0
"#
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[derive(Debug)]
struct RunOptions {
    url: Option<String>,
    deny: bool,
    fix: Option<LocationResult>,
    request: bool,
    wait: Duration,
}

impl RunOptions {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let lat = match flag_value(args, "--lat") {
            Some(v) => v.parse::<f64>().context("--lat must be a number")?,
            None => DEFAULT_FIX.0,
        };
        let lng = match flag_value(args, "--lng") {
            Some(v) => v.parse::<f64>().context("--lng must be a number")?,
            None => DEFAULT_FIX.1,
        };
        let wait_ms = match flag_value(args, "--wait-ms") {
            Some(v) => v.parse::<u64>().context("--wait-ms must be a whole number")?,
            None => 3_000,
        };

        let fix = if has_flag(args, "--no-fix") {
            None
        } else {
            Some(LocationResult::new(lat, lng))
        };

        Ok(Self {
            url: flag_value(args, "--url").map(str::to_string),
            deny: has_flag(args, "--deny"),
            fix,
            request: has_flag(args, "--request"),
            wait: Duration::from_millis(wait_ms),
        })
    }
}

async fn run_shell(options: RunOptions) -> anyhow::Result<()> {
    let mut config = ShellConfig::from_env();
    if let Some(url) = options.url {
        config = config.start_url(url);
    }

    let answer = if options.deny {
        PromptAnswer::Deny
    } else {
        PromptAnswer::Grant
    };
    let platform = SimulatedPlatform::new(SimulatedPermissions::prompt(answer), options.fix);

    let shell = Shell::new(config, platform.services())
        .await
        .context("Failed to start shell")?;

    let load = shell.open().await.context("Failed to load start page")?;
    println!("=== Page ===");
    println!("URL: {}", load.url);
    println!("Status: {}", load.status_code);
    println!(
        "Scripts: {} executed, {} failed",
        load.scripts_executed, load.script_errors
    );
    if load.modules_skipped > 0 {
        println!(
            "Note: {} module script(s) skipped; only classic scripts run in the page host",
            load.modules_skipped
        );
    }

    if options.request {
        shell
            .page()
            .evaluate(&format!("{}.requestLocation();", shell.config().bridge_name))
            .await
            .context("requestLocation() failed")?;
    }

    tokio::time::sleep(options.wait).await;

    let console = shell.page().console_messages();
    if !console.is_empty() {
        println!("\n=== Console ({}) ===", console.len());
        for message in console.iter().take(20) {
            println!("  [{:?}] {}", message.level, message.message);
        }
        if console.len() > 20 {
            println!("  ... and {} more", console.len() - 20);
        }
    }

    let notices = platform.notifier.shown();
    if !notices.is_empty() {
        println!("\n=== Notices ===");
        for notice in &notices {
            println!("  {}", notice);
        }
    }

    shell.shutdown();
    Ok(())
}

async fn proxy_request(url: &str, method: &str) -> anyhow::Result<()> {
    let config = ShellConfig::from_env();
    let client = HttpClient::with_config(config.http_config())?;
    let chain = Shell::default_interceptors(&client);

    let request = InterceptedRequest::new(url, method.to_ascii_uppercase());
    match chain.intercept(&request).await {
        InterceptAction::Respond(response) => {
            println!("=== Intercepted ===");
            println!("Status: {} {}", response.status_code, response.status_message);
            println!("Content-Type: {}", response.content_type);
            println!("Encoding: {}", response.encoding);
            for (name, value) in &response.headers {
                println!("{}: {}", name, value);
            }
            println!("Size: {} bytes", response.body.len());
            Ok(())
        }
        InterceptAction::Default => {
            println!("Not intercepted; the page would load it directly");
            Ok(())
        }
    }
}

fn print_script(lat: &str, lng: &str) -> anyhow::Result<()> {
    let location = LocationResult::new(
        lat.parse().context("latitude must be a number")?,
        lng.parse().context("longitude must be a number")?,
    );
    if !location.in_range() {
        bail!("({}, {}) is not a valid coordinate", lat, lng);
    }
    println!("{}", delivery_script(location, &PollConfig::default())?);
    Ok(())
}
