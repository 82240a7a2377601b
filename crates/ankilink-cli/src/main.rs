//! Command-line front end for the ankilink AnkiConnect client.
//!
//! Maps process arguments onto a single action invocation, prints the JSON
//! result on stdout, and exits non-zero on any failure. Composes with other
//! tools via the `-` placeholder:
//!
//! ```text
//! ankilink getTags | jq
//! ankilink findNotes query=deck:current | ankilink notesInfo notes=-
//! ```

mod params;

use std::time::Duration;

use ankilink::AnkiClient;
use clap::Parser;
use tracing::debug;

/// Dispatch a single AnkiConnect action and print its result as JSON.
#[derive(Parser, Debug)]
#[command(name = "ankilink")]
#[command(version, about, long_about = None)]
struct Args {
    /// AnkiConnect action name, e.g. "sync", "getTags", "findNotes"
    action: String,

    /// Action parameters; values are parsed as JSON, falling back to plain
    /// strings. A literal `-` value is replaced by the last line of stdin.
    #[arg(value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// AnkiConnect host address, scheme included
    #[arg(long, default_value = "http://127.0.0.1")]
    host: String,

    /// AnkiConnect port
    #[arg(long, default_value_t = 8765)]
    port: u16,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut params = params::parse_pairs(&args.params)?;
    params::substitute_stdin(&mut params)?;
    debug!(action = %args.action, ?params, "invoking");

    let client = AnkiClient::builder()
        .host(args.host)
        .port(args.port)
        .timeout(Duration::from_secs(args.timeout))
        .build();
    let result = client.invoke(&args.action, params).await?;

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
