//! Taillight CLI: Tail a remote log stream to stdout.
//!
//! Connects to the server's streaming endpoint, writes rendered markup
//! to stdout as it arrives, and keeps notices, logging, and the token
//! prompt on stderr/stdin so the log stream itself stays clean.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use url::Url;

use taillight::{ClientConfig, Surface, TailClient, Transcript, UserInterface};

#[derive(Debug, Parser)]
#[command(name = "taillight", version, about = "Tail a remote log stream as colorized markup")]
struct Args {
    /// Base URL of the log server (http, https, ws, or wss)
    url: Url,

    /// Where to persist the authentication token
    #[arg(long, value_name = "FILE")]
    credential_file: Option<PathBuf>,

    /// Lines of scrollback to keep in memory
    #[arg(long, default_value_t = 10_000)]
    scrollback: usize,
}

/// Surface that mirrors every append to stdout while the in-memory
/// transcript keeps the scroll bookkeeping.
struct StdoutSurface {
    transcript: Transcript,
}

impl Surface for StdoutSurface {
    fn append(&mut self, markup: &str) {
        print!("{markup}");
        let _ = io::stdout().flush();
        self.transcript.append(markup);
    }

    fn scroll_top(&self) -> u32 {
        self.transcript.scroll_top()
    }

    fn max_scroll(&self) -> u32 {
        self.transcript.max_scroll()
    }

    fn scroll_to(&mut self, offset: u32) {
        self.transcript.scroll_to(offset);
    }
}

/// Terminal credential prompt and notices.
struct ConsoleUi;

impl UserInterface for ConsoleUi {
    fn prompt_for_credential(&mut self) -> Option<String> {
        let stdin = io::stdin();
        let mut line = String::new();

        loop {
            eprint!("Access token: ");
            let _ = io::stderr().flush();

            line.clear();
            match stdin.lock().read_line(&mut line) {
                // EOF or unreadable input counts as declining.
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    let token = line.trim();
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::new(args.url);
    config.credential_path = args.credential_file;

    let surface = StdoutSurface {
        // Default line/viewport geometry; only the scrollback is
        // worth a knob on the command line.
        transcript: Transcript::new(args.scrollback, 16, 480),
    };

    let mut client = match TailClient::new(config, ConsoleUi, surface) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match client.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "client failed");
            ExitCode::FAILURE
        }
    }
}
