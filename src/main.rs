//! ptail CLI
//!
//! Entry point for the `ptail` command-line tool.

use std::process;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

use ptail::api::HttpBackend;
use ptail::query::{QueryError, QuerySpec};
use ptail::signal::ShutdownSignal;
use ptail::tail::{TailConfig, TailLoop};
use ptail::token::{self, TokenError};
use ptail::ui::Ui;

/// Fatal message when no API token can be found anywhere
const NO_TOKEN_HELP: &str = "No Papertrail API token found; exiting.\n\n\
ptail requires a valid Papertrail API token (which you can obtain from \
https://papertrailapp.com/user/edit) to be set in the PAPERTRAIL_API_TOKEN \
environment variable or in ~/.papertrail.yml (in the format `token: MYTOKEN`).";

#[derive(Parser)]
#[command(name = "ptail")]
#[command(about = "Search and live-tail Papertrail logs", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a query and print matching events
    Search {
        /// Keep following new events once the backlog is drained
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        follow: bool,

        /// Render events as `ts=<timestamp> key=value` lines
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        kv: bool,

        /// Restrict the search to one system id
        #[arg(long)]
        system: Option<String>,

        /// Restrict the search to one group id
        #[arg(long)]
        group: Option<String>,

        /// Only search events newer than this many seconds ago
        /// (default: a 48-hour lookback)
        #[arg(long, default_value_t = 0)]
        since_secs: u64,

        /// Query terms, joined with single spaces
        terms: Vec<String>,
    },
}

fn main() {
    // try_parse instead of parse: flag-parse failures exit 1, while
    // --help and --version still exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    match cli.command {
        Commands::Search {
            follow,
            kv,
            system,
            group,
            since_secs,
            terms,
        } => {
            let code = run_search(follow, kv, system, group, since_secs, terms);
            process::exit(code);
        }
    }
}

fn run_search(
    follow: bool,
    kv: bool,
    system: Option<String>,
    group: Option<String>,
    since_secs: u64,
    terms: Vec<String>,
) -> i32 {
    let mut ui = Ui::stdio();

    let token = match token::read_token() {
        Ok(token) => token,
        Err(TokenError::NotFound) => {
            ui.error(NO_TOKEN_HELP);
            return 1;
        }
        Err(e) => {
            ui.error(&e.to_string());
            return 1;
        }
    };

    let spec = QuerySpec {
        terms,
        system_id: system,
        group_id: group,
        follow,
        min_time_ago: Duration::from_secs(since_secs),
    };
    let built = match spec.build() {
        Ok(built) => built,
        Err(QueryError::EmptyQuery) => {
            ui.warn("You need at least one query term");
            return 0;
        }
    };

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.install() {
        ui.warn(&format!("Could not install interrupt handler: {}", e));
    }

    let config = TailConfig {
        kv,
        stop_on_empty: built.stop_on_empty,
        ..Default::default()
    };
    let backend = HttpBackend::new(token);
    let mut tail = TailLoop::new(backend, built.filter, config, shutdown);
    tail.run(&mut ui);

    0
}
