//! check-service CLI entry point
//!
//! Performs an HTTP GET on a given host, optionally routed through another
//! host name, and exits with the observed status code.

use std::env;
use std::io::{self, IsTerminal, Write};
use std::process;

use check_service::cli::args::lossy_tokens;
use check_service::cli::output::Console;
use check_service::config::Config;
use check_service::telemetry::init_tracing;
use check_service::version::get_build_info;
use check_service::{CheckOrchestrator, HostChecker};

fn main() {
    init_tracing();
    tracing::debug!(build = %get_build_info(), "starting");

    let config = Config::from_env();
    let color = !config.no_color && io::stdout().is_terminal();

    let orchestrator = CheckOrchestrator::new(HostChecker::with_config(config.http));
    let mut console = Console::stdout(color);

    let code = orchestrator.run(lossy_tokens(env::args_os().skip(1)), &mut console);
    let _ = console.into_inner().flush();
    process::exit(code);
}
