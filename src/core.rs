use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use crate::cli::Args;
use crate::client::HttpClient;
use crate::config::{ClientConfig, FileDefaults};
use crate::errors::Result;
use crate::logging;
use crate::menu::{Menu, MenuOptions};
use crate::net::ConnectionManager;
use crate::signals;
use crate::status::ExitStatus;

/// How long transient menu messages stay on an interactive terminal.
const MESSAGE_PAUSE: Duration = Duration::from_secs(1);

/// Main entry point for the CLI.
///
/// Parses arguments, sets up logging and configuration, then runs the
/// interactive menu on stdin/stdout until the user quits.
pub fn run(args: Vec<String>) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    logging::init(parsed.debug, parsed.log_format.unwrap_or_default());

    let config = match load_config(&parsed) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("httpterm: {}", e);
            return ExitStatus::Error;
        }
    };

    let styled = !parsed.no_color && console::Term::stdout().is_term();
    let stdin = io::stdin();
    let stdout = io::stdout();

    match run_session(&config, stdin.lock(), stdout.lock(), styled) {
        Ok(()) => {
            info!("Program exited successfully.");
            ExitStatus::Success
        }
        Err(e) => {
            error!("An error occurred: {}", e);
            ExitStatus::Error
        }
    }
}

/// Resolve the effective configuration from the config file and flags.
pub fn load_config(args: &Args) -> Result<ClientConfig> {
    let file = FileDefaults::load(args.config.as_deref())?;
    Ok(ClientConfig::resolve(args, &file))
}

/// Wire a client to `config` and run the menu over `input`/`output`.
pub fn run_session<R: BufRead, W: Write>(
    config: &ClientConfig,
    input: R,
    output: W,
    styled: bool,
) -> Result<()> {
    let connection = ConnectionManager::new(config.connection_settings());
    let client = HttpClient::new(connection, config.user_agent.clone());
    let options = MenuOptions {
        default_host: config.host.clone(),
        default_port: config.port.to_string(),
        selected: config
            .preselected
            .clone()
            .map(|(host, port)| (host, port.to_string())),
        styled,
        message_pause: if styled { MESSAGE_PAUSE } else { Duration::ZERO },
        interrupted: signals::was_interrupted,
    };

    Menu::new(client, input, output, options).run()
}
