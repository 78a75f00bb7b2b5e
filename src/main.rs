use httpterm::status::ExitStatus;
use httpterm::{core, signals};

/// Entry point - installs the Ctrl+C handler and calls core::run()
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    if let Err(e) = signals::install() {
        eprintln!("Warning: Failed to install Ctrl+C handler: {}", e);
    }

    let args: Vec<String> = std::env::args().collect();
    let status = core::run(args);

    if signals::was_interrupted() {
        return ExitStatus::Interrupted;
    }

    status
}
