use autoreset::error::ResetResult;
use clap::Parser;
use ports::handle_list;
use reset::{ResetOptions, handle_reset};

mod ports;
mod reset;

#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
enum Cli {
    /// Pulse RTS/DTR to reset the board attached to a serial port
    #[command(name = "reset", alias = "r")]
    Reset(ResetOptions),

    /// List available serial ports
    #[command(name = "list", alias = "l")]
    List,
}

fn main() -> ResetResult<()> {
    let cli = Cli::parse();

    let level = match &cli {
        Cli::Reset(opts) if opts.verbose => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli {
        Cli::Reset(opts) => handle_reset(opts)?,
        Cli::List => handle_list()?,
    }

    Ok(())
}
