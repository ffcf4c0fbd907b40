use clap::Parser;
use rota::cli::commands::{Cli, Commands};
use rota::cli::handlers;
use rota::logging;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            if let Err(e) = rota::tui::run(cli.dir.as_deref().map(std::path::Path::new), cli.as_user) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Init(args)) => {
            // Init is handled before workspace discovery
            logging::init_cli();
            if let Err(e) = handlers::cmd_init(args, cli.dir.as_deref()) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            logging::init_cli();
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
