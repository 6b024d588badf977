use clap::Parser;
use roster::cli::commands::Cli;
use roster::cli::handlers;
use roster::io::logging;

fn main() {
    let cli = Cli::parse();
    let workspace_dir = cli.workspace_dir.clone();

    match cli.command {
        None => {
            // No subcommand → launch TUI (it sets up file logging itself)
            if let Err(e) = roster::tui::run(workspace_dir.as_deref(), cli.verbose) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            logging::init_stderr(cli.verbose);
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
