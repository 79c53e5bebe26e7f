mod cli;

use clap::Parser;

use cli::{Args, Command};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    clickloop::logging::init(args.verbose);

    let result = match args.command {
        Command::Run {
            points,
            mode,
            dry_run,
        } => cli::run(args.config.as_deref(), points, mode, dry_run).await,
        Command::Record { count } => cli::record(count).await,
        Command::Config { action } => {
            cli::handle_config_action(action, args.config.as_deref());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
