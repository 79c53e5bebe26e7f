//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{parse_point, Mode, PointArg};

/// Click repeatedly at chosen screen points, stop with a global hotkey
#[derive(Parser, Debug)]
#[command(name = "clickloop")]
#[command(version, about = "Repeated mouse clicks at chosen screen points", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Click the configured points until the stop hotkey or Ctrl+C
    Run {
        /// Extra point as X,Y or X,Y,DELAY (DELAY in ms or like 1m30s)
        #[arg(long = "point", short = 'p', value_parser = parse_point)]
        points: Vec<PointArg>,

        /// Click mode (default from config)
        #[arg(long, short)]
        mode: Option<Mode>,

        /// Log clicks instead of moving the pointer
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the positions of your next left clicks as X,Y lines
    Record {
        /// Number of points to capture
        #[arg(long, short = 'n', default_value = "1")]
        count: u32,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let args = Args::parse_from(["clickloop", "run"]);
        match args.command {
            Command::Run {
                points,
                mode,
                dry_run,
            } => {
                assert!(points.is_empty());
                assert!(mode.is_none());
                assert!(!dry_run);
            }
            _ => panic!("Expected Run subcommand"),
        }
        assert!(args.config.is_none());
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_run_points_and_mode() {
        let args = Args::parse_from([
            "clickloop",
            "run",
            "--point",
            "10,20",
            "-p",
            "30,40,250",
            "--mode",
            "sequential",
            "--dry-run",
        ]);
        match args.command {
            Command::Run {
                points,
                mode,
                dry_run,
            } => {
                assert_eq!(points.len(), 2);
                assert_eq!(points[0].x, 10);
                assert_eq!(points[1].delay_ms, Some(250));
                assert_eq!(mode, Some(Mode::Sequential));
                assert!(dry_run);
            }
            _ => panic!("Expected Run subcommand"),
        }
    }

    #[test]
    fn test_invalid_point_rejected() {
        let result = Args::try_parse_from(["clickloop", "run", "--point", "nope"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_count() {
        let args = Args::parse_from(["clickloop", "record"]);
        assert!(matches!(args.command, Command::Record { count: 1 }));

        let args = Args::parse_from(["clickloop", "record", "-n", "3"]);
        assert!(matches!(args.command, Command::Record { count: 3 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["clickloop", "run", "-vv", "--config", "/tmp/c.toml"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["clickloop", "config", "show"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));

        let args = Args::parse_from(["clickloop", "config", "init"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }
}
