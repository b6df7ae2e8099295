use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "reporter")]
#[command(about = "Periodically posts a random, not recently posted feed article to an imageboard")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(env = "REPORTER_CONFIG")]
    pub config: PathBuf,

    /// Dry run - log the threads that would be created instead of posting them
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_config_and_flag() {
        let cli = Cli::try_parse_from(["reporter", "reporter.toml", "--dry-run"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("reporter.toml"));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_dry_run_defaults_off() {
        let cli = Cli::try_parse_from(["reporter", "reporter.toml"]).unwrap();
        assert!(!cli.dry_run);
    }
}
