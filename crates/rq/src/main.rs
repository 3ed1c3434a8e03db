use clap::{CommandFactory, Parser};
use std::process::ExitCode;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, Config, ConfigSetOptions};
use commands::search::SearchCommandOptions;
use commands::{join_query, open_store, CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(s) => eprintln!("{s}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Sets up `env_logger` on stderr.
///
/// `RUST_LOG` wins when set; otherwise `-v` shows debug output, `-q` shows
/// only errors, and the default is warnings.
fn init_logging(cli: &Cli) {
    let level = log_level(cli);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

fn run(cli: &Cli) -> commands::Result<()> {
    match &cli.command {
        Some(Commands::Search {
            query,
            sort,
            desc,
            offset,
            limit,
            all,
        }) => {
            let config = load_config()?;
            let ctx = CommandContext::from_cli(cli, &config);
            let store = open_store(cli, &config)?;
            let opts = SearchCommandOptions {
                query: join_query(query),
                sort: sort.clone(),
                desc: *desc,
                offset: *offset,
                limit: *limit,
                all: *all,
            };
            commands::search::execute(&ctx, &opts, &store, &config.search)
        }
        Some(Commands::Parse { query }) => {
            let ctx = CommandContext::from_cli(cli, &lenient_config());
            commands::parse::execute(&ctx, &join_query(query))
        }
        Some(Commands::Config { command }) => {
            let ctx = CommandContext::from_cli(cli, &lenient_config());
            match command {
                Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx),
                Some(ConfigCommands::Set { key, value }) => {
                    let opts = ConfigSetOptions {
                        key: key.clone(),
                        value: value.clone(),
                    };
                    commands::config::execute_set(&ctx, &opts)
                }
                Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
            }
        }
        Some(Commands::Completions { shell }) => {
            commands::completions::execute(*shell)?;
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Loads the config for commands that never read cards. An unreadable
/// file falls back to defaults with a warning.
fn lenient_config() -> Config {
    load_config().unwrap_or_else(|e| {
        log::warn!("{e}");
        Config::default()
    })
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Query(_) => "QUERY_ERROR",
        CommandError::Store(_) => "STORE_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Query(_) => 1,
        CommandError::Json(_) => 1,
        CommandError::Io(_) => 3,
        CommandError::Store(_) => 5,
        CommandError::Config(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_search::search::QueryError;
    use recall_search::CardStoreError;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&CommandError::Query(QueryError::invalid_query("a:b:c"))),
            "QUERY_ERROR"
        );
        assert_eq!(
            error_code(&CommandError::Store(CardStoreError::NoDataDir)),
            "STORE_ERROR"
        );
        assert_eq!(
            error_code(&CommandError::Config("bad".to_string())),
            "CONFIG_ERROR"
        );
        assert_eq!(
            error_code(&CommandError::Io(std::io::Error::other("x"))),
            "IO_ERROR"
        );
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(
            exit_status(&CommandError::Query(QueryError::invalid_query("a:b:c"))),
            1
        );
        assert_eq!(exit_status(&CommandError::Store(CardStoreError::NoDataDir)), 5);
        assert_eq!(exit_status(&CommandError::Config("bad".to_string())), 5);
        assert_eq!(exit_status(&CommandError::Io(std::io::Error::other("x"))), 3);
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(&Cli::parse_from(["rq", "parse", "x"])), "warn");
        assert_eq!(log_level(&Cli::parse_from(["rq", "-v", "parse", "x"])), "debug");
        assert_eq!(log_level(&Cli::parse_from(["rq", "-q", "parse", "x"])), "error");
    }
}
