use std::ffi::OsString;
use std::path::Path;

use clap::{CommandFactory, FromArgMatches};

use crate::app::{finalize_run, run_attack};
use crate::args::{DEFAULT_CONFIG_FILES, SiteStressArgs};
use crate::config::{apply_config, load_config};
use crate::domain::RunConfig;
use crate::error::AppResult;
use crate::system::{banner, logger};

pub(crate) fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    logger::init_logging(args.verbose, args.no_color);
    if !args.no_banner {
        banner::print_cli_banner(args.no_color);
    }

    let config = RunConfig::from_args(&args).inspect_err(|err| {
        tracing::error!("{}", err);
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let report = run_attack(&config, args.no_color).await?;
        finalize_run(&config, &report).await;
        Ok(())
    })
}

/// Parses the command line and merges the config file into it. Returns
/// `None` when help was printed instead.
fn parse_args() -> AppResult<Option<SiteStressArgs>> {
    let mut cmd = SiteStressArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let mut args = SiteStressArgs::from_arg_matches(&matches)?;

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    Ok(Some(args))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn os_args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn help_only_without_arguments() -> AppResult<()> {
        if should_show_help(&os_args(&["sitestress", "-d", "example.com"])) {
            return Err(AppError::validation("Expected no help when args are given"));
        }
        if has_default_config() {
            return Ok(());
        }
        if !should_show_help(&os_args(&["sitestress"])) {
            return Err(AppError::validation("Expected help for bare invocation"));
        }
        if !should_show_help(&os_args(&["sitestress", "--"])) {
            return Err(AppError::validation("Expected help for bare separator"));
        }
        Ok(())
    }
}
