use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveUsize, SiteStressArgs, parse_header, parse_status_code};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. Values given explicitly on
/// the command line win.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut SiteStressArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "domains")
        && let Some(domains) = config.domains.as_ref()
    {
        args.domains.clone_from(domains);
    }

    if !is_cli(matches, "duration")
        && let Some(duration) = config.duration.as_ref()
    {
        args.duration = Some(to_duration(duration, "duration", "m")?);
    }

    if !is_cli(matches, "output_dir")
        && let Some(output_dir) = config.output_dir.as_ref()
    {
        args.output_dir = Some(output_dir.clone());
    }

    if !is_cli(matches, "workers")
        && let Some(workers) = config.workers
    {
        args.workers = Some(ensure_positive_usize(workers, "workers")?);
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = to_duration(timeout, "timeout", "s")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = to_duration(timeout, "connect_timeout", "s")?;
    }

    if !is_cli(matches, "monitor_interval")
        && let Some(interval) = config.monitor_interval.as_ref()
    {
        args.monitor_interval = to_duration(interval, "monitor_interval", "s")?;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    if !is_cli(matches, "user_agent")
        && let Some(user_agent) = config.user_agent.as_ref()
    {
        args.user_agent = Some(user_agent.clone());
    }

    if !is_cli(matches, "redirect_limit")
        && let Some(redirect) = config.redirect
    {
        args.redirect_limit = redirect;
    }

    if !is_cli(matches, "fail_statuses")
        && let Some(statuses) = config.fail_statuses.as_ref()
    {
        let mut parsed = Vec::with_capacity(statuses.len());
        for code in statuses {
            parsed.push(parse_status_code(&code.to_string()).map_err(AppError::validation)?);
        }
        args.fail_statuses = parsed;
    }

    if !is_cli(matches, "export_json")
        && let Some(path) = config.export_json.as_ref()
    {
        args.export_json = Some(path.clone());
    }

    apply_flag(matches, "insecure", config.insecure, &mut args.insecure);
    apply_flag(matches, "fail_on_4xx", config.fail_on_4xx, &mut args.fail_on_4xx);
    apply_flag(matches, "no_color", config.no_color, &mut args.no_color);
    apply_flag(matches, "no_banner", config.no_banner, &mut args.no_banner);
    apply_flag(matches, "verbose", config.verbose, &mut args.verbose);

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn apply_flag(matches: &ArgMatches, name: &str, value: Option<bool>, target: &mut bool) {
    if !is_cli(matches, name)
        && let Some(value) = value
    {
        *target = value;
    }
}

fn to_duration(
    value: &DurationValue,
    field: &'static str,
    bare_unit: &str,
) -> AppResult<std::time::Duration> {
    value
        .to_duration(bare_unit)
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

fn ensure_positive_usize(value: usize, field: &'static str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value)
        .map_err(|err| AppError::config(ConfigError::FieldMustBePositive { field, source: err }))
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}
