//! One-time target discovery: DNS lookup and URL scheme probing.
use std::net::IpAddr;

use reqwest::{Client, Url};
use tokio::net::lookup_host;
use tracing::{debug, info, warn};

use crate::domain::{Domain, Resolution};
use crate::error::{AppError, AppResult, HttpError};

const DEFAULT_PORT: u16 = 443;
const PROBE_SCHEMES: [&str; 2] = ["https", "http"];

/// Strips surrounding whitespace, a leading `http://` or `https://`, and one
/// trailing `/` and `.`.
#[must_use]
pub fn normalize_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let without_slash = without_scheme.strip_suffix('/').unwrap_or(without_scheme);
    let without_dot = without_slash.strip_suffix('.').unwrap_or(without_slash);
    without_dot.to_owned()
}

/// Splits `host[:port]` into the host to look up and its port.
///
/// # Errors
///
/// Returns an error when `name` does not form a valid URL authority.
pub fn split_host_port(name: &str) -> AppResult<(String, u16)> {
    let parsed = Url::parse(&format!("https://{}", name)).map_err(|err| {
        AppError::http(HttpError::InvalidTarget {
            target: name.to_owned(),
            source: err,
        })
    })?;
    let host = parsed.host_str().ok_or_else(|| {
        AppError::http(HttpError::TargetMissingHost {
            target: name.to_owned(),
        })
    })?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    Ok((host.to_owned(), parsed.port().unwrap_or(DEFAULT_PORT)))
}

/// Looks up the addresses behind `name` with the system resolver. The list
/// is informational since requests resolve through the client. A failed or
/// empty lookup is not fatal; the run goes ahead and lets the requests fail.
///
/// # Errors
///
/// Returns an error only when `name` cannot be parsed.
pub async fn discover_addresses(name: &str) -> AppResult<Vec<IpAddr>> {
    let (host, port) = split_host_port(name)?;
    let mut addresses: Vec<IpAddr> = Vec::new();
    match lookup_host((host.as_str(), port)).await {
        Ok(found) => {
            for addr in found {
                if !addresses.contains(&addr.ip()) {
                    addresses.push(addr.ip());
                }
            }
        }
        Err(err) => {
            warn!(domain = name, error = %err, "DNS lookup failed, trying anyway");
            return Ok(addresses);
        }
    }

    if addresses.is_empty() {
        warn!(domain = name, "No addresses found, trying anyway");
    } else {
        let listed = addresses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        info!(domain = name, addresses = %listed, "Resolved");
    }
    Ok(addresses)
}

/// Picks the URL the workers will hit: the first of `https://` and
/// `http://` that returns any HTTP response. Falls back to `https://` when
/// neither answers.
///
/// # Errors
///
/// Returns an error only when `name` cannot be parsed.
pub async fn resolve_target(client: &Client, name: &str) -> AppResult<Domain> {
    let addresses = discover_addresses(name).await?;

    for scheme in PROBE_SCHEMES {
        let url = format!("{}://{}", scheme, name);
        match client.get(&url).send().await {
            Ok(response) => {
                info!(
                    domain = name,
                    url = %url,
                    status = response.status().as_u16(),
                    "Target reachable"
                );
                return Ok(Domain::new(
                    name.to_owned(),
                    url,
                    addresses,
                    Resolution::Probed,
                ));
            }
            Err(err) => debug!(domain = name, url = %url, error = %err, "Probe failed"),
        }
    }

    let url = format!("https://{}", name);
    warn!(domain = name, url = %url, "No scheme responded, using fallback URL");
    Ok(Domain::new(
        name.to_owned(),
        url,
        addresses,
        Resolution::Fallback,
    ))
}
