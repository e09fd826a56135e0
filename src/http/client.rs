use std::time::Duration;

use reqwest::{
    Client,
    header::{CACHE_CONTROL, CONNECTION, HeaderMap, HeaderName, HeaderValue, PRAGMA, USER_AGENT},
    redirect,
};

use crate::domain::RunConfig;
use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Idle keep-alive connections are closed after this long.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Header set sent with every request: browser-like User-Agent, caching
/// disabled, keep-alive, then any user-supplied extras (which may override).
///
/// # Errors
///
/// Returns an error when a header name or value is not valid HTTP.
pub fn build_headers(config: &RunConfig) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value("User-Agent", &config.user_agent)?);
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|err| {
            AppError::validation(ValidationError::InvalidHeaderName {
                header: key.clone(),
                source: err,
            })
        })?;
        headers.insert(name, header_value(key, value)?);
    }
    Ok(headers)
}

fn header_value(header: &str, value: &str) -> AppResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|err| {
        AppError::validation(ValidationError::InvalidHeaderValue {
            header: header.to_owned(),
            source: err,
        })
    })
}

/// Builds the one client shared by every worker and the resolver. The idle
/// pool holds one connection per worker so a saturated pool never shows up
/// as a target failure.
///
/// # Errors
///
/// Returns an error when the headers are invalid or the TLS backend cannot
/// be initialized.
pub fn build_client(config: &RunConfig) -> AppResult<Client> {
    let mut builder = Client::builder()
        .default_headers(build_headers(config)?)
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.workers())
        .pool_idle_timeout(Some(POOL_IDLE_TIMEOUT))
        .tcp_nodelay(true);

    builder = if config.redirect_limit == 0 {
        builder.redirect(redirect::Policy::none())
    } else {
        builder.redirect(redirect::Policy::limited(
            usize::try_from(config.redirect_limit).unwrap_or(usize::MAX),
        ))
    };

    if config.insecure {
        builder = builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }

    builder
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
