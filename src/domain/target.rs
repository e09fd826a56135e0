use std::net::IpAddr;

/// How the target URL of a domain was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The scheme answered the startup probe.
    Probed,
    /// No scheme answered; the URL is a best-effort guess.
    Fallback,
}

/// A resolved target. Immutable for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    name: String,
    url: String,
    addresses: Vec<IpAddr>,
    resolution: Resolution,
}

impl Domain {
    #[must_use]
    pub const fn new(
        name: String,
        url: String,
        addresses: Vec<IpAddr>,
        resolution: Resolution,
    ) -> Self {
        Self {
            name,
            url,
            addresses,
            resolution,
        }
    }

    /// Domain whose URL is known up front, skipping discovery.
    #[must_use]
    pub fn with_url(name: &str, url: &str) -> Self {
        Self::new(
            name.to_owned(),
            url.to_owned(),
            Vec::new(),
            Resolution::Probed,
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    #[must_use]
    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }
}
