//! HTTP reachability probe.
//!
//! This module performs the single GET request of a run.
//!
//! # Example
//!
//! ```rust,no_run
//! use check_cli::probe::{HttpProbe, Probe};
//!
//! # fn example() -> Result<(), check_cli::CliError> {
//! let probe = HttpProbe::new()?;
//! let result = probe.probe("https://example.com");
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

use std::error::Error as StdError;
use std::time::Duration;

use check_alerts::CheckResult;
use reqwest::blocking::Client;
use tracing::{debug, trace};

use crate::error::CliError;

/// Time allowed for the whole request before it counts as a transport failure.
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Something that can check a URL once.
pub trait Probe {
    /// Performs one request against `url`.
    fn probe(&self, url: &str) -> CheckResult;
}

/// Blocking HTTP GET probe.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
}

impl HttpProbe {
    /// Creates a probe with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, CliError> {
        Self::with_timeout(CHECK_TIMEOUT)
    }

    /// Creates a probe with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(timeout: Duration) -> Result<Self, CliError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CliError::Http(describe(&e)))?;
        Ok(Self { client, timeout })
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Probe for HttpProbe {
    fn probe(&self, url: &str) -> CheckResult {
        trace!(url, timeout = ?self.timeout, "sending GET");
        match self.client.get(url).send() {
            Ok(response) => {
                let status = response.status();
                debug!(url, %status, "website response");
                CheckResult::Status(status.as_u16())
            }
            Err(e) => CheckResult::Transport(describe(&e)),
        }
    }
}

// reqwest's top-level message hides the cause (DNS, refused, timeout).
fn describe(err: &dyn StdError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
