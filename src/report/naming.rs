//! Company name resolution
//!
//! A first guess comes from the URL's host label (`acme-robotics.io` becomes
//! `acme robotics`). Sources that know better may supply a name later; the
//! first plausible one replaces the guess.

use url::{Host, Url};

use crate::constants::report::{MIN_RESOLVED_NAME_LEN, NOT_AVAILABLE};
use crate::types::{Result, ScreenerError};

/// Heuristic company name from the first label of the URL host
pub fn derive_company_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|e| ScreenerError::orchestration(format!("cannot parse '{url}': {e}")))?;

    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain,
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {
            return Err(ScreenerError::orchestration(format!(
                "cannot derive a company name from IP address host in '{url}'"
            )));
        }
        None => {
            return Err(ScreenerError::orchestration(format!(
                "no host in '{url}'"
            )));
        }
    };

    let label = host.strip_prefix("www.").unwrap_or(host);
    let label = label.split('.').next().unwrap_or_default();
    let name = label.replace(['-', '_'], " ").trim().to_string();

    if name.is_empty() {
        return Err(ScreenerError::orchestration(format!(
            "empty domain label in '{url}'"
        )));
    }
    Ok(name)
}

/// Whether a source-supplied name may replace the heuristic
pub fn is_plausible_name(name: &str) -> bool {
    let name = name.trim();
    name.chars().count() > MIN_RESOLVED_NAME_LEN && !name.eq_ignore_ascii_case(NOT_AVAILABLE)
}

/// First plausible candidate, trimmed, else the heuristic
pub fn resolve_company_name<'a>(
    heuristic: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> String {
    candidates
        .into_iter()
        .find(|name| is_plausible_name(name))
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| heuristic.to_string())
}
