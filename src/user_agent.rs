//! User-Agent string sent to the disk provider and its download hosts.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/diskview";

/// Default User-Agent for every outbound request (identifies the tool).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("diskview/{version} (public-link-browser; +{PROJECT_UA_URL})")
}
