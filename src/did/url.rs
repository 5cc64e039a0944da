//! Conversion between HTTP URLs and `did:web` DID URLs.
//!
//! A `did:web` method-specific identifier is the host, a percent-encoded
//! port when one is given, and any path segments, all separated by colons:
//! `https://example.com:8080/issuers/acme` becomes
//! `did:web:example.com%3A8080:issuers:acme`.

use std::fmt::{self, Display, Formatter, Write};
use std::str::FromStr;

use percent_encoding::percent_decode_str;

use crate::error::{Context, Err, Error};
use crate::{tracerr, Result};

/// Prefix shared by all `did:web` DIDs.
pub const DID_WEB_PREFIX: &str = "did:web:";

/// Convert an HTTP URL into a host and path separated by colons suitable
/// for use in a `did:web` DID.
///
/// Default ports (80 for `http`, 443 for `https`) are omitted. Empty path
/// segments, including a trailing slash, are ignored.
///
/// Valid examples:
/// - `https://example.com`
/// - `http://example.com/custom/path/`
/// - `https://example.com:8080`
///
/// # Errors
///
/// Returns an `invalid_config` error if the url is not a valid URL, has no
/// host, or has an IPv6 host.
pub fn parse_url(url: &str) -> Result<String> {
    let url = url::Url::parse(url)?;
    let Some(host_str) = url.host_str() else {
        tracerr!(Err::InvalidConfig, "no host in url {url}");
    };
    if matches!(url.host(), Some(url::Host::Ipv6(_))) {
        tracerr!(Err::InvalidConfig, "IPv6 host in url {url} cannot form a did:web DID");
    }

    let mut host = host_str.to_string();
    if let Some(port) = url.port() {
        let _ = write!(host, "%3A{port}");
    }
    if let Some(segments) = url.path_segments() {
        for segment in segments.filter(|s| !s.is_empty()) {
            let _ = write!(host, ":{}", segment.replace(':', "%3A"));
        }
    }
    Ok(host)
}

/// Construct the `did:web` DID for an HTTP URL. See [`parse_url`].
///
/// # Errors
///
/// Returns an `invalid_config` error if the url is not a valid URL or has no
/// host.
pub fn default_did(url: &str) -> Result<String> {
    let host_and_path = parse_url(url)?;
    Ok(format!("{DID_WEB_PREFIX}{host_and_path}"))
}

/// The HTTP URL a `did:web` DID's document is published at. See
/// [`DidUrl::to_web_http`].
///
/// # Errors
///
/// Returns an `invalid_format` error if `did` is not a `did:web` DID.
pub fn did_web_url(did: &str) -> Result<String> {
    DidUrl::from_str(did)?.to_web_http()
}

/// A parsed `did:web` DID URL.
///
/// Only the forms `did:web:<id>` and `did:web:<id>#<fragment>` are accepted.
/// The fragment is everything after the first `#`; it must be non-empty and
/// may not itself contain `#`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DidUrl {
    /// Method-specific identifier, still percent-encoded.
    pub id: String,

    /// Fragment, if any, without the leading `#`.
    pub fragment: Option<String>,
}

impl DidUrl {
    /// The DID without any fragment.
    #[must_use]
    pub fn did(&self) -> String {
        format!("{DID_WEB_PREFIX}{}", self.id)
    }

    /// The percent-decoded domain: host and optional port.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_format` error if the component does not decode to
    /// UTF-8.
    pub fn domain(&self) -> Result<String> {
        let domain = self.id.split(':').next().unwrap_or_default();
        decode(domain)
    }

    /// The percent-decoded path segments following the domain.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_format` error if a segment does not decode to
    /// UTF-8.
    pub fn path(&self) -> Result<Vec<String>> {
        self.id.split(':').skip(1).map(decode).collect()
    }

    /// The HTTP URL the DID document is published at.
    ///
    /// Documents without a path live under `/.well-known`. Hosts naming
    /// `localhost` use `http`, all others `https`.
    ///
    /// # Errors
    ///
    /// Returns an `invalid_format` error if the identifier cannot be decoded.
    pub fn to_web_http(&self) -> Result<String> {
        let domain = self.domain()?;
        let path = self.path()?;
        let scheme = if domain.contains("localhost") { "http" } else { "https" };

        let mut url = format!("{scheme}://{domain}");
        if path.is_empty() {
            url.push_str("/.well-known");
        } else {
            for segment in path {
                let _ = write!(url, "/{segment}");
            }
        }
        url.push_str("/did.json");
        Ok(url)
    }
}

impl FromStr for DidUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some(rest) = s.strip_prefix(DID_WEB_PREFIX) else {
            return Err(Err::InvalidFormat).context(format!("{s} is not a did:web DID"));
        };

        let (id, fragment) = match rest.split_once('#') {
            Some((_, fragment)) if fragment.is_empty() || fragment.contains('#') => {
                return Err(Err::InvalidFormat).context(format!("{s} has an invalid fragment"));
            }
            Some((id, fragment)) => (id, Some(fragment.to_string())),
            None => (rest, None),
        };
        if id.split(':').any(str::is_empty) {
            return Err(Err::InvalidFormat).context(format!(
                "{s} has an empty identifier component"
            ));
        }

        Ok(Self {
            id: id.to_string(),
            fragment,
        })
    }
}

impl Display for DidUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{DID_WEB_PREFIX}{}", self.id)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

fn decode(component: &str) -> Result<String> {
    let Ok(decoded) = percent_decode_str(component).decode_utf8() else {
        return Err(Err::InvalidFormat).context(format!(
            "{component} is not valid percent-encoded UTF-8"
        ));
    };
    Ok(decoded.into_owned())
}
