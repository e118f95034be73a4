//! Recognition of scanned payloads as web links.
//!
//! Both entry points are total: malformed input never surfaces as an error,
//! [`is_valid_url`] answers `false` and [`format_host`] hands the input back.

use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};
use url::{Host, Url};

// Scheme policy
//------------------------------------------------------------------------------

/// How the scheme of a candidate link is matched against `http`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchemeMatch {
    /// Only `http` and `https`.
    #[default]
    Exact,
    /// Any scheme starting with `http`, so `httpfoo://host` passes too.
    Prefix,
}

impl SchemeMatch {
    pub fn accepts(self, scheme: &str) -> bool {
        match self {
            Self::Exact => matches!(scheme, "http" | "https"),
            Self::Prefix => scheme.starts_with("http"),
        }
    }
}

// Candidate payload
//------------------------------------------------------------------------------

/// Raw text decoded from one QR code, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidatePayload(String);

impl CandidatePayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for CandidatePayload {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for CandidatePayload {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CandidatePayload {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for CandidatePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Validated url
//------------------------------------------------------------------------------

/// A payload that passed validation. The text is kept exactly as scanned; the
/// host is extracted once for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn validate(
        payload: CandidatePayload,
        policy: SchemeMatch,
    ) -> Result<Self, CandidatePayload> {
        match http_host(&payload, policy) {
            Some(host) => Ok(Self { url: payload.into_inner(), host }),
            None => Err(payload),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn into_inner(self) -> String {
        self.url
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

// Validator & formatter
//------------------------------------------------------------------------------

/// Checks whether `text` is a navigable `http`/`https` link with a host.
pub fn is_valid_url(text: &str) -> bool {
    is_valid_url_with(text, SchemeMatch::default())
}

pub fn is_valid_url_with(text: &str, policy: SchemeMatch) -> bool {
    http_host(text, policy).is_some()
}

/// Short label for display: the host of `text` in Unicode, or `text` itself
/// when it has none or does not parse.
pub fn format_host(text: &str) -> String {
    match parse_uri(text).as_ref().and_then(display_host) {
        Some(host) => host,
        None => text.to_string(),
    }
}

// The scheme is matched as written, before `Url` lowercases it
fn http_host(text: &str, policy: SchemeMatch) -> Option<String> {
    let (scheme, _) = text.split_once(':')?;
    if !policy.accepts(scheme) {
        return None;
    }
    display_host(&parse_uri(text)?)
}

/// Parses `text` only if it is already a well formed absolute URI with an
/// authority. `Url::parse` silently repairs missing slashes, backslashes,
/// stray spaces and bad escapes; such texts are refused instead.
fn parse_uri(text: &str) -> Option<Url> {
    if !text.chars().all(is_uri_char) || !has_valid_escapes(text) {
        return None;
    }
    let (_, rest) = text.split_once(':')?;
    let authority = rest.strip_prefix("//")?;
    if authority.is_empty() || authority.starts_with(['/', '?', '#']) {
        return None;
    }
    Url::parse(text).ok()
}

fn is_uri_char(c: char) -> bool {
    !c.is_whitespace()
        && !c.is_control()
        && !matches!(c, '"' | '<' | '>' | '\\' | '^' | '`' | '{' | '|' | '}')
}

// Every `%` starts a two digit hex escape
fn has_valid_escapes(text: &str) -> bool {
    let bytes = text.as_bytes();
    let hex = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_hexdigit);
    bytes.iter().enumerate().all(|(i, &b)| b != b'%' || (hex(i + 1) && hex(i + 2)))
}

fn display_host(url: &Url) -> Option<String> {
    let host = match url.host()? {
        Host::Domain(domain) => match idna::domain_to_unicode(domain) {
            (unicode, Ok(())) => unicode,
            (_, Err(_)) => domain.to_string(),
        },
        Host::Ipv4(_) | Host::Ipv6(_) => url.host_str()?.to_string(),
    };
    Some(host).filter(|h| !h.is_empty())
}
