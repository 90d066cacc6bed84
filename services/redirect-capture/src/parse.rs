//! Redirect query parsing
//!
//! Validates the parameters a provider appends to the loopback redirect.
//! `code` is required; `scope` and `state` are optional and provider-shaped
//! (Streamlabs redirects carry no `scope` at all).

use std::collections::BTreeSet;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Raw query parameters as they arrive on the redirect.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub code: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
}

/// Validated redirect parameters.
#[derive(Debug)]
pub struct ParsedRedirect {
    pub code: String,
    pub scopes: BTreeSet<String>,
    /// Verbatim `state` value; key interpretation happens in [`crate::keys`].
    pub state: String,
}

/// Extract and validate the redirect parameters.
///
/// `scope` splits on runs of whitespace into a set. A whitespace-only value
/// grants nothing; the upstream meaning is unclear, so it is logged rather
/// than rejected.
pub fn parse(query: &RedirectQuery) -> Result<ParsedRedirect> {
    let code = match query.code.as_deref() {
        Some(code) if !code.is_empty() => code.to_owned(),
        _ => return Err(Error::MissingAuthorizationCode),
    };

    let scope = query.scope.as_deref().unwrap_or("");
    let scopes: BTreeSet<String> = scope.split_whitespace().map(str::to_owned).collect();
    if scopes.is_empty() && !scope.is_empty() {
        warn!(scope, "scope parameter is whitespace-only, granting no scopes");
    }

    Ok(ParsedRedirect {
        code,
        scopes,
        state: query.state.clone().unwrap_or_default(),
    })
}
