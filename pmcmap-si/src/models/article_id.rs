//! PubMed Central article identifiers

use once_cell::sync::Lazy;
use pmcmap_common::{Error, Result};
use regex::Regex;
use std::fmt;

static PMC_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"articles/(PMC\d+)/?").expect("valid PMC URL pattern"));

/// A validated PubMed Central identifier: the literal `PMC` prefix followed
/// by one or more ASCII digits.
///
/// Identifiers failing the shape check never reach the registry client, so a
/// bad input line costs zero network requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PmcId(String);

impl PmcId {
    /// Parse an identifier, enforcing the `PMC<digits>` shape.
    pub fn parse(raw: &str) -> Result<PmcId> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix("PMC").ok_or_else(|| {
            Error::InvalidInput(format!("identifier missing PMC prefix: {trimmed}"))
        })?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidInput(format!(
                "identifier suffix is not numeric: {trimmed}"
            )));
        }
        Ok(PmcId(trimmed.to_string()))
    }

    /// Extract an identifier from a PMC article URL, e.g.
    /// `https://www.ncbi.nlm.nih.gov/pmc/articles/PMC3630201/`.
    pub fn from_url(url: &str) -> Option<PmcId> {
        PMC_URL_PATTERN
            .captures(url)
            .map(|caps| PmcId(caps[1].to_string()))
    }

    /// Full identifier, e.g. `PMC3630201`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix without the `PMC` prefix, e.g. `3630201`.
    pub fn numeric(&self) -> &str {
        &self.0[3..]
    }
}

impl fmt::Display for PmcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
