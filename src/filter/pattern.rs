//! URL pattern matching for deciding which requests are traced.
//!
//! # Responsibilities
//! - Parse servlet-style URL patterns
//! - Match a request path against a set of patterns
//!
//! # Design Decisions
//! - Four shapes only: catch-all (`/`, `/*`), prefix (`/api/*`), extension (`*.json`), exact (`/health`)
//! - Matching is case-sensitive and never uses regex
//! - A prefix pattern matches the prefix itself and anything below it
//! - An extension is the text after the last `.` of the last path segment

use thiserror::Error;

/// Errors for malformed patterns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("invalid url pattern {0:?}: must start with '/' or '*.'")]
    Invalid(String),

    #[error("invalid url pattern {0:?}: '*' is only allowed as '/*' suffix or '*.' prefix")]
    MisplacedWildcard(String),

    #[error("invalid url pattern {0:?}: the extension is the text after the last '.'")]
    CompoundExtension(String),
}

/// A single URL pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    All,
    Prefix(String),
    Extension(String),
    Exact(String),
}

impl UrlPattern {
    /// Parse one servlet-style pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern == "/" || pattern == "/*" {
            return Ok(UrlPattern::All);
        }

        if let Some(ext) = pattern.strip_prefix("*.") {
            if ext.is_empty() || ext.contains('/') || ext.contains('*') {
                return Err(PatternError::MisplacedWildcard(pattern.to_string()));
            }
            if ext.contains('.') {
                return Err(PatternError::CompoundExtension(pattern.to_string()));
            }
            return Ok(UrlPattern::Extension(ext.to_string()));
        }

        if !pattern.starts_with('/') {
            return Err(PatternError::Invalid(pattern.to_string()));
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            if prefix.contains('*') {
                return Err(PatternError::MisplacedWildcard(pattern.to_string()));
            }
            return Ok(UrlPattern::Prefix(prefix.to_string()));
        }

        if pattern.contains('*') {
            return Err(PatternError::MisplacedWildcard(pattern.to_string()));
        }
        Ok(UrlPattern::Exact(pattern.to_string()))
    }

    /// Whether `path` falls under this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            UrlPattern::All => true,
            UrlPattern::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .map(|rest| rest.is_empty() || rest.starts_with('/'))
                .unwrap_or(false),
            UrlPattern::Extension(ext) => {
                let last = path.rsplit('/').next().unwrap_or(path);
                last.rsplit_once('.').is_some_and(|(_, found)| found == ext.as_str())
            }
            UrlPattern::Exact(exact) => path == exact,
        }
    }
}

/// The set of patterns an interceptor traces. A path matches if any pattern does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPatterns {
    patterns: Vec<UrlPattern>,
}

impl UrlPatterns {
    /// Parse every pattern, failing on the first malformed one.
    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| UrlPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Matches every path.
    pub fn all() -> Self {
        Self {
            patterns: vec![UrlPattern::All],
        }
    }

    /// Whether any pattern matches `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

impl Default for UrlPatterns {
    fn default() -> Self {
        Self::all()
    }
}
