//! Path template compilation and matching.
//!
//! # Responsibilities
//! - Compile `/users/{user_id}` style templates into segment lists
//! - Match a concrete path against a compiled template
//! - Extract named parameters
//!
//! # Design Decisions
//! - Literal segments are case-sensitive and match verbatim
//! - A parameter matches exactly one non-empty segment
//! - Matching is anchored: segment counts must agree
//! - No regex; a template is a plain list of segments

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route template `{0}` must start with '/'")]
    NotAbsolute(String),

    #[error("route template `{template}` has malformed placeholder `{segment}`")]
    InvalidPlaceholder { template: String, segment: String },

    #[error("route template `{template}` declares parameter `{name}` twice")]
    DuplicateParam { template: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile a template. Placeholders are `{name}` where `name` is an identifier.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let Some(rest) = template.strip_prefix('/') else {
            return Err(RouteError::NotAbsolute(template.to_string()));
        };

        let mut segments = Vec::new();
        for segment in rest.split('/') {
            if segment.contains('{') || segment.contains('}') {
                let name = segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .filter(|name| is_identifier(name))
                    .ok_or_else(|| RouteError::InvalidPlaceholder {
                        template: template.to_string(),
                        segment: segment.to_string(),
                    })?;

                if segments.contains(&Segment::Param(name.to_string())) {
                    return Err(RouteError::DuplicateParam {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Literal(segment.to_string()));
            }
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template as written at registration.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the parameters in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match a concrete path, returning extracted parameters on success.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut params = HashMap::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if part != literal {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), part.to_string());
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
