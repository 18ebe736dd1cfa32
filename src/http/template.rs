use std::fmt;

use rand::Rng;

use crate::error::ValidationError;

/// Per-request values a path template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateVars {
    pub vu: u64,
    pub iteration: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Vu,
    Iteration,
    Rand(u64),
}

/// Request path with `{{vu}}`, `{{iter}}` and `{{rand:N}}` placeholders,
/// parsed once when the step is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a path template.
    ///
    /// # Errors
    ///
    /// Returns an error for an unclosed or unknown placeholder, or a `rand`
    /// bound below 1.
    pub fn parse(source: &str) -> Result<Self, ValidationError> {
        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(open) = rest.find("{{") {
            let (literal, tail) = rest.split_at(open);
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_owned()));
            }
            let inner_and_after = tail.get(2..).unwrap_or_default();
            let Some(close) = inner_and_after.find("}}") else {
                return Err(ValidationError::UnclosedPlaceholder {
                    template: source.to_owned(),
                });
            };
            let (inner, after) = inner_and_after.split_at(close);
            segments.push(parse_placeholder(inner.trim())?);
            rest = after.get(2..).unwrap_or_default();
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }
        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn render(&self, vars: TemplateVars) -> String {
        let mut rng = rand::thread_rng();
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Vu => rendered.push_str(&vars.vu.to_string()),
                Segment::Iteration => rendered.push_str(&vars.iteration.to_string()),
                Segment::Rand(bound) => {
                    let value = rng.gen_range(0..*bound);
                    rendered.push_str(&value.to_string());
                }
            }
        }
        rendered
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_placeholder(inner: &str) -> Result<Segment, ValidationError> {
    match inner {
        "vu" => return Ok(Segment::Vu),
        "iter" => return Ok(Segment::Iteration),
        _ => {}
    }
    let Some(bound) = inner.strip_prefix("rand:") else {
        return Err(ValidationError::UnknownPlaceholder {
            name: inner.to_owned(),
        });
    };
    match bound.trim().parse::<u64>() {
        Ok(value) if value >= 1 => Ok(Segment::Rand(value)),
        Ok(_) | Err(_) => Err(ValidationError::InvalidRandBound {
            placeholder: inner.to_owned(),
        }),
    }
}
