//! A small `{name}` / `{name:spec}` template language.
//!
//! Supported specs are the ones the rule tables need: none, `s`, `.N`/`.Ns`
//! (string truncation), `f`/`.Nf` (fixed-point numbers) and `d` (integers).
//! `{{` and `}}` produce literal braces.
use crate::error::TemplateError;
use crate::graph::ParamValue;
use ahash::AHashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSpec {
    Plain,
    Str { precision: Option<usize> },
    Fixed { precision: usize },
    Integer,
}

impl FormatSpec {
    fn parse(field: &str, spec: &str) -> Result<Self, TemplateError> {
        let unsupported = || TemplateError::UnsupportedSpec {
            field: field.to_string(),
            spec: spec.to_string(),
        };

        if spec.is_empty() {
            return Ok(FormatSpec::Plain);
        }
        let (precision, kind) = match spec.strip_prefix('.') {
            Some(rest) => {
                let digits = rest.chars().take_while(char::is_ascii_digit).count();
                if digits == 0 {
                    return Err(unsupported());
                }
                let precision = rest[..digits].parse::<usize>().map_err(|_| unsupported())?;
                (Some(precision), &rest[digits..])
            }
            None => (None, spec),
        };

        match (kind, precision) {
            ("s", precision) | ("", precision @ Some(_)) => Ok(FormatSpec::Str { precision }),
            ("f", precision) => Ok(FormatSpec::Fixed {
                precision: precision.unwrap_or(6),
            }),
            ("d", None) => Ok(FormatSpec::Integer),
            _ => Err(unsupported()),
        }
    }

    fn apply(&self, field: &str, raw_spec: &str, value: &ParamValue) -> Result<String, TemplateError> {
        let incompatible = || TemplateError::IncompatibleValue {
            field: field.to_string(),
            spec: raw_spec.to_string(),
            value: value.to_string(),
        };

        match self {
            FormatSpec::Plain => Ok(value.to_string()),
            FormatSpec::Str { precision } => {
                let text = value.as_text().ok_or_else(incompatible)?;
                Ok(match precision {
                    Some(limit) => text.chars().take(*limit).collect(),
                    None => text,
                })
            }
            FormatSpec::Fixed { precision } => {
                let number = value
                    .as_number()
                    .and_then(|n| n.as_f64())
                    .ok_or_else(incompatible)?;
                Ok(format!("{:.*}", precision, number))
            }
            FormatSpec::Integer => {
                let number = value.as_number().ok_or_else(incompatible)?;
                if let Some(i) = number.as_i64() {
                    Ok(i.to_string())
                } else if let Some(u) = number.as_u64() {
                    Ok(u.to_string())
                } else {
                    Err(incompatible())
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        name: String,
        raw_spec: String,
        spec: FormatSpec,
    },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().enumerate().peekable();

        while let Some((position, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(TemplateError::UnbalancedBrace { position }),
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for (inner_position, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(TemplateError::UnbalancedBrace {
                                    position: inner_position,
                                });
                            }
                            other => body.push(other),
                        }
                    }
                    if !closed {
                        return Err(TemplateError::UnbalancedBrace { position });
                    }

                    let (name, raw_spec) = body.split_once(':').unwrap_or((&body, ""));
                    if name.is_empty() {
                        return Err(TemplateError::EmptyField { position });
                    }
                    let spec = FormatSpec::parse(name, raw_spec)?;

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field {
                        name: name.to_string(),
                        raw_spec: raw_spec.to_string(),
                        spec,
                    });
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of the fields the template references, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitutes every placeholder. Any missing or unformattable field fails the whole render.
    pub fn render(&self, fields: &AHashMap<String, ParamValue>) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Field {
                    name,
                    raw_spec,
                    spec,
                } => {
                    let value = fields
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingField(name.clone()))?;
                    output.push_str(&spec.apply(name, raw_spec, value)?);
                }
            }
        }
        Ok(output)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
