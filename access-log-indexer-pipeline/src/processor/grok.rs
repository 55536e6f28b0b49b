//! Grok-style pattern matching on top of `regex`.
//!
//! A Grok pattern is a regular expression with `%{NAME}`, `%{NAME:field}`
//! and `%{NAME:field:int|float}` tokens. Tokens expand recursively from a
//! [`PatternLibrary`]; tokens with a field name become captures.

use std::collections::HashMap;

use access_log_indexer_shared::FieldValue;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::extractor::FieldExtractor;
use super::patterns::builtin_patterns;

/// Nesting depth after which expansion is assumed to be cyclic.
const MAX_EXPANSION_DEPTH: usize = 32;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%\{(?P<pattern>[A-Za-z0-9_]+)(?::(?P<field>[A-Za-z0-9_@.\-]+))?(?::(?P<kind>int|float))?\}")
        .expect("grok token expression is valid")
});

/// Errors raised while compiling a Grok pattern.
#[derive(Error, Debug, Clone)]
pub enum GrokError {
    /// A token references a pattern the library does not define.
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    /// Expansion nested deeper than the limit, usually a cycle.
    #[error("Pattern expansion too deep at: {0}")]
    RecursionLimit(String),

    /// The expanded expression is not a valid regular expression.
    #[error("Invalid expression: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Named pattern definitions available to `%{...}` tokens.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    patterns: HashMap<String, String>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self {
            patterns: builtin_patterns()
                .into_iter()
                .map(|(name, definition)| (name.to_string(), definition))
                .collect(),
        }
    }
}

impl PatternLibrary {
    /// A library with no definitions.
    pub fn empty() -> Self {
        Self {
            patterns: HashMap::new(),
        }
    }

    /// Add or replace a definition.
    pub fn with_pattern(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.patterns.insert(name.into(), definition.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.patterns.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Int,
    Float,
}

impl FieldKind {
    fn parse(kind: Option<&str>) -> Self {
        match kind {
            Some("int") => FieldKind::Int,
            Some("float") => FieldKind::Float,
            _ => FieldKind::Text,
        }
    }

    /// Convert captured text, keeping it as text when the conversion fails.
    fn convert(self, text: &str) -> FieldValue {
        match self {
            FieldKind::Int => text
                .parse::<i64>()
                .map(FieldValue::Integer)
                .unwrap_or_else(|_| FieldValue::from(text)),
            FieldKind::Float => text
                .parse::<f64>()
                .map(FieldValue::Float)
                .unwrap_or_else(|_| FieldValue::from(text)),
            FieldKind::Text => FieldValue::from(text),
        }
    }
}

#[derive(Debug, Clone)]
struct FieldSpec {
    /// Capture group name in the compiled expression.
    group: String,
    /// Field name reported to callers.
    name: String,
    kind: FieldKind,
}

/// A compiled Grok pattern.
#[derive(Debug, Clone)]
pub struct Grok {
    regex: Regex,
    fields: Vec<FieldSpec>,
}

impl Grok {
    /// Compile a pattern against the built-in library.
    pub fn compile(pattern: &str) -> Result<Self, GrokError> {
        Self::compile_with(pattern, &PatternLibrary::default())
    }

    /// Compile a pattern against a custom library.
    pub fn compile_with(pattern: &str, library: &PatternLibrary) -> Result<Self, GrokError> {
        let mut fields = Vec::new();
        let expression = expand(pattern, library, 0, &mut fields)?;
        let regex = Regex::new(&expression)?;
        Ok(Self { regex, fields })
    }

    /// Field names this pattern can produce, in capture order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// The fully expanded regular expression.
    pub fn expression(&self) -> &str {
        self.regex.as_str()
    }
}

impl FieldExtractor for Grok {
    fn extract(&self, text: &str) -> Option<Vec<(String, FieldValue)>> {
        let captures = self.regex.captures(text)?;
        Some(
            self.fields
                .iter()
                .filter_map(|spec| {
                    captures
                        .name(&spec.group)
                        .map(|m| (spec.name.clone(), spec.kind.convert(m.as_str())))
                })
                .collect(),
        )
    }
}

/// Replace every token in `pattern` with its expanded definition.
///
/// Field names are not valid capture group names in every case (`@`), so
/// each named token gets a synthetic group `fN` recorded in `fields`.
fn expand(
    pattern: &str,
    library: &PatternLibrary,
    depth: usize,
    fields: &mut Vec<FieldSpec>,
) -> Result<String, GrokError> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(GrokError::RecursionLimit(pattern.to_string()));
    }

    let mut expression = String::with_capacity(pattern.len());
    let mut last = 0;

    for captures in TOKEN.captures_iter(pattern) {
        let Some(token) = captures.get(0) else {
            continue;
        };
        expression.push_str(&pattern[last..token.start()]);
        last = token.end();

        let name = &captures["pattern"];
        let definition = library
            .get(name)
            .ok_or_else(|| GrokError::UnknownPattern(name.to_string()))?;
        let inner = expand(definition, library, depth + 1, fields)?;

        match captures.name("field") {
            Some(field) => {
                let group = format!("f{}", fields.len());
                expression.push_str(&format!("(?P<{}>{})", group, inner));
                fields.push(FieldSpec {
                    group,
                    name: field.as_str().to_string(),
                    kind: FieldKind::parse(captures.name("kind").map(|k| k.as_str())),
                });
            }
            None => {
                expression.push_str("(?:");
                expression.push_str(&inner);
                expression.push(')');
            }
        }
    }

    expression.push_str(&pattern[last..]);
    Ok(expression)
}
