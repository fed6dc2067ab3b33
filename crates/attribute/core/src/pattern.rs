//! Lore template compilation and value extraction.
//!
//! A template is a line of lore with exactly one [`PLACEHOLDER`] standing in
//! for the number, e.g. `"[VALUE] ATK"`. Each template compiles into three
//! matchers sharing the surrounding text:
//!
//! ```text
//! range    [VALUE] → NUMBER-NUMBER     "5-10 ATK"  → min += 5,  max += 10
//! single   [VALUE] → NUMBER            "+5 ATK"    → min += 5,  max += 5
//! percent  [VALUE] → NUMBER%           "5% ATK"    → percent += 5
//! ```
//!
//! Range wins over single for the same line and template. Percent is tested
//! independently. Everything sums: across lines, across templates, with no
//! deduplication.
//!
//! The text around the placeholder is regex syntax, so templates may use
//! alternation or character classes. A template that fails to compile is
//! reported and left out; the rest of the set keeps working.

use regex::Regex;
use thiserror::Error;

use crate::status::StatusData;

/// Token marking the number's position inside a template.
pub const PLACEHOLDER: &str = "[VALUE]";

/// Signed number with optional decimal part.
const NUMBER: &str = r"([-+]?\d+(?:\.\d+)?)";
/// Upper bound of a range; the dash before it is the separator.
const UNSIGNED: &str = r"(\d+(?:\.\d+)?)";

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("template {template:?} must contain exactly one [VALUE] placeholder (found {count})")]
    Placeholder { template: String, count: usize },

    #[error("template {template:?} does not compile")]
    Regex {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// One template compiled into its three matchers.
#[derive(Clone, Debug)]
pub struct CompiledPattern {
    template: String,
    range: Regex,
    single: Regex,
    percent: Regex,
}

impl CompiledPattern {
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let count = template.matches(PLACEHOLDER).count();
        if count != 1 {
            return Err(PatternError::Placeholder {
                template: template.to_string(),
                count,
            });
        }

        let build = |replacement: &str| {
            Regex::new(&template.replace(PLACEHOLDER, replacement)).map_err(|source| {
                PatternError::Regex {
                    template: template.to_string(),
                    source,
                }
            })
        };

        Ok(Self {
            template: template.to_string(),
            range: build(&format!("{NUMBER}-{UNSIGNED}"))?,
            single: build(NUMBER)?,
            percent: build(&format!("{NUMBER}%"))?,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Contribution of a single (already stripped) line.
    pub fn extract_line(&self, line: &str) -> StatusData {
        let mut data = StatusData::new();

        if let Some((low, high)) = self
            .range
            .captures(line)
            .and_then(|caps| Some((number(caps.get(1)?.as_str()), number(caps.get(2)?.as_str()))))
        {
            data.min += low;
            data.max += high;
        } else if let Some(value) = self
            .single
            .captures(line)
            .and_then(|caps| caps.get(1).map(|m| number(m.as_str())))
        {
            data.min += value;
            data.max += value;
        }

        if let Some(percent) = self
            .percent
            .captures(line)
            .and_then(|caps| caps.get(1).map(|m| number(m.as_str())))
        {
            data.percent += percent;
        }

        data
    }
}

/// Ordered set of compiled templates for one attribute.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every template, logging and skipping the ones that fail.
    pub fn compile<S: AsRef<str>>(templates: &[S]) -> Self {
        let (set, errors) = Self::compile_checked(templates);
        for error in &errors {
            tracing::warn!(
                target: "attribute::pattern",
                error = %error,
                "Skipping lore template"
            );
        }
        set
    }

    /// Compiles every template, returning the failures alongside the set.
    pub fn compile_checked<S: AsRef<str>>(templates: &[S]) -> (Self, Vec<PatternError>) {
        let mut patterns = Vec::with_capacity(templates.len());
        let mut errors = Vec::new();

        for template in templates {
            match CompiledPattern::compile(template.as_ref()) {
                Ok(pattern) => patterns.push(pattern),
                Err(error) => errors.push(error),
            }
        }

        (Self { patterns }, errors)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn templates(&self) -> impl Iterator<Item = &str> + '_ {
        self.patterns.iter().map(CompiledPattern::template)
    }

    /// Sum of every template's contribution over every line.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> StatusData {
        self.patterns
            .iter()
            .flat_map(|pattern| {
                lines
                    .iter()
                    .map(move |line| pattern.extract_line(line.as_ref()))
            })
            .sum()
    }
}

/// The capture grammar only admits well-formed decimals.
fn number(text: &str) -> f64 {
    text.parse().unwrap_or_default()
}
