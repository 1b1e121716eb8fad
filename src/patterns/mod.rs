//! Pattern registry for request recognition
//!
//! This module provides the fixed, ordered set of request templates:
//! - Single-item templates (`linkmod: Colony Manager`, `there's a mod for that: ...`)
//! - Multi-item templates (`link 4 mods: a, b`, `there are A17 mods for that: a, b`)
//!
//! Single-item templates are always applied before multi-item templates.

use crate::error::{Result, ModlinkerError};
use regex::{Captures, Regex};

/// Inline flags shared by every template: case-insensitive, `$` at line ends
/// (CRLF aware).
const FLAGS: &str = "(?imR)";

/// Built-in templates, in application order
const TEMPLATES: &[TemplateConfig] = &[
    TemplateConfig {
        name: "single:there's a mod for that",
        family: TemplateFamily::Single,
        pattern: r"there's an? (?:(?:\[?(?:a|b|alpha|beta) ?(?P<alpha>[0-9]{2})\]?)|(?:(?:version|v)? ?(?P<version>[0-9]\.[0-9])))? ?(?P<type>mod|scenario) for that: (?P<query>.*?)(?:,|;|:|\.|\)|$)",
    },
    TemplateConfig {
        name: "single:link mod",
        family: TemplateFamily::Single,
        pattern: r"link ?(?:(?:\[?(?:a|b|alpha|beta) ?(?P<alpha>[0-9]{2})\]?)|(?:\[?(?:v|version)? ?(?P<version>[0-9]\.[0-9])\]?))? ?(?P<type>mod|scenario):? (?P<query>.*?)(?:,|;|:|\.|\)|$)",
    },
    TemplateConfig {
        name: "multiple:link mods",
        family: TemplateFamily::Multiple,
        pattern: r"link\s?(?P<count>[0-9]+)?\s?(?:(?:\[?(?:a|b|alpha|beta)\s?(?P<alpha>[0-9]{2})\]?)|(?:\[?(?:v|version)?\s?(?P<version>[0-9]\.[0-9])\]?))?\s?(?P<type>mod|scenario)s:?\s?(?P<query>.*?)(?:;|:|\.|$)",
    },
    TemplateConfig {
        name: "multiple:there are mods for that",
        family: TemplateFamily::Multiple,
        pattern: r"there(?:'s| are) (?P<count>[0-9]+)? ?(?:(?:\[?(?:a|b|alpha|beta)\s?(?P<alpha>[0-9]{2})\]?)|(?:\[?(?:v|version)?\s?(?P<version>[0-9]\.[0-9])\]?))?\s?(?P<type>mod|scenario)s? for that:? (?P<query>.*?)(?:;|:|\.|$)",
    },
];

/// Whether a template names one item or a comma separated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFamily {
    /// One query, one result
    Single,
    /// A list of queries sharing a count and version
    Multiple,
}

/// Uncompiled template definition
#[derive(Debug, Clone, Copy)]
pub struct TemplateConfig {
    pub name: &'static str,
    pub family: TemplateFamily,
    pub pattern: &'static str,
}

/// Compiled request template with pre-compiled regex
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub name: &'static str,
    pub family: TemplateFamily,
    pub regex: Regex,
}

/// Pattern registry with all pre-compiled templates
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Templates in application order (single before multiple)
    pub templates: Vec<CompiledTemplate>,
}

impl PatternRegistry {
    /// Compile the built-in templates
    pub fn builtin() -> Result<Self> {
        Self::from_templates(TEMPLATES)
    }

    /// Compile a set of templates, keeping single-item templates first
    pub fn from_templates(configs: &[TemplateConfig]) -> Result<Self> {
        let mut templates = configs
            .iter()
            .map(|cfg| {
                Regex::new(&format!("{}{}", FLAGS, cfg.pattern))
                    .map(|regex| CompiledTemplate {
                        name: cfg.name,
                        family: cfg.family,
                        regex,
                    })
                    .map_err(|e| {
                        ModlinkerError::Config(format!(
                            "Invalid request template '{}': {}",
                            cfg.name, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable sort keeps the configured order within a family
        templates.sort_by_key(|t| match t.family {
            TemplateFamily::Single => 0,
            TemplateFamily::Multiple => 1,
        });

        Ok(Self { templates })
    }

    /// Run every template over the text, in order, collecting raw captures
    pub fn find_captures(&self, text: &str) -> Vec<TemplateCapture> {
        self.templates
            .iter()
            .flat_map(|template| {
                template
                    .regex
                    .captures_iter(text)
                    .map(move |caps| TemplateCapture::from_captures(template, &caps))
            })
            .collect()
    }
}

/// Named groups of one template match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCapture {
    pub template: &'static str,
    pub family: TemplateFamily,
    pub kind: String,
    pub query: String,
    pub count: Option<String>,
    pub alpha: Option<String>,
    pub version: Option<String>,
}

impl TemplateCapture {
    fn from_captures(template: &CompiledTemplate, caps: &Captures<'_>) -> Self {
        let group = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

        Self {
            template: template.name,
            family: template.family,
            kind: group("type").unwrap_or_default(),
            query: group("query").unwrap_or_default(),
            count: group("count"),
            alpha: group("alpha"),
            version: group("version"),
        }
    }
}
