//! Rendering configuration for the query builder and the binder.

use std::fmt::Write as _;

/// Placeholder marker written in predicates handed to
/// [`QueryBuilder::and_where`](crate::QueryBuilder::and_where).
pub const DEFAULT_MARKER: &str = "$?";

/// How positional parameters are written in rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `$1, $2, ...` (PostgreSQL).
    #[default]
    Dollar,
    /// `?` for every parameter, for drivers that number implicitly.
    Question,
}

impl PlaceholderStyle {
    /// Write the placeholder for the `n`th parameter (1-based).
    pub fn write(self, out: &mut String, n: usize) {
        match self {
            Self::Dollar => {
                // Writing to a String cannot fail.
                let _ = write!(out, "${n}");
            }
            Self::Question => out.push('?'),
        }
    }

    /// The placeholder for the `n`th parameter (1-based).
    pub fn render(self, n: usize) -> String {
        let mut out = String::with_capacity(4);
        self.write(&mut out, n);
        out
    }
}

/// Configuration for [`QueryBuilder`](crate::QueryBuilder).
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Alias appended to the FROM table and used to qualify record columns.
    pub select_alias: Option<String>,
    /// Select computed fields as plain columns instead of their expression.
    pub ignore_computed: bool,
    /// Positional parameter format.
    pub placeholder: PlaceholderStyle,
    /// Marker replaced by positional parameters in filter predicates.
    pub marker: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            select_alias: None,
            ignore_computed: false,
            placeholder: PlaceholderStyle::Dollar,
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl AssemblerConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the select alias.
    pub fn select_alias(mut self, alias: impl Into<String>) -> Self {
        self.select_alias = Some(alias.into());
        self
    }

    /// Select computed fields by column name only.
    pub fn ignore_computed(mut self, ignore: bool) -> Self {
        self.ignore_computed = ignore;
        self
    }

    /// Set the positional parameter format.
    pub fn placeholder(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder = style;
        self
    }

    /// Set the placeholder marker used in filter predicates.
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollar_placeholders_are_numbered() {
        assert_eq!(PlaceholderStyle::Dollar.render(1), "$1");
        assert_eq!(PlaceholderStyle::Dollar.render(12), "$12");
    }

    #[test]
    fn question_placeholders_are_unnumbered() {
        assert_eq!(PlaceholderStyle::Question.render(1), "?");
        assert_eq!(PlaceholderStyle::Question.render(7), "?");
    }

    #[test]
    fn config_defaults() {
        let cfg = AssemblerConfig::new();
        assert_eq!(cfg.marker, "$?");
        assert_eq!(cfg.placeholder, PlaceholderStyle::Dollar);
        assert!(cfg.select_alias.is_none());
        assert!(!cfg.ignore_computed);
    }
}
