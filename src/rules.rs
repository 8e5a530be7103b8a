//! Per-field validation rules.

use regex::Regex;

/// A compiled full-match pattern.
///
/// The engine anchors every pattern: the entire string must match, not merely
/// contain a match. The original source is kept for error messages.
#[derive(Debug, Clone)]
pub struct Pattern {
	regex: Regex,
	source: String,
}

impl Pattern {
	/// Compiles `source` anchored as `^(?:source)$`.
	pub(crate) fn compile(source: &str) -> Result<Self, regex::Error> {
		let regex = Regex::new(&format!("^(?:{source})$"))?;
		Ok(Self {
			regex,
			source: source.to_string(),
		})
	}

	/// The pattern as written by the schema author, without anchors.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Whether the entire string matches.
	pub fn matches(&self, value: &str) -> bool {
		self.regex.is_match(value)
	}
}

/// Constraints attached to one field.
///
/// A pure data record: which rules apply to which field types is enforced by
/// the schema builder, and rule evaluation order is fixed by the validator.
/// All bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ValidationRules {
	/// Whether the field must be present in the input tree.
	pub required: bool,
	/// Minimum length for strings (in characters) and arrays (in elements).
	pub min_length: Option<usize>,
	/// Maximum length for strings (in characters) and arrays (in elements).
	pub max_length: Option<usize>,
	/// Minimum value for numeric fields.
	pub min_value: Option<f64>,
	/// Maximum value for numeric fields.
	pub max_value: Option<f64>,
	/// Full-match pattern for string-backed fields.
	pub pattern: Option<Pattern>,
	/// Allowed string representations, matched exactly and case-sensitively.
	pub one_of: Option<Vec<String>>,
}

impl ValidationRules {
	/// True when no constraint beyond presence has been attached.
	pub fn is_presence_only(&self) -> bool {
		self.min_length.is_none()
			&& self.max_length.is_none()
			&& self.min_value.is_none()
			&& self.max_value.is_none()
			&& self.pattern.is_none()
			&& self.one_of.is_none()
	}
}
