//! X.500 distinguished name parsing, canonicalization and pattern matching.
//!
//! Names are held as an ordered multimap from normalized attribute name to
//! the list of values seen for that attribute, in RDN order. Lookups are
//! case sensitive on the normalized key; case-insensitive comparison is
//! what [`DnCanonicalizer::canonicalize`] output is for.

use log::warn;
use regex::RegexBuilder;
use unicode_normalization::UnicodeNormalization;
use yasna::tags::{
	TAG_BMPSTRING, TAG_IA5STRING, TAG_PRINTABLESTRING, TAG_TELETEXSTRING, TAG_UNIVERSALSTRING,
	TAG_UTF8STRING,
};

use crate::Error;

/// Ordered multimap of normalized DN attribute name to values.
///
/// Insertion order reflects RDN order in the source DN. Values for the same
/// attribute are grouped under its first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DnAttributeMap {
	entries: Vec<(String, Vec<String>)>,
}

impl DnAttributeMap {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}
	/// Values recorded for the given normalized attribute name.
	pub fn get(&self, attr: &str) -> Option<&[String]> {
		self.entries
			.iter()
			.find(|(key, _)| key == attr)
			.map(|(_, values)| values.as_slice())
	}
	/// Iterates over `(attribute, values)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.entries
			.iter()
			.map(|(key, values)| (key.as_str(), values.as_slice()))
	}
	/// The set of attribute names present.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(key, _)| key.as_str())
	}
	/// Number of distinct attribute names.
	pub fn len(&self) -> usize {
		self.entries.len()
	}
	/// True when no attribute is present.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
	fn insert(&mut self, attr: String, value: String) {
		match self.entries.iter_mut().find(|(key, _)| *key == attr) {
			Some((_, values)) => values.push(value),
			None => self.entries.push((attr, vec![value])),
		}
	}
	fn key_set(&self) -> std::collections::HashSet<&str> {
		self.keys().collect()
	}
}

/// Recognized attribute keywords and their normalized spellings.
///
/// Anything else is kept only if it is a dotted numeric OID (optionally
/// prefixed `OID.`) or a plain alphanumeric keyword, which is upper-cased.
const ATTR_ALIASES: &[(&str, &str)] = &[
	("COMMONNAME", "CN"),
	("COUNTRYNAME", "C"),
	("LOCALITYNAME", "L"),
	("STATEORPROVINCENAME", "ST"),
	("S", "ST"),
	("ORGANIZATIONNAME", "O"),
	("ORGANIZATIONALUNITNAME", "OU"),
	("SURNAME", "SN"),
	("DOMAINCOMPONENT", "DC"),
	("USERID", "UID"),
	("E", "EMAILADDRESS"),
	("EMAIL", "EMAILADDRESS"),
];

fn normalize_attr(raw: &str) -> Option<String> {
	let raw = raw.trim();
	if raw.is_empty() {
		return None;
	}
	let stripped = raw
		.strip_prefix("OID.")
		.or_else(|| raw.strip_prefix("oid."))
		.unwrap_or(raw);
	if stripped.contains('.') || stripped.chars().all(|c| c.is_ascii_digit()) {
		// numeric OID form
		let valid = !stripped.is_empty()
			&& stripped.split('.').all(|c| !c.is_empty() && c.chars().all(|d| d.is_ascii_digit()));
		return valid.then(|| stripped.to_string());
	}
	if !stripped.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
		return None;
	}
	let upper = stripped.to_ascii_uppercase();
	let normalized = ATTR_ALIASES
		.iter()
		.find(|(alias, _)| *alias == upper)
		.map(|(_, canonical)| canonical.to_string())
		.unwrap_or(upper);
	Some(normalized)
}

/// Parses an X.500 distinguished name string into an attribute map.
///
/// RDNs are separated by `,` or `;`, multivalued RDNs by `+`. RFC 2253
/// backslash escapes, `\xx` hex escapes, quoted values and `#hex` encoded
/// values are understood. Syntactically invalid input is an error; no
/// partial map is returned.
pub fn dn_to_attribute_map(dn: &str) -> Result<DnAttributeMap, Error> {
	let invalid = || Error::InvalidDnString(dn.to_string());
	let mut map = DnAttributeMap::new();
	let mut chars = dn.chars().peekable();

	loop {
		while matches!(chars.peek(), Some(' ')) {
			chars.next();
		}
		if chars.peek().is_none() {
			break;
		}

		// attribute type up to '='
		let mut attr_raw = String::new();
		loop {
			match chars.next() {
				Some('=') => break,
				Some(c) if c == ',' || c == '+' || c == ';' => return Err(invalid()),
				Some(c) => attr_raw.push(c),
				None => return Err(invalid()),
			}
		}
		let attr = normalize_attr(&attr_raw).ok_or_else(invalid)?;

		while matches!(chars.peek(), Some(' ')) {
			chars.next();
		}

		// attribute value
		let mut value_bytes: Vec<u8> = Vec::new();
		let mut separator = None;
		match chars.peek() {
			Some('"') => {
				chars.next();
				loop {
					match chars.next() {
						Some('\\') => match chars.next() {
							Some(c) => {
								let mut buf = [0u8; 4];
								value_bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
							},
							None => return Err(invalid()),
						},
						Some('"') => break,
						Some(c) => {
							let mut buf = [0u8; 4];
							value_bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
						},
						None => return Err(invalid()),
					}
				}
				while matches!(chars.peek(), Some(' ')) {
					chars.next();
				}
				match chars.next() {
					None => {},
					Some(c) if c == ',' || c == '+' || c == ';' => separator = Some(c),
					Some(_) => return Err(invalid()),
				}
			},
			Some('#') => {
				// hex encoded value, kept verbatim including the '#'
				value_bytes.push(b'#');
				chars.next();
				loop {
					match chars.peek() {
						Some(&c) if c == ',' || c == '+' || c == ';' => {
							separator = Some(c);
							chars.next();
							break;
						},
						Some(&c) => {
							let mut buf = [0u8; 4];
							value_bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
							chars.next();
						},
						None => break,
					}
				}
			},
			_ => {
				// unquoted value with backslash escapes; unescaped trailing
				// spaces are dropped, escaped ones survive
				let mut pending_spaces = 0usize;
				loop {
					match chars.peek() {
						Some(&c) if c == ',' || c == '+' || c == ';' => {
							separator = Some(c);
							chars.next();
							break;
						},
						Some('\\') => {
							chars.next();
							for _ in 0..pending_spaces {
								value_bytes.push(b' ');
							}
							pending_spaces = 0;
							let first = chars.next().ok_or_else(invalid)?;
							if first.is_ascii_hexdigit()
								&& chars.peek().is_some_and(|c| c.is_ascii_hexdigit())
							{
								let second = chars.next().ok_or_else(invalid)?;
								let byte = u8::from_str_radix(
									&format!("{first}{second}"),
									16,
								)
								.map_err(|_| invalid())?;
								value_bytes.push(byte);
							} else {
								let mut buf = [0u8; 4];
								value_bytes
									.extend_from_slice(first.encode_utf8(&mut buf).as_bytes());
							}
						},
						Some(' ') => {
							pending_spaces += 1;
							chars.next();
						},
						Some(&c) => {
							for _ in 0..pending_spaces {
								value_bytes.push(b' ');
							}
							pending_spaces = 0;
							let mut buf = [0u8; 4];
							value_bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
							chars.next();
						},
						None => break,
					}
				}
			},
		}

		let value = String::from_utf8(value_bytes).map_err(|_| invalid())?;
		map.insert(attr, value);

		if separator.is_none() && chars.peek().is_none() {
			break;
		}
	}
	Ok(map)
}

/// Strategy for rendering a parsed DN back into string form.
///
/// The canonical renderer is the default; passing a different formatter at
/// construction time replaces it without any process-global discovery.
pub trait DnFormatter: Send + Sync {
	/// Renders the attribute map as a DN string.
	fn format(&self, dn: &DnAttributeMap) -> String;
}

/// The built-in canonical renderer.
///
/// Lower-cases attribute keywords, case-folds and NFKD-normalizes values,
/// collapses internal runs of whitespace, and (optionally) decodes `#hex`
/// encoded attribute values back into readable text.
#[derive(Debug, Clone)]
pub struct CanonicalDnFormatter {
	/// Decode `attr=#...` values where the DER inside is a recognized
	/// string type. Decoding failures leave the encoded form untouched.
	pub decode_hex_values: bool,
}

impl Default for CanonicalDnFormatter {
	fn default() -> Self {
		Self {
			decode_hex_values: true,
		}
	}
}

impl DnFormatter for CanonicalDnFormatter {
	fn format(&self, dn: &DnAttributeMap) -> String {
		let mut parts = Vec::new();
		for (attr, values) in dn.iter() {
			for value in values {
				parts.push(format!(
					"{}={}",
					attr.to_ascii_lowercase(),
					self.canonical_value(value)
				));
			}
		}
		parts.join(",")
	}
}

impl CanonicalDnFormatter {
	fn canonical_value(&self, raw: &str) -> String {
		if let Some(hex) = raw.strip_prefix('#') {
			if !self.decode_hex_values {
				return raw.to_string();
			}
			return match decode_hex_attribute_value(hex) {
				Ok(decoded) => fold_canonical(&escape_rfc2253(&decoded)),
				// undecodable values keep their encoded form
				Err(_) => raw.to_string(),
			};
		}
		fold_canonical(&escape_rfc2253(raw))
	}
}

/// Escapes RFC 2253 special characters and a leading `#`.
fn escape_rfc2253(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for (i, c) in value.chars().enumerate() {
		match c {
			',' | '+' | '"' | '\\' | '<' | '>' | ';' => {
				out.push('\\');
				out.push(c);
			},
			'#' if i == 0 => {
				out.push('\\');
				out.push('#');
			},
			_ => out.push(c),
		}
	}
	out
}

/// Upper-case, then lower-case, then NFKD, with whitespace runs collapsed.
///
/// The double case conversion mirrors the canonical-form expectations of
/// X.500 string matching (case folds that are not round-trippable settle
/// into a stable form on the first pass).
fn fold_canonical(value: &str) -> String {
	let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
	collapsed.to_uppercase().to_lowercase().nfkd().collect()
}

/// Decodes the DER value of a `#hex` encoded attribute into text.
fn decode_hex_attribute_value(hex_part: &str) -> Result<String, Error> {
	let bytes = hex::decode(hex_part).map_err(|_| Error::InvalidDnString(hex_part.into()))?;
	let tagged = yasna::parse_der(&bytes, |reader| reader.read_tagged_der())
		.map_err(|_| Error::InvalidDnString(hex_part.into()))?;
	let value = tagged.value();
	let invalid = || Error::InvalidDnString(hex_part.into());
	match tagged.tag() {
		t if t == TAG_UTF8STRING || t == TAG_PRINTABLESTRING || t == TAG_IA5STRING => {
			String::from_utf8(value.to_vec()).map_err(|_| invalid())
		},
		t if t == TAG_TELETEXSTRING => {
			// T.61 strings in the wild are almost always Latin-1
			Ok(value.iter().map(|&b| b as char).collect())
		},
		t if t == TAG_BMPSTRING => {
			if value.len() % 2 != 0 {
				return Err(invalid());
			}
			let units: Vec<u16> = value
				.chunks_exact(2)
				.map(|c| u16::from_be_bytes([c[0], c[1]]))
				.collect();
			String::from_utf16(&units).map_err(|_| invalid())
		},
		t if t == TAG_UNIVERSALSTRING => {
			if value.len() % 4 != 0 {
				return Err(invalid());
			}
			value
				.chunks_exact(4)
				.map(|c| {
					char::from_u32(u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
						.ok_or_else(invalid)
				})
				.collect()
		},
		_ => Err(invalid()),
	}
}

/// Canonical DN rendering with a pluggable formatter strategy.
pub struct DnCanonicalizer {
	formatter: Box<dyn DnFormatter>,
}

impl Default for DnCanonicalizer {
	fn default() -> Self {
		Self::new()
	}
}

impl DnCanonicalizer {
	/// Canonicalizer using the built-in canonical formatter.
	pub fn new() -> Self {
		Self {
			formatter: Box::new(CanonicalDnFormatter::default()),
		}
	}
	/// Canonicalizer using the supplied formatter strategy.
	pub fn with_formatter(formatter: Box<dyn DnFormatter>) -> Self {
		Self { formatter }
	}
	/// Renders the DN in canonical form.
	pub fn canonicalize(&self, dn: &str) -> Result<String, Error> {
		let map = dn_to_attribute_map(dn)?;
		Ok(self.formatter.format(&map))
	}
	/// True when the DN parses and the canonical re-rendering preserves the
	/// exact set of attribute names.
	///
	/// Comparing key sets catches attribute names a renderer would silently
	/// drop or rename.
	pub fn is_valid_dn(&self, dn: &str) -> bool {
		let Ok(raw_map) = dn_to_attribute_map(dn) else {
			return false;
		};
		let Ok(canonical) = self.canonicalize(dn) else {
			return false;
		};
		let Ok(canonical_map) = dn_to_attribute_map(&canonical) else {
			return false;
		};
		raw_map.key_set() == canonical_map.key_set()
	}
}

/// Attribute-wise DN pattern match.
///
/// Every attribute present in `pattern` must also be present in `dn`, and
/// each pattern value must match at least one DN value for that attribute.
/// In wildcard mode pattern values are literal except `*`, which matches any
/// run of characters. DN attributes the pattern does not mention are
/// ignored.
pub fn dn_matches_pattern(dn: &str, pattern: &str, use_regex: bool) -> bool {
	let Ok(dn_map) = dn_to_attribute_map(dn) else {
		warn!("refusing to match unparseable DN: {dn}");
		return false;
	};
	if use_regex {
		// Backslash sequences in the pattern must reach the regex compiler
		// intact, so the pattern is split without RFC 2253 unescaping.
		let Some(pairs) = split_pattern_verbatim(pattern) else {
			warn!("refusing to match unparseable DN pattern: {pattern}");
			return false;
		};
		for (attr, pattern_value) in &pairs {
			let Some(dn_values) = dn_map.get(attr) else {
				return false;
			};
			let expr = format!("^(?:{pattern_value})$");
			if !any_value_matches(&expr, pattern_value, dn_values) {
				return false;
			}
		}
		return true;
	}
	let Ok(pattern_map) = dn_to_attribute_map(pattern) else {
		warn!("refusing to match unparseable DN pattern: {pattern}");
		return false;
	};
	for (attr, pattern_values) in pattern_map.iter() {
		let Some(dn_values) = dn_map.get(attr) else {
			return false;
		};
		for pattern_value in pattern_values {
			let expr = wildcard_to_regex(pattern_value);
			if !any_value_matches(&expr, pattern_value, dn_values) {
				return false;
			}
		}
	}
	true
}

fn any_value_matches(expr: &str, pattern_value: &str, dn_values: &[String]) -> bool {
	let re = match RegexBuilder::new(expr).case_insensitive(true).build() {
		Ok(re) => re,
		Err(e) => {
			warn!("bad DN pattern value {pattern_value:?}: {e}");
			return false;
		},
	};
	dn_values.iter().any(|value| re.is_match(value))
}

/// Splits a regex-mode pattern into `(attr, value)` pairs.
///
/// Separators are `,`, `+` and `;` outside of a backslash escape; values
/// are kept verbatim apart from surrounding spaces. A trailing lone
/// backslash or a field without `=` makes the whole pattern unusable.
fn split_pattern_verbatim(pattern: &str) -> Option<Vec<(String, String)>> {
	let mut fields = Vec::new();
	let mut field = String::new();
	let mut escaped = false;
	for c in pattern.chars() {
		if escaped {
			field.push(c);
			escaped = false;
		} else if c == '\\' {
			field.push(c);
			escaped = true;
		} else if c == ',' || c == '+' || c == ';' {
			fields.push(std::mem::take(&mut field));
		} else {
			field.push(c);
		}
	}
	if escaped {
		return None;
	}
	fields.push(field);

	let mut pairs = Vec::new();
	for field in fields {
		let (attr, value) = field.split_once('=')?;
		let attr = normalize_attr(attr)?;
		pairs.push((attr, value.trim().to_string()));
	}
	Some(pairs)
}

fn wildcard_to_regex(pattern: &str) -> String {
	let body = pattern
		.split('*')
		.map(regex::escape)
		.collect::<Vec<_>>()
		.join(".*");
	format!("^{body}$")
}

/// Per-label hostname wildcard match (not a DN match).
///
/// The label counts of `name` and `pattern` must be equal. A `*` in a
/// pattern label matches zero or more characters within that label. With
/// `hostname_only_wildcard` set, only the leftmost label may use wildcards;
/// the remaining labels must match literally (ignoring ASCII case).
pub fn domain_name_matches_pattern(
	name: &str,
	pattern: &str,
	hostname_only_wildcard: bool,
) -> bool {
	let name_labels: Vec<&str> = name.split('.').collect();
	let pattern_labels: Vec<&str> = pattern.split('.').collect();
	if name_labels.len() != pattern_labels.len() {
		return false;
	}
	for (i, (name_label, pattern_label)) in
		name_labels.iter().zip(pattern_labels.iter()).enumerate()
	{
		let wildcards_allowed = i == 0 || !hostname_only_wildcard;
		let matched = if wildcards_allowed && pattern_label.contains('*') {
			let expr = wildcard_to_regex(pattern_label);
			match RegexBuilder::new(&expr).case_insensitive(true).build() {
				Ok(re) => re.is_match(name_label),
				Err(_) => false,
			}
		} else {
			name_label.eq_ignore_ascii_case(pattern_label)
		};
		if !matched {
			return false;
		}
	}
	true
}
