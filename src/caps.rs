//! Capability descriptors (caps) for negotiation.
//!
//! Caps describe the semantic type of a payload flowing through the
//! pipeline. They are immutable once constructed: deriving a modified
//! value (e.g. [`Caps::merge_params`]) always yields a new value.
//!
//! # Design Principles
//!
//! - **Immutable**: construction is builder-style and consumes `self`;
//!   there are no mutating accessors.
//! - **Structural equality**: two caps are equal iff media type, name, and
//!   the parameter set match. Identity (`uri`) and taxonomy (`broader`)
//!   annotations are not part of equality.
//! - **Open parameters**: an ordered map of scalar or list values; list
//!   parameters compare order-independently.
//!
//! The triple/Turtle/JSON projections at the bottom are read-only views
//! for downstream consumers and carry no negotiation contract.

use indexmap::IndexMap;
use smallvec::SmallVec;

// ============================================================================
// ParamValue
// ============================================================================

/// A single caps parameter value: a scalar or an ordered list.
#[derive(Debug, Clone)]
pub enum ParamValue {
    /// String value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// List of strings (ordered by preference, compared as a set).
    List(Vec<String>),
}

impl ParamValue {
    /// Build a list value from anything yielding string-likes.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Get the string value, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list items, if this is a `List`.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Render as a JSON value for the summary projection.
    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Str(s) => serde_json::Value::from(s.as_str()),
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Bool(b) => serde_json::Value::from(*b),
            Self::List(items) => serde_json::Value::from(items.clone()),
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            // Multi-valued entries compare order-independently.
            (Self::List(a), Self::List(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut a = a.clone();
                let mut b = b.clone();
                a.sort();
                b.sort();
                a == b
            }
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

// ============================================================================
// Caps
// ============================================================================

/// Immutable capability descriptor attached to data flowing through the
/// pipeline.
///
/// # Example
///
/// ```rust
/// use typeflow::caps::{Caps, ParamValue};
///
/// let caps = Caps::new("document", "document")
///     .with_param("extensions", ParamValue::list(["pdf", "txt"]))
///     .with_uri("urn:typeflow:caps:document");
///
/// assert_eq!(caps.label(), "document");
/// ```
#[derive(Debug, Clone)]
pub struct Caps {
    /// Broad MIME-style category (e.g. "image", "document").
    media_type: String,
    /// Short canonical name for the type.
    name: String,
    /// Open parameter map; keys unique, values scalar or list.
    params: IndexMap<String, ParamValue>,
    /// Optional stable identity reference for linked-data use.
    uri: Option<String>,
    /// Identity references of parent categories.
    broader: SmallVec<[String; 2]>,
}

impl Caps {
    /// Create caps with a media type and canonical name.
    pub fn new(media_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            name: name.into(),
            params: IndexMap::new(),
            uri: None,
            broader: SmallVec::new(),
        }
    }

    /// Add a parameter (builder style).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the stable identity reference.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Add broader taxonomy references.
    pub fn with_broader<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.broader.extend(parents.into_iter().map(Into::into));
        self
    }

    /// Get the media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Get the canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display-friendly label: the name when non-empty, else the media type.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.media_type
        } else {
            &self.name
        }
    }

    /// Get the parameter map.
    pub fn params(&self) -> &IndexMap<String, ParamValue> {
        &self.params
    }

    /// Look up a single parameter.
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    /// Get the identity reference, if any.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Get the broader taxonomy references.
    pub fn broader(&self) -> &[String] {
        &self.broader
    }

    /// Derive a new caps value whose parameters are this value's parameters
    /// overridden and extended by `new`. The receiver is left unchanged.
    pub fn merge_params<I, K, V>(&self, new: I) -> Caps
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        let mut merged = self.clone();
        for (key, value) in new {
            merged.params.insert(key.into(), value.into());
        }
        merged
    }
}

impl PartialEq for Caps {
    fn eq(&self, other: &Self) -> bool {
        // Structural: media type, name, and parameter set only.
        self.media_type == other.media_type
            && self.name == other.name
            && self.params == other.params
    }
}

impl Eq for Caps {}

impl std::fmt::Display for Caps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.media_type, self.label())
    }
}

// ============================================================================
// Projections (read-only, for external consumers)
// ============================================================================

/// An RDF-like (subject, predicate, object) triple.
pub type Triple = (String, String, String);

impl Caps {
    /// Subject used by the linked-data projections.
    fn subject(&self) -> String {
        self.uri
            .clone()
            .unwrap_or_else(|| format!("urn:typeflow:caps:{}", self.name))
    }

    /// Project this caps value into a small RDF-like triple list.
    ///
    /// Predicates use a pseudo-namespace `tf:`. This is a one-way view for
    /// downstream tooling, not part of the negotiation contract.
    pub fn triples(&self) -> Vec<Triple> {
        let subject = self.subject();
        let mut triples = vec![
            (subject.clone(), "rdf:type".to_string(), "tf:Caps".to_string()),
            (subject.clone(), "tf:mediaType".to_string(), self.media_type.clone()),
            (subject.clone(), "tf:name".to_string(), self.name.clone()),
        ];
        if let Some(ParamValue::Str(description)) = self.params.get("description") {
            triples.push((subject.clone(), "tf:description".to_string(), description.clone()));
        }
        if let Some(ParamValue::List(extensions)) = self.params.get("extensions") {
            for ext in extensions {
                triples.push((subject.clone(), "tf:extension".to_string(), ext.clone()));
            }
        }
        for parent in &self.broader {
            triples.push((subject.clone(), "rdfs:subClassOf".to_string(), parent.clone()));
        }
        triples
    }

    /// Serialize into a minimal Turtle snippet.
    pub fn to_turtle(&self) -> String {
        let mut lines = vec![
            "@prefix tf: <urn:typeflow:caps#> .".to_string(),
            "@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .".to_string(),
            "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .".to_string(),
            String::new(),
        ];
        let subject = match &self.uri {
            Some(uri) => format!("<{uri}>"),
            None => format!("tf:{}", self.name),
        };
        lines.push(format!("{subject} a tf:Caps ;"));
        lines.push(format!("  tf:mediaType \"{}\" ;", self.media_type));
        lines.push(format!("  tf:name \"{}\" ;", self.name));
        if let Some(ParamValue::Str(description)) = self.params.get("description") {
            lines.push(format!("  tf:description \"{description}\" ;"));
        }
        if let Some(ParamValue::List(extensions)) = self.params.get("extensions") {
            let literals: Vec<String> = extensions.iter().map(|e| format!("\"{e}\"")).collect();
            lines.push(format!("  tf:extension {} ;", literals.join(", ")));
        }
        if !self.broader.is_empty() {
            let refs: Vec<String> = self.broader.iter().map(|u| format!("<{u}>")).collect();
            lines.push(format!("  rdfs:subClassOf {} ;", refs.join(", ")));
        }
        if let Some(last) = lines.last_mut() {
            *last = format!("{} .", last.trim_end_matches(" ;"));
        }
        lines.join("\n")
    }

    /// Render a compact JSON summary suitable for terminal sinks and CLIs.
    ///
    /// `type_source` records how the type was determined ("header" or
    /// "classifier") when known.
    pub fn summary_json(&self, type_source: Option<&str>) -> String {
        let mut summary = serde_json::Map::new();
        summary.insert("media_type".to_string(), self.media_type.as_str().into());
        summary.insert("name".to_string(), self.name.as_str().into());
        if let Some(uri) = &self.uri {
            summary.insert("uri".to_string(), uri.as_str().into());
        }
        if !self.broader.is_empty() {
            summary.insert("broader".to_string(), self.broader.join(",").into());
        }
        for (key, value) in &self.params {
            summary.insert(key.clone(), value.to_json());
        }
        if let Some(source) = type_source {
            summary.insert("source".to_string(), source.into());
        }
        serde_json::Value::Object(summary).to_string()
    }
}
