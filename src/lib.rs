//! Simple X.500 distinguished name handling.
//!
//! Only the simplest version of the canonical format from
//! <https://datatracker.ietf.org/doc/html/rfc1779> is understood, that is to
//! say things like `CN=Ethel the Aardvark, OU=AntBGone Dept`. Components are
//! separated by `,` or `;` and each one is an optional `KEY=` followed by a
//! value. Quoting, escaping, multi-valued RDNs, hex values and OID types are
//! not supported: a `,`, `;` or `=` always acts as a delimiter.
//!
//! Parsing never fails. Fields that don't make sense are dropped instead.

use std::{collections::BTreeMap, convert::Infallible, fmt, result, slice, str::FromStr};

use derive_more::{Display, Error};
use tracing::{debug, trace};

#[cfg(feature = "serde")]
mod ser_de;

/// Common name.
pub const COMMON_NAME_KEY: &str = "CN";
/// Locality name.
pub const LOCALITY_NAME_KEY: &str = "L";
/// State or province name.
pub const STATE_OR_PROVINCE_NAME_KEY: &str = "ST";
/// Organization name.
pub const ORGANIZATION_NAME_KEY: &str = "O";
/// Organizational unit name.
pub const ORGANIZATIONAL_UNIT_KEY: &str = "OU";
/// Country name.
pub const COUNTRY_NAME_KEY: &str = "C";
/// Street address.
pub const STREET_ADDRESS_KEY: &str = "STREET";

/// Separator put between components when rebuilding a string.
pub const DEFAULT_SEPARATOR: &str = "; ";

/// Possible errors when querying distinguished names.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum Error {
    /// No component has the requested key.
    #[display(fmt = "no {key} elements found")]
    NotFound { key: String },
    /// More than one component has the requested key.
    #[display(fmt = "more than one {key} element found ({count})")]
    Ambiguous { key: String, count: usize },
}

/// Query result type.
pub type Result<T> = result::Result<T, Error>;

/// A name component, e.g. `CN=Ethel the Aardvark`.
///
/// The key may be empty, in which case the component is an anonymous value.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    key: String,
    value: String,
}

impl Component {
    /// Create a new component.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key of this component. Empty for anonymous values.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value of this component.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this component is a value without a key.
    pub fn is_anonymous(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            f.write_str(&self.value)
        } else {
            write!(f, "{}={}", self.key, self.value)
        }
    }
}

/// A distinguished name split into components.
pub type Components = Vec<Component>;

/// Options used when rebuilding a distinguished name string.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatOptions {
    /// Put between components, never before the first nor after the last.
    pub separator: String,
}

impl FormatOptions {
    /// Options using the given separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }
}

/// A distinguished name (DN).
///
/// Keeps the string it was built from, its components in order of appearance
/// and an index from each key to all of its values. A DN is immutable once
/// built.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct DistinguishedName {
    original: String,
    components: Components,
    index: BTreeMap<String, Vec<String>>,
}

impl DistinguishedName {
    /// Parse a DN. Never fails: an input with nothing usable gives an empty
    /// DN.
    pub fn new(s: impl Into<String>) -> Self {
        let original = s.into();
        let components = parse_components(&original);

        let mut index = BTreeMap::<String, Vec<String>>::new();
        for component in &components {
            index
                .entry(component.key.clone())
                .or_default()
                .push(component.value.clone());
        }

        debug!(
            components = components.len(),
            keys = index.len(),
            "parsed distinguished name"
        );

        Self {
            original,
            components,
            index,
        }
    }

    /// The string this DN was built from, untouched.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The components, in order of appearance.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn iter(&self) -> slice::Iter<'_, Component> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// All the values for the given key, in order of appearance. Anonymous
    /// values are found under the empty key.
    pub fn get_values(&self, key: &str) -> &[String] {
        self.index
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find the value of the first occurence of the given key.
    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.get_values(key).first().map(String::as_str)
    }

    /// Get the value of the given key, which must appear exactly once.
    pub fn single_value(&self, key: &str) -> Result<&str> {
        match self.get_values(key) {
            [value] => Ok(value.as_str()),
            [] => Err(Error::NotFound {
                key: key.to_owned(),
            }),
            values => Err(Error::Ambiguous {
                key: key.to_owned(),
                count: values.len(),
            }),
        }
    }

    /// Get the common name, which must appear exactly once.
    pub fn common_name(&self) -> Result<&str> {
        self.single_value(COMMON_NAME_KEY)
    }

    /// Rebuild a string from the components.
    pub fn format_with(&self, options: &FormatOptions) -> String {
        let mut res = String::new();
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                res += &options.separator;
            }
            res += &component.to_string();
        }

        res
    }
}

/// Rebuild with the default options, e.g.
/// `CN=Ethel the Aardvark; OU=Australia; C=OZ`.
impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(&FormatOptions::default()))
    }
}

impl FromStr for DistinguishedName {
    type Err = Infallible;

    fn from_str(s: &str) -> result::Result<Self, Infallible> {
        Ok(Self::new(s))
    }
}

impl From<&str> for DistinguishedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DistinguishedName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<'a> IntoIterator for &'a DistinguishedName {
    type Item = &'a Component;
    type IntoIter = slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split a DN string into trimmed fields on every `,` or `;`.
///
/// Empty fields between adjacent separators are skipped. A field holding only
/// whitespace is kept as an empty string.
pub fn split(s: &str) -> Vec<&str> {
    s.split([',', ';'])
        .filter(|field| !field.is_empty())
        .map(str::trim)
        .collect()
}

/// Parse a single field into a component.
///
/// The field is split on every `=`, so `a=b=c` gives `a=b` and the rest is
/// ignored. Returns `None` when the key is present but blank, or when the
/// value is blank.
pub fn parse_component(field: &str) -> Option<Component> {
    let sides = field.split('=').map(str::trim).collect::<Vec<_>>();
    let component = match sides.as_slice() {
        [value] => Component::new("", *value),
        [key, value, ..] if !key.is_empty() => Component::new(*key, *value),
        _ => {
            trace!(field, "dropping field with blank key");
            return None;
        }
    };

    if component.value.is_empty() {
        trace!(field, "dropping field with blank value");
        return None;
    }

    Some(component)
}

/// Parse a whole DN string into its components, in order of appearance.
pub fn parse_components(s: &str) -> Components {
    split(s).into_iter().filter_map(parse_component).collect()
}
