//! Core type definitions

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};

/// Name of a C preprocessor macro
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConstantName(String);

impl ConstantName {
    /// Create a name, rejecting anything that is not a C identifier
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if Self::is_identifier(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidName(name))
        }
    }

    /// Whether `s` is a valid C identifier
    pub fn is_identifier(s: &str) -> bool {
        let mut chars = s.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// Name known to be an identifier at compile time
    pub(crate) fn trusted(name: &str) -> Self {
        debug_assert!(Self::is_identifier(name));
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConstantName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ConstantName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ConstantName> for String {
    fn from(name: ConstantName) -> Self {
        name.0
    }
}

impl fmt::Display for ConstantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compilation context in which macros are looked up: a few `#include` lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderProbe {
    source: String,
}

impl HeaderProbe {
    /// Create a probe from raw source text
    pub fn new(source: impl Into<String>) -> Self {
        let mut source = source.into();
        if !source.ends_with('\n') {
            source.push('\n');
        }
        Self { source }
    }

    /// Create a probe including a single system header
    pub fn include(header: &str) -> Self {
        Self::includes([header])
    }

    /// Create a probe including several system headers, in order
    pub fn includes<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let source = headers
            .into_iter()
            .map(|h| format!("#include <{}>\n", h))
            .collect::<String>();
        Self { source }
    }

    /// Source text of the probe
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for HeaderProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source.trim_end())
    }
}

/// Value the compiler resolved a macro to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacroValue(String);

impl MacroValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the value as a decimal or `0x` hexadecimal integer
    pub fn as_integer(&self) -> Option<i64> {
        let s = self.0.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) if !hex.starts_with(['+', '-']) => {
                let magnitude = i128::from_str_radix(hex, 16).ok()?;
                let value = if negative { magnitude.checked_neg()? } else { magnitude };
                i64::try_from(value).ok()
            }
            Some(_) => None,
            None => s.parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for MacroValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Macro values in the order they were requested.
///
/// A name whose extraction failed has no entry, so an absent value can
/// never be mistaken for an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroMap {
    entries: Vec<(ConstantName, MacroValue)>,
}

impl MacroMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; a name can only be bound once
    pub fn insert(&mut self, name: ConstantName, value: MacroValue) -> Result<()> {
        if self.contains(&name) {
            return Err(Error::Parse(format!("duplicate value for {}", name)));
        }
        self.entries.push((name, value));
        Ok(())
    }

    pub fn get(&self, name: &ConstantName) -> Option<&MacroValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &ConstantName) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConstantName, &MacroValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn names(&self) -> impl Iterator<Item = &ConstantName> {
        self.entries.iter().map(|(n, _)| n)
    }
}

impl Serialize for MacroMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'a> IntoIterator for &'a MacroMap {
    type Item = (&'a ConstantName, &'a MacroValue);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Two spellings of the same logical limit in two header universes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantPair {
    /// Name in the kernel headers (e.g. `PATH_MAX`)
    pub kernel: ConstantName,
    /// Name in the C library headers (e.g. `__PATH_MAX`)
    pub library: ConstantName,
}

impl ConstantPair {
    pub fn new(kernel: &str, library: &str) -> Result<Self> {
        Ok(Self {
            kernel: ConstantName::new(kernel)?,
            library: ConstantName::new(library)?,
        })
    }
}

impl fmt::Display for ConstantPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.kernel, self.library)
    }
}

/// Outcome of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Process exit status for this verdict
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Pass only if every verdict passes
    pub fn all(verdicts: impl IntoIterator<Item = Verdict>) -> Verdict {
        if verdicts.into_iter().all(|v| v.is_pass()) {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl From<bool> for Verdict {
    fn from(pass: bool) -> Self {
        if pass {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail => f.write_str("FAIL"),
        }
    }
}
