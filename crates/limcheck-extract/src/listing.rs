//! Macro Listing
//!
//! Parses the `#define` dump produced by `cc -E -dM`.

use regex::Regex;

use limcheck_core::{ConstantName, Error, Result};

/// A macro as printed by the preprocessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: ConstantName,
    /// Parameter list for function-like macros
    pub params: Option<Vec<String>>,
    /// Replacement text, trimmed
    pub value: String,
}

impl MacroDefinition {
    pub fn is_object_like(&self) -> bool {
        self.params.is_none()
    }
}

/// Every macro visible after preprocessing a probe, in dump order
#[derive(Debug, Clone, Default)]
pub struct MacroListing {
    pub definitions: Vec<MacroDefinition>,
}

impl MacroListing {
    /// Parse `-dM` output. Any line that is not a `#define` is an error.
    pub fn parse(text: &str) -> Result<Self> {
        let define = Regex::new(r"^#define ([0-9A-Za-z_]+)(.*)$")
            .map_err(|e| Error::InvalidPattern(e.to_string()))?;

        let mut definitions = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let caps = define
                .captures(line)
                .ok_or_else(|| Error::Parse(format!("bad -dM output line: {}", line)))?;
            let name = ConstantName::new(&caps[1])?;
            let rest = &caps[2];

            let (params, value) = match rest.strip_prefix('(') {
                Some(args) => {
                    let close = args.find(')').ok_or_else(|| {
                        Error::Parse(format!("unterminated parameter list: {}", line))
                    })?;
                    let params = args[..close]
                        .split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect();
                    (Some(params), args[close + 1..].trim().to_string())
                }
                None => (None, rest.trim().to_string()),
            };

            definitions.push(MacroDefinition {
                name,
                params,
                value,
            });
        }

        Ok(Self { definitions })
    }

    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.definitions.iter().find(|d| d.name.as_str() == name)
    }

    pub fn object_like(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.definitions.iter().filter(|d| d.is_object_like())
    }

    /// Object-like macros whose whole name matches `pattern` and not `exclude`, sorted by name
    pub fn select(&self, pattern: &Regex, exclude: Option<&Regex>) -> Vec<ConstantName> {
        let mut names: Vec<ConstantName> = self
            .object_like()
            .filter(|d| full_match(pattern, d.name.as_str()))
            .filter(|d| !exclude.is_some_and(|ex| full_match(ex, d.name.as_str())))
            .map(|d| d.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Compile a user pattern that must match whole macro names
pub fn name_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| Error::InvalidPattern(e.to_string()))
}

fn full_match(re: &Regex, s: &str) -> bool {
    re.find(s).is_some_and(|m| m.start() == 0 && m.end() == s.len())
}
