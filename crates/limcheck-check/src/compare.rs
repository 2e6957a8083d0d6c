//! Macro set comparison
//!
//! Compares every macro matching a pattern in two header contexts, for
//! headers that are meant to define the same set of constants.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use limcheck_core::{ConstantName, Error, HeaderProbe, MacroMap, MacroValue, Result, Verdict};
use limcheck_extract::Extractor;

/// Which side may define macros the other one lacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllowExtra {
    pub first: bool,
    pub second: bool,
}

impl AllowExtra {
    /// Allowance for comparing a library header (first) against kernel
    /// headers (second): whichever side tracks the newer kernel may
    /// define constants the other does not know yet.
    pub fn for_versions(library: KernelVersion, headers: KernelVersion) -> Self {
        Self {
            first: library > headers,
            second: headers > library,
        }
    }
}

/// Kernel release as `(major, minor)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct KernelVersion {
    pub major: u32,
    pub minor: u32,
}

impl KernelVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Decode `LINUX_VERSION_CODE` (`major << 16 | minor << 8 | patch`)
    pub fn from_code(code: i64) -> Option<Self> {
        let code = u32::try_from(code).ok()?;
        Some(Self::new(code >> 16, (code >> 8) & 0xff))
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Kernel version the installed `<linux/version.h>` describes
pub fn linux_kernel_version(extractor: &Extractor) -> Result<KernelVersion> {
    let name = ConstantName::new("LINUX_VERSION_CODE")?;
    let values = extractor.macro_consts(&HeaderProbe::include("linux/version.h"), &[name.clone()])?;

    let value = values
        .get(&name)
        .ok_or_else(|| Error::Parse("linux/version.h does not define LINUX_VERSION_CODE".into()))?;
    let version = value
        .as_integer()
        .and_then(KernelVersion::from_code)
        .ok_or_else(|| Error::Parse(format!("bad LINUX_VERSION_CODE: {}", value)))?;
    debug!("Kernel headers are {}", version);
    Ok(version)
}

/// A macro defined on both sides with different values
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueDifference {
    pub name: ConstantName,
    pub first: MacroValue,
    pub second: MacroValue,
}

/// Result of comparing two macro sets
#[derive(Debug, Clone, Serialize)]
pub struct MacroSetComparison {
    pub only_in_first: Vec<ConstantName>,
    pub only_in_second: Vec<ConstantName>,
    pub different: Vec<ValueDifference>,
    pub verdict: Verdict,
}

impl MacroSetComparison {
    /// Compare two already extracted maps, reporting names in sorted order
    pub fn from_maps(first: &MacroMap, second: &MacroMap, allow: AllowExtra) -> Self {
        let mut only_in_first = Vec::new();
        let mut only_in_second = Vec::new();
        let mut different = Vec::new();

        for (name, value) in first {
            match second.get(name) {
                None => only_in_first.push(name.clone()),
                Some(other) if other != value => different.push(ValueDifference {
                    name: name.clone(),
                    first: value.clone(),
                    second: other.clone(),
                }),
                Some(_) => {}
            }
        }
        for name in second.names() {
            if !first.contains(name) {
                only_in_second.push(name.clone());
            }
        }

        only_in_first.sort();
        only_in_second.sort();
        different.sort_by(|a, b| a.name.cmp(&b.name));

        let pass = different.is_empty()
            && (allow.first || only_in_first.is_empty())
            && (allow.second || only_in_second.is_empty());

        Self {
            only_in_first,
            only_in_second,
            different,
            verdict: Verdict::from(pass),
        }
    }

    pub fn is_identical(&self) -> bool {
        self.only_in_first.is_empty() && self.only_in_second.is_empty() && self.different.is_empty()
    }
}

impl fmt::Display for MacroSetComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.only_in_first {
            writeln!(f, "Only in first: {}", name)?;
        }
        for diff in &self.different {
            writeln!(
                f,
                "Different values for {}: {} != {}",
                diff.name, diff.first, diff.second
            )?;
        }
        for name in &self.only_in_second {
            writeln!(f, "Only in second: {}", name)?;
        }
        write!(f, "{}", self.verdict)
    }
}

/// Extract the macros matching `pattern` from both sources and compare them
pub fn compare_macro_consts(
    extractor: &Extractor,
    source_1: &HeaderProbe,
    source_2: &HeaderProbe,
    pattern: &str,
    exclude: Option<&str>,
    allow: AllowExtra,
) -> Result<MacroSetComparison> {
    let first = extractor.macro_consts_matching(source_1, pattern, exclude)?;
    let second = extractor.macro_consts_matching(source_2, pattern, exclude)?;
    debug!(
        "Comparing {} and {} macros matching {}",
        first.len(),
        second.len(),
        pattern
    );
    Ok(MacroSetComparison::from_maps(&first, &second, allow))
}
