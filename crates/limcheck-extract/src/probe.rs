//! Probe program generation and assembly parsing
//!
//! Each requested constant becomes an inline `asm` statement whose
//! immediate operand is the constant's value. Compiling with `-S` makes
//! the compiler print that value next to a marker we can find again:
//!
//! ```c
//! #ifdef PATH_MAX
//!   asm ("@@@name@@@PATH_MAX@@@value@@@%0@@@end@@@" : : "i" ((long int) (PATH_MAX)));
//! #endif
//! ```

use regex::Regex;
use std::collections::HashMap;

use limcheck_core::{ConstantName, Error, MacroMap, MacroValue, Result};

const MARKER: &str = "@@@name@@@";

/// One constant to evaluate in a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Name the value is reported under
    pub name: ConstantName,
    /// C integer constant expression to evaluate
    pub expr: String,
    /// Only evaluate if `name` is a defined macro
    pub guarded: bool,
}

impl Symbol {
    /// Evaluate the macro `name`, skipping it if undefined
    pub fn macro_value(name: ConstantName) -> Self {
        Self {
            expr: name.as_str().to_string(),
            name,
            guarded: true,
        }
    }

    /// Evaluate an arbitrary expression; it must compile
    pub fn expression(name: ConstantName, expr: impl Into<String>) -> Self {
        Self {
            name,
            expr: expr.into(),
            guarded: false,
        }
    }
}

/// Render the translation unit for `symbols` after `prelude`
pub fn render_probe(prelude: &str, symbols: &[Symbol]) -> String {
    let mut out = String::with_capacity(prelude.len() + 128 * symbols.len());
    out.push_str(prelude);
    if !prelude.is_empty() && !prelude.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("void\ndummy (void)\n{\n");
    for symbol in symbols {
        if symbol.guarded {
            out.push_str(&format!("#ifdef {}\n", symbol.name));
        }
        out.push_str(&format!(
            "  asm (\"{}{}@@@value@@@%0@@@end@@@\" : : \"i\" ((long int) ({})));\n",
            MARKER, symbol.name, symbol.expr
        ));
        if symbol.guarded {
            out.push_str("#endif\n");
        }
    }
    out.push_str("}\n");
    out
}

/// Recovers constant values from the compiler's assembly output
pub struct AssemblyParser {
    marker: Regex,
}

impl AssemblyParser {
    pub fn new() -> Result<Self> {
        // The operand comes out as `$4096` on x86, `#4096` on arm, plain elsewhere.
        // Anything else (`$.LC0`, `$sym`) is not an integer immediate.
        let marker = Regex::new(
            r"@@@name@@@([^@]*)@@@value@@@[$#]?(-?(?:0[xX][0-9a-fA-F]+|[0-9]+))@@@end@@@",
        )
        .map_err(|e| Error::InvalidPattern(e.to_string()))?;
        Ok(Self { marker })
    }

    /// Map marker lines back to the requested names, in request order.
    ///
    /// Names absent from the output are left out of the result. Output
    /// naming a constant that was not requested, naming one twice, or a
    /// marker that does not parse is an error.
    pub fn parse(&self, asm: &str, requested: &[ConstantName]) -> Result<MacroMap> {
        let mut found: HashMap<&str, &str> = HashMap::new();

        for line in asm.lines() {
            if !line.contains(MARKER) {
                continue;
            }
            let caps = self
                .marker
                .captures(line)
                .ok_or_else(|| Error::Parse(format!("malformed probe marker: {}", line.trim())))?;
            let (name, value) = match (caps.get(1), caps.get(2)) {
                (Some(n), Some(v)) => (n.as_str(), v.as_str()),
                _ => return Err(Error::Parse(format!("malformed probe marker: {}", line.trim()))),
            };

            if !requested.iter().any(|r| r.as_str() == name) {
                return Err(Error::Parse(format!(
                    "compiler output names unrequested constant {}",
                    name
                )));
            }
            if found.insert(name, value).is_some() {
                return Err(Error::Parse(format!("duplicate output for {}", name)));
            }
        }

        let mut map = MacroMap::new();
        for name in requested {
            if let Some(value) = found.get(name.as_str()) {
                map.insert(name.clone(), MacroValue::new(*value))?;
            }
        }
        Ok(map)
    }
}
