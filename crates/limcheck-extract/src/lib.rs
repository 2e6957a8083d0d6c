//! limcheck Extract
//!
//! Resolves C preprocessor macros to the values a real compiler gives
//! them, instead of re-implementing C preprocessing.
//!
//! ## Modules
//!
//! - `compiler` - runs the configured C compiler
//! - `probe` - generates probe programs and parses their assembly
//! - `listing` - parses `-dM` macro dumps
//! - `scratch` - temporary directory for probe files
//!
//! A requested macro that the probe's headers do not define is left out
//! of the result; it never fails the extraction of the other names.
//! A macro that is defined but is not an integer constant expression
//! (`#define EMPTY`, a string literal) fails the whole call: either the
//! probe does not compile (`CompilerInvocation`) or its operand is not an
//! immediate (`Parse`). No value is ever reported for it, empty or not.

pub mod compiler;
pub mod listing;
pub mod probe;
pub mod scratch;

use limcheck_core::{CompilerCommand, ConstantName, HeaderProbe, MacroMap, Result};
use tracing::{debug, warn};

pub use compiler::{CompileOutcome, Compiler};
pub use listing::{MacroDefinition, MacroListing};
pub use probe::{AssemblyParser, Symbol};
pub use scratch::ProbeScratch;

const ASSEMBLY_OUTPUT: &str = "probe.s";
const LISTING_OUTPUT: &str = "probe.i";
const OBJECT_OUTPUT: &str = "probe.o";

/// Macro extractor bound to one compiler
pub struct Extractor {
    compiler: Compiler,
    parser: AssemblyParser,
}

impl Extractor {
    pub fn new(compiler: Compiler) -> Result<Self> {
        Ok(Self {
            compiler,
            parser: AssemblyParser::new()?,
        })
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Resolve `names` under `probe` with a single compiler run
    pub fn macro_consts(&self, probe: &HeaderProbe, names: &[ConstantName]) -> Result<MacroMap> {
        let symbols: Vec<Symbol> = unique(names)
            .into_iter()
            .map(Symbol::macro_value)
            .collect();
        let map = self.c_consts(probe.source(), &symbols)?;

        for symbol in &symbols {
            if !map.contains(&symbol.name) {
                warn!("{} is not defined by {}", symbol.name, probe);
            }
        }
        Ok(map)
    }

    /// Resolve every object-like macro matching `pattern` (and not `exclude`)
    pub fn macro_consts_matching(
        &self,
        probe: &HeaderProbe,
        pattern: &str,
        exclude: Option<&str>,
    ) -> Result<MacroMap> {
        let pattern = listing::name_pattern(pattern)?;
        let exclude = exclude.map(listing::name_pattern).transpose()?;

        let listing = self.list_macros(probe)?;
        let names = listing.select(&pattern, exclude.as_ref());
        debug!("{} of {} macros selected", names.len(), listing.len());

        self.macro_consts(probe, &names)
    }

    /// Evaluate arbitrary constant expressions after `prelude`
    pub fn c_consts(&self, prelude: &str, symbols: &[Symbol]) -> Result<MacroMap> {
        let source = probe::render_probe(prelude, symbols);
        debug!("Probe for {} symbols, {} bytes", symbols.len(), source.len());

        let scratch = ProbeScratch::new()?;
        let c_file = scratch.write_source(&source)?;
        let s_file = scratch.file(ASSEMBLY_OUTPUT);

        self.compiler.compile_to_assembly(&c_file, &s_file)?;
        let asm = scratch.read_output(ASSEMBLY_OUTPUT)?;

        let requested: Vec<ConstantName> = symbols.iter().map(|s| s.name.clone()).collect();
        self.parser.parse(&asm, &requested)
    }

    /// List every macro defined after preprocessing `probe`
    pub fn list_macros(&self, probe: &HeaderProbe) -> Result<MacroListing> {
        let scratch = ProbeScratch::new()?;
        let c_file = scratch.write_source(probe.source())?;
        let i_file = scratch.file(LISTING_OUTPUT);

        self.compiler.dump_macros(&c_file, &i_file)?;
        MacroListing::parse(&scratch.read_output(LISTING_OUTPUT)?)
    }

    /// Compile `snippet` to an object file; a compile error is reported, not returned
    pub fn compile_snippet(&self, snippet: &str) -> Result<CompileOutcome> {
        let scratch = ProbeScratch::new()?;
        let mut source = snippet.to_string();
        source.push('\n');
        let c_file = scratch.write_source(&source)?;
        let outcome = self
            .compiler
            .try_compile_object(&c_file, &scratch.file(OBJECT_OUTPUT))?;
        debug!("Snippet compile exited with {}", outcome.status);
        Ok(outcome)
    }
}

/// Resolve `names` to their values under `header_probe`.
///
/// Names the headers leave undefined are omitted from the result. A
/// defined name that does not evaluate to an integer fails the call.
pub fn compute_macro_consts(
    header_probe: &HeaderProbe,
    compiler_command: &CompilerCommand,
    names: &[ConstantName],
) -> Result<MacroMap> {
    Extractor::new(Compiler::new(compiler_command.clone()))?.macro_consts(header_probe, names)
}

/// Resolve all object-like macros whose names match `pattern` but not `exclude`
pub fn compute_macro_consts_matching(
    header_probe: &HeaderProbe,
    compiler_command: &CompilerCommand,
    pattern: &str,
    exclude: Option<&str>,
) -> Result<MacroMap> {
    Extractor::new(Compiler::new(compiler_command.clone()))?
        .macro_consts_matching(header_probe, pattern, exclude)
}

/// Evaluate `(name, expression)` symbols after `prelude`
pub fn compute_c_consts(
    prelude: &str,
    compiler_command: &CompilerCommand,
    symbols: &[Symbol],
) -> Result<MacroMap> {
    Extractor::new(Compiler::new(compiler_command.clone()))?.c_consts(prelude, symbols)
}

/// List the macros `header_probe` defines
pub fn list_macros(header_probe: &HeaderProbe, compiler_command: &CompilerCommand) -> Result<MacroListing> {
    Extractor::new(Compiler::new(compiler_command.clone()))?.list_macros(header_probe)
}

/// Try compiling `snippet`; used to find out whether a header exists
pub fn compile_snippet(snippet: &str, compiler_command: &CompilerCommand) -> Result<CompileOutcome> {
    Extractor::new(Compiler::new(compiler_command.clone()))?.compile_snippet(snippet)
}

/// Drop repeated names, keeping the first occurrence
fn unique(names: &[ConstantName]) -> Vec<ConstantName> {
    let mut out: Vec<ConstantName> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
