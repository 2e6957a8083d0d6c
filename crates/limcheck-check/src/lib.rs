//! limcheck Check
//!
//! Compares limit constants between the kernel headers and the C
//! library headers. Values are paired by name, and a check passes only
//! if every pair is defined on both sides with the same value.

pub mod compare;
pub mod report;

use limcheck_core::{
    CheckConfig, CompilerCommand, ConstantName, ConstantPair, HeaderProbe, Result, Verdict,
};
use limcheck_extract::{Compiler, Extractor};
use tracing::{debug, info};

pub use compare::{
    compare_macro_consts, linux_kernel_version, AllowExtra, KernelVersion, MacroSetComparison,
};
pub use report::{CheckReport, PairOutcome, PairStatus};

/// Kernel header holding the reference limits
pub const KERNEL_LIMITS_HEADER: &str = "linux/limits.h";

/// C library header mirroring them
pub const LIBRARY_LIMITS_HEADER: &str = "bits/stdlib_lim.h";

/// Runs limit comparisons with one compiler
pub struct LimitChecker {
    extractor: Extractor,
    kernel_probe: HeaderProbe,
    library_probe: HeaderProbe,
}

impl LimitChecker {
    /// Checker for `<linux/limits.h>` against `<bits/stdlib_lim.h>`
    pub fn new(compiler: CompilerCommand) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(Compiler::new(compiler))?,
            kernel_probe: HeaderProbe::include(KERNEL_LIMITS_HEADER),
            library_probe: HeaderProbe::include(LIBRARY_LIMITS_HEADER),
        })
    }

    pub fn from_config(config: &CheckConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: Extractor::new(Compiler::new(config.compiler.clone()))?,
            kernel_probe: HeaderProbe::include(&config.kernel_header),
            library_probe: HeaderProbe::include(&config.library_header),
        })
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Compare one kernel constant with its library counterpart
    pub fn check_single(
        &self,
        kernel_name: &ConstantName,
        library_name: &ConstantName,
    ) -> Result<Verdict> {
        let pair = ConstantPair {
            kernel: kernel_name.clone(),
            library: library_name.clone(),
        };
        Ok(self.check_pairs(&[pair])?.verdict)
    }

    /// Compare several pairs; one extraction per header context
    pub fn check_pairs(&self, pairs: &[ConstantPair]) -> Result<CheckReport> {
        let kernel_names: Vec<ConstantName> = pairs.iter().map(|p| p.kernel.clone()).collect();
        let library_names: Vec<ConstantName> = pairs.iter().map(|p| p.library.clone()).collect();

        let kernel = self
            .extractor
            .macro_consts(&self.kernel_probe, &kernel_names)?;
        let library = self
            .extractor
            .macro_consts(&self.library_probe, &library_names)?;
        debug!(
            "Extracted {} kernel and {} library values",
            kernel.len(),
            library.len()
        );

        let outcomes: Vec<PairOutcome> = pairs
            .iter()
            .map(|p| PairOutcome::evaluate(p, &kernel, &library))
            .collect();
        let report = CheckReport::new(
            self.kernel_probe.to_string(),
            self.library_probe.to_string(),
            outcomes,
        );

        for failure in report.failures() {
            info!("Mismatch: {}", failure);
        }
        Ok(report)
    }
}

/// Compare `kernel_name` from `<linux/limits.h>` with `library_name` from `<bits/stdlib_lim.h>`
pub fn check_single(
    compiler: &CompilerCommand,
    kernel_name: &ConstantName,
    library_name: &ConstantName,
) -> Result<Verdict> {
    LimitChecker::new(compiler.clone())?.check_single(kernel_name, library_name)
}

/// Run every pair in `config`
pub fn check_pairs(config: &CheckConfig) -> Result<CheckReport> {
    LimitChecker::from_config(config)?.check_pairs(&config.pairs)
}
