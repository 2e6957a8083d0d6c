//! Check reports

use serde::Serialize;
use std::fmt;

use limcheck_core::{ConstantPair, MacroMap, MacroValue, Verdict};

/// How one pair of constants compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    Match,
    Mismatch,
    MissingKernel,
    MissingLibrary,
    MissingBoth,
}

impl PairStatus {
    pub fn is_match(&self) -> bool {
        matches!(self, PairStatus::Match)
    }
}

/// Result for one pair
#[derive(Debug, Clone, Serialize)]
pub struct PairOutcome {
    pub pair: ConstantPair,
    pub kernel_value: Option<MacroValue>,
    pub library_value: Option<MacroValue>,
    pub status: PairStatus,
}

impl PairOutcome {
    /// Compare the values bound to `pair` on both sides, looking each up by name
    pub fn evaluate(pair: &ConstantPair, kernel: &MacroMap, library: &MacroMap) -> Self {
        let kernel_value = kernel.get(&pair.kernel).cloned();
        let library_value = library.get(&pair.library).cloned();

        let status = match (&kernel_value, &library_value) {
            (Some(k), Some(l)) if k == l => PairStatus::Match,
            (Some(_), Some(_)) => PairStatus::Mismatch,
            (None, Some(_)) => PairStatus::MissingKernel,
            (Some(_), None) => PairStatus::MissingLibrary,
            (None, None) => PairStatus::MissingBoth,
        };

        Self {
            pair: pair.clone(),
            kernel_value,
            library_value,
            status,
        }
    }
}

impl fmt::Display for PairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<MacroValue>| {
            v.as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<undefined>".to_string())
        };
        let relation = match self.status {
            PairStatus::Match => "==",
            _ => "!=",
        };
        write!(
            f,
            "{} = {} {} {} = {}",
            self.pair.kernel,
            show(&self.kernel_value),
            relation,
            self.pair.library,
            show(&self.library_value)
        )
    }
}

/// Outcome of comparing every configured pair
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub kernel_probe: String,
    pub library_probe: String,
    pub outcomes: Vec<PairOutcome>,
    pub verdict: Verdict,
}

impl CheckReport {
    /// Fold pair outcomes into a report; every pair must match to pass
    pub fn new(kernel_probe: String, library_probe: String, outcomes: Vec<PairOutcome>) -> Self {
        let verdict = Verdict::all(outcomes.iter().map(|o| Verdict::from(o.status.is_match())));
        Self {
            kernel_probe,
            library_probe,
            outcomes,
            verdict,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &PairOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_match())
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Kernel:  {}", self.kernel_probe)?;
        writeln!(f, "Library: {}", self.library_probe)?;
        for outcome in &self.outcomes {
            let tag = if outcome.status.is_match() { "ok  " } else { "FAIL" };
            writeln!(f, "  [{}] {}", tag, outcome)?;
        }
        write!(f, "{}", self.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limcheck_core::ConstantName;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, &str)]) -> MacroMap {
        let mut map = MacroMap::new();
        for (n, v) in entries {
            map.insert(ConstantName::new(*n).unwrap(), MacroValue::new(*v))
                .unwrap();
        }
        map
    }

    fn pair() -> ConstantPair {
        ConstantPair::new("PATH_MAX", "__PATH_MAX").unwrap()
    }

    #[test]
    fn test_statuses() {
        let k = map(&[("PATH_MAX", "4096")]);
        let same = map(&[("__PATH_MAX", "4096")]);
        let other = map(&[("__PATH_MAX", "1024")]);
        let empty = MacroMap::new();

        assert_eq!(PairOutcome::evaluate(&pair(), &k, &same).status, PairStatus::Match);
        assert_eq!(PairOutcome::evaluate(&pair(), &k, &other).status, PairStatus::Mismatch);
        assert_eq!(PairOutcome::evaluate(&pair(), &empty, &same).status, PairStatus::MissingKernel);
        assert_eq!(PairOutcome::evaluate(&pair(), &k, &empty).status, PairStatus::MissingLibrary);
        assert_eq!(PairOutcome::evaluate(&pair(), &empty, &empty).status, PairStatus::MissingBoth);
    }

    #[test]
    fn test_pairs_by_name_not_position() {
        // Same length, different order: positional pairing would compare PATH_MAX with NAME_MAX.
        let kernel = map(&[("PATH_MAX", "4096"), ("NAME_MAX", "255")]);
        let library = map(&[("__NAME_MAX", "255"), ("__PATH_MAX", "4096")]);
        let pairs = [
            ConstantPair::new("PATH_MAX", "__PATH_MAX").unwrap(),
            ConstantPair::new("NAME_MAX", "__NAME_MAX").unwrap(),
        ];

        let outcomes = pairs
            .iter()
            .map(|p| PairOutcome::evaluate(p, &kernel, &library))
            .collect();
        let report = CheckReport::new("k".into(), "l".into(), outcomes);
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn test_any_failure_fails_report() {
        let kernel = map(&[("PATH_MAX", "4096"), ("NAME_MAX", "255")]);
        let library = map(&[("__PATH_MAX", "4096"), ("__NAME_MAX", "256")]);
        let pairs = [
            ConstantPair::new("PATH_MAX", "__PATH_MAX").unwrap(),
            ConstantPair::new("NAME_MAX", "__NAME_MAX").unwrap(),
        ];

        let outcomes = pairs
            .iter()
            .map(|p| PairOutcome::evaluate(p, &kernel, &library))
            .collect();
        let report = CheckReport::new("k".into(), "l".into(), outcomes);
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_display() {
        let outcome = PairOutcome::evaluate(
            &pair(),
            &map(&[("PATH_MAX", "4096")]),
            &MacroMap::new(),
        );
        assert_eq!(outcome.to_string(), "PATH_MAX = 4096 != __PATH_MAX = <undefined>");

        let report = CheckReport::new(
            "#include <linux/limits.h>".into(),
            "#include <bits/stdlib_lim.h>".into(),
            vec![outcome],
        );
        let text = report.to_string();
        assert!(text.contains("[FAIL] PATH_MAX = 4096"));
        assert!(text.ends_with("FAIL"));
    }

    #[test]
    fn test_serializes_to_json() {
        let outcome = PairOutcome::evaluate(
            &pair(),
            &map(&[("PATH_MAX", "4096")]),
            &map(&[("__PATH_MAX", "4096")]),
        );
        let report = CheckReport::new("k".into(), "l".into(), vec![outcome]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["verdict"], "pass");
        assert_eq!(json["outcomes"][0]["status"], "match");
        assert_eq!(json["outcomes"][0]["pair"]["kernel"], "PATH_MAX");
        assert_eq!(json["outcomes"][0]["library_value"], "4096");
    }
}
