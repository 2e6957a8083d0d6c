//! Scripted stand-in for a C compiler.
//!
//! Recognises which headers a probe includes and answers `-S` with
//! probe markers, and `-E -dM` with `#define` lines, for the macros
//! configured for that header.

#![allow(dead_code)]

use limcheck_core::CompilerCommand;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct FakeCompiler {
    _dir: TempDir,
    script: PathBuf,
    log: PathBuf,
}

impl FakeCompiler {
    /// `headers`: header name fragment and the `(macro, value)` pairs it defines
    pub fn new(headers: &[(&str, &[(&str, &str)])]) -> Self {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("fakecc");
        let log = dir.path().join("sources.log");

        let mut rules = String::new();
        for (header, macros) in headers {
            rules.push_str(&format!("if grep -q '{}' \"$src\"; then\n  found=1\n", header));
            for (name, value) in macros.iter() {
                rules.push_str(&format!(
                    "  if [ $mode = asm ] && grep -q '@@@name@@@{n}@@@' \"$src\"; then\n    \
                     printf '\\t@@@name@@@%s@@@value@@@$%s@@@end@@@\\n' '{n}' '{v}' >> \"$out\"\n  fi\n  \
                     if [ $mode = pre ]; then printf '#define %s %s\\n' '{n}' '{v}' >> \"$out\"; fi\n",
                    n = name,
                    v = value
                ));
            }
            rules.push_str("fi\n");
        }

        let body = format!(
            r#"mode=obj; out=; src=
while [ $# -gt 0 ]; do
  case "$1" in
    --version) echo "fakecc 1.0"; exit 0;;
    -S) mode=asm;;
    -E) mode=pre;;
    -x|-o) opt="$1"; shift; [ "$opt" = -o ] && out="$1";;
    -*) ;;
    *) src="$1";;
  esac
  shift
done
echo "$src" >> '{log}'
: > "$out"
found=0
{rules}
if [ $found = 0 ]; then
  echo "$src:1:10: fatal error: header not found" >&2
  exit 1
fi
"#,
            log = log.display(),
            rules = rules
        );
        fs::write(&script, body).unwrap();

        Self {
            _dir: dir,
            script,
            log,
        }
    }

    /// `PATH_MAX` in the kernel header and `__PATH_MAX` in the library header
    pub fn path_max(kernel: &str, library: &str) -> Self {
        Self::new(&[
            ("linux/limits.h", &[("PATH_MAX", kernel)]),
            ("bits/stdlib_lim.h", &[("__PATH_MAX", library)]),
        ])
    }

    pub fn command(&self) -> CompilerCommand {
        CompilerCommand::new(format!("sh {}", self.script.display()))
    }

    /// Probe sources the compiler was asked to compile, in order
    pub fn sources(&self) -> Vec<PathBuf> {
        fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(PathBuf::from)
            .collect()
    }
}
