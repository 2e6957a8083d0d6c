//! Scripted compiler for driving the binary end to end.

use std::fs;
use tempfile::TempDir;

/// A fake `cc` defining `PATH_MAX` and `__PATH_MAX` in their usual headers.
/// Passing `None` leaves the macro undefined.
pub struct FakeCompiler {
    dir: TempDir,
}

impl FakeCompiler {
    pub fn path_max(kernel: Option<&str>, library: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        let emit = |name: &str, value: Option<&str>| match value {
            Some(v) => format!(
                "printf '\\t@@@name@@@%s@@@value@@@$%s@@@end@@@\\n' '{}' '{}' >> \"$out\"",
                name, v
            ),
            None => ":".to_string(),
        };
        let body = format!(
            r#"out=; src=
while [ $# -gt 0 ]; do
  case "$1" in
    --version) echo "fakecc 1.0"; exit 0;;
    -x|-o) opt="$1"; shift; [ "$opt" = -o ] && out="$1";;
    -*) ;;
    *) src="$1";;
  esac
  shift
done
: > "$out"
if grep -q 'linux/limits.h' "$src"; then
  {kernel}
elif grep -q 'bits/stdlib_lim.h' "$src"; then
  {library}
else
  echo "$src:1:10: fatal error: header not found" >&2
  exit 1
fi
"#,
            kernel = emit("PATH_MAX", kernel),
            library = emit("__PATH_MAX", library)
        );
        fs::write(dir.path().join("fakecc"), body).unwrap();
        Self { dir }
    }

    /// Value for `--cc`
    pub fn command(&self) -> String {
        format!("sh {}", self.dir.path().join("fakecc").display())
    }
}
