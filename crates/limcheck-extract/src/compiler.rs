//! C Compiler Integration
//!
//! Wraps an external C compiler. The compiler command is whatever the
//! build system hands us (`gcc -m32`, `ccache clang`, ...), so it is run
//! through `/bin/sh -c` and only the generated file paths are quoted.

use std::path::Path;
use std::process::{Command, Output, Stdio};
use tracing::{debug, warn};

use limcheck_core::{CompilerCommand, Error, Result};

/// Shell used to interpret the compiler command
const SHELL: &str = "/bin/sh";

/// Exit statuses the shell uses for "command not found" / "not executable"
const SHELL_NOT_FOUND: i32 = 127;
const SHELL_NOT_EXECUTABLE: i32 = 126;

/// Outcome of compiling a snippet that is allowed to fail
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Whether the compiler exited successfully
    pub success: bool,
    /// Exit status as reported by the OS
    pub status: String,
    /// Everything the compiler printed
    pub diagnostics: String,
}

/// C compiler wrapper
#[derive(Debug, Clone)]
pub struct Compiler {
    command: CompilerCommand,
}

impl Compiler {
    /// Create a compiler wrapper for the given command line
    pub fn new(command: CompilerCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &CompilerCommand {
        &self.command
    }

    /// Check if the compiler can be run at all
    pub fn is_available(&self) -> bool {
        self.spawn(&["--version"])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Get the first line of `--version`
    pub fn version(&self) -> Option<String> {
        self.spawn(&["--version"]).ok().and_then(|o| {
            String::from_utf8(o.stdout)
                .ok()
                .and_then(|s| s.lines().next().map(|l| l.to_string()))
        })
    }

    /// Compile `source` to assembly in `asm`
    pub fn compile_to_assembly(&self, source: &Path, asm: &Path) -> Result<()> {
        let out = asm.to_string_lossy();
        let src = source.to_string_lossy();
        self.run(&["-S", "-o", &*out, "-x", "c", &*src])
            .map(|_| ())
    }

    /// Dump the macro definitions visible after preprocessing `source`
    pub fn dump_macros(&self, source: &Path, listing: &Path) -> Result<()> {
        let out = listing.to_string_lossy();
        let src = source.to_string_lossy();
        self.run(&["-E", "-dM", "-o", &*out, &*src])
            .map(|_| ())
    }

    /// Compile `source` to an object file, reporting rather than failing on errors
    pub fn try_compile_object(&self, source: &Path, object: &Path) -> Result<CompileOutcome> {
        let out = object.to_string_lossy();
        let src = source.to_string_lossy();
        let output = self.spawn(&["-c", "-o", &*out, &*src])?;

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).to_string();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CompileOutcome {
            success: output.status.success(),
            status: output.status.to_string(),
            diagnostics,
        })
    }

    /// Run the compiler and require a zero exit status
    fn run(&self, args: &[&str]) -> Result<Output> {
        let output = self.spawn(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::CompilerInvocation {
                command: self.command_line(args),
                status: output.status.to_string(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        for warning in parse_warnings(&output.stderr) {
            warn!("{}", warning);
        }

        Ok(output)
    }

    /// Run the compiler; only a missing compiler is an error here
    fn spawn(&self, args: &[&str]) -> Result<Output> {
        if self.command.is_empty() {
            return Err(Error::CompilerNotFound {
                command: String::new(),
            });
        }

        let line = self.command_line(args);
        debug!("Running: {}", line);

        let output = Command::new(SHELL)
            .arg("-c")
            .arg(&line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        match output.status.code() {
            Some(SHELL_NOT_FOUND) | Some(SHELL_NOT_EXECUTABLE) => {
                debug!("Shell reported: {}", String::from_utf8_lossy(&output.stderr).trim_end());
                Err(Error::CompilerNotFound {
                    command: self.command.to_string(),
                })
            }
            _ => Ok(output),
        }
    }

    /// Full shell command line for the given arguments
    fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.command.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&shell_quote(arg));
        }
        line
    }
}

/// Quote a single argument for `/bin/sh`
pub(crate) fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=+,:@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Pick warning lines out of compiler stderr
fn parse_warnings(stderr: &[u8]) -> Vec<String> {
    let stderr_str = String::from_utf8_lossy(stderr);
    stderr_str
        .lines()
        .filter(|line| line.contains("warning:"))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_appends_quoted_args() {
        let compiler = Compiler::new(CompilerCommand::new("gcc -m32"));
        let line = compiler.command_line(&["-S", "-o", "/tmp/a b/probe.s", "-x", "c", "/tmp/probe.c"]);
        assert_eq!(line, "gcc -m32 -S -o '/tmp/a b/probe.s' -x c /tmp/probe.c");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("-dM"), "-dM");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
        assert_eq!(shell_quote("$HOME"), "'$HOME'");
    }

    #[test]
    fn test_parse_warnings() {
        let stderr = b"probe.c:1: warning: unused\nnote: something\nprobe.c:2: warning: shadow\n";
        let warnings = parse_warnings(stderr);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("unused"));
    }

    #[test]
    fn test_empty_command_is_not_found() {
        let compiler = Compiler::new(CompilerCommand::new(""));
        assert!(matches!(
            compiler.spawn(&["--version"]),
            Err(Error::CompilerNotFound { .. })
        ));
        assert!(!compiler.is_available());
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_compiler_is_not_found() {
        let compiler = Compiler::new(CompilerCommand::new("/nonexistent/limcheck-cc"));
        assert!(matches!(
            compiler.spawn(&["--version"]),
            Err(Error::CompilerNotFound { .. })
        ));
        assert_eq!(compiler.version(), None);
    }
}
