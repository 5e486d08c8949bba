//! Linker driver: turn the emitted C into a native executable.
//!
//! The generated translation unit is written to a temporary `.c` file and
//! handed to the system C compiler with include/library search paths for the
//! tool's `core/` and `libs/` directories (resolved next to the running
//! executable) and a libcurl link. The child inherits our stdout/stderr so
//! its diagnostics stream straight through; there is no timeout. The temp
//! file is removed on success and failure alike.

use anyhow::{Context, Result, bail};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Directory holding the runtime headers (`core/`) and support libraries
/// (`libs/`), laid out next to the installed binary.
fn tool_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `$CC` when set, otherwise the platform default driver.
fn c_compiler() -> String {
    env::var("CC").unwrap_or_else(|_| "cc".to_string())
}

fn compile_command(input: &Path, output: &Path) -> Command {
    let dir = tool_dir();
    let mut cmd = Command::new(c_compiler());
    cmd.arg(input)
        .arg("-o")
        .arg(output)
        .arg(format!("-I{}", dir.join("core").display()))
        .arg(format!("-I{}", dir.join("libs").display()))
        .arg(format!("-L{}", dir.join("libs").display()))
        .arg("-lcurl");
    cmd
}

/// Compile `c_source` into the executable at `output`.
pub fn build_binary(c_source: &str, output: &Path) -> Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix("hcs")
        .suffix(".c")
        .tempfile()
        .context("failed to create temporary C file")?;
    tmp.write_all(c_source.as_bytes())
        .context("failed to write temporary C file")?;
    tmp.flush().context("failed to flush temporary C file")?;

    let status = compile_command(tmp.path(), output)
        .status()
        .with_context(|| format!("failed to run `{}`", c_compiler()))?;

    // `tmp` drops here, deleting the file on both paths.
    if !status.success() {
        match status.code() {
            Some(code) => bail!("C compiler exited with status {code}"),
            None => bail!("C compiler was terminated by a signal"),
        }
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_command_links_curl() {
        let cmd = compile_command(Path::new("/tmp/x.c"), Path::new("x"));
        assert!(args_of(&cmd).contains(&"-lcurl".to_string()));
    }

    #[test]
    fn test_command_names_output() {
        let cmd = compile_command(Path::new("/tmp/x.c"), Path::new("out-bin"));
        let args = args_of(&cmd);
        let o = args.iter().position(|a| a == "-o").expect("-o missing");
        assert_eq!(args[o + 1], "out-bin");
    }

    #[test]
    fn test_command_search_paths() {
        let cmd = compile_command(Path::new("/tmp/x.c"), Path::new("x"));
        let args = args_of(&cmd);
        assert!(args.iter().any(|a| a.starts_with("-I") && a.ends_with("core")));
        assert!(args.iter().any(|a| a.starts_with("-I") && a.ends_with("libs")));
        assert!(args.iter().any(|a| a.starts_with("-L") && a.ends_with("libs")));
    }
}
