use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Program and arguments that hand `path` to the desktop's default app
pub fn opener_command(path: &Path) -> (&'static str, Vec<OsString>) {
    if cfg!(target_os = "windows") {
        (
            "cmd",
            vec!["/C".into(), "start".into(), "".into(), path.into()],
        )
    } else if cfg!(target_os = "macos") {
        ("open", vec![path.into()])
    } else {
        ("xdg-open", vec![path.into()])
    }
}

fn spawn_opener(path: &Path) -> Result<()> {
    let (program, args) = opener_command(path);
    let program: PathBuf =
        which::which(program).with_context(|| format!("{program} not found on PATH"))?;

    let mut child = Command::new(&program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to run {}", program.display()))?;

    // Reap in the background; the result does not matter
    tokio::spawn(async move {
        let _ = child.wait().await;
    });
    Ok(())
}

/// Open `path` externally, fire-and-forget; failures are only logged
pub fn open_path(path: &Path) {
    if let Err(e) = spawn_opener(path) {
        debug!("Could not open {}: {:#}", path.display(), e);
    }
}
