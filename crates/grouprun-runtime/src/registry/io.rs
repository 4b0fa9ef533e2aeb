//! Atomic registry entry I/O.
//!
//! Format: four-line text file named `<id>.kill`
//! ```text
//! <owner pid>
//! <target process group>
//! <signal name>
//! <label>
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use grouprun_core::{KillSignal, ProcessGroup};

const ENTRY_EXTENSION: &str = "kill";

/// A pending kill action as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Process that registered the action and is expected to release it.
    pub owner_pid: u32,
    /// Group to signal if the owner disappears.
    pub target: ProcessGroup,
    pub signal: KillSignal,
    /// Diagnostic label (the process name).
    pub label: String,
}

/// Write an entry atomically using temp file + rename.
///
/// # File naming
/// `<id>.kill`, written first as `<id>.kill.tmp`
pub fn write_entry(dir: &Path, id: &str, entry: &RegistryEntry) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let filename = format!("{id}.{ENTRY_EXTENSION}");
    let final_path = dir.join(&filename);
    let temp_path = dir.join(format!("{filename}.tmp"));

    fs::write(&temp_path, render_entry(entry))?;
    fs::rename(&temp_path, &final_path)?;

    Ok(final_path)
}

/// Read one entry.
pub fn read_entry(path: &Path) -> io::Result<RegistryEntry> {
    let content = fs::read_to_string(path)?;
    parse_entry(&content)
}

/// Delete an entry (idempotent - no error if missing).
pub fn delete_entry(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// List all entries in `dir`.
///
/// Returns `(path, entry)` pairs for successfully parsed files.
/// Silently ignores malformed files and leftover temp files.
pub fn list_entries(dir: &Path) -> io::Result<Vec<(PathBuf, RegistryEntry)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut results = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().and_then(|s| s.to_str()) != Some(ENTRY_EXTENSION) {
            continue;
        }

        if let Ok(content) = fs::read_to_string(&path)
            && let Ok(parsed) = parse_entry(&content)
        {
            results.push((path, parsed));
        }
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(results)
}

fn render_entry(entry: &RegistryEntry) -> String {
    let label = entry.label.replace(['\n', '\r'], " ");
    format!(
        "{}\n{}\n{}\n{}\n",
        entry.owner_pid,
        entry.target.id(),
        entry.signal.name(),
        label
    )
}

fn parse_entry(content: &str) -> io::Result<RegistryEntry> {
    let mut lines = content.lines();

    let owner_pid = lines
        .next()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .ok_or_else(|| invalid("missing or invalid owner PID"))?;

    let target = lines
        .next()
        .and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&pgid| pgid > 0)
        .map(ProcessGroup::new)
        .ok_or_else(|| invalid("missing or invalid process group"))?;

    let signal = lines
        .next()
        .ok_or_else(|| invalid("missing signal"))?
        .parse::<KillSignal>()
        .map_err(|e| invalid(&e.to_string()))?;

    let label = lines.next().unwrap_or_default().to_string();

    Ok(RegistryEntry {
        owner_pid,
        target,
        signal,
        label,
    })
}

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}
