//! # Report Output
//!
//! Writes the rendered document next to the user (the desktop, unless the
//! configuration names another directory) and hands it to the platform's
//! default application.
//!
//! Writes are not locked. If the previous report with the same name is still
//! open in a spreadsheet program the write fails with
//! [`ReportError::OutputWriteFailed`] and the user is asked to close it.

use crate::{
    assembler::ReportGrid,
    layout::LayoutParams,
    renderer::{render_document, write_document_csv},
    ReportError,
};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info};

/// UTF-8 byte order mark; spreadsheet programs need it to read Hangul
/// from CSV correctly.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The user's desktop, falling back to `~/Desktop` and then the working
/// directory.
pub fn desktop_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Where the document for `grid` is written inside `dir`.
pub fn output_path(dir: &Path, grid: &ReportGrid) -> PathBuf {
    dir.join(format!("{}.csv", grid.file_stem()))
}

/// Render the report and write it into `dir`, returning the file written.
pub fn save(grid: &ReportGrid, layout: &LayoutParams, dir: &Path) -> Result<PathBuf, ReportError> {
    let path = output_path(dir, grid);
    let rows = render_document(grid, layout);

    let write = || -> io::Result<()> {
        fs::create_dir_all(dir)?;
        let mut out = BufWriter::new(File::create(&path)?);
        out.write_all(UTF8_BOM)?;
        write_document_csv(&rows, &mut out)?;
        out.flush()
    };
    write().map_err(|source| ReportError::OutputWriteFailed {
        path: path.clone(),
        source,
    })?;

    info!(rows = rows.len(), "wrote {}", path.display());
    Ok(path)
}

/// Launch the written document with the platform's default application.
pub fn open(path: &Path) -> Result<(), ReportError> {
    let failed = |reason: String| ReportError::OutputOpenFailed {
        path: path.to_path_buf(),
        reason,
    };
    if !path.exists() {
        return Err(failed("file does not exist".to_string()));
    }

    let mut command = opener_command(path);
    debug!(?command, "opening report");
    let status = command.status().map_err(|e| failed(e.to_string()))?;
    if !status.success() {
        return Err(failed(format!("opener exited with {status}")));
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    // The empty argument is the window title `start` expects first.
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
