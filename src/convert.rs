//! DOCX→PDF conversion pipeline.
//!
//! One linear path per request:
//!   upload bytes → random-basename temp file → (best-effort) pandoc
//!   equation extraction → headless LibreOffice conversion → read PDF →
//!   respond → unlink both temp files.
//!
//! The uploaded file never keeps any attacker-controlled characters in its
//! name: it is written under a fresh 32-hex-character basename, so the
//! subprocess argument vector only ever contains paths we generated.
//! Cleanup runs on every exit path via `TempGuard`; a failed unlink is
//! logged and swallowed so it never masks the original error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::RngCore;
use regex::Regex;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

/// Upload cap, enforced before any file is written.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// LibreOffice gets this long per document; pandoc has no own timeout and
/// rides on the request timeout.
const CONVERT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ConvertError {
  #[error("document converter is not installed")]
  ConverterUnavailable,
  #[error("converter exited with failure: {0}")]
  ConverterFailed(String),
  #[error("conversion timed out")]
  Timeout,
  #[error("conversion produced no output file")]
  MissingOutput,
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// Deletes every tracked path when dropped, on success and error alike.
pub struct TempGuard {
  paths: Vec<PathBuf>,
}

impl TempGuard {
  pub fn new() -> Self {
    Self { paths: Vec::new() }
  }

  pub fn track(&mut self, path: PathBuf) {
    self.paths.push(path);
  }
}

impl Default for TempGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for TempGuard {
  fn drop(&mut self) {
    for path in &self.paths {
      if let Err(e) = std::fs::remove_file(path) {
        debug!(target: "convert", path = %path.display(), error = %e, "Temp file cleanup failed");
      }
    }
  }
}

/// 32 hex characters, no extension. Collisions are not a practical concern
/// and concurrent uploads never share a name.
pub fn random_basename() -> String {
  let mut bytes = [0u8; 16];
  rand::thread_rng().fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Probe the headless office suite. Called before any temp file is written
/// so a missing binary fails the request immediately.
#[instrument(level = "debug")]
pub async fn soffice_available() -> bool {
  match Command::new("soffice").arg("--version").kill_on_drop(true).output().await {
    Ok(out) => out.status.success(),
    Err(_) => false,
  }
}

/// Best-effort equation extraction: run pandoc to markdown and scan for TeX
/// spans. Any failure logs and yields an empty list; this never aborts the
/// pipeline.
#[instrument(level = "info", skip_all)]
pub async fn extract_equations(source: &Path) -> Vec<String> {
  let out = match Command::new("pandoc")
    .arg(source)
    .args(["-t", "markdown", "--wrap=none"])
    .kill_on_drop(true)
    .output()
    .await
  {
    Ok(out) => out,
    Err(e) => {
      warn!(target: "convert", error = %e, "pandoc unavailable; skipping equation extraction");
      return Vec::new();
    }
  };
  if !out.status.success() {
    warn!(target: "convert", status = ?out.status.code(), "pandoc failed; skipping equation extraction");
    return Vec::new();
  }
  scan_equations(&String::from_utf8_lossy(&out.stdout))
}

/// Display spans (`$$...$$`) first, then inline spans (`$...$`) with the
/// display spans removed, deduplicating inline matches against captured ones.
pub fn scan_equations(markdown: &str) -> Vec<String> {
  let display = Regex::new(r"(?s)\$\$(.+?)\$\$").expect("static regex");
  let inline = Regex::new(r"\$([^\$\n]+?)\$").expect("static regex");

  let mut equations = Vec::new();
  for cap in display.captures_iter(markdown) {
    let eq = cap[1].trim().to_string();
    if !eq.is_empty() && !equations.contains(&eq) {
      equations.push(eq);
    }
  }
  let stripped = display.replace_all(markdown, "");
  for cap in inline.captures_iter(&stripped) {
    let eq = cap[1].trim().to_string();
    if !eq.is_empty() && !equations.contains(&eq) {
      equations.push(eq);
    }
  }
  equations
}

/// Pick the converter's output file out of a directory listing when the
/// expected `{basename}.pdf` is missing. LibreOffice strips everything after
/// the first dot of multi-dot filenames, so we try the full basename and the
/// portion before the first dot.
pub fn locate_output(source_name: &str, listing: &[String]) -> Option<String> {
  let full = format!("{source_name}.pdf");
  if listing.iter().any(|n| n == &full) {
    return Some(full);
  }
  let head = source_name.split('.').next().unwrap_or(source_name);
  let short = format!("{head}.pdf");
  if listing.iter().any(|n| n == &short) {
    return Some(short);
  }
  None
}

/// Convert `source` to PDF in its own directory. Returns the produced path.
#[instrument(level = "info", skip_all)]
pub async fn convert_to_pdf(source: &Path) -> Result<PathBuf, ConvertError> {
  let outdir = source.parent().map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);

  let run = Command::new("soffice")
    .args(["--headless", "--convert-to", "pdf", "--outdir"])
    .arg(&outdir)
    .arg(source)
    .kill_on_drop(true)
    .output();
  let out = timeout(CONVERT_TIMEOUT, run)
    .await
    .map_err(|_| ConvertError::Timeout)??;

  if !out.status.success() {
    return Err(ConvertError::ConverterFailed(
      String::from_utf8_lossy(&out.stderr).trim().to_string(),
    ));
  }

  let source_name = source
    .file_name()
    .and_then(|n| n.to_str())
    .unwrap_or_default()
    .to_string();
  let expected = outdir.join(format!("{source_name}.pdf"));
  if tokio::fs::try_exists(&expected).await.unwrap_or(false) {
    return Ok(expected);
  }

  // Expected name missing: fall back to scanning the output directory.
  let mut listing = Vec::new();
  let mut entries = tokio::fs::read_dir(&outdir).await?;
  while let Some(entry) = entries.next_entry().await? {
    if let Some(name) = entry.file_name().to_str() {
      listing.push(name.to_string());
    }
  }
  match locate_output(&source_name, &listing) {
    Some(name) => Ok(outdir.join(name)),
    None => Err(ConvertError::MissingOutput),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn basenames_are_32_hex_chars() {
    let name = random_basename();
    assert_eq!(name.len(), 32);
    assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(name, random_basename());
  }

  #[test]
  fn scans_display_equations_first() {
    let md = "intro $$E = mc^2$$ middle $a + b$ end";
    assert_eq!(scan_equations(md), vec!["E = mc^2".to_string(), "a + b".to_string()]);
  }

  #[test]
  fn inline_matches_dedupe_against_display() {
    let md = "$$x^2$$ and again $x^2$ plus $y$";
    assert_eq!(scan_equations(md), vec!["x^2".to_string(), "y".to_string()]);
  }

  #[test]
  fn multiline_display_spans_are_captured() {
    let md = "$$\n\\Delta H = \\sum_i n_i\n$$";
    assert_eq!(scan_equations(md), vec!["\\Delta H = \\sum_i n_i".to_string()]);
  }

  #[test]
  fn no_equations_means_empty_list() {
    assert!(scan_equations("plain prose, $5 price tags stay\nunmatched").is_empty());
  }

  #[test]
  fn locate_output_prefers_full_basename() {
    let listing = vec!["abc.def.pdf".to_string(), "abc.pdf".to_string()];
    assert_eq!(locate_output("abc.def", &listing).as_deref(), Some("abc.def.pdf"));
  }

  #[test]
  fn locate_output_falls_back_to_first_dot_prefix() {
    let listing = vec!["report.pdf".to_string()];
    assert_eq!(locate_output("report.v2.final", &listing).as_deref(), Some("report.pdf"));
  }

  #[test]
  fn locate_output_reports_missing() {
    assert_eq!(locate_output("report", &["other.pdf".to_string()]), None);
  }

  #[test]
  fn temp_guard_removes_tracked_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scratch");
    std::fs::write(&path, b"x").expect("write");
    {
      let mut guard = TempGuard::new();
      guard.track(path.clone());
    }
    assert!(!path.exists());
  }

  #[test]
  fn temp_guard_swallows_missing_files() {
    let mut guard = TempGuard::new();
    guard.track(PathBuf::from("/nonexistent/definitely-not-here"));
    drop(guard); // must not panic
  }
}
