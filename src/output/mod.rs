use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};

use crate::session::Session;
use crate::SummaryError;

pub mod pdf;

pub use pdf::{export_pdf, FontChoice};

pub const TXT_FILE_NAME: &str = "video_summary.txt";
pub const PDF_FILE_NAME: &str = "video_summary.pdf";

/// A file offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl Download {
    /// Write the download into `dir`, returning the written path
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs_err::create_dir_all(dir)?;
        let path = dir.join(self.file_name);
        fs_err::write(&path, &self.data)?;
        tracing::debug!("Wrote {} ({})", path.display(), self.mime_type);
        Ok(path)
    }
}

/// Plain-text download, byte-identical to the summary
pub fn export_text(summary: &str) -> Download {
    Download {
        file_name: TXT_FILE_NAME,
        mime_type: "text/plain",
        data: summary.as_bytes().to_vec(),
    }
}

/// Which downloads to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSelection {
    pub txt: bool,
    pub pdf: bool,
}

impl ExportSelection {
    /// Both formats unless one was asked for explicitly
    pub fn from_flags(txt: bool, pdf: bool) -> Self {
        if !txt && !pdf {
            Self { txt: true, pdf: true }
        } else {
            Self { txt, pdf }
        }
    }
}

/// Build the downloads for a session; empty unless a summary is visible
pub fn downloads(session: &Session, selection: ExportSelection, font: &FontChoice) -> Result<Vec<Download>> {
    if !session.has_visible_summary() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    if selection.txt {
        files.push(export_text(&session.summary_text));
    }
    if selection.pdf {
        files.push(export_pdf(&session.summary_text, font)?);
    }
    Ok(files)
}

/// Print the result section of a session
pub fn print_summary(session: &Session) {
    if !session.has_visible_summary() {
        return;
    }

    println!("{}", style("Summary:").bold().underlined());
    println!("{}", session.summary_text.trim_end());
    println!();
    println!(
        "{}",
        style(format!(
            "{} words · {} style",
            session.actual_word_count, session.selected_summary_type
        ))
        .dim()
    );
}

/// Print a failed Summarize action inline
pub fn print_error(error: &SummaryError) {
    if error.is_warning() {
        eprintln!("{} {}", style("⚠").yellow(), style(error).yellow());
    } else {
        eprintln!("{} {}", style("✗").red(), style(error).red());
    }
}
