//! Writing decomposition results into a run directory
//!
//! Templates land in `webtemplate/` inside the run; the archive is rebuilt
//! from whatever that directory currently holds.

pub mod preview;
pub mod run;

pub use preview::{NO_HTML_PLACEHOLDER, inline_css, preview_html};
pub use run::{RunDirectory, RunDirectoryProvider, TimestampedRuns, validate_run_name};

use crate::decompose::{Decomposition, EntryStatus, VIEW_TEMPLATE_FILE};
use crate::error::{Result, TemplateError};
pub(crate) use run::read_lossy;
use run::write_atomic;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Default prefix for download references
pub const DOWNLOAD_PREFIX: &str = "/download";

/// What happened to one manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReport {
    pub name: String,
    pub normalized_name: String,
    /// Download reference of the written fragment; absent if not found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_reference: Option<String>,
    pub status: EntryStatus,
}

/// Summary of one assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyReport {
    pub run: String,
    pub components: Vec<ComponentReport>,
    /// Download reference of `view_template.swt`
    pub view_template: String,
    pub files_written: usize,
}

/// Persists fragments and the view template
#[derive(Debug, Clone)]
pub struct OutputAssembler {
    download_prefix: String,
}

impl Default for OutputAssembler {
    fn default() -> Self {
        Self {
            download_prefix: DOWNLOAD_PREFIX.to_string(),
        }
    }
}

impl OutputAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the prefix used in output references
    pub fn with_download_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.download_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    /// `{prefix}/{run}/webtemplate/{file}`
    pub fn reference(&self, run: &RunDirectory, file: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.download_prefix,
            run.name(),
            RunDirectory::WEBTEMPLATE_DIR,
            file
        )
    }

    /// Write every fragment and the shell into `webtemplate/`
    ///
    /// Fragments whose normalized names collide overwrite each other; the last
    /// one wins.
    pub fn write(&self, run: &RunDirectory, decomposition: &Decomposition) -> Result<AssemblyReport> {
        let dir = run.webtemplate_dir();
        fs::create_dir_all(&dir).map_err(|e| TemplateError::io(&dir, e))?;

        let mut seen = HashSet::new();
        let mut references = HashMap::new();
        for fragment in &decomposition.fragments {
            let file = fragment.file_name();
            if !seen.insert(file.clone()) {
                log::warn!(
                    "'{}' normalizes to an existing name, overwriting {}",
                    fragment.name,
                    file
                );
            }
            write_atomic(&dir.join(&file), fragment.template.as_bytes())?;
            references.insert(fragment.normalized_name.clone(), self.reference(run, &file));
        }

        write_atomic(&dir.join(VIEW_TEMPLATE_FILE), decomposition.shell.as_bytes())?;

        let components = decomposition
            .entries
            .iter()
            .map(|entry| ComponentReport {
                name: entry.name.clone(),
                normalized_name: entry.normalized_name.clone(),
                output_reference: match entry.status {
                    EntryStatus::Ok => references.get(&entry.normalized_name).cloned(),
                    EntryStatus::NotFound => None,
                },
                status: entry.status,
            })
            .collect();

        let report = AssemblyReport {
            run: run.name().to_string(),
            components,
            view_template: self.reference(run, VIEW_TEMPLATE_FILE),
            files_written: seen.len() + 1,
        };
        log::info!(
            "Wrote {} template file(s) to {}",
            report.files_written,
            dir.display()
        );
        Ok(report)
    }

    /// Rebuild `webtemplate_{run}.zip` from the current `webtemplate/` contents
    ///
    /// Entries are stored relative to `webtemplate/`, in sorted order.
    pub fn archive(&self, run: &RunDirectory) -> Result<PathBuf> {
        let dir = run.webtemplate_dir();
        fs::create_dir_all(&dir).map_err(|e| TemplateError::io(&dir, e))?;

        let mut files = Vec::new();
        collect_files(&dir, &dir, &mut files)?;
        files.sort();

        let target = run.archive_path();
        let tmp = run.path().join(format!(".webtemplate_{}.zip.tmp", run.name()));
        let result = write_zip(&tmp, &dir, &files).and_then(|()| {
            fs::rename(&tmp, &target).map_err(|e| TemplateError::io(&target, e))
        });
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result?;

        log::info!("Packaged {} file(s) into {}", files.len(), target.display());
        Ok(target)
    }
}

/// Relative `/`-separated names of every regular file under `dir`
fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| TemplateError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| TemplateError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| TemplateError::io(&path, e))?;
        if file_type.is_dir() {
            collect_files(base, &path, out)?;
        } else if file_type.is_file() {
            // Skip in-flight temp files
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if let Ok(relative) = path.strip_prefix(base) {
                let name: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(name.join("/"));
            }
        }
    }
    Ok(())
}

fn write_zip(target: &Path, base: &Path, files: &[String]) -> Result<()> {
    let archive_err = |e: zip::result::ZipError| TemplateError::ArchiveFailed(e.to_string());

    let file = fs::File::create(target).map_err(|e| TemplateError::io(target, e))?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in files {
        let source = base.join(name);
        let bytes = fs::read(&source).map_err(|e| TemplateError::io(&source, e))?;
        writer.start_file(name.as_str(), options).map_err(archive_err)?;
        writer.write_all(&bytes).map_err(|e| TemplateError::io(target, e))?;
    }

    writer.finish().map_err(archive_err)?;
    Ok(())
}
