//! Turning a generative model's reply into a run directory
//!
//! The model answers with fenced ```` ```json ````, ```` ```html ```` and
//! ```` ```css ```` blocks. Only the first block of each language is used.

use crate::assemble::{RunDirectory, RunDirectoryProvider, read_lossy};
use crate::error::{Result, TemplateError};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Manifest written when the reply carries no json block
const EMPTY_MANIFEST: &str = "{}";

/// Stylesheet used for the failure page
const FAILURE_CSS: &str = "body { background:#111; color:#eee; font-family:Arial,sans-serif; }";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fence {
    Json,
    Html,
    Css,
}

impl Fence {
    fn pattern(&self) -> &'static LazyLock<Regex> {
        static JSON: LazyLock<Regex> = LazyLock::new(|| fence("json"));
        static HTML: LazyLock<Regex> = LazyLock::new(|| fence("html"));
        static CSS: LazyLock<Regex> = LazyLock::new(|| fence("css"));
        match self {
            Fence::Json => &JSON,
            Fence::Html => &HTML,
            Fence::Css => &CSS,
        }
    }

    /// Trimmed body of the first block, or empty
    fn extract(&self, text: &str) -> String {
        self.pattern()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }
}

fn fence(lang: &str) -> Regex {
    RegexBuilder::new(&format!(r"```{}\s+([\s\S]*?)```", lang))
        .case_insensitive(true)
        .build()
        .expect("fence pattern is valid")
}

/// The three documents of a generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelBundle {
    /// Reply exactly as received
    pub raw: String,
    pub html: String,
    pub css: String,
    pub manifest: String,
}

impl ModelBundle {
    /// Split a fenced model reply into its documents
    pub fn from_response(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            html: Fence::Html.extract(raw),
            css: Fence::Css.extract(raw),
            manifest: Fence::Json.extract(raw),
        }
    }

    /// Bundle describing a failed model call
    pub fn failure(reason: &str) -> Self {
        let message = format!("Conversion failed: {}", reason);
        Self {
            html: format!(
                "<html><body><h2>Conversion failed</h2><pre>{}</pre></body></html>",
                message
            ),
            css: FAILURE_CSS.to_string(),
            manifest: EMPTY_MANIFEST.to_string(),
            raw: message,
        }
    }

    /// Write all four artifacts into `run`
    pub fn write_to(&self, run: &RunDirectory) -> Result<()> {
        let manifest = if self.manifest.trim().is_empty() {
            EMPTY_MANIFEST
        } else {
            self.manifest.as_str()
        };
        run.write_artifact(RunDirectory::RAW_RESPONSE, &self.raw)?;
        run.write_artifact(RunDirectory::GENERATED_HTML, &self.html)?;
        run.write_artifact(RunDirectory::STYLE_CSS, &self.css)?;
        run.write_artifact(RunDirectory::MANIFEST, manifest)?;
        Ok(())
    }
}

/// Summary of a freshly created run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub run: String,
    pub has_html: bool,
    pub has_css: bool,
    pub has_manifest: bool,
}

impl IngestReport {
    fn new(run: &RunDirectory, bundle: &ModelBundle) -> Self {
        Self {
            run: run.name().to_string(),
            has_html: !bundle.html.is_empty(),
            has_css: !bundle.css.is_empty(),
            has_manifest: !bundle.manifest.trim().is_empty() && bundle.manifest.trim() != EMPTY_MANIFEST,
        }
    }
}

/// Create a run from a raw model reply; an empty reply records the failure page
pub fn ingest_response(provider: &dyn RunDirectoryProvider, raw: &str) -> Result<(RunDirectory, IngestReport)> {
    let bundle = if raw.trim().is_empty() {
        ModelBundle::failure("empty model reply")
    } else {
        ModelBundle::from_response(raw)
    };
    let run = provider.create_run()?;
    bundle.write_to(&run)?;

    let report = IngestReport::new(&run, &bundle);
    if !report.has_html {
        log::warn!("Model reply for run {} has no html block", run.name());
    }
    log::info!("Ingested model reply into run {}", run.name());
    Ok((run, report))
}

/// Create a run from documents on disk; a missing stylesheet is allowed
pub fn import_documents(
    provider: &dyn RunDirectoryProvider,
    html: &Path,
    manifest: &Path,
    css: Option<&Path>,
) -> Result<(RunDirectory, IngestReport)> {
    let bundle = ModelBundle {
        raw: String::new(),
        html: read_input(html)?,
        manifest: read_input(manifest)?,
        css: css.map(read_input).transpose()?.unwrap_or_default(),
    };

    let run = provider.create_run()?;
    run.write_artifact(RunDirectory::GENERATED_HTML, &bundle.html)?;
    run.write_artifact(RunDirectory::MANIFEST, &bundle.manifest)?;
    run.write_artifact(RunDirectory::STYLE_CSS, &bundle.css)?;

    log::info!("Imported {} into run {}", html.display(), run.name());
    let report = IngestReport::new(&run, &bundle);
    Ok((run, report))
}

/// Copy the source screenshot under `upload_root` and note its location in the run
pub fn record_source_image(run: &RunDirectory, upload_root: &Path, image: &Path) -> Result<PathBuf> {
    let file_name = image
        .file_name()
        .ok_or_else(|| TemplateError::InvalidArgument(format!("not a file: {}", image.display())))?;
    if !image.is_file() {
        return Err(TemplateError::MissingInput(image.display().to_string()));
    }

    fs::create_dir_all(upload_root).map_err(|e| TemplateError::io(upload_root, e))?;
    let stored = upload_root.join(file_name);
    if stored != image {
        fs::copy(image, &stored).map_err(|e| TemplateError::io(&stored, e))?;
    }
    run.write_artifact(RunDirectory::SOURCE_IMAGE, &stored.to_string_lossy())?;
    Ok(stored)
}

fn read_input(path: &Path) -> Result<String> {
    read_lossy(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TemplateError::MissingInput(path.display().to_string()),
        _ => TemplateError::io(path, e),
    })
}
