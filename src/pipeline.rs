//! End-to-end operations over a run directory

use crate::assemble::{AssemblyReport, OutputAssembler, RunDirectory};
use crate::decompose::decompose;
use crate::dom::DomTree;
use crate::error::Result;
use crate::manifest::{ManifestDocument, load_manifest};
use crate::validate::{ValidationReport, validate, validate_flat};
use serde::Serialize;
use std::path::PathBuf;

/// Result of a generation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// `hierarchical` or `flat`
    pub shape: &'static str,
    #[serde(flatten)]
    pub assembly: AssemblyReport,
    pub not_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
}

/// Both inputs of a run, loaded and parsed
struct RunInputs {
    tree: DomTree,
    manifest: ManifestDocument,
}

impl RunInputs {
    /// Both files must exist before either is parsed
    fn load(run: &RunDirectory) -> Result<Self> {
        let html = run.read_artifact(RunDirectory::GENERATED_HTML)?;
        let manifest_text = run.read_artifact(RunDirectory::MANIFEST)?;
        let manifest = load_manifest(&manifest_text)?;
        Ok(Self {
            tree: DomTree::parse(&html),
            manifest,
        })
    }
}

/// Decompose a run's HTML by its manifest and write the templates
///
/// Nothing is written unless both inputs are present and the manifest loads.
pub fn generate_templates(run: &RunDirectory, archive: bool) -> Result<GenerationReport> {
    generate_templates_with(&OutputAssembler::default(), run, archive)
}

/// [`generate_templates`] with a specific assembler
pub fn generate_templates_with(
    assembler: &OutputAssembler,
    run: &RunDirectory,
    archive: bool,
) -> Result<GenerationReport> {
    let inputs = RunInputs::load(run)?;
    log::info!(
        "Generating templates for run {} from a {} manifest",
        run.name(),
        inputs.manifest.shape()
    );

    let decomposition = decompose(&inputs.tree, &inputs.manifest);
    let assembly = assembler.write(run, &decomposition)?;
    let archive = if archive { Some(assembler.archive(run)?) } else { None };

    Ok(GenerationReport {
        shape: inputs.manifest.shape(),
        not_found: decomposition.not_found(),
        assembly,
        archive,
    })
}

/// Check a run's manifest against its HTML without writing anything
pub fn validate_run(run: &RunDirectory) -> Result<ValidationReport> {
    let inputs = RunInputs::load(run)?;
    let report = match &inputs.manifest {
        ManifestDocument::Hierarchical(manifest) => validate(&inputs.tree, manifest),
        ManifestDocument::Flat(entries) => validate_flat(&inputs.tree, entries),
    };
    if !report.valid {
        log::warn!(
            "Run {}: {} selector(s) did not resolve",
            run.name(),
            report.missing.len()
        );
    }
    Ok(report)
}
