use crate::decompose::{TEMPLATE_EXTENSION, VIEW_TEMPLATE_FILE};
use crate::error::{Result, TemplateError};
use chrono::Local;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Upper bound on `_N` suffixes tried when a timestamp is taken
const MAX_SUFFIX: u32 = 1000;

/// Hands out run directories
pub trait RunDirectoryProvider {
    /// Create a fresh, empty run directory
    fn create_run(&self) -> Result<RunDirectory>;

    /// Open an existing run by name
    fn open_run(&self, name: &str) -> Result<RunDirectory>;
}

/// One generation run on disk
///
/// Model outputs sit at the top level; generated templates go under
/// `webtemplate/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    name: String,
    path: PathBuf,
}

impl RunDirectory {
    pub const RAW_RESPONSE: &'static str = "raw_response.txt";
    pub const GENERATED_HTML: &'static str = "generated.html";
    pub const STYLE_CSS: &'static str = "style.css";
    pub const MANIFEST: &'static str = "manifest.json";
    pub const SOURCE_IMAGE: &'static str = "source_image.txt";
    pub const WEBTEMPLATE_DIR: &'static str = "webtemplate";

    /// Top-level files that may be handed out for download
    const DOWNLOADABLE: [&'static str; 4] = [
        Self::RAW_RESPONSE,
        Self::GENERATED_HTML,
        Self::STYLE_CSS,
        Self::MANIFEST,
    ];

    /// Wrap an existing directory `root/name`
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        validate_run_name(name)?;
        let path = root.join(name);
        if !path.is_dir() {
            return Err(TemplateError::RunNotFound(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `webtemplate/` inside the run
    pub fn webtemplate_dir(&self) -> PathBuf {
        self.path.join(Self::WEBTEMPLATE_DIR)
    }

    /// `webtemplate_{run}.zip` inside the run
    pub fn archive_path(&self) -> PathBuf {
        self.path.join(format!("webtemplate_{}.zip", self.name))
    }

    /// Path of a top-level artifact, without allow-list checks
    pub fn artifact(&self, file: &str) -> PathBuf {
        self.path.join(file)
    }

    /// Resolve a downloadable artifact
    ///
    /// Only the model outputs, `view_template.swt` and `applet_*.swt` are
    /// served; templates resolve inside `webtemplate/`.
    pub fn artifact_path(&self, file: &str) -> Result<PathBuf> {
        if Self::DOWNLOADABLE.contains(&file) {
            Ok(self.artifact(file))
        } else if file == VIEW_TEMPLATE_FILE || is_applet_file(file) {
            Ok(self.webtemplate_dir().join(file))
        } else {
            Err(TemplateError::ArtifactNotAllowed(file.to_string()))
        }
    }

    /// Read a top-level artifact; absence is reported as missing input
    pub fn read_artifact(&self, file: &str) -> Result<String> {
        let path = self.artifact(file);
        read_lossy(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TemplateError::MissingInput(format!("{} not found in run {}", file, self.name)),
            _ => TemplateError::io(path, e),
        })
    }

    /// Read a top-level artifact if it exists
    pub fn read_optional(&self, file: &str) -> Result<Option<String>> {
        match self.read_artifact(file) {
            Ok(text) => Ok(Some(text)),
            Err(TemplateError::MissingInput(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn has_artifact(&self, file: &str) -> bool {
        self.artifact(file).is_file()
    }

    /// Atomically write a top-level artifact
    pub fn write_artifact(&self, file: &str, contents: &str) -> Result<PathBuf> {
        let path = self.artifact(file);
        write_atomic(&path, contents.as_bytes())?;
        Ok(path)
    }
}

/// Run names are single, non-special path components
pub fn validate_run_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.chars().any(|c| c == '/' || c == '\\' || c == '\0');
    if invalid {
        return Err(TemplateError::InvalidRunName(name.to_string()));
    }
    Ok(())
}

fn is_applet_file(file: &str) -> bool {
    file.strip_prefix("applet_")
        .and_then(|rest| rest.strip_suffix(TEMPLATE_EXTENSION))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|token| {
            token
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
        })
}

/// Read a text file, replacing invalid UTF-8 sequences with U+FFFD
pub(crate) fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("{} is not valid UTF-8, decoding lossily", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    })
}

/// Write `bytes` to a sibling temp file, then rename it over `path`
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = parent.join(format!(".{}.{}.tmp", file_name, std::process::id()));

    let result = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    result.map_err(|e| {
        let _ = fs::remove_file(&tmp);
        TemplateError::io(path, e)
    })
}

/// Run directories named by local time under an output root
#[derive(Debug, Clone)]
pub struct TimestampedRuns {
    root: PathBuf,
}

impl TimestampedRuns {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn create_named(&self, stamp: &str) -> Result<RunDirectory> {
        fs::create_dir_all(&self.root).map_err(|e| TemplateError::io(&self.root, e))?;

        for attempt in 0..=MAX_SUFFIX {
            let name = if attempt == 0 {
                stamp.to_string()
            } else {
                format!("{}_{}", stamp, attempt)
            };
            let path = self.root.join(&name);
            match fs::create_dir(&path) {
                Ok(()) => {
                    log::info!("Created run directory {}", path.display());
                    return Ok(RunDirectory { name, path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(TemplateError::io(path, e)),
            }
        }

        Err(TemplateError::io(
            self.root.join(stamp),
            std::io::Error::new(ErrorKind::AlreadyExists, "no free run directory name"),
        ))
    }
}

impl RunDirectoryProvider for TimestampedRuns {
    fn create_run(&self) -> Result<RunDirectory> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.create_named(&stamp)
    }

    fn open_run(&self, name: &str) -> Result<RunDirectory> {
        RunDirectory::open(&self.root, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_run_uses_timestamp() {
        let dir = tempdir().unwrap();
        let runs = TimestampedRuns::new(dir.path());

        let run = runs.create_run().unwrap();

        assert!(run.path().is_dir());
        assert_eq!(run.name().len(), 15);
        assert_eq!(&run.name()[8..9], "_");
        assert!(run.name().chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_colliding_names_get_suffix() {
        let dir = tempdir().unwrap();
        let runs = TimestampedRuns::new(dir.path());

        let first = runs.create_named("20240101_120000").unwrap();
        let second = runs.create_named("20240101_120000").unwrap();
        let third = runs.create_named("20240101_120000").unwrap();

        assert_eq!(first.name(), "20240101_120000");
        assert_eq!(second.name(), "20240101_120000_1");
        assert_eq!(third.name(), "20240101_120000_2");
    }

    #[test]
    fn test_open_run() {
        let dir = tempdir().unwrap();
        let runs = TimestampedRuns::new(dir.path());
        let created = runs.create_named("20240101_120000").unwrap();

        assert_eq!(runs.open_run("20240101_120000").unwrap(), created);
        assert!(matches!(runs.open_run("20240101_999999"), Err(TemplateError::RunNotFound(_))));
        assert!(matches!(runs.open_run("../etc"), Err(TemplateError::InvalidRunName(_))));
        assert!(matches!(runs.open_run(".."), Err(TemplateError::InvalidRunName(_))));
    }

    #[test]
    fn test_artifact_allow_list() {
        let dir = tempdir().unwrap();
        let run = TimestampedRuns::new(dir.path()).create_named("r").unwrap();

        assert_eq!(run.artifact_path("generated.html").unwrap(), run.path().join("generated.html"));
        assert_eq!(
            run.artifact_path("view_template.swt").unwrap(),
            run.webtemplate_dir().join("view_template.swt")
        );
        assert_eq!(
            run.artifact_path("applet_top_nav.swt").unwrap(),
            run.webtemplate_dir().join("applet_top_nav.swt")
        );
        for name in ["secrets.txt", "applet_../x.swt", "applet_a.html", "source_image.txt", "../generated.html"] {
            assert!(
                matches!(run.artifact_path(name), Err(TemplateError::ArtifactNotAllowed(_))),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_write_and_read_artifacts() {
        let dir = tempdir().unwrap();
        let run = TimestampedRuns::new(dir.path()).create_named("r").unwrap();

        run.write_artifact(RunDirectory::STYLE_CSS, "body{}").unwrap();
        run.write_artifact(RunDirectory::STYLE_CSS, "p{}").unwrap();

        assert_eq!(run.read_artifact(RunDirectory::STYLE_CSS).unwrap(), "p{}");
        assert!(matches!(
            run.read_artifact(RunDirectory::GENERATED_HTML),
            Err(TemplateError::MissingInput(_))
        ));
        assert_eq!(run.read_optional(RunDirectory::GENERATED_HTML).unwrap(), None);
        // No temp files left behind
        let entries: Vec<_> = fs::read_dir(run.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_artifact_tolerates_invalid_utf8() {
        let dir = tempdir().unwrap();
        let run = TimestampedRuns::new(dir.path()).create_named("r").unwrap();
        fs::write(run.artifact(RunDirectory::GENERATED_HTML), b"<p>caf\xE9</p>").unwrap();

        let html = run.read_artifact(RunDirectory::GENERATED_HTML).unwrap();

        assert_eq!(html, "<p>caf\u{FFFD}</p>");
    }
}
