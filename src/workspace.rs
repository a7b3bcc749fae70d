use crate::assemble::{OutputAssembler, RunDirectory, RunDirectoryProvider, TimestampedRuns};
use crate::config::Config;
use crate::error::Result;
use std::fmt;

/// Configuration plus the services that act on it
pub struct Workspace {
    config: Config,
    runs: Box<dyn RunDirectoryProvider>,
    assembler: OutputAssembler,
}

impl Workspace {
    /// Timestamped runs under `config.output_root`
    pub fn new(config: Config) -> Self {
        let runs = TimestampedRuns::new(config.output_root.clone());
        Self::with_provider(config, runs)
    }

    /// Use a custom run provider
    pub fn with_provider(config: Config, runs: impl RunDirectoryProvider + 'static) -> Self {
        Self {
            config,
            runs: Box::new(runs),
            assembler: OutputAssembler::default(),
        }
    }

    /// Builder method: replace the assembler
    pub fn with_assembler(mut self, assembler: OutputAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runs(&self) -> &dyn RunDirectoryProvider {
        self.runs.as_ref()
    }

    pub fn assembler(&self) -> &OutputAssembler {
        &self.assembler
    }

    /// Open an existing run by name
    pub fn open_run(&self, name: &str) -> Result<RunDirectory> {
        self.runs.open_run(name)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(Config::from_env())
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("config", &self.config)
            .field("assembler", &self.assembler)
            .finish_non_exhaustive()
    }
}
