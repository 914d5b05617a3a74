use std::path::PathBuf;

use dirscribe::config::ProjectConfig;

use crate::cli::{Cli, Command};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command: Command,
    pub root: PathBuf,
    pub file: Option<PathBuf>,
}

impl RuntimeConfig {
    /// Structure document to work on: `--file` wins over the project config.
    pub fn structure_path(&self, project: &ProjectConfig) -> PathBuf {
        match &self.file {
            Some(file) => file.clone(),
            None => project.structure_path(&self.root),
        }
    }
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command,
            root: cli.root,
            file: cli.file,
        }
    }
}
