use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use dirscribe::structure::{PathError, TreePath};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Edit directory-structure documents")]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The root directory of the project
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Structure document to edit, overriding the one from dirscribe.yaml
    #[clap(long, short)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a document with the configured top-level folders
    Init {
        /// Overwrite an existing document
        #[clap(long)]
        force: bool,
    },
    /// Print the tree, or the subtree at PATH
    Show { path: Option<TreePath> },
    /// Print a file description or a folder listing
    Get { path: TreePath },
    /// Add a folder or file below PARENT ("." for the top level)
    Add {
        parent: ParentPath,
        name: String,
        /// Add a folder instead of a file
        #[clap(long)]
        folder: bool,
        #[clap(long, short, default_value = "")]
        description: String,
    },
    /// Set the description of the file at PATH, creating folders as needed
    Set { path: TreePath, description: String },
    /// Rename the entry at PATH
    Rename { path: TreePath, new_name: String },
    /// Delete the entry at PATH with everything below it
    Delete { path: TreePath },
    /// Count folders and files
    Stats { path: Option<TreePath> },
}

/// Parent folder argument where `.` stands for the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentPath(pub Option<TreePath>);

impl FromStr for ParentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "." => Ok(ParentPath(None)),
            path => path.parse().map(|path| ParentPath(Some(path))),
        }
    }
}
