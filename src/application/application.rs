use std::path::PathBuf;

use dirscribe::config::{ConfigError, ProjectConfig};
use dirscribe::session::{EditSession, EntryKind, PendingEdit, SessionError};
use dirscribe::store::{JsonFileStore, StoreError, StructureStore};
use dirscribe::structure::{DirectoryTree, Node, TreeError, TreeRenderer};
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Command;

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let color = supports_color::on(supports_color::Stream::Stdout).is_some();

        let output = Self::execute(&app_config, color).await?;
        print!("{output}");

        Ok(())
    }

    /// Runs the command and returns what should be printed.
    pub async fn execute(
        app_config: &RuntimeConfig,
        color: bool,
    ) -> Result<String, ApplicationError> {
        let project = ProjectConfig::read(&app_config.root)
            .await
            .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", project);

        let store = JsonFileStore::new(app_config.structure_path(&project));
        let renderer = TreeRenderer::new(color);

        match &app_config.command {
            Command::Init { force } => Self::init(&store, &project, *force).await,
            Command::Show { path } => {
                let tree = Self::load(&store).await?;
                match path {
                    Some(path) => {
                        let node = tree.get(path).context(StructureSnafu)?;
                        Ok(renderer.render_node(path.name(), node))
                    }
                    None if tree.is_empty() => Ok("(empty)\n".to_string()),
                    None => Ok(renderer.render_tree(&tree)),
                }
            }
            Command::Get { path } => {
                let tree = Self::load(&store).await?;
                let node = tree.get(path).context(StructureSnafu)?;
                Ok(describe(node))
            }
            Command::Stats { path } => {
                let tree = Self::load(&store).await?;
                let stats = match path {
                    Some(path) => tree.get(path).context(StructureSnafu)?.stats(),
                    None => tree.stats(),
                };
                Ok(format!("{stats}\n"))
            }
            Command::Add {
                parent,
                name,
                folder,
                description,
            } => {
                let kind = if *folder {
                    EntryKind::Folder
                } else {
                    EntryKind::File
                };
                Self::edit(&store, &project, |session| {
                    session.stage(PendingEdit::Add {
                        parent: parent.0.clone(),
                        kind,
                    })?;
                    let path = session.confirm_add(name, description)?;
                    Ok(format!("Added {kind} {path}\n"))
                })
                .await
            }
            Command::Set { path, description } => {
                Self::edit(&store, &project, |session| {
                    session.apply(|tree| tree.set(path, Node::file(description.as_str())))?;
                    Ok(format!("Set {path}\n"))
                })
                .await
            }
            Command::Rename { path, new_name } => {
                Self::edit(&store, &project, |session| {
                    session.stage(PendingEdit::Rename { path: path.clone() })?;
                    let new_path = session.confirm_rename(new_name)?;
                    Ok(format!("Renamed {path} to {new_path}\n"))
                })
                .await
            }
            Command::Delete { path } => {
                Self::edit(&store, &project, |session| {
                    session.stage(PendingEdit::Delete { path: path.clone() })?;
                    let removed = session.working().get(path).map(Node::stats);
                    session.confirm_delete()?;
                    Ok(match removed {
                        Ok(stats) => format!("Deleted {path} ({stats})\n"),
                        Err(_) => format!("Deleted {path}\n"),
                    })
                })
                .await
            }
        }
    }

    async fn init(
        store: &JsonFileStore,
        project: &ProjectConfig,
        force: bool,
    ) -> Result<String, ApplicationError> {
        ensure!(
            force || !store.exists(),
            AlreadyInitializedSnafu {
                path: store.path(),
            }
        );

        let tree = DirectoryTree::scaffold(project.roots.iter().cloned())
            .context(StructureSnafu)?;
        store.save(&tree).await.context(SaveSnafu)?;
        info!("Initialized {}", store.path().display());

        Ok(format!(
            "Initialized {} with {}\n",
            store.path().display(),
            tree.stats()
        ))
    }

    async fn load(store: &JsonFileStore) -> Result<DirectoryTree, ApplicationError> {
        store.load().await.context(LoadSnafu)
    }

    /// Loads the document, applies `edit` inside an edit session and commits.
    async fn edit<F>(
        store: &JsonFileStore,
        project: &ProjectConfig,
        edit: F,
    ) -> Result<String, ApplicationError>
    where
        F: FnOnce(&mut EditSession) -> Result<String, SessionError>,
    {
        let tree = Self::load(store).await?;
        let mut session =
            EditSession::new(tree).with_folder_name_normalization(project.normalize_folder_names);

        session.begin_edit().context(EditSnafu)?;
        let message = edit(&mut session).context(EditSnafu)?;
        session.commit(store).await.context(EditSnafu)?;

        Ok(message)
    }
}

/// File description, or the listing of a folder.
fn describe(node: &Node) -> String {
    match node {
        Node::File(description) => format!("{description}\n"),
        Node::Folder(_) => node
            .entries()
            .into_iter()
            .map(|(name, child)| match child {
                Node::Folder(_) => format!("{name}/\n"),
                Node::File(_) => format!("{name}\n"),
            })
            .collect(),
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Could not load the directory structure"))]
    LoadError { source: StoreError },
    #[snafu(display("Could not save the directory structure"))]
    SaveError { source: StoreError },
    #[snafu(display("Directory structure operation failed"))]
    StructureError { source: TreeError },
    #[snafu(display("Editing the directory structure failed"))]
    EditError { source: SessionError },
    #[snafu(display(
        "A directory structure already exists at {}, use --force to overwrite it",
        path.display()
    ))]
    AlreadyInitialized { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ParentPath;
    use dirscribe::structure::TreePath;
    use tempfile::TempDir;

    fn path(s: &str) -> TreePath {
        s.parse().expect("valid test path")
    }

    fn runtime(root: &TempDir, command: Command) -> RuntimeConfig {
        RuntimeConfig {
            command,
            root: root.path().to_path_buf(),
            file: None,
        }
    }

    async fn exec(root: &TempDir, command: Command) -> Result<String, ApplicationError> {
        Application::execute(&runtime(root, command), false).await
    }

    #[compio::test]
    async fn init_scaffolds_default_roots() {
        let root = TempDir::new().expect("Failed to create temp directory");

        let output = exec(&root, Command::Init { force: false }).await.unwrap();
        assert!(output.contains("3 folders, 0 files"));

        let shown = exec(&root, Command::Show { path: None }).await.unwrap();
        assert_eq!(shown, "├── frontend/\n├── backend/\n└── shared/\n");
    }

    #[compio::test]
    async fn init_refuses_to_overwrite_without_force() {
        let root = TempDir::new().expect("Failed to create temp directory");
        exec(&root, Command::Init { force: false }).await.unwrap();

        let again = exec(&root, Command::Init { force: false }).await;
        assert!(matches!(
            again,
            Err(ApplicationError::AlreadyInitialized { .. })
        ));
        assert!(exec(&root, Command::Init { force: true }).await.is_ok());
    }

    #[compio::test]
    async fn init_uses_roots_from_project_config() {
        let root = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(
            root.path().join("dirscribe.yaml"),
            "structure: docs/tree.json\nroots: [client, server]\n",
        )
        .unwrap();

        exec(&root, Command::Init { force: false }).await.unwrap();

        assert!(root.path().join("docs/tree.json").is_file());
        let listing = exec(&root, Command::Stats { path: None }).await.unwrap();
        assert_eq!(listing, "2 folders, 0 files\n");
    }

    #[compio::test]
    async fn edit_commands_are_persisted() {
        let root = TempDir::new().expect("Failed to create temp directory");
        exec(&root, Command::Init { force: false }).await.unwrap();

        exec(
            &root,
            Command::Set {
                path: path(r"backend.controllers.authController\.js"),
                description: "Handles auth".into(),
            },
        )
        .await
        .unwrap();
        exec(
            &root,
            Command::Add {
                parent: ParentPath(Some(path("frontend"))),
                name: "UI Components".into(),
                folder: true,
                description: String::new(),
            },
        )
        .await
        .unwrap();
        exec(
            &root,
            Command::Rename {
                path: path("frontend.ui-components"),
                new_name: "ui".into(),
            },
        )
        .await
        .unwrap();

        let description = exec(
            &root,
            Command::Get {
                path: path(r"backend.controllers.authController\.js"),
            },
        )
        .await
        .unwrap();
        assert_eq!(description, "Handles auth\n");

        let frontend = exec(
            &root,
            Command::Get {
                path: path("frontend"),
            },
        )
        .await
        .unwrap();
        assert_eq!(frontend, "ui/\n");
    }

    #[compio::test]
    async fn delete_reports_removed_entries() {
        let root = TempDir::new().expect("Failed to create temp directory");
        exec(&root, Command::Init { force: false }).await.unwrap();
        for file in [r"frontend.index\.js", r"frontend.app.App\.tsx", r"frontend.app.Nav\.tsx"] {
            exec(
                &root,
                Command::Set {
                    path: path(file),
                    description: "x".into(),
                },
            )
            .await
            .unwrap();
        }

        let output = exec(
            &root,
            Command::Delete {
                path: path("frontend"),
            },
        )
        .await
        .unwrap();
        assert_eq!(output, "Deleted frontend (2 folders, 3 files)\n");

        let stats = exec(&root, Command::Stats { path: None }).await.unwrap();
        assert_eq!(stats, "2 folders, 0 files\n");
    }

    #[compio::test]
    async fn failed_edit_leaves_document_untouched() {
        let root = TempDir::new().expect("Failed to create temp directory");
        exec(&root, Command::Init { force: false }).await.unwrap();

        let result = exec(
            &root,
            Command::Rename {
                path: path("frontend"),
                new_name: "backend".into(),
            },
        )
        .await;
        assert!(matches!(
            result,
            Err(ApplicationError::EditError {
                source: SessionError::Tree {
                    source: TreeError::NameCollision { .. }
                }
            })
        ));

        let shown = exec(&root, Command::Show { path: None }).await.unwrap();
        assert_eq!(shown, "├── frontend/\n├── backend/\n└── shared/\n");
    }

    #[compio::test]
    async fn commands_fail_before_init() {
        let root = TempDir::new().expect("Failed to create temp directory");
        let result = exec(&root, Command::Show { path: None }).await;
        assert!(matches!(
            result,
            Err(ApplicationError::LoadError {
                source: StoreError::NotFound { .. }
            })
        ));
    }
}
