//! Subcommand implementations

use crate::cli::{InspectArgs, MigrateArgs, ReplayArgs};
use crate::offline::OfflineBackend;
use anyhow::{bail, Context, Result};
use app_core::event_loop;
use app_core::{infer_attributes, AppConfig, CatalogStore, Command, InferredAttributeGroup, Outcome, Session, TransientStore};
use app_db::CatalogFile;
use futures::StreamExt;
use ipc_proto::{BackendAction, ProtoError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Printed after `replay`
#[derive(Debug, Default, Serialize)]
pub struct ReplaySummary {
    pub registered: usize,
    pub batches: usize,
    pub actions: usize,
    pub stream_faults: usize,
    pub commands_applied: usize,
    pub commands_disabled: usize,
    pub commands_failed: usize,
    pub images: usize,
    pub current_list: usize,
    pub output: PathBuf,
}

/// Printed after `inspect`
#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    pub version: u32,
    pub images: usize,
    pub paths: usize,
    pub filters_invariant: String,
    pub current_list: usize,
    /// Invariant -> item count
    pub lists: BTreeMap<String, usize>,
    pub primary: Option<String>,
    pub additional: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<InferredAttributeGroup>>,
}

/// Decode a recorded event stream. Undecodable lines become stream faults.
pub fn read_actions(path: &Path) -> Result<Vec<std::result::Result<BackendAction, ProtoError>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read action log {:?}", path))?;
    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(BackendAction::decode)
        .collect())
}

/// Parse a command script. Unlike actions, a bad command line is fatal.
pub fn read_commands(path: &Path) -> Result<Vec<Command>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read command script {:?}", path))?;

    let mut commands = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let command = Command::from_json(line)
            .with_context(|| format!("{:?} line {}: invalid command", path, index + 1))?;
        commands.push(command);
    }
    Ok(commands)
}

fn load_store(path: &Path, config: &AppConfig) -> Result<CatalogStore> {
    if !path.exists() {
        tracing::warn!("Catalog {:?} does not exist, starting empty", path);
        return Ok(CatalogStore::new(config.initial_state()));
    }
    let catalog = CatalogFile::load(path).with_context(|| format!("Failed to load catalog {:?}", path))?;
    Ok(CatalogStore::new(catalog.state))
}

pub async fn run_replay(args: &ReplayArgs, config: &AppConfig) -> Result<ReplaySummary> {
    let store = load_store(&args.catalog, config)?;
    let output = args.output.clone().unwrap_or_else(|| args.catalog.clone());
    let output_str = output.to_string_lossy().into_owned();

    let backend = Arc::new(OfflineBackend::new(&args.catalog));
    let mut session = Session::new(backend, store, TransientStore::new(config.transient_state()));
    session.mirror_mut().set_catalog_path(output_str.clone());

    let events = futures::stream::iter(read_actions(&args.actions)?).boxed();
    let commands = match &args.commands {
        Some(path) => read_commands(path)?,
        None => Vec::new(),
    };

    // Commands are replayed after the stream so the result is reproducible
    let (_, mut no_commands) = mpsc::channel(1);
    let stats = event_loop::run(&mut session, events, &mut no_commands, config.batch_window()).await;

    let mut summary = ReplaySummary {
        registered: stats.registered(),
        batches: stats.batches.len(),
        actions: stats.actions,
        stream_faults: stats.stream_faults,
        ..ReplaySummary::default()
    };

    for command in commands {
        let name = command.name();
        match session.apply(command).await {
            Ok(Outcome::Disabled) => {
                summary.commands_disabled += 1;
                tracing::warn!("Command {} is not available here, skipped", name);
            }
            Ok(_) => summary.commands_applied += 1,
            Err(e) => {
                summary.commands_failed += 1;
                tracing::warn!("Command {} failed: {}", name, e);
            }
        }
    }

    session
        .apply(Command::SaveAs { path: output_str })
        .await
        .with_context(|| format!("Failed to save {:?}", output))?;

    summary.images = session.store().state().images.len();
    summary.current_list = session.store().current_list().len();
    summary.output = output;
    Ok(summary)
}

pub fn run_inspect(args: &InspectArgs, config: &AppConfig) -> Result<CatalogSummary> {
    let store = load_store(&args.catalog, config)?;
    let state = store.state();

    let attributes = match &args.image {
        Some(uid) => match store.image(uid) {
            Some(image) => Some(infer_attributes(image)),
            None => bail!("No image {} in {:?}", uid, args.catalog),
        },
        None => None,
    };

    Ok(CatalogSummary {
        version: state.version,
        images: state.images.len(),
        paths: state.paths.len(),
        filters_invariant: state.filters_invariant.clone(),
        current_list: store.current_list().len(),
        lists: state
            .lists
            .iter()
            .map(|(invariant, list)| (invariant.clone(), list.len()))
            .collect(),
        primary: state.selection.primary.clone(),
        additional: state.selection.additional.len(),
        attributes,
    })
}

pub fn run_migrate(args: &MigrateArgs) -> Result<u32> {
    let catalog = CatalogFile::load(&args.catalog)
        .with_context(|| format!("Failed to load catalog {:?}", args.catalog))?;
    let version = catalog.state.version;

    CatalogFile::new(args.output.to_string_lossy(), catalog.state)
        .save(&args.output)
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_db::{Label, State};
    use ipc_proto::ImageFile;
    use tempfile::TempDir;

    fn registered(uid: &str) -> String {
        BackendAction::FileRegistered {
            image: ImageFile::new(uid, format!("/photos/{}.jpg", uid)),
        }
        .encode()
        .unwrap()
    }

    fn write_lines(path: &Path, lines: &[String]) {
        std::fs::write(path, lines.join("\n")).unwrap();
    }

    #[tokio::test]
    async fn test_replay_end_to_end() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("catalog.json");
        let actions = dir.path().join("actions.jsonl");
        let commands = dir.path().join("commands.jsonl");

        write_lines(
            &actions,
            &[
                registered("a"),
                registered("b"),
                "{not json".to_string(),
                String::new(),
                r#"{"action":"LONG_OPERATION_START","loid":"export-1"}"#.to_string(),
                registered("c"),
            ],
        );
        write_lines(
            &commands,
            &[
                r#"{"command":"select_primary","uid":"b"}"#.to_string(),
                r#"{"command":"label_selection","label":3}"#.to_string(),
                r#"{"command":"add_list_column","index":0,"name":"city"}"#.to_string(),
                r#"{"command":"select_range","uid":"zzz"}"#.to_string(),
            ],
        );

        let args = ReplayArgs {
            catalog: catalog.clone(),
            actions,
            commands: Some(commands),
            output: None,
        };
        let summary = run_replay(&args, &AppConfig::default()).await.unwrap();

        assert_eq!(summary.registered, 3);
        assert_eq!(summary.actions, 1);
        assert_eq!(summary.stream_faults, 1);
        assert_eq!(summary.commands_applied, 2);
        // Column commands need the list tab
        assert_eq!(summary.commands_disabled, 1);
        assert_eq!(summary.commands_failed, 1);
        assert_eq!(summary.current_list, 3);

        let saved = CatalogFile::load(&catalog).unwrap();
        assert_eq!(saved.path, catalog.to_string_lossy());
        assert_eq!(saved.state.metadata["b"].label, Label::Blue);
        assert_eq!(saved.state.selection.primary.as_deref(), Some("b"));

        // Replaying more events on top of the saved catalog keeps its edits
        let more = dir.path().join("more.jsonl");
        write_lines(&more, &[registered("d")]);
        let args = ReplayArgs {
            catalog: catalog.clone(),
            actions: more,
            commands: None,
            output: Some(dir.path().join("out.json")),
        };
        let summary = run_replay(&args, &AppConfig::default()).await.unwrap();
        assert_eq!(summary.images, 4);

        let out = CatalogFile::load(&dir.path().join("out.json")).unwrap();
        assert_eq!(out.state.metadata["b"].label, Label::Blue);
    }

    #[tokio::test]
    async fn test_fresh_catalog_takes_view_settings() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("new.json");
        let actions = dir.path().join("actions.jsonl");
        write_lines(&actions, &[registered("a")]);

        let mut config = AppConfig::default();
        config.view.thumbnail_size = 280;
        let args = ReplayArgs {
            catalog: catalog.clone(),
            actions,
            commands: None,
            output: None,
        };
        run_replay(&args, &config).await.unwrap();

        let saved = CatalogFile::load(&catalog).unwrap();
        assert_eq!(saved.state.thumbnail_settings.size, 280);

        // An existing catalog keeps its own size
        config.view.thumbnail_size = 100;
        run_replay(&args, &config).await.unwrap();
        assert_eq!(CatalogFile::load(&catalog).unwrap().state.thumbnail_settings.size, 280);
    }

    #[test]
    fn test_bad_command_line_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("commands.jsonl");
        write_lines(
            &path,
            &[
                r#"{"command":"select_all"}"#.to_string(),
                r#"{"command":"explode"}"#.to_string(),
            ],
        );

        let err = read_commands(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_inspect_and_migrate() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("catalog.json");

        let mut store = CatalogStore::new(State::default());
        store.register_image(ImageFile::new("a", "/photos/a.jpg"));
        CatalogFile::new(catalog.to_string_lossy(), store.into_state())
            .save(&catalog)
            .unwrap();

        let summary = run_inspect(
            &InspectArgs {
                catalog: catalog.clone(),
                image: Some("a".into()),
            },
            &AppConfig::default(),
        )
        .unwrap();
        assert_eq!(summary.images, 1);
        assert_eq!(summary.current_list, 1);
        assert_eq!(summary.lists[""], 1);
        assert!(summary.attributes.is_some());

        assert!(run_inspect(
            &InspectArgs {
                catalog: catalog.clone(),
                image: Some("missing".into()),
            },
            &AppConfig::default(),
        )
        .is_err());

        let output = dir.path().join("migrated.json");
        let version = run_migrate(&MigrateArgs {
            catalog,
            output: output.clone(),
        })
        .unwrap();
        assert_eq!(version, State::default().version);
        assert_eq!(CatalogFile::load(&output).unwrap().path, output.to_string_lossy());
    }
}
