//! Directory based command discovery.
//!
//! Rust has no runtime class loading, so discovery resolves each file under a commands
//! directory to a logical identifier and looks that identifier up in a `CommandCatalog`
//! of constructors compiled into the binary. Identifiers come from a namespace pattern
//! with at most one `*`, which is replaced by the file's sub-path:
//!
//! `commands/admin/ban.rs` with pattern `app::commands::*` resolves to
//! `app::commands::admin::ban`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::{
    command::{ApplicationCommand, ChatCommand},
    error::{definition::DefinitionError, Result},
    model::CommandKind,
};

/// A constructed command value.
#[derive(Clone)]
pub enum CatalogItem {
    Chat(Arc<dyn ChatCommand>),
    Application(Arc<dyn ApplicationCommand>),
}

impl CatalogItem {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Chat(_) => CommandKind::ChatCommand,
            Self::Application(command) => command.definition().kind,
        }
    }
}

type Constructor = Box<dyn Fn() -> CatalogItem + Send + Sync>;

enum CatalogEntry {
    /// Shared base types that are listed so discovery can recognize and skip them.
    Abstract,
    Concrete(Constructor),
}

/// Constructors keyed by logical identifier.
#[derive(Default)]
pub struct CommandCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chat<F>(mut self, id: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Arc<dyn ChatCommand> + Send + Sync + 'static,
    {
        self.entries.insert(
            id.into(),
            CatalogEntry::Concrete(Box::new(move || CatalogItem::Chat(constructor()))),
        );
        self
    }

    pub fn application<F>(mut self, id: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Arc<dyn ApplicationCommand> + Send + Sync + 'static,
    {
        self.entries.insert(
            id.into(),
            CatalogEntry::Concrete(Box::new(move || CatalogItem::Application(constructor()))),
        );
        self
    }

    /// Lists an identifier that must never be instantiated.
    pub fn abstract_entry(mut self, id: impl Into<String>) -> Self {
        self.entries.insert(id.into(), CatalogEntry::Abstract);
        self
    }

    /// Constructs the entry for `id`.
    ///
    /// # Returns
    /// - `Ok(CatalogItem)` - A fresh instance
    /// - `Err(DefinitionError::UnknownCatalogEntry)` - No entry, or the entry is abstract
    pub fn instantiate(&self, id: &str) -> Result<CatalogItem, DefinitionError> {
        match self.entries.get(id) {
            Some(CatalogEntry::Concrete(constructor)) => Ok(constructor()),
            _ => Err(DefinitionError::UnknownCatalogEntry(id.to_string())),
        }
    }

    /// Scans `directory` and instantiates every concrete entry of the requested kind.
    ///
    /// Files are visited in sorted path order. Identifiers with no catalog entry,
    /// abstract entries and entries of another kind are skipped.
    ///
    /// # Arguments
    /// - `kind` - Capability the discovered values must have
    /// - `directory` - Root of the commands tree
    /// - `pattern` - Namespace pattern with at most one `*`
    ///
    /// # Returns
    /// - `Ok(Vec<(String, CatalogItem)>)` - Identifiers and instances, empty when the
    ///   directory does not exist
    /// - `Err(BotError::IoErr)` - The directory exists but could not be read
    pub fn discover(
        &self,
        kind: CommandKind,
        directory: &Path,
        pattern: &str,
    ) -> Result<Vec<(String, CatalogItem)>> {
        if !directory.is_dir() {
            debug!("Command directory {} does not exist", directory.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        collect_files(directory, &mut files)?;
        files.sort();

        let mut discovered = Vec::new();
        for file in files {
            let Some(id) = resolve_identifier(directory, &file, pattern) else {
                continue;
            };

            match self.entries.get(&id) {
                Some(CatalogEntry::Concrete(constructor)) => {
                    let item = constructor();
                    if item.kind() == kind {
                        discovered.push((id, item));
                    } else {
                        debug!("Skipping {}: not a {:?}", id, kind);
                    }
                }
                Some(CatalogEntry::Abstract) => debug!("Skipping abstract {}", id),
                None => debug!("Skipping {}: no catalog entry", id),
            }
        }

        Ok(discovered)
    }
}

fn collect_files(directory: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Resolves a file under `root` to a logical identifier.
///
/// The file's path relative to `root`, without extension, is joined with `::`. It
/// replaces the single `*` of `pattern`, or is appended to the pattern when it has none.
///
/// # Returns
/// - `Some(String)` - The identifier
/// - `None` - `file` is not under `root` or has no usable name
pub fn resolve_identifier(root: &Path, file: &Path, pattern: &str) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let segments: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_str().map(str::to_string))
        .collect::<Option<_>>()?;
    if segments.is_empty() || segments.iter().any(String::is_empty) {
        return None;
    }
    let sub_path = segments.join("::");

    Some(match pattern.split_once('*') {
        Some((head, tail)) => format!("{head}{sub_path}{tail}"),
        None if pattern.is_empty() => sub_path,
        None => format!("{}::{sub_path}", pattern.trim_end_matches("::")),
    })
}
