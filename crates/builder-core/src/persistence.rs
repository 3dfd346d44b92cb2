//! Persistence Gateway
//!
//! The boundary through which a page is saved and loaded. A page is serialized as an ordered list
//! of root [`ComponentTree`]s; ids are stable across save cycles.

use crate::error::PersistenceError;
use crate::node::ComponentTree;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Saves and loads serialized forests.
pub trait PersistenceGateway {
    /// Persist the forest.
    fn save(&mut self, forest: &[ComponentTree]) -> Result<(), PersistenceError>;

    /// Fetch the last persisted forest.
    fn load(&mut self) -> Result<Vec<ComponentTree>, PersistenceError>;
}

/// Stores the page as pretty-printed JSON in a single file.
///
/// Loading a file that does not exist yet yields an empty page.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    /// Gateway backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceGateway for JsonFileGateway {
    fn save(&mut self, forest: &[ComponentTree]) -> Result<(), PersistenceError> {
        let mut json = serde_json::to_string_pretty(forest)?;
        json.push('\n');

        // Write next to the target and rename so a crash never leaves a truncated page.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        if let Err(err) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(err.into());
        }
        tracing::debug!(path = %self.path.display(), roots = forest.len(), "page written");
        Ok(())
    }

    fn load(&mut self) -> Result<Vec<ComponentTree>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_forest(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Parse a saved forest without a nesting limit; the stack grows on demand for deep pages.
fn parse_forest(text: &str) -> Result<Vec<ComponentTree>, PersistenceError> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let forest = Vec::<ComponentTree>::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(forest)
}

/// In-memory gateway, mainly for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    stored: Vec<ComponentTree>,
    save_count: usize,
    fail_saves: bool,
}

impl MemoryGateway {
    /// Gateway pre-loaded with `forest`.
    pub fn with_forest(forest: Vec<ComponentTree>) -> Self {
        Self {
            stored: forest,
            ..Self::default()
        }
    }

    /// The last saved forest.
    pub fn stored(&self) -> &[ComponentTree] {
        &self.stored
    }

    /// How many saves succeeded.
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Make subsequent saves fail with [`PersistenceError::Rejected`].
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }
}

impl PersistenceGateway for MemoryGateway {
    fn save(&mut self, forest: &[ComponentTree]) -> Result<(), PersistenceError> {
        if self.fail_saves {
            return Err(PersistenceError::Rejected("memory gateway is failing".to_string()));
        }
        self.stored = forest.to_vec();
        self.save_count += 1;
        Ok(())
    }

    fn load(&mut self) -> Result<Vec<ComponentTree>, PersistenceError> {
        Ok(self.stored.clone())
    }
}
