//! Project files edited in the studio: file list, open tabs and the active
//! file, persisted through a [`KvStore`].

use crate::assistant::FileWrite;
use crate::compiler::DEFAULT_FILENAME;
use serde::{Deserialize, Serialize};
use shared::{keys, KvStore, StorageError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    files: Vec<ProjectFile>,
    open: Vec<String>,
    active: Option<String>,
}

impl Default for ProjectFiles {
    /// A single empty `contract.sol`, open and active.
    fn default() -> Self {
        Self {
            files: vec![ProjectFile {
                path: DEFAULT_FILENAME.to_string(),
                content: String::new(),
            }],
            open: vec![DEFAULT_FILENAME.to_string()],
            active: Some(DEFAULT_FILENAME.to_string()),
        }
    }
}

impl ProjectFiles {
    /// Restore from the store; missing or undecodable keys fall back to the
    /// defaults individually.
    pub fn load(store: &KvStore) -> Self {
        let defaults = Self::default();
        let files = store.get_json::<Vec<ProjectFile>>(keys::FILES).unwrap_or(defaults.files);
        let open = store.get_json::<Vec<String>>(keys::OPEN_FILES).unwrap_or(defaults.open);
        // No stored active file falls back to the first open tab, if any.
        let active = match store.get(keys::ACTIVE_FILE) {
            Some(path) if files.iter().any(|f| f.path == path) => Some(path.to_string()),
            _ => open.first().cloned(),
        };

        debug!(files = files.len(), open = open.len(), "Loaded project files");
        Self { files, open, active }
    }

    pub fn save(&self, store: &mut KvStore) -> Result<(), StorageError> {
        store.set_json(keys::FILES, &self.files)?;
        store.set_json(keys::OPEN_FILES, &self.open)?;
        match &self.active {
            Some(active) => store.set(keys::ACTIVE_FILE, active.as_str())?,
            None => store.remove(keys::ACTIVE_FILE)?,
        }
        Ok(())
    }

    pub fn files(&self) -> &[ProjectFile] {
        &self.files
    }

    pub fn open_tabs(&self) -> &[String] {
        &self.open
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get(&self, path: &str) -> Option<&ProjectFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Content of the active file; empty when nothing is active.
    pub fn active_content(&self) -> &str {
        self.active
            .as_deref()
            .and_then(|path| self.get(path))
            .map_or("", |f| f.content.as_str())
    }

    /// Create a file, open it and make it active. Returns `false` (and changes
    /// nothing) when the path already exists.
    pub fn create_file(&mut self, path: &str, content: impl Into<String>) -> bool {
        if self.contains(path) {
            return false;
        }
        self.files.push(ProjectFile {
            path: path.to_string(),
            content: content.into(),
        });
        self.open_tab(path);
        true
    }

    pub fn update_file(&mut self, path: &str, content: impl Into<String>) -> bool {
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(file) => {
                file.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Edit the active file in place.
    pub fn set_active_content(&mut self, content: impl Into<String>) -> bool {
        match self.active.clone() {
            Some(path) => self.update_file(&path, content),
            None => false,
        }
    }

    /// Rename a file; open tabs and the active file follow. Refuses to
    /// overwrite an existing path.
    pub fn rename_file(&mut self, old_path: &str, new_path: &str) -> bool {
        if old_path == new_path || self.contains(new_path) {
            return false;
        }
        let Some(file) = self.files.iter_mut().find(|f| f.path == old_path) else {
            return false;
        };
        file.path = new_path.to_string();

        for tab in self.open.iter_mut().filter(|tab| tab.as_str() == old_path) {
            *tab = new_path.to_string();
        }
        if self.active.as_deref() == Some(old_path) {
            self.active = Some(new_path.to_string());
        }
        true
    }

    /// Delete a file. When it was active, the first other open tab becomes
    /// active, else the first remaining file.
    pub fn delete_file(&mut self, path: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.path != path);
        if self.files.len() == before {
            return false;
        }
        self.open.retain(|tab| tab != path);

        if self.active.as_deref() == Some(path) {
            self.active = self
                .open
                .first()
                .cloned()
                .or_else(|| self.files.first().map(|f| f.path.clone()));
        }
        true
    }

    /// Open an existing file in a tab and make it active.
    pub fn open_file(&mut self, path: &str) -> bool {
        if !self.contains(path) {
            return false;
        }
        self.open_tab(path);
        true
    }

    /// Close a tab. Closing the active tab activates the first remaining tab.
    pub fn close_tab(&mut self, path: &str) {
        self.open.retain(|tab| tab != path);
        if self.active.as_deref() == Some(path) {
            self.active = self.open.first().cloned();
        }
    }

    /// Apply an assistant write. A create whose path exists leaves the file
    /// untouched but still opens it.
    pub fn apply(&mut self, write: &FileWrite) {
        match write {
            FileWrite::CreateAndOpen { path, content } => {
                if !self.create_file(path, content.as_str()) {
                    self.open_tab(path);
                }
            }
            FileWrite::UpdateActive { path, content } => {
                self.update_file(path, content.as_str());
            }
        }
    }

    fn open_tab(&mut self, path: &str) {
        if !self.open.iter().any(|tab| tab == path) {
            self.open.push(path.to_string());
        }
        self.active = Some(path.to_string());
    }
}
