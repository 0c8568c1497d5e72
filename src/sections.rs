/// Section visibility preferences
///
/// Each dashboard view is a stack of sections (KPI row, charts, table) the
/// user can show, minimize or hide. Choices persist under one storage key as
/// a JSON object mapping section id to mode.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

pub const DEFAULT_STORAGE_KEY: &str = "dashboard:sections";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionMode {
    #[default]
    Show,
    Min,
    Hide,
}

impl SectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionMode::Show => "show",
            SectionMode::Min => "min",
            SectionMode::Hide => "hide",
        }
    }
}

impl fmt::Display for SectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "show" => Ok(SectionMode::Show),
            "min" => Ok(SectionMode::Min),
            "hide" => Ok(SectionMode::Hide),
            _ => Err(format!("Invalid section mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub default_mode: SectionMode,
}

impl SectionSpec {
    /// Section titled after its id, shown by default.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        SectionSpec {
            title: id.clone(),
            id,
            default_mode: SectionMode::Show,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_default(mut self, mode: SectionMode) -> Self {
        self.default_mode = mode;
        self
    }
}

/// Key-value persistence for preference documents.
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one JSON object of key to stored string.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value.to_string());
        let text = serde_json::to_string_pretty(&all)?;
        std::fs::write(&self.path, text).map_err(|e| Error::io(&self.path, e))
    }
}

/// A section with its effective mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleSection<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub mode: SectionMode,
}

#[derive(Debug, Clone)]
pub struct SectionLayout {
    storage_key: String,
    sections: Vec<SectionSpec>,
    modes: HashMap<String, SectionMode>,
}

impl SectionLayout {
    pub fn new(storage_key: impl Into<String>, sections: Vec<SectionSpec>) -> Self {
        let modes = sections
            .iter()
            .map(|s| (s.id.clone(), s.default_mode))
            .collect();
        SectionLayout {
            storage_key: storage_key.into(),
            sections,
            modes,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn sections(&self) -> &[SectionSpec] {
        &self.sections
    }

    /// Restores stored modes.
    ///
    /// Ids that match no section and values that are not a known mode are
    /// ignored; those sections keep their default. A failing store or an
    /// unreadable document leaves every section at its default.
    pub fn load<S: PreferenceStore + ?Sized>(&mut self, store: &S) {
        let raw = match store.load(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                log::warn!("could not read section preferences '{}': {}", self.storage_key, e);
                return;
            }
        };

        let stored: Map<String, JsonValue> = match serde_json::from_str::<JsonValue>(&raw) {
            Ok(JsonValue::Object(map)) => map,
            Ok(_) => {
                log::warn!("section preferences '{}' are not an object", self.storage_key);
                return;
            }
            Err(e) => {
                log::warn!("section preferences '{}' are not valid JSON: {}", self.storage_key, e);
                return;
            }
        };

        for section in &self.sections {
            let mode = stored
                .get(&section.id)
                .and_then(JsonValue::as_str)
                .and_then(|s| s.parse().ok());
            if let Some(mode) = mode {
                self.modes.insert(section.id.clone(), mode);
            }
        }
    }

    /// Effective mode of a section; `None` for unknown ids.
    pub fn mode(&self, id: &str) -> Option<SectionMode> {
        self.modes.get(id).copied()
    }

    /// Changes a section's mode and persists the layout. Returns false for
    /// unknown ids and for no-op changes.
    pub fn set_mode<S: PreferenceStore + ?Sized>(&mut self, id: &str, mode: SectionMode, store: &S) -> bool {
        match self.modes.get_mut(id) {
            Some(current) if *current != mode => *current = mode,
            _ => return false,
        }
        self.persist(store);
        true
    }

    /// Header button of a section: flips between shown and minimized.
    pub fn toggle_minimized<S: PreferenceStore + ?Sized>(&mut self, id: &str, store: &S) -> bool {
        let next = match self.mode(id) {
            Some(SectionMode::Min) => SectionMode::Show,
            Some(_) => SectionMode::Min,
            None => return false,
        };
        self.set_mode(id, next, store)
    }

    fn persist<S: PreferenceStore + ?Sized>(&self, store: &S) {
        let document: BTreeMap<&str, &str> = self
            .modes
            .iter()
            .map(|(id, mode)| (id.as_str(), mode.as_str()))
            .collect();
        let result = serde_json::to_string(&document)
            .map_err(Error::from)
            .and_then(|text| store.save(&self.storage_key, &text));
        if let Err(e) = result {
            log::warn!("could not save section preferences '{}': {}", self.storage_key, e);
        }
    }

    /// Sections not hidden, in declaration order.
    pub fn visible(&self) -> Vec<VisibleSection<'_>> {
        self.sections
            .iter()
            .filter_map(|s| {
                let mode = self.modes.get(&s.id).copied().unwrap_or(s.default_mode);
                (mode != SectionMode::Hide).then_some(VisibleSection {
                    id: &s.id,
                    title: &s.title,
                    mode,
                })
            })
            .collect()
    }
}
