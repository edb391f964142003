//! Local sidecar index of uploaded documents and the `file_list` tool.
//!
//! The index is a JSON file (`metadata.json`) mapping file ids to the vector
//! store they were attached to, their extracted attributes and upload status.
//! The report loop exposes it to the model as the `file_list` function tool.

use crate::error::IndexError;
use crate::responses::ToolDeclaration;
use anyhow::Context;
use outlook_attrs::AttributeRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const FILE_LIST_TOOL: &str = "file_list";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidecarEntry {
    pub vector_store_id: String,
    pub file_id: String,
    #[serde(default)]
    pub attributes: AttributeRecord,
    #[serde(default)]
    pub source_path: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Unix seconds, as reported by the upload.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl SidecarEntry {
    pub fn needs_extraction(&self) -> bool {
        self.attributes.is_blank()
    }

    /// Extracted title, else the source file name.
    pub fn display_title(&self) -> String {
        if let Some(title) = self.attributes.title() {
            return title.to_string();
        }
        Path::new(&self.source_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidecarIndex {
    #[serde(default)]
    pub files: BTreeMap<String, SidecarEntry>,
    #[serde(default)]
    pub by_vector_store: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub attribute_keys: Vec<String>,
}

impl SidecarIndex {
    /// Read the index at `path`; a missing file is an empty index.
    pub fn try_load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse sidecar index {}", path.display()))
    }

    /// Like [`SidecarIndex::try_load`], but an unreadable index is logged and
    /// treated as empty.
    pub fn load(path: &Path) -> Self {
        Self::try_load(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %format!("{e:#}"), "unusable sidecar index; starting empty");
            Self::default()
        })
    }

    /// Write pretty JSON, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<(), IndexError> {
        let io_err = |source| IndexError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    /// Insert or replace an entry, keeping the per-store id lists and the
    /// sorted attribute-key union current.
    pub fn upsert(&mut self, entry: SidecarEntry) {
        let ids = self
            .by_vector_store
            .entry(entry.vector_store_id.clone())
            .or_default();
        if !ids.contains(&entry.file_id) {
            ids.push(entry.file_id.clone());
        }

        for key in entry.attributes.keys() {
            if let Err(pos) = self.attribute_keys.binary_search_by(|k| k.as_str().cmp(key)) {
                self.attribute_keys.insert(pos, key.to_string());
            }
        }
        self.files.insert(entry.file_id.clone(), entry);
    }

    pub fn get(&self, file_id: &str) -> Option<&SidecarEntry> {
        self.files.get(file_id)
    }

    /// Look up by exact id, then id prefix, then case-insensitive title substring.
    pub fn find(&self, key: &str) -> Option<&SidecarEntry> {
        if let Some(entry) = self.files.get(key) {
            return Some(entry);
        }
        if let Some(entry) = self.files.iter().find(|(id, _)| id.starts_with(key)).map(|(_, e)| e) {
            return Some(entry);
        }
        let needle = key.to_lowercase();
        self.files
            .values()
            .find(|e| e.display_title().to_lowercase().contains(&needle))
    }

    pub fn entries_needing_extraction(&self) -> impl Iterator<Item = &SidecarEntry> {
        self.files.values().filter(|e| e.needs_extraction())
    }

    pub fn listing(&self, vector_store_id: &str) -> FileInventoryListing {
        let files = self
            .files
            .iter()
            .filter(|(_, e)| e.vector_store_id == vector_store_id)
            .map(|(id, e)| InventoryFile {
                id: id.clone(),
                title: e.display_title(),
                attributes: e.attributes.clone(),
                status: e.status.clone(),
            })
            .collect();
        FileInventoryListing {
            vector_store_id: vector_store_id.to_string(),
            available_attributes: self.attribute_keys.clone(),
            files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryFile {
    pub id: String,
    pub title: String,
    pub attributes: AttributeRecord,
    pub status: Option<String>,
}

/// Result of the `file_list` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInventoryListing {
    pub vector_store_id: String,
    pub available_attributes: Vec<String>,
    pub files: Vec<InventoryFile>,
}

/// Lists the documents known for a vector store.
pub trait FileInventory {
    fn list_files(&self, vector_store_id: &str) -> anyhow::Result<FileInventoryListing>;
}

impl FileInventory for SidecarIndex {
    fn list_files(&self, vector_store_id: &str) -> anyhow::Result<FileInventoryListing> {
        Ok(self.listing(vector_store_id))
    }
}

impl<T: FileInventory + ?Sized> FileInventory for &T {
    fn list_files(&self, vector_store_id: &str) -> anyhow::Result<FileInventoryListing> {
        (**self).list_files(vector_store_id)
    }
}

/// Inventory backed by the index file, re-read on every call so uploads made
/// during a report are visible.
#[derive(Debug, Clone)]
pub struct SidecarFileInventory {
    path: PathBuf,
}

impl SidecarFileInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileInventory for SidecarFileInventory {
    fn list_files(&self, vector_store_id: &str) -> anyhow::Result<FileInventoryListing> {
        Ok(SidecarIndex::try_load(&self.path)?.listing(vector_store_id))
    }
}

pub fn file_list_tool() -> ToolDeclaration {
    ToolDeclaration::Function {
        name: FILE_LIST_TOOL.to_string(),
        description: "List files in a vector store with normalized attributes from the local metadata index."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "vector_store_id": {
                    "type": "string",
                    "description": "Vector store id to list. If empty, use default."
                }
            },
            "required": ["vector_store_id"],
            "additionalProperties": false
        }),
        strict: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(vs: &str, id: &str, title: &str, source: &str) -> SidecarEntry {
        let mut attributes = AttributeRecord::default();
        attributes.set("title", title);
        attributes.set("company", "");
        SidecarEntry {
            vector_store_id: vs.to_string(),
            file_id: id.to_string(),
            attributes,
            source_path: source.to_string(),
            status: Some("completed".to_string()),
            created_at: Some(1_720_000_000),
        }
    }

    #[test]
    fn upsert_tracks_store_lists_and_key_union() {
        let mut idx = SidecarIndex::default();
        idx.upsert(entry("vs_1", "file_b", "B", "b.pdf"));
        idx.upsert(entry("vs_1", "file_a", "A", "a.pdf"));
        idx.upsert(entry("vs_1", "file_a", "A2", "a.pdf"));

        assert_eq!(idx.by_vector_store["vs_1"], vec!["file_b", "file_a"]);
        assert_eq!(idx.attribute_keys, vec!["company", "title"]);
        assert_eq!(idx.get("file_a").unwrap().attributes.title(), Some("A2"));
    }

    #[test]
    fn find_prefers_id_then_prefix_then_title() {
        let mut idx = SidecarIndex::default();
        idx.upsert(entry("vs_1", "file_abc", "Hilton Q2 Call", "h.pdf"));
        idx.upsert(entry("vs_1", "file_xyz", "Marriott Outlook", "m.pdf"));

        assert_eq!(idx.find("file_xyz").unwrap().file_id, "file_xyz");
        assert_eq!(idx.find("file_a").unwrap().file_id, "file_abc");
        assert_eq!(idx.find("marriott").unwrap().file_id, "file_xyz");
        assert!(idx.find("hyatt").is_none());
    }

    #[test]
    fn listing_filters_by_store_and_falls_back_to_file_name() {
        let mut idx = SidecarIndex::default();
        idx.upsert(entry("vs_1", "file_1", "", "docs/STR_Weekly.pdf"));
        idx.upsert(entry("vs_2", "file_2", "Other", "o.pdf"));

        let listing = idx.list_files("vs_1").unwrap();
        assert_eq!(listing.vector_store_id, "vs_1");
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].title, "STR_Weekly.pdf");
        assert_eq!(listing.available_attributes, vec!["company", "title"]);
    }

    #[test]
    fn blank_attributes_need_extraction() {
        let mut e = entry("vs_1", "file_1", "", "x.pdf");
        e.attributes = AttributeRecord::default();
        assert!(e.needs_extraction());
    }

    #[test]
    fn load_and_save_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("metadata.json");
        assert_eq!(SidecarIndex::load(&path), SidecarIndex::default());

        let mut idx = SidecarIndex::default();
        idx.upsert(entry("vs_1", "file_1", "Hilton", "h.pdf"));
        idx.save(&path).unwrap();
        assert_eq!(SidecarIndex::load(&path), idx);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"files\": {"));
    }

    #[test]
    fn corrupt_index_loads_empty_but_inventory_reports_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(SidecarIndex::load(&path), SidecarIndex::default());
        let err = SidecarFileInventory::new(&path).list_files("vs_1").unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse sidecar index"));
    }

    #[test]
    fn file_inventory_sees_writes_between_calls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        let inventory = SidecarFileInventory::new(&path);
        assert!(inventory.list_files("vs_1").unwrap().files.is_empty());

        let mut idx = SidecarIndex::default();
        idx.upsert(entry("vs_1", "file_1", "Hilton", "h.pdf"));
        idx.save(&path).unwrap();
        assert_eq!(inventory.list_files("vs_1").unwrap().files.len(), 1);
    }

    #[test]
    fn file_list_tool_is_a_strict_function() {
        let v = serde_json::to_value(file_list_tool()).unwrap();
        assert_eq!(v["type"], "function");
        assert_eq!(v["name"], FILE_LIST_TOOL);
        assert_eq!(v["strict"], true);
        assert_eq!(v["parameters"]["required"], json!(["vector_store_id"]));
    }
}
