use crate::foundation::core::{ItemId, OutputFormat};

/// Folder of direct-layout images.
pub const IMAGES_DIR: &str = "images";
/// Folder of direct-layout metadata (entries carry no extension).
pub const JSON_DIR: &str = "json";
/// Folder of shadow placeholder renders.
pub const SHADOWS_DIR: &str = "shadows";
/// Folder of public shadow metadata, and of empty placeholder records.
pub const METADATA_DIR: &str = "metadata";
/// Folder of private reveal records.
pub const REVEAL_DIR: &str = "reveal_data";

/// Archive folder structure produced by a packaging run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveLayout {
    /// `images/<id>.<ext>` + `json/<id>`.
    Direct,
    /// `shadows/<id>.png` + `metadata/<id>.json` + `reveal_data/<id>.json`.
    Shadow,
    /// `metadata/<id>` blank records.
    Placeholder,
}

impl ArchiveLayout {
    /// Folders populated by this layout.
    pub fn folders(self) -> &'static [&'static str] {
        match self {
            Self::Direct => &[IMAGES_DIR, JSON_DIR],
            Self::Shadow => &[SHADOWS_DIR, METADATA_DIR, REVEAL_DIR],
            Self::Placeholder => &[METADATA_DIR],
        }
    }

    /// Every `folder/file` path an item with `id` contributes, in deposit order.
    pub fn entry_paths(self, id: ItemId, format: OutputFormat) -> Vec<String> {
        match self {
            Self::Direct => vec![
                direct_image(id, format).path(),
                direct_json(id).path(),
            ],
            Self::Shadow => vec![
                shadow_image(id).path(),
                shadow_metadata(id).path(),
                reveal_record(id).path(),
            ],
            Self::Placeholder => vec![placeholder(id).path()],
        }
    }
}

/// A file inside one archive folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryName {
    /// Folder name.
    pub folder: &'static str,
    /// File name inside the folder.
    pub file: String,
}

impl EntryName {
    fn new(folder: &'static str, file: String) -> Self {
        Self { folder, file }
    }

    /// `folder/file`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.folder, self.file)
    }
}

/// `images/<id>.<ext>`.
pub fn direct_image(id: ItemId, format: OutputFormat) -> EntryName {
    EntryName::new(IMAGES_DIR, format!("{id}.{}", format.extension()))
}

/// `json/<id>`.
pub fn direct_json(id: ItemId) -> EntryName {
    EntryName::new(JSON_DIR, id.to_string())
}

/// `shadows/<id>.png`.
pub fn shadow_image(id: ItemId) -> EntryName {
    EntryName::new(SHADOWS_DIR, format!("{id}.png"))
}

/// Archive path of the shadow render of `id`.
pub fn shadow_image_path(id: ItemId) -> String {
    shadow_image(id).path()
}

/// `metadata/<id>.json`.
pub fn shadow_metadata(id: ItemId) -> EntryName {
    EntryName::new(METADATA_DIR, format!("{id}.json"))
}

/// `reveal_data/<id>.json`.
pub fn reveal_record(id: ItemId) -> EntryName {
    EntryName::new(REVEAL_DIR, format!("{id}.json"))
}

/// `metadata/<id>`.
pub fn placeholder(id: ItemId) -> EntryName {
    EntryName::new(METADATA_DIR, id.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/package/layout.rs"]
mod tests;
