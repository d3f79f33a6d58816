use crate::catalog::model::TraitCatalog;
use crate::foundation::core::ItemId;
use crate::generate::combination::GeneratedItem;
use crate::metadata::record::{Attribute, CollectionInfo, Metadata, RevealRecord, ShadowRecords};
use crate::package::layout::shadow_image_path;

/// Maps generated items to metadata records. Pure: same item, same record.
#[derive(Clone, Debug)]
pub struct MetadataBuilder<'a> {
    catalog: &'a TraitCatalog,
    info: CollectionInfo,
    image_ext: &'static str,
}

impl<'a> MetadataBuilder<'a> {
    /// Create a builder whose image references end in `.png`.
    pub fn new(catalog: &'a TraitCatalog, info: CollectionInfo) -> Self {
        Self {
            catalog,
            info,
            image_ext: "png",
        }
    }

    /// Use `ext` for image references (must match the archive's image entries).
    pub fn with_image_extension(mut self, ext: &'static str) -> Self {
        self.image_ext = ext;
        self
    }

    /// Collection constants.
    pub fn info(&self) -> &CollectionInfo {
        &self.info
    }

    /// Public image reference of item `id`.
    pub fn image_uri(&self, id: ItemId) -> String {
        format!(
            "{}/{id}.{}",
            self.info.image_base_uri.trim_end_matches('/'),
            self.image_ext
        )
    }

    /// Direct-layout metadata for `item`.
    pub fn build(&self, item: &GeneratedItem) -> Metadata {
        Metadata {
            name: format!("{} #{}", self.info.name, item.id),
            description: self.info.description.clone(),
            image: self.image_uri(item.id),
            external_url: self.info.external_url.clone(),
            attributes: self.attributes(item),
        }
    }

    /// Public placeholder record plus the private reveal record for `item`.
    pub fn shadow(&self, item: &GeneratedItem) -> ShadowRecords {
        let public = Metadata {
            name: format!("{} #{}", self.info.shadow_name, item.id),
            description: self.info.shadow_description.clone(),
            image: format!("{}.png", item.id),
            external_url: self.info.external_url.clone(),
            attributes: Vec::new(),
        };
        let reveal = RevealRecord {
            id: item.id,
            traits: item.traits.clone(),
            full_metadata: self.build(item),
            shadow_image_used: shadow_image_path(item.id),
            reveal_instructions: self.info.reveal_instructions.clone(),
        };
        ShadowRecords { public, reveal }
    }

    /// Blank record reserving a metadata slot before traits are assigned.
    pub fn empty(&self) -> Metadata {
        Metadata {
            image: self.info.placeholder_image.clone(),
            ..Metadata::default()
        }
    }

    fn attributes(&self, item: &GeneratedItem) -> Vec<Attribute> {
        item.traits
            .layered(self.catalog)
            .map(|(category, option)| Attribute {
                trait_type: capitalize(category),
                value: option.to_string(),
            })
            .collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/metadata/builder.rs"]
mod tests;
