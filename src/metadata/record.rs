use crate::foundation::core::ItemId;
use crate::foundation::error::MintResult;
use crate::generate::combination::TraitCombination;

/// One `{trait_type, value}` pair.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    /// Capitalized category label.
    pub trait_type: String,
    /// Selected option name.
    pub value: String,
}

/// Standard metadata record deposited for each item.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Metadata {
    /// Collection title plus id.
    pub name: String,
    /// Collection-level description.
    pub description: String,
    /// Image reference.
    pub image: String,
    /// Collection-level external URL.
    pub external_url: String,
    /// Non-empty traits in layer order.
    pub attributes: Vec<Attribute>,
}

impl Metadata {
    /// Serialize to the pretty JSON bytes written into archives.
    pub fn to_json_bytes(&self) -> MintResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Private record kept for a later reveal of a shadow item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RevealRecord {
    /// Item id.
    pub id: ItemId,
    /// Real trait selection, sentinel entries included.
    pub traits: TraitCombination,
    /// Metadata the item will carry once revealed.
    #[serde(rename = "fullMetadata")]
    pub full_metadata: Metadata,
    /// Archive path of the placeholder render shown publicly.
    #[serde(rename = "shadowImageUsed")]
    pub shadow_image_used: String,
    /// Free-form reveal guidance from the collection config.
    #[serde(rename = "revealInstructions")]
    pub reveal_instructions: String,
}

impl RevealRecord {
    /// Serialize to the pretty JSON bytes written into archives.
    pub fn to_json_bytes(&self) -> MintResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Public and private artifacts of one shadow item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShadowRecords {
    /// Public record pointing at the placeholder image.
    pub public: Metadata,
    /// Private reveal record; never deposited next to `public`.
    pub reveal: RevealRecord,
}

fn default_scheme() -> String {
    "ipfs://".to_string()
}

fn default_shadow_name() -> String {
    "Unrevealed".to_string()
}

fn default_shadow_description() -> String {
    "This item has not been revealed yet.".to_string()
}

fn default_reveal_instructions() -> String {
    "Replace metadata/<id>.json with fullMetadata and upload the real render.".to_string()
}

/// Collection-level constants used by the metadata builder.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CollectionInfo {
    /// Title prefix; item names are `"<name> #<id>"`.
    pub name: String,
    /// Description shared by every item.
    pub description: String,
    /// Base URI for images, e.g. `ipfs://<cid>`.
    pub image_base_uri: String,
    /// External URL shared by every item.
    #[serde(default)]
    pub external_url: String,
    /// Scheme every public image reference must use.
    #[serde(default = "default_scheme")]
    pub required_image_scheme: String,
    /// Title prefix for shadow items.
    #[serde(default = "default_shadow_name")]
    pub shadow_name: String,
    /// Description for shadow items.
    #[serde(default = "default_shadow_description")]
    pub shadow_description: String,
    /// Text stored in every reveal record.
    #[serde(default = "default_reveal_instructions")]
    pub reveal_instructions: String,
    /// Fixed image reference of empty placeholder records.
    #[serde(default)]
    pub placeholder_image: String,
}

impl CollectionInfo {
    /// Minimal info with defaults for every optional field.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        image_base_uri: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image_base_uri: image_base_uri.into(),
            external_url: String::new(),
            required_image_scheme: default_scheme(),
            shadow_name: default_shadow_name(),
            shadow_description: default_shadow_description(),
            reveal_instructions: default_reveal_instructions(),
            placeholder_image: String::new(),
        }
    }
}
