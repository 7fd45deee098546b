use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{TraitgenError, TraitgenResult};

/// How the character dimension attaches to a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterStrategy {
    /// One global trait list; the character is drawn by weight, independently of traits.
    #[default]
    GlobalTraitsWithWeightedCharacter,
    /// Each character may carry its own trait pool, sampled after the character is drawn.
    CharacterScopedTraits,
}

/// Raw configuration document as read from JSON.
///
/// Required fields are optional here so that a missing one surfaces as a
/// [`TraitgenError::Config`] naming the field rather than a parse failure.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<CharacterStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<CharacterConfig>>,
    #[serde(default)]
    pub traits: Option<Vec<TraitConfig>>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CharacterConfig {
    pub name: String,
    pub weight: f64,
    #[serde(rename = "z-index", alias = "z_index")]
    pub z_index: i32,
    /// Per-character pool; only meaningful with [`CharacterStrategy::CharacterScopedTraits`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<TraitConfig>>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TraitConfig {
    #[serde(rename = "type")]
    pub trait_type: String,
    #[serde(rename = "z-index", alias = "z_index")]
    pub z_index: i32,
    pub variants: Vec<VariantConfig>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VariantConfig {
    /// `null` (or omitted) marks the "no overlay" outcome for this trait.
    #[serde(rename = "type", alias = "name", default)]
    pub id: Option<String>,
    pub weight: f64,
}

impl CatalogConfig {
    pub fn from_json_str(s: &str) -> TraitgenResult<Self> {
        serde_json::from_str(s).map_err(|e| TraitgenError::serde(format!("parse config: {e}")))
    }

    pub fn load(path: &Path) -> TraitgenResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}
