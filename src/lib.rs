//! traitgen generates a collection of unique trait-combination tokens and renders
//! each one by stacking per-trait PNG artwork.
//!
//! # Pipeline overview
//!
//! 1. **Load**: JSON `CatalogConfig -> Catalog` (validated once, immutable for the run)
//! 2. **Generate**: `Catalog -> GeneratedSet` by weighted rejection sampling until
//!    `size` distinct tokens are collected
//! 3. **Analyze** (optional): `GeneratedSet -> RarityReport`
//! 4. **Render** (optional): each token's layers are stacked in z-order and written
//!    as an opaque PNG
//!
//! Analysis and rendering only read the frozen set and can run in either order.
#![forbid(unsafe_code)]

mod analyze;
mod catalog;
mod foundation;
mod generate;
mod render;

pub use analyze::rarity::{CharacterCount, RarityReport, TraitRarity, VariantRarity, analyze};
pub use catalog::config::{
    CatalogConfig, CharacterConfig, CharacterStrategy, TraitConfig, VariantConfig,
};
pub use catalog::model::{Catalog, Character, CharacterDimension, Trait, Variant};
pub use foundation::error::{TraitgenError, TraitgenResult};
pub use generate::sampler::{TokenSampler, sample_token};
pub use generate::token::{GeneratedSet, Token};
pub use generate::unique::{GenerateOpts, GenerateStats, generate_unique_set, seeded_rng};
pub use render::assets::{AssetLayout, FsLayerSource, LayerSource, decode_image};
pub use render::composite::{flatten_rgba8, over, over_straight};
pub use render::compositor::{RenderSettings, flatten, layer_paths, render_token, stack_layers};
pub use render::pipeline::{RenderOpts, RenderStats, render_set};
pub use render::zorder::{LayerSlot, z_order};
