use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{TraitgenError, TraitgenResult};

/// Directory convention for layer artwork and rendered tokens.
///
/// With characters:
/// - base: `<root>/<character>/<character>.png`
/// - overlay: `<root>/<character>/<trait_type>/<variant>.png`
/// - output: `<root>/<character>/output/<index>.png`
///
/// Without characters the per-character directory is dropped.
#[derive(Clone, Debug)]
pub struct AssetLayout {
    root: PathBuf,
}

impl AssetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn group_dir(&self, character: Option<&str>) -> PathBuf {
        match character {
            Some(name) => self.root.join(name),
            None => self.root.clone(),
        }
    }

    pub fn character_image(&self, character: &str) -> PathBuf {
        self.root
            .join(character)
            .join(format!("{character}.png"))
    }

    pub fn variant_image(
        &self,
        character: Option<&str>,
        trait_type: &str,
        variant: &str,
    ) -> PathBuf {
        self.group_dir(character)
            .join(trait_type)
            .join(format!("{variant}.png"))
    }

    pub fn output_dir(&self, character: Option<&str>) -> PathBuf {
        self.group_dir(character).join("output")
    }

    pub fn output_image(&self, character: Option<&str>, index: usize) -> PathBuf {
        self.output_dir(character).join(format!("{index}.png"))
    }
}

/// Loads decoded straight-alpha RGBA8 layer images by path.
pub trait LayerSource {
    fn load(&mut self, path: &Path) -> TraitgenResult<Arc<RgbaImage>>;
}

/// Filesystem-backed [`LayerSource`] that decodes each file once.
#[derive(Debug, Default)]
pub struct FsLayerSource {
    cache: HashMap<PathBuf, Arc<RgbaImage>>,
}

impl FsLayerSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayerSource for FsLayerSource {
    fn load(&mut self, path: &Path) -> TraitgenResult<Arc<RgbaImage>> {
        if let Some(img) = self.cache.get(path) {
            return Ok(img.clone());
        }
        if !path.is_file() {
            return Err(TraitgenError::asset_missing(path));
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("read layer bytes from '{}'", path.display()))?;
        let img = Arc::new(decode_image(&bytes).with_context(|| {
            format!("decode layer '{}'", path.display())
        })?);
        self.cache.insert(path.to_path_buf(), img.clone());
        Ok(img)
    }
}

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/render/assets.rs"]
mod tests;
