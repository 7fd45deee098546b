use std::sync::Arc;

use image::{RgbImage, RgbaImage};

use crate::{
    catalog::model::Catalog,
    foundation::error::{TraitgenError, TraitgenResult},
    generate::token::Token,
    render::{
        assets::{AssetLayout, LayerSource},
        composite::{flatten_rgba8, over_straight_in_place},
        zorder::{LayerSlot, z_order},
    },
};

/// Output options shared by every rendered token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSettings {
    /// Opaque color placed under the stack when flattening. `None` drops alpha.
    pub background_rgb: Option<[u8; 3]>,
}

/// Resolve the layer image paths of `token`, bottom to top. Absent values are skipped.
pub fn layer_paths(
    catalog: &Catalog,
    token: &Token,
    layout: &AssetLayout,
) -> TraitgenResult<Vec<std::path::PathBuf>> {
    let character = match token.character.as_deref() {
        Some(name) => Some(catalog.character(name).ok_or_else(|| {
            TraitgenError::render(format!("token references unknown character '{name}'"))
        })?),
        None => None,
    };
    let pool = catalog.pool(character);
    if pool.len() != token.traits.len() {
        return Err(TraitgenError::render(format!(
            "token has {} trait values but its pool declares {} traits",
            token.traits.len(),
            pool.len()
        )));
    }

    let group = character.map(|c| c.name.as_str());
    let mut paths = Vec::with_capacity(pool.len() + 1);
    for slot in z_order(character, pool) {
        match slot {
            LayerSlot::Character => {
                if let Some(c) = character {
                    paths.push(layout.character_image(&c.name));
                }
            }
            LayerSlot::Trait(idx) => {
                let Some(variant) = token.traits[idx].as_deref() else {
                    continue;
                };
                paths.push(layout.variant_image(group, &pool[idx].trait_type, variant));
            }
        }
    }
    Ok(paths)
}

/// Stack layers bottom to top. The first layer is the base and is used verbatim;
/// later layers are alpha-composited over it. All layers must share dimensions.
pub fn stack_layers(layers: &[Arc<RgbaImage>]) -> TraitgenResult<RgbaImage> {
    let (base, rest) = layers
        .split_first()
        .ok_or_else(|| TraitgenError::render("token resolves to no layers"))?;

    let mut acc = RgbaImage::clone(base);
    for layer in rest {
        if layer.dimensions() != acc.dimensions() {
            return Err(TraitgenError::render(format!(
                "layer size {:?} does not match base size {:?}",
                layer.dimensions(),
                acc.dimensions()
            )));
        }
        over_straight_in_place(&mut acc, layer.as_raw())?;
    }
    Ok(acc)
}

/// Flatten a straight-alpha image into an opaque RGB image.
pub fn flatten(img: &RgbaImage, settings: &RenderSettings) -> TraitgenResult<RgbImage> {
    let (width, height) = img.dimensions();
    let rgb = flatten_rgba8(img.as_raw(), settings.background_rgb);
    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| TraitgenError::render("flattened buffer has unexpected length"))
}

/// Composite one token into an opaque image.
pub fn render_token<S: LayerSource + ?Sized>(
    catalog: &Catalog,
    token: &Token,
    layout: &AssetLayout,
    source: &mut S,
    settings: &RenderSettings,
) -> TraitgenResult<RgbImage> {
    let layers = layer_paths(catalog, token, layout)?
        .iter()
        .map(|path| source.load(path))
        .collect::<TraitgenResult<Vec<_>>>()?;
    let stacked = stack_layers(&layers)?;
    flatten(&stacked, settings)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
