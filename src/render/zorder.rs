use crate::catalog::model::{Character, Trait};

/// One position in the compositing stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerSlot {
    /// The character's base image.
    Character,
    /// Index into the trait pool (and into the token's trait values).
    Trait(usize),
}

/// Bottom-to-top draw order for a character and its trait pool.
///
/// Layers are sorted by ascending z-index. Ties keep declaration order, and the
/// character sits below any trait sharing its z-index.
pub fn z_order(character: Option<&Character>, pool: &[Trait]) -> Vec<LayerSlot> {
    let mut entries = Vec::with_capacity(pool.len() + 1);
    if let Some(c) = character {
        entries.push((c.z_index, LayerSlot::Character));
    }
    entries.extend(
        pool.iter()
            .enumerate()
            .map(|(idx, t)| (t.z_index, LayerSlot::Trait(idx))),
    );
    // Stable sort, so equal z-indices keep insertion order.
    entries.sort_by_key(|(z, _)| *z);
    entries.into_iter().map(|(_, slot)| slot).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/zorder.rs"]
mod tests;
