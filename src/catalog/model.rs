use std::collections::HashSet;

use crate::{
    catalog::config::{CatalogConfig, CharacterConfig, CharacterStrategy, TraitConfig},
    foundation::error::{TraitgenError, TraitgenResult},
};

/// One selectable option within a [`Trait`].
///
/// `id == None` is the absent outcome: the trait is drawn but nothing is overlaid.
#[derive(Clone, Debug, PartialEq)]
pub struct Variant {
    pub id: Option<String>,
    pub weight: f64,
}

/// A categorical dimension of variation, e.g. "hat" or "eyes".
#[derive(Clone, Debug, PartialEq)]
pub struct Trait {
    pub trait_type: String,
    pub z_index: i32,
    pub variants: Vec<Variant>,
}

/// Base artwork a token is built on.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    pub name: String,
    pub weight: f64,
    pub z_index: i32,
    /// Own trait pool under [`CharacterDimension::Scoped`]; `None` falls back to the global traits.
    pub traits: Option<Vec<Trait>>,
}

/// Presence and attachment policy of the character dimension.
#[derive(Clone, Debug, PartialEq)]
pub enum CharacterDimension {
    /// Tokens are trait tuples only.
    Absent,
    /// Character drawn by weight; every character shares the global traits.
    WeightedGlobal(Vec<Character>),
    /// Character drawn by weight; traits come from that character's pool.
    Scoped(Vec<Character>),
}

/// Validated, immutable description of the trait space for one run.
#[derive(Clone, Debug, PartialEq)]
pub struct Catalog {
    /// Number of unique tokens to generate.
    pub size: usize,
    /// Seed for the random stream, if the config pins one.
    pub seed: Option<u64>,
    /// Global trait list in declaration order.
    pub traits: Vec<Trait>,
    pub characters: CharacterDimension,
}

impl Variant {
    pub fn is_absent(&self) -> bool {
        self.id.is_none()
    }

    fn reachable(&self) -> bool {
        self.weight > 0.0
    }
}

impl Trait {
    /// Number of variants that can actually be drawn (positive weight).
    pub fn reachable_count(&self) -> u128 {
        self.variants.iter().filter(|v| v.reachable()).count() as u128
    }

    /// Whether a draw of this trait can come up absent.
    pub fn can_be_absent(&self) -> bool {
        self.variants.iter().any(|v| v.is_absent() && v.reachable())
    }

    pub fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.variants.iter().map(|v| v.weight)
    }
}

impl CharacterDimension {
    pub fn characters(&self) -> &[Character] {
        match self {
            Self::Absent => &[],
            Self::WeightedGlobal(chars) | Self::Scoped(chars) => chars,
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

impl Catalog {
    /// Convert a raw config document into a catalog and run [`Catalog::validate`].
    pub fn from_config(config: &CatalogConfig) -> TraitgenResult<Self> {
        let size = config
            .size
            .ok_or_else(|| TraitgenError::config("missing required field 'size'"))?;
        if size < 1 {
            return Err(TraitgenError::config(format!(
                "size must be >= 1 (got {size})"
            )));
        }
        let size = usize::try_from(size)
            .map_err(|_| TraitgenError::config(format!("size {size} is out of range")))?;

        let traits = config
            .traits
            .as_deref()
            .ok_or_else(|| TraitgenError::config("missing required field 'traits'"))?
            .iter()
            .map(trait_from_config)
            .collect::<Vec<_>>();

        let strategy = config.strategy.unwrap_or_default();
        let characters = match &config.characters {
            None => CharacterDimension::Absent,
            Some(chars) => {
                let chars = chars.iter().map(character_from_config).collect();
                match strategy {
                    CharacterStrategy::GlobalTraitsWithWeightedCharacter => {
                        CharacterDimension::WeightedGlobal(chars)
                    }
                    CharacterStrategy::CharacterScopedTraits => CharacterDimension::Scoped(chars),
                }
            }
        };

        let catalog = Self {
            size,
            seed: config.seed,
            traits,
            characters,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn characters(&self) -> &[Character] {
        self.characters.characters()
    }

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters().iter().find(|c| c.name == name)
    }

    /// Trait pool sampled for tokens carrying `character`.
    pub fn pool<'a>(&'a self, character: Option<&'a Character>) -> &'a [Trait] {
        match (&self.characters, character) {
            (CharacterDimension::Scoped(_), Some(c)) => c.traits.as_deref().unwrap_or(&self.traits),
            _ => &self.traits,
        }
    }

    /// Every distinct trait type across all pools, in first-declaration order.
    pub fn trait_types(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let pools = std::iter::once(self.traits.as_slice())
            .chain(self.characters().iter().filter_map(|c| c.traits.as_deref()));
        for pool in pools {
            for t in pool {
                if seen.insert(t.trait_type.as_str()) {
                    out.push(t.trait_type.as_str());
                }
            }
        }
        out
    }

    /// Number of distinct valid tokens this catalog can produce.
    ///
    /// Only positive-weight variants count. Without characters, the all-absent
    /// tuple is excluded because it is never accepted.
    pub fn capacity(&self) -> u128 {
        match &self.characters {
            CharacterDimension::Absent => {
                let product = pool_product(&self.traits);
                if !self.traits.is_empty() && self.traits.iter().all(Trait::can_be_absent) {
                    product.saturating_sub(1)
                } else {
                    product
                }
            }
            CharacterDimension::WeightedGlobal(chars) => {
                let reachable = chars.iter().filter(|c| c.weight > 0.0).count() as u128;
                reachable.saturating_mul(pool_product(&self.traits))
            }
            CharacterDimension::Scoped(chars) => chars
                .iter()
                .filter(|c| c.weight > 0.0)
                .map(|c| pool_product(self.pool(Some(c))))
                .fold(0u128, u128::saturating_add),
        }
    }

    /// Structural and feasibility checks. Must pass before any sampling starts.
    pub fn validate(&self) -> TraitgenResult<()> {
        if self.size < 1 {
            return Err(TraitgenError::config("size must be >= 1"));
        }
        if self.traits.is_empty() {
            return Err(TraitgenError::config("at least one trait must be defined"));
        }
        if self.traits[0].variants.is_empty() {
            return Err(TraitgenError::config(format!(
                "first trait '{}' must have at least one variant",
                self.traits[0].trait_type
            )));
        }
        validate_pool("global traits", &self.traits)?;

        match &self.characters {
            CharacterDimension::Absent => {}
            CharacterDimension::WeightedGlobal(chars) | CharacterDimension::Scoped(chars) => {
                validate_characters(chars)?;
                for c in chars {
                    match (&self.characters, &c.traits) {
                        (CharacterDimension::WeightedGlobal(_), Some(_)) => {
                            return Err(TraitgenError::config(format!(
                                "character '{}' declares its own traits, which requires strategy 'character-scoped-traits'",
                                c.name
                            )));
                        }
                        (CharacterDimension::Scoped(_), Some(pool)) => {
                            if pool.is_empty() {
                                return Err(TraitgenError::config(format!(
                                    "character '{}' declares an empty trait pool",
                                    c.name
                                )));
                            }
                            validate_pool(&format!("traits of character '{}'", c.name), pool)?;
                        }
                        _ => {}
                    }
                }
            }
        }

        let capacity = self.capacity();
        if self.size as u128 > capacity {
            return Err(TraitgenError::config(format!(
                "not enough variants to generate {} unique tokens (can generate up to {} with current config)",
                self.size, capacity
            )));
        }
        Ok(())
    }
}

fn pool_product(pool: &[Trait]) -> u128 {
    pool.iter()
        .map(Trait::reachable_count)
        .fold(1u128, u128::saturating_mul)
}

fn validate_weight(what: &str, weight: f64) -> TraitgenResult<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(TraitgenError::config(format!(
            "{what} has invalid weight {weight} (must be finite and >= 0)"
        )));
    }
    Ok(())
}

/// Names become directory and file names of layer artwork.
fn validate_path_segment(what: &str, name: &str) -> TraitgenResult<()> {
    if name.trim().is_empty() {
        return Err(TraitgenError::config(format!("{what} must be non-empty")));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(TraitgenError::config(format!(
            "{what} '{name}' must be a single path component"
        )));
    }
    Ok(())
}

fn validate_pool(label: &str, pool: &[Trait]) -> TraitgenResult<()> {
    let mut types = HashSet::new();
    for t in pool {
        validate_path_segment(&format!("{label}: trait type"), &t.trait_type)?;
        if !types.insert(t.trait_type.as_str()) {
            return Err(TraitgenError::config(format!(
                "{label}: duplicate trait type '{}'",
                t.trait_type
            )));
        }
        if t.variants.is_empty() {
            return Err(TraitgenError::config(format!(
                "{label}: trait '{}' must have at least one variant",
                t.trait_type
            )));
        }

        let mut ids = HashSet::new();
        for v in &t.variants {
            let shown = v.id.as_deref().unwrap_or("None");
            validate_weight(
                &format!("{label}: variant '{shown}' of trait '{}'", t.trait_type),
                v.weight,
            )?;
            if let Some(id) = &v.id {
                validate_path_segment(
                    &format!("{label}: variant of trait '{}'", t.trait_type),
                    id,
                )?;
            }
            if !ids.insert(v.id.as_deref()) {
                return Err(TraitgenError::config(format!(
                    "{label}: trait '{}' declares variant '{shown}' more than once",
                    t.trait_type
                )));
            }
        }
        let total = t.weights().sum::<f64>();
        if total <= 0.0 {
            return Err(TraitgenError::config(format!(
                "{label}: trait '{}' has all-zero weights",
                t.trait_type
            )));
        }
        if !total.is_finite() {
            return Err(TraitgenError::config(format!(
                "{label}: weights of trait '{}' overflow when summed",
                t.trait_type
            )));
        }
    }
    Ok(())
}

fn validate_characters(chars: &[Character]) -> TraitgenResult<()> {
    if chars.is_empty() {
        return Err(TraitgenError::config(
            "characters list must be non-empty when present",
        ));
    }
    let mut names = HashSet::new();
    for c in chars {
        validate_path_segment("character name", &c.name)?;
        if !names.insert(c.name.as_str()) {
            return Err(TraitgenError::config(format!(
                "duplicate character '{}'",
                c.name
            )));
        }
        validate_weight(&format!("character '{}'", c.name), c.weight)?;
    }
    let total = chars.iter().map(|c| c.weight).sum::<f64>();
    if total <= 0.0 {
        return Err(TraitgenError::config("characters have all-zero weights"));
    }
    if !total.is_finite() {
        return Err(TraitgenError::config(
            "character weights overflow when summed",
        ));
    }
    Ok(())
}

fn trait_from_config(t: &TraitConfig) -> Trait {
    Trait {
        trait_type: t.trait_type.clone(),
        z_index: t.z_index,
        variants: t
            .variants
            .iter()
            .map(|v| Variant {
                id: v.id.clone(),
                weight: v.weight,
            })
            .collect(),
    }
}

fn character_from_config(c: &CharacterConfig) -> Character {
    Character {
        name: c.name.clone(),
        weight: c.weight,
        z_index: c.z_index,
        traits: c
            .traits
            .as_ref()
            .map(|pool| pool.iter().map(trait_from_config).collect()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
