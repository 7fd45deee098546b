use rand::{
    Rng,
    distributions::{Distribution, WeightedError, WeightedIndex},
};

use crate::{
    catalog::model::{Catalog, CharacterDimension, Trait},
    foundation::error::{TraitgenError, TraitgenResult},
    generate::token::Token,
};

/// Draws single weighted trait combinations from a [`Catalog`].
///
/// Every dimension is an independent draw where variant `v` is picked with
/// probability `weight(v) / sum(weights)`. Distributions are built once up front.
pub struct TokenSampler<'a> {
    catalog: &'a Catalog,
    characters: Option<WeightedIndex<f64>>,
    global: Vec<WeightedIndex<f64>>,
    // Indexed like `catalog.characters()`; `None` means the character uses the global pool.
    scoped: Vec<Option<Vec<WeightedIndex<f64>>>>,
}

impl<'a> TokenSampler<'a> {
    pub fn new(catalog: &'a Catalog) -> TraitgenResult<Self> {
        let chars = catalog.characters();
        let characters = if catalog.characters.is_present() {
            let weights = chars.iter().map(|c| c.weight).collect::<Vec<_>>();
            Some(weighted_index(&weights).map_err(|e| {
                TraitgenError::config(format!("invalid character weights: {e}"))
            })?)
        } else {
            None
        };

        let global = pool_distributions(&catalog.traits)?;
        let mut scoped = Vec::with_capacity(chars.len());
        for c in chars {
            let own = match (&catalog.characters, &c.traits) {
                (CharacterDimension::Scoped(_), Some(pool)) => Some(pool_distributions(pool)?),
                _ => None,
            };
            scoped.push(own);
        }

        Ok(Self {
            catalog,
            characters,
            global,
            scoped,
        })
    }

    /// Draw one candidate token. Uniqueness is not checked here.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Token {
        let picked = self.characters.as_ref().map(|dist| dist.sample(rng));

        let (pool, dists) = match picked {
            Some(idx) => {
                let character = &self.catalog.characters()[idx];
                let dists = self.scoped[idx].as_deref().unwrap_or(self.global.as_slice());
                (self.catalog.pool(Some(character)), dists)
            }
            None => (self.catalog.traits.as_slice(), self.global.as_slice()),
        };

        let traits = pool
            .iter()
            .zip(dists)
            .map(|(t, dist)| t.variants[dist.sample(rng)].id.clone())
            .collect();

        Token {
            character: picked.map(|idx| self.catalog.characters()[idx].name.clone()),
            traits,
        }
    }
}

/// One-shot convenience around [`TokenSampler`].
pub fn sample_token<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> TraitgenResult<Token> {
    Ok(TokenSampler::new(catalog)?.sample(rng))
}

fn pool_distributions(pool: &[Trait]) -> TraitgenResult<Vec<WeightedIndex<f64>>> {
    pool.iter()
        .map(|t| {
            weighted_index(&t.weights().collect::<Vec<_>>()).map_err(|e| {
                TraitgenError::config(format!(
                    "invalid weights for trait '{}': {e}",
                    t.trait_type
                ))
            })
        })
        .collect()
}

// rand panics instead of erroring when finite weights sum to infinity.
fn weighted_index(weights: &[f64]) -> Result<WeightedIndex<f64>, WeightedError> {
    if !weights.iter().sum::<f64>().is_finite() {
        return Err(WeightedError::InvalidWeight);
    }
    WeightedIndex::new(weights)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/sampler.rs"]
mod tests;
