use std::collections::HashMap;

use crate::{catalog::model::Catalog, generate::token::GeneratedSet};

/// Occurrence data derived from a frozen [`GeneratedSet`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RarityReport {
    pub size: usize,
    /// Tokens per character, in character declaration order. Empty without characters.
    pub characters: Vec<CharacterCount>,
    /// One entry per trait type, in declaration order.
    pub traits: Vec<TraitRarity>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CharacterCount {
    pub name: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TraitRarity {
    pub trait_type: String,
    /// Observed values only, in variant declaration order.
    pub variants: Vec<VariantRarity>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VariantRarity {
    /// `None` is the absent outcome.
    pub variant: Option<String>,
    pub occurrences: usize,
    /// `occurrences * 100 / size`, unrounded.
    pub rarity_pct: f64,
}

impl VariantRarity {
    pub fn label(&self) -> &str {
        self.variant.as_deref().unwrap_or("None")
    }
}

/// Count characters and trait variants over the generated set.
pub fn analyze(catalog: &Catalog, set: &GeneratedSet) -> RarityReport {
    let size = set.len();

    let characters = catalog
        .characters()
        .iter()
        .map(|c| CharacterCount {
            name: c.name.clone(),
            count: set
                .iter()
                .filter(|t| t.character.as_deref() == Some(c.name.as_str()))
                .count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    let mut counts = HashMap::<(&str, Option<&str>), usize>::new();
    for token in set {
        for (t, value) in token.trait_values(catalog) {
            *counts.entry((t.trait_type.as_str(), value)).or_insert(0) += 1;
        }
    }

    let mut traits = Vec::new();
    for trait_type in catalog.trait_types() {
        let mut variants = Vec::<VariantRarity>::new();
        for t in declared_traits(catalog, trait_type) {
            for v in &t.variants {
                let id = v.id.as_deref();
                if variants.iter().any(|seen| seen.variant.as_deref() == id) {
                    continue;
                }
                let Some(&occurrences) = counts.get(&(trait_type, id)) else {
                    continue;
                };
                variants.push(VariantRarity {
                    variant: v.id.clone(),
                    occurrences,
                    rarity_pct: percentage(occurrences, size),
                });
            }
        }
        traits.push(TraitRarity {
            trait_type: trait_type.to_string(),
            variants,
        });
    }

    RarityReport {
        size,
        characters,
        traits,
    }
}

impl RarityReport {
    pub fn trait_rarity(&self, trait_type: &str) -> Option<&TraitRarity> {
        self.traits.iter().find(|t| t.trait_type == trait_type)
    }

    /// Emit the report as log lines, percentages to two decimals.
    pub fn log(&self) {
        for c in &self.characters {
            tracing::info!("{} tokens generated for character: {}", c.count, c.name);
        }
        for t in &self.traits {
            tracing::info!(
                "{} variants generated for trait: {}",
                t.variants.len(),
                t.trait_type
            );
            for v in &t.variants {
                tracing::info!(
                    "variant: {} occurrences: {} rarity: {:.2}%",
                    v.label(),
                    v.occurrences,
                    v.rarity_pct
                );
            }
        }
    }
}

impl TraitRarity {
    pub fn variant(&self, id: Option<&str>) -> Option<&VariantRarity> {
        self.variants.iter().find(|v| v.variant.as_deref() == id)
    }
}

fn declared_traits<'a>(
    catalog: &'a Catalog,
    trait_type: &'a str,
) -> impl Iterator<Item = &'a crate::catalog::model::Trait> + 'a {
    std::iter::once(catalog.traits.as_slice())
        .chain(
            catalog
                .characters()
                .iter()
                .filter_map(|c| c.traits.as_deref()),
        )
        .flat_map(|pool| pool.iter())
        .filter(move |t| t.trait_type == trait_type)
}

fn percentage(occurrences: usize, size: usize) -> f64 {
    if size == 0 {
        return 0.0;
    }
    occurrences as f64 * 100.0 / size as f64
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/rarity.rs"]
mod tests;
