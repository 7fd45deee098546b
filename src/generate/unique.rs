use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    catalog::model::Catalog,
    foundation::error::{TraitgenError, TraitgenResult},
    generate::{
        sampler::TokenSampler,
        token::{GeneratedSet, Token},
    },
};

/// Knobs for [`generate_unique_set`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GenerateOpts {
    /// Upper bound on candidate draws. `None` keeps sampling until the set is full.
    ///
    /// Expected draws grow like the coupon-collector bound as `size` approaches
    /// the catalog capacity, so near-exhaustive sizes can take a long time.
    pub max_attempts: Option<u64>,
}

/// Counters describing one rejection-sampling run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct GenerateStats {
    pub attempts: u64,
    pub duplicates: u64,
    pub invalid: u64,
}

/// Build a random stream: explicit seed first, then the catalog seed, then entropy.
pub fn seeded_rng(catalog: &Catalog, seed_override: Option<u64>) -> StdRng {
    match seed_override.or(catalog.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draw candidates until `catalog.size` distinct valid tokens are collected.
///
/// Duplicates and all-absent candidates are discarded and redrawn. The catalog
/// is validated first, so an infeasible size fails before any sampling.
#[tracing::instrument(skip(catalog, rng), fields(size = catalog.size))]
pub fn generate_unique_set<R: Rng + ?Sized>(
    catalog: &Catalog,
    rng: &mut R,
    opts: GenerateOpts,
) -> TraitgenResult<(GeneratedSet, GenerateStats)> {
    catalog.validate()?;
    let sampler = TokenSampler::new(catalog)?;

    let mut seen = HashSet::<Token>::with_capacity(catalog.size);
    let mut tokens = Vec::with_capacity(catalog.size);
    let mut stats = GenerateStats::default();

    while tokens.len() < catalog.size {
        if let Some(cap) = opts.max_attempts
            && stats.attempts >= cap
        {
            return Err(TraitgenError::SamplingStall {
                accepted: tokens.len(),
                size: catalog.size,
                attempts: stats.attempts,
            });
        }

        stats.attempts += 1;
        let candidate = sampler.sample(rng);
        if candidate.is_all_absent() {
            stats.invalid += 1;
            tracing::debug!(?candidate, "all-absent token, regenerating");
            continue;
        }
        if seen.contains(&candidate) {
            stats.duplicates += 1;
            tracing::debug!(?candidate, "existing token, regenerating");
            continue;
        }

        tracing::debug!(?candidate, "generated token");
        seen.insert(candidate.clone());
        tokens.push(candidate);
    }

    tracing::info!(
        tokens = tokens.len(),
        attempts = stats.attempts,
        duplicates = stats.duplicates,
        invalid = stats.invalid,
        "generated unique token set"
    );
    Ok((GeneratedSet::from_unique(tokens), stats))
}

#[cfg(test)]
#[path = "../../tests/unit/generate/unique.rs"]
mod tests;
