use std::path::PathBuf;

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    catalog::model::Catalog,
    foundation::error::{TraitgenError, TraitgenResult},
    generate::token::{GeneratedSet, Token},
    render::{
        assets::{AssetLayout, FsLayerSource, LayerSource},
        compositor::{RenderSettings, render_token},
    },
};

#[derive(Clone, Debug, Default)]
pub struct RenderOpts {
    /// Render tokens on a rayon pool, one layer cache per worker.
    pub parallel: bool,
    /// Worker count for the parallel pool; rayon's default when `None`.
    pub threads: Option<usize>,
    /// Warn and skip a token whose artwork is missing instead of aborting the run.
    pub skip_missing_assets: bool,
    pub settings: RenderSettings,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub tokens_total: usize,
    pub tokens_rendered: usize,
    pub tokens_skipped: usize,
}

enum Outcome {
    Written,
    Skipped,
}

struct Job<'a> {
    token: &'a Token,
    out: PathBuf,
}

/// Render every token of `set` to `<group>/output/<index>.png` under `layout`.
pub fn render_set(
    catalog: &Catalog,
    set: &GeneratedSet,
    layout: &AssetLayout,
    opts: &RenderOpts,
) -> TraitgenResult<RenderStats> {
    create_output_dirs(catalog, layout)?;

    let jobs = set
        .iter()
        .zip(set.output_indices())
        .map(|(token, idx)| Job {
            token,
            out: layout.output_image(token.character.as_deref(), idx),
        })
        .collect::<Vec<_>>();

    let outcomes = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        map_per_worker(&pool, &jobs, FsLayerSource::new, |source, job| {
            render_job(catalog, job, layout, source, opts)
        })
    } else {
        let mut source = FsLayerSource::new();
        jobs.iter()
            .map(|job| render_job(catalog, job, layout, &mut source, opts))
            .collect::<Vec<_>>()
    };

    let mut stats = RenderStats {
        tokens_total: jobs.len(),
        ..RenderStats::default()
    };
    for outcome in outcomes {
        match outcome? {
            Outcome::Written => stats.tokens_rendered += 1,
            Outcome::Skipped => stats.tokens_skipped += 1,
        }
    }

    tracing::info!(
        rendered = stats.tokens_rendered,
        skipped = stats.tokens_skipped,
        root = %layout.root().display(),
        "rendered token images"
    );
    Ok(stats)
}

fn render_job<S: LayerSource + ?Sized>(
    catalog: &Catalog,
    job: &Job<'_>,
    layout: &AssetLayout,
    source: &mut S,
    opts: &RenderOpts,
) -> TraitgenResult<Outcome> {
    let img = match render_token(catalog, job.token, layout, source, &opts.settings) {
        Ok(img) => img,
        Err(TraitgenError::AssetMissing(path)) if opts.skip_missing_assets => {
            tracing::warn!(
                token = ?job.token,
                asset = %path.display(),
                "skipping token with missing asset"
            );
            return Ok(Outcome::Skipped);
        }
        Err(e) => return Err(e),
    };

    img.save(&job.out)
        .with_context(|| format!("write png '{}'", job.out.display()))?;
    tracing::debug!(out = %job.out.display(), "wrote token image");
    Ok(Outcome::Written)
}

fn create_output_dirs(catalog: &Catalog, layout: &AssetLayout) -> TraitgenResult<()> {
    let groups: Vec<Option<&str>> = if catalog.characters.is_present() {
        catalog
            .characters()
            .iter()
            .map(|c| Some(c.name.as_str()))
            .collect()
    } else {
        vec![None]
    };
    for group in groups {
        let dir = layout.output_dir(group);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
    }
    Ok(())
}

/// Ordered parallel map where each worker gets one contiguous run of `items`,
/// so `init` runs at most once per pool thread.
fn map_per_worker<I, S, T, F, M>(
    pool: &rayon::ThreadPool,
    items: &[I],
    init: F,
    map: M,
) -> Vec<T>
where
    I: Sync,
    T: Send,
    F: Fn() -> S + Sync + Send,
    M: Fn(&mut S, &I) -> T + Sync + Send,
{
    let min_len = items.len().div_ceil(pool.current_num_threads()).max(1);
    pool.install(|| {
        items
            .par_iter()
            .with_min_len(min_len)
            .map_init(init, map)
            .collect()
    })
}

fn build_thread_pool(threads: Option<usize>) -> TraitgenResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TraitgenError::config(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TraitgenError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
