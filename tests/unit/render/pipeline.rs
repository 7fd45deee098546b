use image::{Rgba, RgbaImage};

use super::*;
use crate::catalog::model::{Character, CharacterDimension, Trait, Variant};

fn fixture_root(name: &str) -> PathBuf {
    let root = PathBuf::from("target").join("unit_pipeline").join(name);
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    root
}

fn write_png(path: PathBuf, px: [u8; 4]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbaImage::from_pixel(4, 4, Rgba(px)).save(path).unwrap();
}

fn hat_catalog() -> Catalog {
    Catalog {
        size: 2,
        seed: None,
        traits: vec![Trait {
            trait_type: "hat".to_string(),
            z_index: 1,
            variants: ["cap", "crown"]
                .iter()
                .map(|id| Variant {
                    id: Some(id.to_string()),
                    weight: 1.0,
                })
                .collect(),
        }],
        characters: CharacterDimension::WeightedGlobal(vec![Character {
            name: "cat".to_string(),
            weight: 1.0,
            z_index: 0,
            traits: None,
        }]),
    }
}

fn hat_set() -> GeneratedSet {
    GeneratedSet::from_tokens(&hat_catalog(), vec![
        Token {
            character: Some("cat".to_string()),
            traits: vec![Some("crown".to_string())],
        },
        Token {
            character: Some("cat".to_string()),
            traits: vec![Some("cap".to_string())],
        },
    ])
    .unwrap()
}

#[test]
fn writes_one_png_per_token_in_acceptance_order() {
    let root = fixture_root("sequential");
    let layout = AssetLayout::new(&root);
    write_png(layout.character_image("cat"), [10, 10, 10, 255]);
    write_png(layout.variant_image(Some("cat"), "hat", "cap"), [255, 0, 0, 255]);
    write_png(layout.variant_image(Some("cat"), "hat", "crown"), [0, 0, 255, 255]);

    let stats = render_set(&hat_catalog(), &hat_set(), &layout, &RenderOpts::default()).unwrap();
    assert_eq!(stats.tokens_rendered, 2);

    let first = image::open(layout.output_image(Some("cat"), 0)).unwrap().to_rgb8();
    let second = image::open(layout.output_image(Some("cat"), 1)).unwrap().to_rgb8();
    assert_eq!(first.get_pixel(0, 0).0, [0, 0, 255]);
    assert_eq!(second.get_pixel(0, 0).0, [255, 0, 0]);
}

#[test]
fn parallel_matches_sequential() {
    let root = fixture_root("parallel");
    let layout = AssetLayout::new(&root);
    write_png(layout.character_image("cat"), [10, 10, 10, 255]);
    write_png(layout.variant_image(Some("cat"), "hat", "cap"), [255, 0, 0, 128]);
    write_png(layout.variant_image(Some("cat"), "hat", "crown"), [0, 0, 255, 64]);

    render_set(&hat_catalog(), &hat_set(), &layout, &RenderOpts::default()).unwrap();
    let seq: Vec<_> = (0..2)
        .map(|i| std::fs::read(layout.output_image(Some("cat"), i)).unwrap())
        .collect();

    let opts = RenderOpts {
        parallel: true,
        threads: Some(2),
        ..RenderOpts::default()
    };
    render_set(&hat_catalog(), &hat_set(), &layout, &opts).unwrap();
    let par: Vec<_> = (0..2)
        .map(|i| std::fs::read(layout.output_image(Some("cat"), i)).unwrap())
        .collect();
    assert_eq!(seq, par);
}

#[test]
fn missing_asset_is_fatal_by_default_and_skippable_on_request() {
    let root = fixture_root("missing");
    let layout = AssetLayout::new(&root);
    write_png(layout.character_image("cat"), [10, 10, 10, 255]);
    write_png(layout.variant_image(Some("cat"), "hat", "cap"), [255, 0, 0, 255]);

    let err = render_set(&hat_catalog(), &hat_set(), &layout, &RenderOpts::default()).unwrap_err();
    assert!(matches!(err, TraitgenError::AssetMissing(_)));

    let opts = RenderOpts {
        skip_missing_assets: true,
        ..RenderOpts::default()
    };
    let stats = render_set(&hat_catalog(), &hat_set(), &layout, &opts).unwrap();
    assert_eq!(
        stats,
        RenderStats {
            tokens_total: 2,
            tokens_rendered: 1,
            tokens_skipped: 1,
        }
    );
    assert!(layout.output_image(Some("cat"), 1).exists());
}

#[test]
fn zero_threads_is_rejected() {
    let root = fixture_root("threads");
    let layout = AssetLayout::new(&root);
    let opts = RenderOpts {
        parallel: true,
        threads: Some(0),
        ..RenderOpts::default()
    };
    assert!(render_set(&hat_catalog(), &hat_set(), &layout, &opts).is_err());
}

#[test]
fn worker_state_is_built_at_most_once_per_thread() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let pool = build_thread_pool(Some(3)).unwrap();
    let items: Vec<usize> = (0..100).collect();
    let inits = AtomicUsize::new(0);

    let out = map_per_worker(
        &pool,
        &items,
        || {
            inits.fetch_add(1, Ordering::SeqCst);
            0usize
        },
        |seen, item| {
            *seen += 1;
            item * 2
        },
    );

    assert_eq!(out, items.iter().map(|i| i * 2).collect::<Vec<_>>());
    let inits = inits.load(Ordering::SeqCst);
    assert!((1..=3).contains(&inits), "{inits} worker states built");
}
