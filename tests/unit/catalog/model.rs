use super::*;

fn config(json: &str) -> CatalogConfig {
    CatalogConfig::from_json_str(json).unwrap()
}

fn color_trait(variants: &[(Option<&str>, f64)]) -> Trait {
    Trait {
        trait_type: "color".to_string(),
        z_index: 1,
        variants: variants
            .iter()
            .map(|(id, weight)| Variant {
                id: id.map(str::to_string),
                weight: *weight,
            })
            .collect(),
    }
}

#[test]
fn from_config_reads_characters_and_traits() {
    let cfg = config(
        r#"{
            "size": 4,
            "characters": [
                {"name": "cat", "weight": 1, "z-index": 0},
                {"name": "dog", "weight": 2, "z-index": 0}
            ],
            "traits": [
                {"type": "hat", "z-index": 2, "variants": [
                    {"type": "cap", "weight": 1},
                    {"type": null, "weight": 3}
                ]}
            ]
        }"#,
    );
    let catalog = Catalog::from_config(&cfg).unwrap();
    assert_eq!(catalog.size, 4);
    assert!(matches!(
        catalog.characters,
        CharacterDimension::WeightedGlobal(ref c) if c.len() == 2
    ));
    assert!(catalog.traits[0].variants[1].is_absent());
    assert_eq!(catalog.capacity(), 4);
}

#[test]
fn missing_fields_are_config_errors() {
    let err = Catalog::from_config(&config(r#"{"traits": []}"#)).unwrap_err();
    assert!(err.to_string().contains("missing required field 'size'"));

    let err = Catalog::from_config(&config(r#"{"size": 1}"#)).unwrap_err();
    assert!(err.to_string().contains("missing required field 'traits'"));
}

#[test]
fn size_below_one_is_rejected() {
    let err = Catalog::from_config(&config(
        r#"{"size": 0, "traits": [{"type": "a", "z-index": 0, "variants": [{"type": "x", "weight": 1}]}]}"#,
    ))
    .unwrap_err();
    assert!(matches!(err, TraitgenError::Config(_)));
}

#[test]
fn empty_trait_list_and_empty_first_trait_are_rejected() {
    let err = Catalog::from_config(&config(r#"{"size": 1, "traits": []}"#)).unwrap_err();
    assert!(err.to_string().contains("at least one trait"));

    let err = Catalog::from_config(&config(
        r#"{"size": 1, "traits": [{"type": "a", "z-index": 0, "variants": []}]}"#,
    ))
    .unwrap_err();
    assert!(err.to_string().contains("first trait 'a'"));
}

#[test]
fn capacity_exceeded_names_the_maximum() {
    let catalog = Catalog {
        size: 5,
        seed: None,
        traits: vec![color_trait(&[(Some("red"), 1.0), (Some("blue"), 1.0)])],
        characters: CharacterDimension::Absent,
    };
    let err = catalog.validate().unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, TraitgenError::Config(_)));
    assert!(msg.contains("5 unique tokens"), "{msg}");
    assert!(msg.contains("up to 2"), "{msg}");
}

#[test]
fn all_zero_weights_are_rejected() {
    let catalog = Catalog {
        size: 1,
        seed: None,
        traits: vec![color_trait(&[(Some("red"), 0.0), (Some("blue"), 0.0)])],
        characters: CharacterDimension::Absent,
    };
    let err = catalog.validate().unwrap_err();
    assert!(err.to_string().contains("all-zero weights"));
}

#[test]
fn negative_and_nan_weights_are_rejected() {
    for w in [-1.0, f64::NAN, f64::INFINITY] {
        let catalog = Catalog {
            size: 1,
            seed: None,
            traits: vec![color_trait(&[(Some("red"), w), (Some("blue"), 1.0)])],
            characters: CharacterDimension::Absent,
        };
        assert!(catalog.validate().is_err(), "weight {w} accepted");
    }
}

#[test]
fn duplicate_variant_ids_are_rejected() {
    let catalog = Catalog {
        size: 1,
        seed: None,
        traits: vec![color_trait(&[(Some("red"), 1.0), (Some("red"), 1.0)])],
        characters: CharacterDimension::Absent,
    };
    assert!(catalog.validate().is_err());
}

#[test]
fn zero_weight_variants_do_not_count_towards_capacity() {
    let catalog = Catalog {
        size: 2,
        seed: None,
        traits: vec![color_trait(&[
            (Some("red"), 1.0),
            (Some("blue"), 0.0),
            (Some("green"), 2.0),
        ])],
        characters: CharacterDimension::Absent,
    };
    assert_eq!(catalog.capacity(), 2);
    catalog.validate().unwrap();
}

#[test]
fn all_absent_tuple_is_excluded_from_capacity() {
    let mut hat = color_trait(&[(Some("cap"), 1.0), (None, 1.0)]);
    hat.trait_type = "hat".to_string();
    let catalog = Catalog {
        size: 3,
        seed: None,
        traits: vec![color_trait(&[(Some("red"), 1.0), (None, 1.0)]), hat],
        characters: CharacterDimension::Absent,
    };
    assert_eq!(catalog.capacity(), 3);
    catalog.validate().unwrap();

    let mut too_many = catalog.clone();
    too_many.size = 4;
    assert!(too_many.validate().is_err());
}

#[test]
fn global_strategy_rejects_per_character_traits() {
    let cfg = config(
        r#"{
            "size": 1,
            "characters": [{"name": "cat", "weight": 1, "z-index": 0,
                "traits": [{"type": "hat", "z-index": 1, "variants": [{"type": "cap", "weight": 1}]}]}],
            "traits": [{"type": "hat", "z-index": 1, "variants": [{"type": "cap", "weight": 1}]}]
        }"#,
    );
    let err = Catalog::from_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("character-scoped-traits"));
}

#[test]
fn scoped_capacity_sums_character_pools() {
    let cfg = config(
        r#"{
            "size": 5,
            "strategy": "character-scoped-traits",
            "characters": [
                {"name": "cat", "weight": 1, "z-index": 0,
                 "traits": [{"type": "whiskers", "z-index": 1, "variants": [
                    {"type": "long", "weight": 1}, {"type": "short", "weight": 1}, {"type": "none", "weight": 1}
                 ]}]},
                {"name": "dog", "weight": 1, "z-index": 0}
            ],
            "traits": [{"type": "hat", "z-index": 1, "variants": [
                {"type": "cap", "weight": 1}, {"type": "crown", "weight": 1}
            ]}]
        }"#,
    );
    let catalog = Catalog::from_config(&cfg).unwrap();
    assert_eq!(catalog.capacity(), 5);
    assert_eq!(catalog.trait_types(), vec!["hat", "whiskers"]);

    let cat = catalog.character("cat").unwrap();
    assert_eq!(catalog.pool(Some(cat))[0].trait_type, "whiskers");
    let dog = catalog.character("dog").unwrap();
    assert_eq!(catalog.pool(Some(dog))[0].trait_type, "hat");
}

#[test]
fn duplicate_characters_are_rejected() {
    let cfg = config(
        r#"{
            "size": 1,
            "characters": [
                {"name": "cat", "weight": 1, "z-index": 0},
                {"name": "cat", "weight": 1, "z-index": 0}
            ],
            "traits": [{"type": "hat", "z-index": 1, "variants": [{"type": "cap", "weight": 1}]}]
        }"#,
    );
    assert!(Catalog::from_config(&cfg).is_err());
}

#[test]
fn variant_name_alias_is_accepted() {
    let cfg = config(
        r#"{"size": 1, "traits": [{"type": "a", "z_index": 0, "variants": [{"name": "x", "weight": 1}]}]}"#,
    );
    let catalog = Catalog::from_config(&cfg).unwrap();
    assert_eq!(catalog.traits[0].variants[0].id.as_deref(), Some("x"));
}

#[test]
fn names_must_be_single_path_components() {
    let catalog = Catalog {
        size: 1,
        seed: None,
        traits: vec![color_trait(&[(Some("../escape"), 1.0)])],
        characters: CharacterDimension::Absent,
    };
    let err = catalog.validate().unwrap_err();
    assert!(err.to_string().contains("single path component"));
}

#[test]
fn weights_summing_past_f64_range_are_rejected() {
    let catalog = Catalog {
        size: 1,
        seed: None,
        traits: vec![color_trait(&[(Some("red"), f64::MAX), (Some("blue"), f64::MAX)])],
        characters: CharacterDimension::Absent,
    };
    let err = catalog.validate().unwrap_err();
    assert!(matches!(err, TraitgenError::Config(_)));
    assert!(err.to_string().contains("trait 'color'"), "{err}");

    let catalog = Catalog {
        size: 1,
        seed: None,
        traits: vec![color_trait(&[(Some("red"), 1.0)])],
        characters: CharacterDimension::WeightedGlobal(
            ["cat", "dog"]
                .iter()
                .map(|n| Character {
                    name: n.to_string(),
                    weight: f64::MAX,
                    z_index: 0,
                    traits: None,
                })
                .collect(),
        ),
    };
    let err = catalog.validate().unwrap_err();
    assert!(err.to_string().contains("character weights"), "{err}");
}
