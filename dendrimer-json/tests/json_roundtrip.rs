//! File-level round trips through the JSON codec with derived node types.

use dendrimer_core::{Backbone, EncodeOptions, Factory, Monomer, Scalar};
use dendrimer_json::{CodecError, load_json, save_json};

#[derive(Debug, Default, Monomer)]
struct Person {
    #[monomer(backbone)]
    backbone: Backbone,
    height: f64,
}

#[derive(Debug, Default, Monomer)]
struct Pet {
    #[monomer(backbone)]
    backbone: Backbone,
    species: String,
}

fn family() -> Person {
    let mut jane = Person {
        backbone: Backbone::named("Jane"),
        height: 1.64,
    };
    jane.attach(Box::new(Person {
        backbone: Backbone::named("John"),
        height: 1.8,
    }));
    jane.attach(Box::new(Person {
        backbone: Backbone::named("Josephine"),
        height: 1.2,
    }));
    let mut spot = Pet {
        backbone: Backbone::named("Spot"),
        species: "dog".to_string(),
    };
    spot.set("vaccinated", Scalar::Bool(true)).unwrap();
    jane.attach(Box::new(spot));
    jane
}

fn family_factory() -> Factory {
    // Children are keyed by display name in the saved document, so the
    // creators are registered under those keys.
    let mut factory = Factory::new();
    factory.register_default::<Person>("John");
    factory.register_default::<Person>("Josephine");
    factory.register_default::<Pet>("Spot");
    factory
}

#[test]
fn save_then_load_rebuilds_the_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("family.json");

    let jane = family();
    let options = EncodeOptions {
        include_name: true,
        ..EncodeOptions::default()
    };
    save_json(&jane, &path, &options).unwrap();

    let mut fresh = Person::default();
    let report = load_json(&mut fresh, &path, &family_factory()).unwrap();

    assert!(report.is_clean());
    assert_eq!(fresh.name(), "Jane");
    assert_eq!(fresh.height, 1.64);
    assert_eq!(fresh.children().len(), 3);

    let john = &fresh.children()[0];
    assert_eq!(john.type_tag(), "Person");
    assert_eq!(john.name(), "John");
    assert_eq!(john.get("height"), Some(Scalar::Float(1.8)));

    let spot = &fresh.children()[2];
    assert_eq!(spot.type_tag(), "Pet");
    assert_eq!(spot.name(), "Spot");
    assert_eq!(spot.get("species"), Some(Scalar::Text("dog".to_string())));
    assert_eq!(spot.get("vaccinated"), Some(Scalar::Bool(true)));
}

fn anonymous_family(heights: [f64; 2], species: &str) -> Person {
    // No display names, so children are keyed by type tag and the two
    // Person entries fold into a list in the saved document.
    let mut root = Person::default();
    for height in heights {
        root.attach(Box::new(Person {
            height,
            ..Person::default()
        }));
    }
    root.attach(Box::new(Pet {
        species: species.to_string(),
        ..Pet::default()
    }));
    root
}

#[test]
fn load_into_populated_tree_updates_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("family.json");

    let fresh = anonymous_family([1.8, 1.2], "dog");
    save_json(&fresh, &path, &EncodeOptions::default()).unwrap();

    // Same topology, stale attribute values: every document entry matches
    // an existing child by type tag and nothing is created, even with an
    // empty factory.
    let mut stale = anonymous_family([0.0, 0.0], "");
    let report = load_json(&mut stale, &path, &Factory::new()).unwrap();

    assert!(report.is_clean());
    assert_eq!(stale.children().len(), 3);
    assert_eq!(stale.children()[0].get("height"), Some(Scalar::Float(1.8)));
    assert_eq!(stale.children()[1].get("height"), Some(Scalar::Float(1.2)));
    assert_eq!(
        stale.children()[2].get("species"),
        Some(Scalar::Text("dog".to_string()))
    );
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{not json").unwrap();

    let mut root = Person::default();
    let err = load_json(&mut root, &path, &Factory::new()).unwrap_err();

    assert!(matches!(err, CodecError::Parse(_)));
}

#[test]
fn non_object_root_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let mut root = Person::default();
    let err = load_json(&mut root, &path, &Factory::new()).unwrap_err();

    assert!(matches!(err, CodecError::NotADocument));
}

#[test]
fn missing_file_is_an_io_error() {
    let mut root = Person::default();
    let err = load_json(&mut root, "/nonexistent/family.json", &Factory::new()).unwrap_err();

    assert!(matches!(err, CodecError::Io(_)));
}
