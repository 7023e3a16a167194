use lintrace::config::BenchmarkConfig;
use lintrace::error::LineageError;
use lintrace::io::json::{from_json, read_tree_file, to_json, write_tree_file};
use lintrace::scoring::{AllocationPolicy, TiePolicy};

// --- TESTS JSON TREES ---
#[test]
fn test_simulated_tree_survives_json_file() {
    let config = BenchmarkConfig::from_file("tests/fixtures/benchmark.json").unwrap();
    let mut rng = config.rng();
    let tree = config
        .build_simulator(&mut rng)
        .unwrap()
        .generate_simulated_full_tree(&mut rng)
        .unwrap()
        .with_name("fixture");

    let path = std::env::temp_dir().join(format!("lintrace_tree_{}.json", std::process::id()));
    write_tree_file(&path, &tree).unwrap();
    let loaded = read_tree_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, tree);
    assert_eq!(loaded.name(), Some("fixture"));
    assert_eq!(loaded.num_leaves(), 16);
    assert_eq!(loaded.leaf_by_sample(&tree.samples()[3]), tree.leaf_by_sample(&tree.samples()[3]));
}

#[test]
fn test_inconsistent_json_is_rejected() {
    // Leaf 2 names the wrong parent
    let json = r#"{
        "num_characters": 0,
        "root": 0,
        "vertices": [
            { "Root": { "index": 0, "children": [1, 2], "states": [] } },
            { "Leaf": { "index": 1, "parent": 0, "sample": "A", "states": [] } },
            { "Leaf": { "index": 2, "parent": 1, "sample": "B", "states": [] } }
        ]
    }"#;
    assert!(matches!(from_json(json), Err(LineageError::Json(_))));
}

#[test]
fn test_repeated_child_and_detached_vertex_are_rejected() {
    // Root lists leaf 1 twice; vertex 4 hangs off itself
    let json = r#"{
        "num_characters": 0,
        "root": 0,
        "vertices": [
            { "Root": { "index": 0, "children": [1, 1, 2, 3], "states": [] } },
            { "Leaf": { "index": 1, "parent": 0, "sample": "A", "states": [] } },
            { "Leaf": { "index": 2, "parent": 0, "sample": "B", "states": [] } },
            { "Leaf": { "index": 3, "parent": 0, "sample": "C", "states": [] } },
            { "Internal": { "index": 4, "parent": 4, "children": [4], "states": [] } }
        ]
    }"#;
    assert!(matches!(from_json(json), Err(LineageError::Json(_))));
}

#[test]
fn test_repeated_child_is_rejected() {
    let json = r#"{
        "num_characters": 0,
        "root": 0,
        "vertices": [
            { "Root": { "index": 0, "children": [1, 1, 2, 3], "states": [] } },
            { "Leaf": { "index": 1, "parent": 0, "sample": "A", "states": [] } },
            { "Leaf": { "index": 2, "parent": 0, "sample": "B", "states": [] } },
            { "Leaf": { "index": 3, "parent": 0, "sample": "C", "states": [] } }
        ]
    }"#;
    assert!(from_json(json).is_err());
}

#[test]
fn test_configuration_error_from_outside_the_crate() {
    let err = LineageError::config("missing arguments");
    assert!(matches!(err, LineageError::Configuration(ref msg) if msg == "missing arguments"));
    assert_eq!(err.to_string(), "configuration error: missing arguments");
}

#[test]
fn test_duplicate_samples_in_json_are_rejected() {
    let json = r#"{
        "num_characters": 0,
        "root": 0,
        "vertices": [
            { "Root": { "index": 0, "children": [1, 2], "states": [] } },
            { "Leaf": { "index": 1, "parent": 0, "sample": "A", "states": [] } },
            { "Leaf": { "index": 2, "parent": 0, "sample": "A", "states": [] } }
        ]
    }"#;
    assert!(from_json(json).is_err());
}

#[test]
fn test_json_string_roundtrip_keeps_states() {
    let config = BenchmarkConfig::default();
    let mut rng = config.rng();
    let tree = config
        .build_simulator(&mut rng)
        .unwrap()
        .generate_simulated_full_tree(&mut rng)
        .unwrap();
    let loaded = from_json(&to_json(&tree).unwrap()).unwrap();
    assert_eq!(loaded.character_matrix(), tree.character_matrix());
}

#[test]
fn test_missing_file() {
    let result = read_tree_file("tests/fixtures/does_not_exist.json");
    assert!(matches!(result, Err(LineageError::Io(_))));
}

// --- TESTS CONFIG ---
#[test]
fn test_config_fixture() {
    let config = BenchmarkConfig::from_file("tests/fixtures/benchmark.json").unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.model.num_states, 6);
    assert_eq!(config.simulation.depth, 5);
    assert_eq!(config.simulation.num_retained_leaves(), 16);
    assert_eq!(config.scoring.number_of_trials, 200);
    assert!(config.scoring.modified);
    assert_eq!(config.scoring.tie_policy, TiePolicy::Exclude);
    assert_eq!(config.scoring.allocation, AllocationPolicy::Uniform);
    // Not listed in the file
    assert!(config.model.propensities.is_some());
}

#[test]
fn test_invalid_config_values() {
    for json in [
        r#"{ "simulation": { "depth": 0 } }"#,
        r#"{ "simulation": { "subsample_percentage": 1.5 } }"#,
        r#"{ "scoring": { "number_of_trials": 0 } }"#,
        r#"{ "model": { "mutation_probability": 2.0 } }"#,
        r#"{ "model": { "propensities": { "r": -1.0, "p": 0.5 } } }"#,
    ] {
        assert!(
            matches!(BenchmarkConfig::from_json(json), Err(LineageError::Configuration(_))),
            "accepted {json}"
        );
    }
}

#[test]
fn test_config_serializes_back() {
    let config = BenchmarkConfig::from_file("tests/fixtures/benchmark.json").unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(BenchmarkConfig::from_json(&json).unwrap(), config);
}
