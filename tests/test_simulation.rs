use approx::assert_relative_eq;
use lintrace::error::LineageError;
use lintrace::model::{CharacterState, LineageTree};
use lintrace::simulation::{LineageSimulator, MutationModel, NegativeBinomial, SimulationConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn simulator(depth: usize, num_characters: usize, p: f64, drop: f64) -> LineageSimulator {
    let model = MutationModel::uniform(num_characters, 4, 0.3, drop).unwrap();
    let config = SimulationConfig::new(depth, num_characters).with_subsample_percentage(p);
    LineageSimulator::new(config, model).unwrap()
}

fn assert_irreversible(tree: &LineageTree) {
    for vertex in tree.pre_order_iter() {
        let Some(parent) = vertex.parent_index() else {
            continue;
        };
        for (p, c) in tree[parent].states().iter().zip(vertex.states()) {
            match (p, c) {
                (_, CharacterState::Missing) => assert!(vertex.is_leaf()),
                (CharacterState::Mutated(a), CharacterState::Mutated(b)) => assert_eq!(a, b),
                (CharacterState::Mutated(_), CharacterState::Unmutated) => {
                    panic!("mutation reverted on edge {} -> {}", parent, vertex.index())
                }
                _ => {}
            }
        }
    }
}

// --- TESTS MUTATION MODEL ---
#[test]
fn test_state_distributions_sum_to_one() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let model = MutationModel::from_negative_binomial(
        8,
        12,
        0.1,
        0.05,
        NegativeBinomial::default(),
        &mut rng,
    )
    .unwrap();

    for character in 0..model.num_characters() {
        let distribution = model.distribution(character);
        assert_eq!(distribution.len(), 12);
        assert_relative_eq!(distribution.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(distribution[0], 0.9, epsilon = 1e-9);
        assert!(distribution.iter().all(|&q| q >= 0.0));
    }
}

#[test]
fn test_invalid_model_parameters() {
    assert!(matches!(
        MutationModel::uniform(3, 1, 0.1, 0.0),
        Err(LineageError::Configuration(_))
    ));
    assert!(matches!(
        MutationModel::uniform(3, 4, 1.5, 0.0),
        Err(LineageError::Configuration(_))
    ));
    assert!(matches!(
        MutationModel::uniform(3, 4, 0.1, -0.1),
        Err(LineageError::Configuration(_))
    ));
    assert!(NegativeBinomial::new(0.0, 0.5).is_err());
    assert!(NegativeBinomial::new(5.0, 1.5).is_err());
}

#[test]
fn test_mismatched_model_is_rejected() {
    let model = MutationModel::uniform(4, 3, 0.1, 0.0).unwrap();
    let result = LineageSimulator::new(SimulationConfig::new(3, 5), model);
    assert!(matches!(result, Err(LineageError::Configuration(_))));
}

// --- TESTS FULL TREE ---
#[test]
fn test_full_tree_is_perfect_binary() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let depth = 5;
    let tree = simulator(depth, 6, 1.0, 0.0).generate_full_tree(&mut rng);

    assert_eq!(tree.num_leaves(), 1 << depth);
    assert_eq!(tree.num_vertices(), (1 << (depth + 1)) - 1);
    assert!(tree.is_binary());
    assert!(tree.is_valid());
    for leaf in tree.leaves() {
        assert_eq!(tree.depth_of(leaf.index()), depth);
    }
    assert_eq!(tree.samples()[0], "cell_0");
    assert!(tree.contains_sample("cell_31"));
}

#[test]
fn test_root_is_unmutated() {
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let tree = simulator(3, 7, 1.0, 0.0).generate_full_tree(&mut rng);
    assert!(tree.root().states().iter().all(|s| s.is_unmutated()));
}

#[test]
fn test_mutations_are_irreversible() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let tree = simulator(6, 10, 1.0, 0.0).generate_full_tree(&mut rng);
    assert_irreversible(&tree);

    let edges: Vec<_> = tree
        .pre_order_iter()
        .filter_map(|v| v.parent_index().map(|p| (p, v.index())))
        .collect();
    let num_mutations: usize = edges
        .iter()
        .map(|&(p, c)| tree.mutations_along_edge(p, c).unwrap().len())
        .sum();
    // Each character mutates at most once on every root-to-leaf path
    assert!(num_mutations > 0);
    for leaf in tree.leaves() {
        let mut on_path = 0;
        let mut current = leaf.index();
        while let Some(parent) = tree.parent(current) {
            on_path += tree.mutations_along_edge(parent, current).unwrap().len();
            current = parent;
        }
        assert!(on_path <= tree.num_characters());
    }
}

#[test]
fn test_certain_mutation_with_two_states() {
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let model = MutationModel::uniform(5, 2, 1.0, 0.0).unwrap();
    let simulator = LineageSimulator::new(SimulationConfig::new(3, 5), model).unwrap();
    let tree = simulator.generate_simulated_full_tree(&mut rng).unwrap();

    assert_eq!(tree.num_leaves(), 8);
    for leaf in tree.leaves() {
        assert!(leaf.states().iter().all(|&s| s == CharacterState::Mutated(1)));
    }
}

#[test]
fn test_same_seed_same_tree() {
    let simulator = simulator(5, 8, 0.5, 0.1);
    let a = simulator
        .generate_simulated_full_tree(&mut ChaCha8Rng::seed_from_u64(99))
        .unwrap();
    let b = simulator
        .generate_simulated_full_tree(&mut ChaCha8Rng::seed_from_u64(99))
        .unwrap();
    assert_eq!(a, b);
}

// --- TESTS DROPOUT ---
#[test]
fn test_dropout_only_touches_leaves() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let simulator = simulator(5, 10, 1.0, 0.5);
    let mut tree = simulator.generate_full_tree(&mut rng);
    simulator.apply_dropout(&mut tree, &mut rng);

    for vertex in tree.pre_order_iter().filter(|v| !v.is_leaf()) {
        assert!(vertex.states().iter().all(|s| !s.is_missing()));
    }
    let matrix = tree.character_matrix();
    let missing: f64 = matrix.missing_proportions().iter().sum::<f64>() / 10.0;
    assert!(missing > 0.3 && missing < 0.7);
    assert_irreversible(&tree);
}

#[test]
fn test_full_dropout_hides_everything() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let tree = simulator(3, 4, 1.0, 1.0)
        .generate_simulated_full_tree(&mut rng)
        .unwrap();
    for leaf in tree.leaves() {
        assert!(leaf.states().iter().all(|s| s.is_missing()));
    }
}

// --- TESTS SUBSAMPLING ---
#[test]
fn test_subsample_count_is_rounded() {
    for (depth, p, expected) in [(4, 0.5, 8), (5, 0.3, 10), (3, 0.33, 3), (6, 1.0, 64)] {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let tree = simulator(depth, 5, p, 0.0)
            .generate_simulated_full_tree(&mut rng)
            .unwrap();
        assert_eq!(tree.num_leaves(), expected);
        assert!(tree.is_valid());
    }
}

#[test]
fn test_subsample_keeps_ancestry() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let simulator = simulator(5, 6, 0.25, 0.0);
    let full = simulator.generate_full_tree(&mut rng);
    let sub = simulator.subsample(&full, &mut rng).unwrap();

    assert_eq!(sub.num_leaves(), 8);
    for leaf in sub.leaves() {
        let sample = leaf.sample().unwrap();
        let original = full.leaf_by_sample(sample).unwrap();
        assert_eq!(leaf.states(), full[original].states());
        assert_eq!(sub.depth_of(leaf.index()), 5);
    }
    for vertex in sub.pre_order_iter().filter(|v| !v.is_leaf()) {
        assert!(vertex.num_children() >= 1);
    }
}

#[test]
fn test_subsample_to_nothing_fails() {
    let config = SimulationConfig::new(3, 2).with_subsample_percentage(0.01);
    let model = MutationModel::uniform(2, 3, 0.1, 0.0).unwrap();
    assert!(matches!(
        LineageSimulator::new(config, model),
        Err(LineageError::Configuration(_))
    ));
}
