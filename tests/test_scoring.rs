use lintrace::error::LineageError;
use lintrace::model::{CharacterState, LcaOracle, LineageTree};
use lintrace::newick::parse_str;
use lintrace::scoring::{
    outgroup, score_triplets, triplet_outgroup, AllocationPolicy, Outgroup, ScoringConfig,
    TiePolicy, Triplet, TripletSampler, TripletScorer,
};
use lintrace::simulation::{LineageSimulator, MutationModel, SimulationConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

fn simulated(depth: usize, p: f64, seed: u64) -> LineageTree {
    let model = MutationModel::uniform(8, 5, 0.2, 0.0).unwrap();
    let config = SimulationConfig::new(depth, 8).with_subsample_percentage(p);
    let simulator = LineageSimulator::new(config, model).unwrap();
    simulator
        .generate_simulated_full_tree(&mut ChaCha8Rng::seed_from_u64(seed))
        .unwrap()
}

/// Star tree over the samples of `tree`.
fn star_of(tree: &LineageTree) -> LineageTree {
    let mut star = LineageTree::new(0);
    let root = star.add_root(vec![]);
    for sample in tree.samples() {
        star.add_leaf(root, sample.as_str(), vec![]);
    }
    star
}

// --- TESTS OUTGROUPS ---
#[test]
fn test_outgroup_in_caterpillar() {
    let tree = parse_str("(((A,B),C),D);").unwrap();
    let lca = LcaOracle::new(&tree);
    let leaf = |s: &str| tree.leaf_by_sample(s).unwrap();

    assert_eq!(outgroup(&lca, [leaf("A"), leaf("B"), leaf("C")]), Outgroup::Leaf(2));
    assert_eq!(outgroup(&lca, [leaf("A"), leaf("C"), leaf("D")]), Outgroup::Leaf(2));
    assert_eq!(outgroup(&lca, [leaf("D"), leaf("A"), leaf("B")]), Outgroup::Leaf(0));
}

#[test]
fn test_outgroup_in_polytomy_is_unresolved() {
    let tree = parse_str("((A,B,C),D);").unwrap();
    let lca = LcaOracle::new(&tree);
    let leaf = |s: &str| tree.leaf_by_sample(s).unwrap();

    assert_eq!(outgroup(&lca, [leaf("A"), leaf("B"), leaf("C")]), Outgroup::Unresolved);
    assert!(outgroup(&lca, [leaf("A"), leaf("B"), leaf("D")]).is_resolved());
}

#[test]
fn test_triplet_outgroup_by_sample() {
    let tree = parse_str("((A,B),C);").unwrap();
    let lca = LcaOracle::new(&tree);
    let triplet = Triplet::new("C", "B", "A");
    assert_eq!(triplet_outgroup(&tree, &lca, &triplet, "true").unwrap(), Outgroup::Leaf(2));

    let missing = Triplet::new("A", "B", "D");
    assert!(matches!(
        triplet_outgroup(&tree, &lca, &missing, "true"),
        Err(LineageError::MissingLeaf { .. })
    ));
}

// --- TESTS SAMPLER ---
#[test]
fn test_bucket_sizes_of_balanced_tree() {
    // 16 leaves: C(16,3) = 560 triplets in total
    let tree = simulated(4, 1.0, 1);
    let sampler = TripletSampler::new(&tree);

    // Root splits 8|8: 560 - 2 * C(8,3) = 448
    assert_eq!(sampler.num_triplets_at_depth(0), 448);
    // Two vertices splitting 4|4: 2 * (56 - 2 * 4) = 96
    assert_eq!(sampler.num_triplets_at_depth(1), 96);
    // Four vertices splitting 2|2: 4 * 4 = 16
    assert_eq!(sampler.num_triplets_at_depth(2), 16);
    assert_eq!(sampler.num_triplets_at_depth(3), 0);

    let total: u128 = sampler.buckets().map(|b| b.num_triplets).sum();
    assert_eq!(total, 560);
    assert_eq!(sampler.eligible_depths(20), vec![0, 1]);
}

#[test]
fn test_sampled_triplets_stay_in_eligible_buckets() {
    let tree = simulated(6, 0.5, 2);
    let sampler = TripletSampler::new(&tree);
    let min_size_depth = 10;
    let eligible: HashSet<usize> = sampler.eligible_depths(min_size_depth).into_iter().collect();

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let sampled = sampler
        .sample(300, min_size_depth, AllocationPolicy::Uniform, &mut rng)
        .unwrap();
    assert_eq!(sampled.len(), 300);

    let lca = LcaOracle::new(&tree);
    for s in &sampled {
        assert!(eligible.contains(&s.depth));
        let [a, b, c] = s.triplet.samples().map(|x| tree.leaf_by_sample(x).unwrap());
        assert_eq!(lca.depth(lca.lca3(a, b, c)), s.depth);
    }
    let seen: HashSet<usize> = sampled.iter().map(|s| s.depth).collect();
    assert_eq!(seen, eligible);
}

#[test]
fn test_proportional_allocation_favours_large_buckets() {
    let tree = simulated(5, 1.0, 4);
    let sampler = TripletSampler::new(&tree);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let sampled = sampler
        .sample(1000, 1, AllocationPolicy::Proportional, &mut rng)
        .unwrap();
    assert_eq!(sampled.len(), 1000);

    let at_root = sampled.iter().filter(|s| s.depth == 0).count();
    let at_depth_3 = sampled.iter().filter(|s| s.depth == 3).count();
    assert!(at_root > at_depth_3);
}

#[test]
fn test_sampler_without_large_buckets() {
    let tree = parse_str("((A,B),C);").unwrap();
    let sampler = TripletSampler::new(&tree);
    let mut rng = ChaCha8Rng::seed_from_u64(6);

    assert!(matches!(
        sampler.sample(10, 2, AllocationPolicy::Uniform, &mut rng),
        Err(LineageError::InsufficientData(_))
    ));
    assert!(matches!(
        sampler.sample(0, 1, AllocationPolicy::Uniform, &mut rng),
        Err(LineageError::Configuration(_))
    ));
}

// --- TESTS SCORER ---
#[test]
fn test_identical_trees_score_one() {
    let tree = simulated(6, 0.5, 7);
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    for modified in [false, true] {
        let config = ScoringConfig::new(500).with_min_size_depth(5).modified(modified);
        let score = score_triplets(&tree, &tree, config, &mut rng).unwrap();
        assert_eq!(score, 1.0);
    }
}

#[test]
fn test_certain_mutation_scenario_scores_one() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let model = MutationModel::uniform(5, 2, 1.0, 0.0).unwrap();
    let simulator = LineageSimulator::new(SimulationConfig::new(3, 5), model).unwrap();
    let tree = simulator.generate_simulated_full_tree(&mut rng).unwrap();

    assert_eq!(tree.num_leaves(), 8);
    for leaf in tree.leaves() {
        assert!(leaf.states().iter().all(|&s| s == CharacterState::Mutated(1)));
    }

    let config = ScoringConfig::new(50).with_min_size_depth(1).modified(false);
    let score = TripletScorer::new(config)
        .unwrap()
        .score(&tree, &tree, &mut rng)
        .unwrap();
    assert_eq!(score.value(), 1.0);
    assert_eq!(score.num_trials(), 50);
}

#[test]
fn test_star_scores_zero_when_ties_are_incorrect() {
    let tree = simulated(2, 1.0, 10);
    let star = star_of(&tree);
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    let config = ScoringConfig::new(40).with_min_size_depth(1);
    let score = TripletScorer::new(config)
        .unwrap()
        .score(&tree, &star, &mut rng)
        .unwrap();
    assert_eq!(score.value(), 0.0);
    assert_eq!(score.num_trials(), 40);
}

#[test]
fn test_star_is_insufficient_when_ties_are_excluded() {
    let tree = simulated(2, 1.0, 12);
    let star = star_of(&tree);
    let mut rng = ChaCha8Rng::seed_from_u64(13);

    let config = ScoringConfig::new(40)
        .with_min_size_depth(1)
        .with_tie_policy(TiePolicy::Exclude);
    let result = TripletScorer::new(config)
        .unwrap()
        .score(&tree, &star, &mut rng);
    assert!(matches!(result, Err(LineageError::InsufficientData(_))));
}

#[test]
fn test_score_stays_in_unit_interval() {
    let truth = simulated(5, 1.0, 14);
    let other = simulated(5, 1.0, 15);
    let collapsed = parse_str(
        "((cell_0,cell_1,cell_2,cell_3,cell_4,cell_5,cell_6,cell_7,\
         cell_8,cell_9,cell_10,cell_11,cell_12,cell_13,cell_14,cell_15),\
         (cell_16,cell_17,cell_18,cell_19,cell_20,cell_21,cell_22,cell_23,\
         cell_24,cell_25,cell_26,cell_27,cell_28,cell_29,cell_30,cell_31));",
    )
    .unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(16);
    for reconstructed in [&truth, &other, &collapsed] {
        for modified in [false, true] {
            let config = ScoringConfig::new(200).modified(modified);
            let value = score_triplets(&truth, reconstructed, config, &mut rng).unwrap();
            assert!((0.0..=1.0).contains(&value));
        }
    }
}

#[test]
fn test_modified_score_averages_depths() {
    // Root triplets are resolved by the reconstruction, deeper ones are not
    let truth = simulated(3, 1.0, 17);
    let reconstructed =
        parse_str("((cell_0,cell_1,cell_2,cell_3),(cell_4,cell_5,cell_6,cell_7));").unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(18);

    let config = ScoringConfig::new(100).with_min_size_depth(1).modified(true);
    let score = TripletScorer::new(config)
        .unwrap()
        .score(&truth, &reconstructed, &mut rng)
        .unwrap();

    let accuracies: Vec<f64> = score
        .by_depth()
        .values()
        .filter_map(|d| d.accuracy())
        .collect();
    assert_eq!(accuracies, vec![1.0, 0.0]);
    assert_eq!(score.value(), 0.5);
}

#[test]
fn test_missing_leaf_in_reconstruction() {
    let truth = simulated(3, 1.0, 19);
    let pruned = truth
        .restricted_to(truth.samples().iter().skip(1).map(String::as_str))
        .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(20);

    // 200 trials over 8 leaves are bound to hit cell_0
    let config = ScoringConfig::new(200).with_min_size_depth(1);
    match TripletScorer::new(config).unwrap().score(&truth, &pruned, &mut rng) {
        Err(LineageError::MissingLeaf { sample, tree }) => {
            assert_eq!(sample, "cell_0");
            assert_eq!(tree, "reconstructed");
        }
        other => panic!("expected missing leaf, got {:?}", other),
    }
}

#[test]
fn test_invalid_scoring_config() {
    assert!(matches!(
        TripletScorer::new(ScoringConfig::new(0)),
        Err(LineageError::Configuration(_))
    ));
    assert!(matches!(
        TripletScorer::new(ScoringConfig::new(10).with_min_size_depth(0)),
        Err(LineageError::Configuration(_))
    ));
}

#[test]
fn test_scoring_is_reproducible() {
    let truth = simulated(5, 1.0, 21);
    let other = simulated(5, 1.0, 22);
    let config = ScoringConfig::new(300);
    let score = |seed| {
        score_triplets(&truth, &other, config, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap()
    };
    assert_eq!(score(23), score(23));
}
