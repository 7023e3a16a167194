use lintrace::error::LineageError;
use lintrace::model::{CharacterMatrix, CharacterState, LcaOracle, LineageTree};
use lintrace::newick::{parse_str, parse_str_with_states, to_newick, NewickStyle};

use CharacterState::{Missing, Mutated, Unmutated};

/// ((A,B),(C,D)) with mutations: 0 on the left clade, 1 only in A.
fn small_tree() -> LineageTree {
    let mut tree = LineageTree::new(2).with_name("small");
    let root = tree.add_root(vec![Unmutated, Unmutated]);
    let x = tree.add_internal(root, vec![Mutated(1), Unmutated]);
    let y = tree.add_internal(root, vec![Unmutated, Unmutated]);
    tree.add_leaf(x, "A", vec![Mutated(1), Mutated(3)]);
    tree.add_leaf(x, "B", vec![Mutated(1), Missing]);
    tree.add_leaf(y, "C", vec![Unmutated, Unmutated]);
    tree.add_leaf(y, "D", vec![Missing, Unmutated]);
    tree
}

// --- TESTS CONSTRUCTION ---
#[test]
fn test_counts_and_lookups() {
    let tree = small_tree();
    assert_eq!(tree.name(), Some("small"));
    assert_eq!(tree.num_vertices(), 7);
    assert_eq!(tree.num_leaves(), 4);
    assert_eq!(tree.num_internal(), 2);
    assert_eq!(tree.samples(), ["A", "B", "C", "D"]);
    assert!(tree.contains_sample("C"));
    assert!(!tree.contains_sample("E"));
    assert!(tree.is_binary());
    assert!(tree.is_valid());

    let a = tree.leaf_by_sample("A").unwrap();
    assert_eq!(tree[a].sample(), Some("A"));
    assert_eq!(tree.depth_of(a), 2);
    assert_eq!(tree.max_depth(), 2);
    assert_eq!(tree.mean_leaf_depth(), 2.0);
}

#[test]
#[should_panic]
fn test_duplicate_sample_panics() {
    let mut tree = LineageTree::new(0);
    let root = tree.add_root(vec![]);
    tree.add_leaf(root, "A", vec![]);
    tree.add_leaf(root, "A", vec![]);
}

#[test]
#[should_panic]
fn test_wrong_state_length_panics() {
    let mut tree = LineageTree::new(2);
    tree.add_root(vec![Unmutated]);
}

#[test]
fn test_traversals_visit_every_vertex() {
    let tree = small_tree();
    let pre: Vec<usize> = tree.pre_order_iter().map(|v| v.index()).collect();
    let post: Vec<usize> = tree.post_order_iter().map(|v| v.index()).collect();

    assert_eq!(pre.len(), 7);
    assert_eq!(post.len(), 7);
    assert_eq!(pre[0], tree.root_index());
    assert_eq!(*post.last().unwrap(), tree.root_index());

    // Children come after their parent in pre-order and before it in post-order
    for vertex in tree.vertices() {
        let pos_pre = pre.iter().position(|&i| i == vertex.index()).unwrap();
        let pos_post = post.iter().position(|&i| i == vertex.index()).unwrap();
        for &child in vertex.children() {
            assert!(pre.iter().position(|&i| i == child).unwrap() > pos_pre);
            assert!(post.iter().position(|&i| i == child).unwrap() < pos_post);
        }
    }
}

#[test]
fn test_leaf_counts_and_subtrees() {
    let tree = small_tree();
    let counts = tree.leaf_counts();
    assert_eq!(counts[tree.root_index()], 4);

    let x = tree.parent(tree.leaf_by_sample("A").unwrap()).unwrap();
    assert_eq!(counts[x], 2);
    let mut below: Vec<&str> = tree
        .leaves_in_subtree(x)
        .into_iter()
        .filter_map(|l| tree[l].sample())
        .collect();
    below.sort();
    assert_eq!(below, vec!["A", "B"]);
}

// --- TESTS CHARACTERS ---
#[test]
fn test_character_matrix() {
    let matrix = small_tree().character_matrix();
    assert_eq!(matrix.num_cells(), 4);
    assert_eq!(matrix.num_characters(), 2);
    assert_eq!(matrix.get("A"), Some(&[Mutated(1), Mutated(3)][..]));
    assert_eq!(matrix.get("E"), None);
    assert_eq!(matrix.missing_proportions(), vec![0.25, 0.25]);
    assert_eq!(matrix.to_string(), "cell\tr0\tr1\nA\t1\t3\nB\t1\t-\nC\t0\t0\nD\t-\t0\n");
}

#[test]
fn test_character_matrix_rejects_bad_rows() {
    let mut matrix = CharacterMatrix::new(2);
    assert!(matrix.add_row("A", vec![Unmutated, Mutated(1)]).is_ok());
    assert!(matches!(
        matrix.add_row("A", vec![Unmutated, Unmutated]),
        Err(LineageError::Configuration(_))
    ));
    assert!(matches!(
        matrix.add_row("B", vec![Unmutated]),
        Err(LineageError::Configuration(_))
    ));
}

#[test]
fn test_mutations_along_edges() {
    let tree = small_tree();
    let a = tree.leaf_by_sample("A").unwrap();
    let x = tree.parent(a).unwrap();

    assert_eq!(tree.mutations_along_edge(tree.root_index(), x).unwrap(), vec![(0, 1)]);
    assert_eq!(tree.mutations_along_edge(x, a).unwrap(), vec![(1, 3)]);
    assert!(matches!(
        tree.mutations_along_edge(a, x),
        Err(LineageError::InvalidTree(_))
    ));
}

#[test]
fn test_ancestral_reconstruction() {
    let mut matrix = CharacterMatrix::new(3);
    matrix.add_row("A", vec![Mutated(1), Mutated(2), Missing]).unwrap();
    matrix.add_row("B", vec![Mutated(1), Mutated(3), Missing]).unwrap();
    matrix.add_row("C", vec![Unmutated, Mutated(2), Mutated(4)]).unwrap();

    let tree = parse_str_with_states("((A,B),C);", &matrix).unwrap();
    let a = tree.leaf_by_sample("A").unwrap();
    let ab = tree.parent(a).unwrap();

    assert_eq!(tree[ab].states(), [Mutated(1), Unmutated, Missing]);
    assert_eq!(tree.root().states(), [Unmutated, Unmutated, Mutated(4)]);
}

// --- TESTS DERIVED TREES ---
#[test]
fn test_restriction_keeps_ancestry() {
    let tree = small_tree();
    let restricted = tree.restricted_to(["A", "B", "D"]).unwrap();

    assert_eq!(restricted.num_leaves(), 3);
    assert!(!restricted.contains_sample("C"));
    assert!(restricted.is_valid());
    // y keeps only D, so it is unary
    assert!(!restricted.is_binary());
    assert_eq!(restricted.name(), Some("small"));
    assert_eq!(to_newick(&restricted, NewickStyle::Sample), "((A,B),(D));");

    let collapsed = restricted.collapse_unifurcations();
    assert!(collapsed.is_binary());
    assert_eq!(collapsed.num_vertices(), 5);
    assert_eq!(to_newick(&collapsed, NewickStyle::Sample), "((A,B),D);");
    let d = collapsed.leaf_by_sample("D").unwrap();
    assert_eq!(collapsed[d].states(), [Missing, Unmutated]);
}

#[test]
fn test_restriction_errors() {
    let tree = small_tree();
    assert!(matches!(
        tree.restricted_to(["A", "E"]),
        Err(LineageError::MissingLeaf { .. })
    ));
    assert!(matches!(
        tree.restricted_to(std::iter::empty::<&str>()),
        Err(LineageError::InvalidTree(_))
    ));
}

#[test]
fn test_collapse_unary_root_chain() {
    let tree = parse_str("((((A,B),C)));").unwrap();
    let collapsed = tree.collapse_unifurcations();
    assert_eq!(to_newick(&collapsed, NewickStyle::Sample), "((A,B),C);");
    assert!(collapsed.is_valid());
}

// --- TESTS LCA ---
#[test]
fn test_lca_queries() {
    let tree = small_tree();
    let lca = LcaOracle::new(&tree);
    let leaf = |s: &str| tree.leaf_by_sample(s).unwrap();
    let x = tree.parent(leaf("A")).unwrap();

    assert_eq!(lca.lca(leaf("A"), leaf("B")), x);
    assert_eq!(lca.lca(leaf("A"), leaf("C")), tree.root_index());
    assert_eq!(lca.lca(leaf("A"), leaf("A")), leaf("A"));
    assert_eq!(lca.lca(x, leaf("B")), x);
    assert_eq!(lca.lca3(leaf("A"), leaf("B"), leaf("D")), tree.root_index());
    assert_eq!(lca.depth(x), 1);
}
