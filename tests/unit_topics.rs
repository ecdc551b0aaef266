// Unit tests for the topic extraction building blocks.
//
// Exercises the public surface of the cluster partitioner, the class
// TF-IDF term model, and the label filter chain as separate pieces; the
// end-to-end pipeline has its own test file.

use banter::topics::cluster::{self, cluster_count};
use banter::topics::ctfidf::{ClusterDocument, TermMatrix, TermModelError};
use banter::topics::label::{default_filters, select_label, MAX_CANDIDATES};

// ============================================================
// Cluster count policy
// ============================================================

#[test]
fn cluster_count_floors_at_three() {
    for n in [10, 15, 29, 35] {
        assert_eq!(cluster_count(n), 3.max(n / 10), "n = {n}");
    }
    assert_eq!(cluster_count(10), 3);
    assert_eq!(cluster_count(29), 3);
}

#[test]
fn cluster_count_tracks_tenth_of_batch() {
    assert_eq!(cluster_count(50), 5);
    assert_eq!(cluster_count(100), 10);
    assert_eq!(cluster_count(137), 13);
}

#[test]
fn cluster_count_caps_at_twenty() {
    assert_eq!(cluster_count(200), 20);
    assert_eq!(cluster_count(250), 20);
    assert_eq!(cluster_count(3000), 20);
}

// ============================================================
// Partitioner invariants
// ============================================================

fn grid_points(groups: usize, per_group: usize) -> Vec<Vec<f64>> {
    // Well-separated groups with slight in-group spread
    let mut points = Vec::new();
    for g in 0..groups {
        for i in 0..per_group {
            points.push(vec![g as f64 * 100.0 + i as f64 * 0.1, g as f64 * -50.0]);
        }
    }
    points
}

#[test]
fn partition_is_exhaustive_and_disjoint() {
    let points = grid_points(4, 8);
    let clusters = cluster::partition(&points, 4);

    let mut all: Vec<usize> = clusters.iter().flat_map(|c| c.members.clone()).collect();
    all.sort_unstable();
    assert_eq!(all, (0..32).collect::<Vec<_>>());
}

#[test]
fn partition_produces_requested_cluster_count() {
    let points = grid_points(3, 10);
    assert_eq!(cluster::partition(&points, 3).len(), 3);
    assert_eq!(cluster::partition(&points, 7).len(), 7);
}

#[test]
fn partition_groups_separated_points_together() {
    let points = grid_points(3, 5);
    let clusters = cluster::partition(&points, 3);
    assert_eq!(clusters[0].members, vec![0, 1, 2, 3, 4]);
    assert_eq!(clusters[1].members, vec![5, 6, 7, 8, 9]);
    assert_eq!(clusters[2].members, vec![10, 11, 12, 13, 14]);
}

#[test]
fn partition_same_input_same_output() {
    let points = grid_points(5, 6);
    assert_eq!(cluster::partition(&points, 4), cluster::partition(&points, 4));
}

// ============================================================
// Term model — alignment and failure modes
// ============================================================

fn docs_from(texts: &[(usize, usize, &str)]) -> Vec<ClusterDocument> {
    texts
        .iter()
        .map(|&(cluster_id, size, text)| ClusterDocument {
            cluster_id,
            size,
            text: text.to_string(),
        })
        .collect()
}

#[test]
fn term_model_rows_align_with_documents() {
    let docs = docs_from(&[
        (0, 3, "kayak paddle rapids kayak"),
        (2, 5, "orchid greenhouse pollen"),
        (7, 1, "marathon sneakers pacing"),
    ]);
    let matrix = TermMatrix::build(&docs).unwrap();

    // Row order matches document order regardless of cluster ids
    assert_eq!(matrix.ranked_terms(0)[0], "kayak");
    assert!(matrix.weight(1, "orchid") > 0.0);
    assert!(matrix.weight(2, "kayak") == 0.0);
}

#[test]
fn term_model_degenerate_when_all_terms_shared() {
    let docs = docs_from(&[
        (0, 2, "campfire marshmallow"),
        (1, 2, "campfire marshmallow"),
        (2, 2, "campfire marshmallow"),
    ]);
    assert!(matches!(
        TermMatrix::build(&docs),
        Err(TermModelError::DegenerateVocabulary)
    ));
}

#[test]
fn term_model_survives_empty_document() {
    // An empty document contributes nothing but must not break alignment
    let docs = docs_from(&[
        (0, 4, "glacier crevasse icefall"),
        (1, 2, ""),
        (2, 3, "cactus terrarium succulent"),
    ]);
    let matrix = TermMatrix::build(&docs).unwrap();
    assert!(matrix.ranked_terms(1).iter().all(|t| matrix.weight(1, t) == 0.0));
    assert!(matrix.weight(2, "cactus") > 0.0);
}

// ============================================================
// Label filter chain
// ============================================================

#[test]
fn filters_apply_in_any_combination() {
    let filters = default_filters(&["espresso".to_string()]);

    // chat stoplist
    assert_eq!(select_label(vec!["gonna"], &filters), None);
    // caller stoplist
    assert_eq!(select_label(vec!["espresso"], &filters), None);
    // length
    assert_eq!(select_label(vec!["oak"], &filters), None);
    // digits
    assert_eq!(select_label(vec!["catch22"], &filters), None);
    // survivor
    assert_eq!(
        select_label(vec!["gonna", "espresso", "oak", "catch22", "arborist"], &filters),
        Some("arborist".to_string())
    );
}

#[test]
fn rank_order_beats_later_candidates() {
    // A weaker-but-valid candidate ahead of a stronger one wins — the
    // scan takes the first survivor, full stop.
    let filters = default_filters(&[]);
    assert_eq!(
        select_label(vec!["stadium", "championship"], &filters),
        Some("stadium".to_string())
    );
}

#[test]
fn candidate_window_is_twenty() {
    let filters = default_filters(&[]);
    let mut candidates = vec!["no"; MAX_CANDIDATES];
    candidates.push("harvest");
    assert_eq!(select_label(candidates, &filters), None);
}
