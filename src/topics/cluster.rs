// Cluster partitioning — hierarchical agglomerative clustering over
// sentence embeddings.
//
// Bottom-up: every message starts as its own cluster, and the two closest
// clusters are merged repeatedly until exactly K remain. Distances between
// merged clusters use average linkage (Lance-Williams update), so two
// groups are as close as the average pairwise distance of their members.
//
// Determinism matters here: the same batch must always produce the same
// partition. All ties are broken by lowest cluster index.

use tracing::debug;

/// How many clusters to request for a batch of `n` messages.
///
/// Roughly one cluster per ten messages, floored at 3 and capped at 20.
pub fn cluster_count(n: usize) -> usize {
    (n / 10).clamp(3, 20)
}

/// A group of message indices sharing one cluster label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Cluster id in 0..K, assigned by smallest member index
    pub id: usize,
    /// Indices into the original message batch, ascending
    pub members: Vec<usize>,
}

/// Partition `embeddings` into exactly `k` flat clusters.
///
/// Every input index lands in exactly one cluster. When `k >= n` each
/// point gets its own cluster and fewer than `k` are returned — the
/// pipeline guards batch size so this only happens in degenerate inputs.
pub fn partition(embeddings: &[Vec<f64>], k: usize) -> Vec<Cluster> {
    let n = embeddings.len();
    let k = k.max(1);
    if n == 0 {
        return Vec::new();
    }
    if k >= n {
        return (0..n)
            .map(|i| Cluster {
                id: i,
                members: vec![i],
            })
            .collect();
    }

    // Full pairwise distance matrix, flat n*n. f32 halves the memory for
    // large batches and is plenty of precision for linkage comparisons.
    let mut dist = vec![0.0f32; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&embeddings[i], &embeddings[j]) as f32;
            dist[i * n + j] = d;
            dist[j * n + i] = d;
        }
    }

    let mut active = vec![true; n];
    let mut size = vec![1usize; n];
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    let mut remaining = n;

    // Nearest-neighbor cache: for each active cluster, the closest other
    // active cluster and its distance. Invalidated entries are rescanned
    // after each merge.
    let mut nearest: Vec<(usize, f32)> = (0..n)
        .map(|i| scan_nearest(&dist, &active, n, i))
        .collect();

    while remaining > k {
        // Pick the globally closest pair. Strict less-than keeps the
        // lowest-index pair on ties.
        let mut best = usize::MAX;
        for i in 0..n {
            if active[i] && (best == usize::MAX || nearest[i].1 < nearest[best].1) {
                best = i;
            }
        }
        let (mut a, mut b) = (best, nearest[best].0);
        if b < a {
            std::mem::swap(&mut a, &mut b);
        }

        // Average linkage: the distance from any cluster to the merged
        // pair is the size-weighted mean of its distances to each half.
        let (sa, sb) = (size[a] as f32, size[b] as f32);
        for l in 0..n {
            if active[l] && l != a && l != b {
                let d = (sa * dist[a * n + l] + sb * dist[b * n + l]) / (sa + sb);
                dist[a * n + l] = d;
                dist[l * n + a] = d;
            }
        }

        let moved = std::mem::take(&mut members[b]);
        members[a].extend(moved);
        size[a] += size[b];
        active[b] = false;
        remaining -= 1;

        nearest[a] = scan_nearest(&dist, &active, n, a);
        for l in 0..n {
            if !active[l] || l == a {
                continue;
            }
            if nearest[l].0 == a || nearest[l].0 == b {
                // The cached neighbor changed (or vanished) — rescan.
                nearest[l] = scan_nearest(&dist, &active, n, l);
            } else if dist[l * n + a] < nearest[l].1 {
                nearest[l] = (a, dist[l * n + a]);
            }
        }
    }

    let mut clusters: Vec<Vec<usize>> = (0..n)
        .filter(|&i| active[i])
        .map(|i| {
            let mut m = std::mem::take(&mut members[i]);
            m.sort_unstable();
            m
        })
        .collect();
    // Stable ids: order clusters by their smallest member index.
    clusters.sort_by_key(|m| m[0]);

    debug!(points = n, clusters = clusters.len(), "Agglomerative clustering done");

    clusters
        .into_iter()
        .enumerate()
        .map(|(id, members)| Cluster { id, members })
        .collect()
}

/// Closest active cluster to `i`, lowest index winning ties.
fn scan_nearest(dist: &[f32], active: &[bool], n: usize, i: usize) -> (usize, f32) {
    let mut best = (usize::MAX, f32::INFINITY);
    for j in 0..n {
        if j != i && active[j] && dist[i * n + j] < best.1 {
            best = (j, dist[i * n + j]);
        }
    }
    best
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
