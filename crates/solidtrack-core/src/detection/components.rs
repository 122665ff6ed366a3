use ndarray::Array2;

use crate::frame::{BoundingBox, Mask};

use super::config::Connectivity;

/// Integer label per pixel: 0 is background, 1..=n one connected region each.
pub type LabelMap = Array2<u32>;

/// Measurements for a single labeled region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Label of this region in its [`LabelMap`].
    pub label: u32,
    /// Number of pixels in the region.
    pub area: usize,
    /// Half-open bounding box of the region.
    pub bbox: BoundingBox,
}

/// Label the connected foreground (nonzero) components of a mask using
/// two-pass labeling with union-find.
///
/// Labels are numbered 1..=n in raster order of each region's first pixel.
/// Returns the label map and the number of regions.
pub fn label(mask: &Mask, connectivity: Connectivity) -> (LabelMap, usize) {
    let (h, w) = mask.dim();
    let mut labels = LabelMap::zeros((h, w));
    if h == 0 || w == 0 {
        return (labels, 0);
    }

    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0];

    // Pass 1: assign provisional labels from already-visited neighbors.
    for row in 0..h {
        for col in 0..w {
            if mask[[row, col]] == 0 {
                continue;
            }

            let mut neighbors = [0u32; 4];
            if col > 0 {
                neighbors[0] = labels[[row, col - 1]];
            }
            if row > 0 {
                neighbors[1] = labels[[row - 1, col]];
                if connectivity == Connectivity::Eight {
                    if col > 0 {
                        neighbors[2] = labels[[row - 1, col - 1]];
                    }
                    if col + 1 < w {
                        neighbors[3] = labels[[row - 1, col + 1]];
                    }
                }
            }

            let smallest = neighbors.iter().copied().filter(|&l| l > 0).min();
            match smallest {
                None => {
                    let next = parent.len() as u32;
                    parent.push(next);
                    labels[[row, col]] = next;
                }
                Some(min_label) => {
                    labels[[row, col]] = min_label;
                    for &other in neighbors.iter().filter(|&&l| l > 0 && l != min_label) {
                        union(&mut parent, min_label, other);
                    }
                }
            }
        }
    }

    // Pass 2: resolve roots and renumber them in raster order.
    let mut compact = vec![0u32; parent.len()];
    let mut count = 0u32;
    for lbl in labels.iter_mut() {
        if *lbl == 0 {
            continue;
        }
        let root = find(&parent, *lbl) as usize;
        if compact[root] == 0 {
            count += 1;
            compact[root] = count;
        }
        *lbl = compact[root];
    }

    (labels, count as usize)
}

/// Measure area and bounding box of every region in a label map, ordered by label.
pub fn regions(labels: &LabelMap) -> Vec<Region> {
    let mut stats: Vec<Option<Region>> = Vec::new();

    for ((row, col), &lbl) in labels.indexed_iter() {
        if lbl == 0 {
            continue;
        }
        let idx = lbl as usize - 1;
        if idx >= stats.len() {
            stats.resize(idx + 1, None);
        }
        let entry = stats[idx].get_or_insert(Region {
            label: lbl,
            area: 0,
            bbox: BoundingBox::new(row, col, row + 1, col + 1),
        });
        entry.area += 1;
        entry.bbox = entry
            .bbox
            .union(&BoundingBox::new(row, col, row + 1, col + 1));
    }

    stats.into_iter().flatten().collect()
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
