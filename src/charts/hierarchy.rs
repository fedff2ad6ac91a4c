use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use super::RangeChart;
use crate::data::filter::rows_in_range;
use crate::data::model::{Dataset, Series};
use crate::selection::YearRange;

// ---------------------------------------------------------------------------
// Hierarchy: series → year → country, weighted by happiness score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub series: Option<Series>,
    pub value: f64,
    pub children: Vec<Node>,
}

impl Node {
    fn branch(name: String, series: Option<Series>, mut children: Vec<Node>) -> Node {
        children.sort_by(|a, b| b.value.total_cmp(&a.value));
        Node {
            name,
            series,
            value: children.iter().map(|c| c.value).sum(),
            children,
        }
    }

    fn height(&self) -> usize {
        self.children.iter().map(|c| c.height() + 1).max().unwrap_or(0)
    }
}

/// Build the tree for `range`. Missing scores weigh nothing.
pub fn build_tree(dataset: &Dataset, range: YearRange) -> Node {
    let series_nodes = Series::ALL
        .iter()
        .map(|&series| {
            let mut by_year: BTreeMap<i32, Vec<Node>> = BTreeMap::new();
            for o in rows_in_range(dataset, series, range) {
                let score = o.happiness();
                by_year.entry(o.year).or_default().push(Node {
                    name: o.country.clone(),
                    series: Some(series),
                    value: if score.is_finite() { score.max(0.0) } else { 0.0 },
                    children: Vec::new(),
                });
            }
            let years = by_year
                .into_iter()
                .map(|(year, leaves)| Node::branch(year.to_string(), Some(series), leaves))
                .collect();
            Node::branch(series.label().to_string(), Some(series), years)
        })
        .collect();
    Node::branch("Happiness".to_string(), None, series_nodes)
}

// ---------------------------------------------------------------------------
// Sunburst – angular partition of the tree
// ---------------------------------------------------------------------------

/// One ring segment. Radii are fractions of the outer radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub name: String,
    pub series: Option<Series>,
    pub depth: usize,
    pub value: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

#[derive(Debug)]
pub struct Sunburst {
    dataset: Rc<Dataset>,
    last_range: Option<YearRange>,
    pub sectors: Vec<Sector>,
}

impl Sunburst {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        Sunburst {
            dataset,
            last_range: None,
            sectors: Vec::new(),
        }
    }
}

/// Partition `node` over `[start, end)`, depth rings of equal width. The
/// root itself is not emitted; zero-weight nodes get no sector.
fn partition(node: &Node, depth: usize, start: f64, end: f64, rings: f64, out: &mut Vec<Sector>) {
    if node.value <= 0.0 {
        return;
    }
    if depth > 0 {
        out.push(Sector {
            name: node.name.clone(),
            series: node.series,
            depth,
            value: node.value,
            start_angle: start,
            end_angle: end,
            inner_radius: depth as f64 / rings,
            outer_radius: (depth + 1) as f64 / rings,
        });
    }
    let mut angle = start;
    for child in &node.children {
        let span = (end - start) * child.value / node.value;
        partition(child, depth + 1, angle, angle + span, rings, out);
        angle += span;
    }
}

impl RangeChart for Sunburst {
    fn title(&self) -> &str {
        "Happiness sunburst"
    }

    fn render(&mut self, range: YearRange) {
        let tree = build_tree(&self.dataset, range);
        let rings = (tree.height() + 1) as f64;
        self.sectors.clear();
        partition(&tree, 0, 0.0, TAU, rings, &mut self.sectors);
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.sectors.len()
    }
}

// ---------------------------------------------------------------------------
// Circular packing – one disc per series, leaves on concentric rings
// ---------------------------------------------------------------------------

/// Multiplier applied to scores before sizing circles by area.
pub const PACK_VALUE_SCALE: f64 = 10.0;
const PACK_GAP: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PackCircle {
    pub label: String,
    pub series: Series,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackGroup {
    pub series: Series,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub leaves: Vec<PackCircle>,
}

#[derive(Debug)]
pub struct Packing {
    dataset: Rc<Dataset>,
    last_range: Option<YearRange>,
    pub groups: Vec<PackGroup>,
}

impl Packing {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        Packing {
            dataset,
            last_range: None,
            groups: Vec::new(),
        }
    }
}

/// Place `values` (largest first) on rings around the origin: one at the
/// centre, then up to `6k` on ring `k`. Ring spacing of one diameter keeps
/// circles apart. Returns `(x, y, r)` per value and the enclosing radius.
fn ring_layout(values: &[f64]) -> (Vec<(f64, f64, f64)>, f64) {
    let radii: Vec<f64> = values.iter().map(|v| v.max(0.0).sqrt()).collect();
    let r_max = radii.iter().copied().fold(0.0, f64::max);
    if r_max == 0.0 {
        return (Vec::new(), 0.0);
    }
    let pitch = 2.0 * r_max + PACK_GAP;

    let capacity = |ring: usize| if ring == 0 { 1 } else { 6 * ring };
    let mut placed = Vec::with_capacity(radii.len());
    let mut ring = 0usize;
    let mut slot = 0usize;
    for &r in &radii {
        if slot == capacity(ring) {
            ring += 1;
            slot = 0;
        }
        let (x, y) = if ring == 0 {
            (0.0, 0.0)
        } else {
            let angle = TAU * slot as f64 / capacity(ring) as f64;
            let d = pitch * ring as f64;
            (d * angle.cos(), d * angle.sin())
        };
        placed.push((x, y, r));
        slot += 1;
    }
    (placed, pitch * ring as f64 + r_max)
}

impl RangeChart for Packing {
    fn title(&self) -> &str {
        "Circular packing"
    }

    fn render(&mut self, range: YearRange) {
        let mut groups = Vec::new();
        let mut cursor = 0.0;
        for series in Series::ALL {
            let mut rows: Vec<(String, f64)> = rows_in_range(&self.dataset, series, range)
                .into_iter()
                .filter(|o| o.happiness().is_finite() && o.happiness() > 0.0)
                .map(|o| (format!("{} ({})", o.country, o.year), o.happiness() * PACK_VALUE_SCALE))
                .collect();
            if rows.is_empty() {
                continue;
            }
            rows.sort_by(|a, b| b.1.total_cmp(&a.1));
            let values: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();
            let (placed, radius) = ring_layout(&values);

            let cx = cursor + radius;
            cursor += 2.0 * radius + PACK_GAP * 4.0;
            let leaves = rows
                .into_iter()
                .zip(placed)
                .map(|((label, value), (x, y, r))| PackCircle {
                    label,
                    series,
                    value,
                    x: cx + x,
                    y,
                    r,
                })
                .collect();
            groups.push(PackGroup {
                series,
                x: cx,
                y: 0.0,
                r: radius,
                leaves,
            });
        }
        self.groups = groups;
        self.last_range = Some(range);
    }

    fn last_range(&self) -> Option<YearRange> {
        self.last_range
    }

    fn shape_count(&self) -> usize {
        self.groups.iter().map(|g| g.leaves.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;

    fn range(min: i32, max: i32) -> YearRange {
        YearRange::new(min, max).unwrap()
    }

    #[test]
    fn tree_sums_leaf_scores() {
        let ds = sample_dataset();
        let tree = build_tree(&ds, range(2015, 2015));
        assert!((tree.value - (7.4 + 3.2 + 4.5)).abs() < 1e-9);
        assert_eq!(tree.children[0].name, "Best", "children sorted by value");
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn sectors_partition_the_circle() {
        let mut sun = Sunburst::new(Rc::new(sample_dataset()));
        sun.render(range(2015, 2017));
        let top: Vec<&Sector> = sun.sectors.iter().filter(|s| s.depth == 1).collect();
        assert_eq!(top.len(), 3);
        let covered: f64 = top.iter().map(|s| s.end_angle - s.start_angle).sum();
        assert!((covered - TAU).abs() < 1e-9);
        assert_eq!(top[0].inner_radius, 0.25);
        // 3 series + 3 * 3 years + 9 leaves
        assert_eq!(sun.shape_count(), 3 + 9 + 9);
    }

    #[test]
    fn sunburst_without_ukraine_rows_has_no_ukraine_sectors() {
        let mut sun = Sunburst::new(Rc::new(sample_dataset()));
        sun.render(range(2023, 2024));
        assert!(sun.sectors.iter().all(|s| s.series != Some(Series::Ukraine)));
        assert!(sun.sectors.iter().any(|s| s.series == Some(Series::Best)));
    }

    #[test]
    fn packed_circles_do_not_overlap() {
        let values: Vec<f64> = (1..=20).rev().map(|v| v as f64 * 10.0).collect();
        let (placed, radius) = ring_layout(&values);
        assert_eq!(placed.len(), values.len());
        for (i, a) in placed.iter().enumerate() {
            assert!(a.0.hypot(a.1) + a.2 <= radius + 1e-9);
            for b in &placed[i + 1..] {
                let d = (a.0 - b.0).hypot(a.1 - b.1);
                assert!(d >= a.2 + b.2 - 1e-9);
            }
        }
    }

    #[test]
    fn packing_groups_follow_the_range() {
        let mut pack = Packing::new(Rc::new(sample_dataset()));
        pack.render(range(2020, 2022));
        let series: Vec<Series> = pack.groups.iter().map(|g| g.series).collect();
        assert_eq!(series, vec![Series::Best, Series::Worst, Series::Ukraine]);
        assert_eq!(pack.groups[2].leaves.len(), 2);
        assert_eq!(pack.groups[0].leaves[0].label, "Finland (2022)");

        pack.render(range(2023, 2024));
        assert_eq!(pack.groups.len(), 2);
    }
}
