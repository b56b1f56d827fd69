//! # Bitmap outline tracing
//!
//! Every boundary between an ink pixel and a blank pixel becomes a unit edge
//! on the pixel-corner grid, oriented so that ink lies on the right of the
//! direction of travel. Edges are then chained into closed loops and
//! collinear corners are dropped.
//!
//! With ink on the right, outer boundaries run clockwise and holes run
//! counter-clockwise as seen on screen, which is the TrueType convention once
//! the outline is placed in font space.

use std::collections::HashMap;

use log::debug;

use crate::bitmap::Bitmap;

/// Cardinal direction on the pixel grid (y down).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dir {
    /// Positive Y
    Down,
    /// Negative Y
    Up,
    /// Negative X
    Left,
    /// Positive X
    Right,
}

impl Dir {
    fn of((ax, ay): (i64, i64), (bx, by): (i64, i64)) -> Dir {
        if ax == bx {
            if ay < by { Dir::Down } else { Dir::Up }
        } else if ax < bx {
            Dir::Right
        } else {
            Dir::Left
        }
    }

    /// Direction after turning right, as seen by someone travelling in `self`.
    fn right(self) -> Dir {
        match self {
            Dir::Right => Dir::Down,
            Dir::Down => Dir::Left,
            Dir::Left => Dir::Up,
            Dir::Up => Dir::Right,
        }
    }

    fn left(self) -> Dir {
        match self {
            Dir::Right => Dir::Up,
            Dir::Up => Dir::Left,
            Dir::Left => Dir::Down,
            Dir::Down => Dir::Right,
        }
    }
}

/// Options controlling how an image is turned into outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOptions {
    /// Luma below which an opaque pixel is ink.
    pub threshold: u8,
    /// Loops enclosing at most this many pixels are discarded.
    pub despeckle: u32,
}

impl TraceOptions {
    pub const DEFAULT: Self = Self { threshold: 128, despeckle: 0 };
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A closed polygon with corners on the pixel grid, in image coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    pub points: Vec<(i64, i64)>,
}

impl Polygon {
    /// Signed area in pixels; positive for loops running clockwise on screen.
    pub fn signed_area(&self) -> i64 {
        let n = self.points.len();
        let twice: i64 = (0..n)
            .map(|i| {
                let (x0, y0) = self.points[i];
                let (x1, y1) = self.points[(i + 1) % n];
                x0 * y1 - x1 * y0
            })
            .sum();
        twice / 2
    }

    /// True for loops that bound ink from the outside.
    pub fn is_outer(&self) -> bool {
        self.signed_area() > 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: (i64, i64),
    to: (i64, i64),
    dir: Dir,
}

/// Trace all boundaries of the ink in `bitmap`.
pub fn trace(bitmap: &Bitmap, options: &TraceOptions) -> Vec<Polygon> {
    let edges = boundary_edges(bitmap);
    let mut outgoing: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.from).or_default().push(idx);
    }

    let mut used = vec![false; edges.len()];
    let mut polygons = Vec::new();

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let start = edges[first].from;
        let mut corners = vec![start];
        let mut current = first;

        loop {
            let edge = edges[current];
            let candidates = outgoing.get(&edge.to).map(Vec::as_slice).unwrap_or(&[]);
            let next = [edge.dir.right(), edge.dir, edge.dir.left()].into_iter().find_map(|dir| {
                candidates
                    .iter()
                    .copied()
                    .find(|&idx| edges[idx].dir == dir && (!used[idx] || idx == first))
            });
            match next {
                Some(idx) if idx == first => break,
                Some(idx) => {
                    used[idx] = true;
                    corners.push(edges[idx].from);
                    current = idx;
                }
                None => break,
            }
        }

        let polygon = Polygon { points: simplify(&corners) };
        if polygon.signed_area().unsigned_abs() <= u64::from(options.despeckle) {
            debug!("Despeckle dropped loop of {} pixels", polygon.signed_area().abs());
            continue;
        }
        polygons.push(polygon);
    }

    polygons
}

/// Unit edges between ink and blank pixels, in row-major pixel order.
fn boundary_edges(bitmap: &Bitmap) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut push = |from: (i64, i64), to: (i64, i64)| {
        edges.push(Edge { from, to, dir: Dir::of(from, to) });
    };

    for y in 0..i64::from(bitmap.height()) {
        for x in 0..i64::from(bitmap.width()) {
            if !bitmap.ink_at(x, y) {
                continue;
            }
            if !bitmap.ink_at(x, y - 1) {
                push((x, y), (x + 1, y));
            }
            if !bitmap.ink_at(x + 1, y) {
                push((x + 1, y), (x + 1, y + 1));
            }
            if !bitmap.ink_at(x, y + 1) {
                push((x + 1, y + 1), (x, y + 1));
            }
            if !bitmap.ink_at(x - 1, y) {
                push((x, y + 1), (x, y));
            }
        }
    }

    edges
}

/// Keep only the corners where the direction changes.
fn simplify(points: &[(i64, i64)]) -> Vec<(i64, i64)> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let here = points[i];
            let next = points[(i + 1) % n];
            Dir::of(prev, here) != Dir::of(here, next)
        })
        .map(|i| points[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(rows: &[&str]) -> Bitmap {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        Bitmap::from_fn(width, height, |x, y| rows[y as usize].as_bytes()[x as usize] == b'#')
    }

    #[test]
    fn test_single_pixel() {
        let polygons = trace(&bitmap(&["#"]), &TraceOptions::DEFAULT);
        assert_eq!(polygons, vec![Polygon { points: vec![(0, 0), (1, 0), (1, 1), (0, 1)] }]);
        assert_eq!(polygons[0].signed_area(), 1);
        assert!(polygons[0].is_outer());
    }

    #[test]
    fn test_block_collapses_to_four_corners() {
        let polygons = trace(&bitmap(&["....", ".##.", ".##.", ".##.", "...."]), &TraceOptions::DEFAULT);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].points, vec![(1, 1), (3, 1), (3, 4), (1, 4)]);
        assert_eq!(polygons[0].signed_area(), 6);
    }

    #[test]
    fn test_ring_has_hole_with_opposite_winding() {
        let polygons = trace(&bitmap(&["###", "#.#", "###"]), &TraceOptions::DEFAULT);
        assert_eq!(polygons.len(), 2);
        let outer = polygons.iter().find(|p| p.is_outer()).unwrap();
        let hole = polygons.iter().find(|p| !p.is_outer()).unwrap();
        assert_eq!(outer.signed_area(), 9);
        assert_eq!(hole.signed_area(), -1);
        assert_eq!(hole.points.len(), 4);
    }

    #[test]
    fn test_diagonal_pixels_stay_separate() {
        let polygons = trace(&bitmap(&["#.", ".#"]), &TraceOptions::DEFAULT);
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| p.signed_area() == 1));
    }

    #[test]
    fn test_l_shape() {
        let polygons = trace(&bitmap(&["#.", "##"]), &TraceOptions::DEFAULT);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].points.len(), 6);
        assert_eq!(polygons[0].signed_area(), 3);
    }

    #[test]
    fn test_despeckle_drops_small_loops() {
        let rows = ["#....", ".....", "..###", "..###", "..###"];
        let options = TraceOptions { despeckle: 2, ..TraceOptions::DEFAULT };
        let polygons = trace(&bitmap(&rows), &options);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].signed_area(), 9);
    }

    #[test]
    fn test_blank_bitmap_traces_nothing() {
        assert!(trace(&Bitmap::new(4, 4), &TraceOptions::DEFAULT).is_empty());
    }
}
