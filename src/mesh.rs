use super::{Error, GridAsset, Result};
use robust::{incircle, orient2d, Coord};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

// Relative padding of the circumcircle envelopes, covering the circumcenter rounding
const ENVELOPE_PADDING: f64 = 1e-6;

fn coord([x, y]: [f64; 2]) -> Coord<f64> {
    Coord { x, y }
}

/// A counter-clockwise triangle and its circumscribed circle
///
/// The circle only locates the cell in the R-tree, the in-circle test is exact.
#[derive(Debug, Clone, PartialEq)]
struct Cell {
    vertices: [usize; 3],
    corners: [[f64; 2]; 3],
    circle: Option<([f64; 2], f64)>,
}
impl Cell {
    fn new(points: &[[f64; 2]], [a, b, c]: [usize; 3]) -> Option<Self> {
        let orientation = orient2d(coord(points[a]), coord(points[b]), coord(points[c]));
        if orientation == 0. {
            return None;
        }
        let vertices = if orientation > 0. { [a, b, c] } else { [a, c, b] };
        let corners = vertices.map(|i| points[i]);
        Some(Self {
            vertices,
            corners,
            circle: circumcircle(corners),
        })
    }
    fn encloses(&self, p: [f64; 2]) -> bool {
        let [a, b, c] = self.corners.map(coord);
        incircle(a, b, c, coord(p)) > 0.
    }
    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}
impl RTreeObject for Cell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        match self.circle {
            Some(([x, y], radius)) => {
                let r = radius + ENVELOPE_PADDING * (radius + x.abs() + y.abs());
                AABB::from_corners([x - r, y - r], [x + r, y + r])
            }
            // cells without a finite circle are kept out of the tree
            None => AABB::from_points(self.corners.iter()),
        }
    }
}

// Center and radius of the circle through `corners`
fn circumcircle([a, b, c]: [[f64; 2]; 3]) -> Option<([f64; 2], f64)> {
    let d = 2. * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    let (a2, b2, c2) = (
        a[0] * a[0] + a[1] * a[1],
        b[0] * b[0] + b[1] * b[1],
        c[0] * c[0] + c[1] * c[1],
    );
    let center = [
        (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d,
        (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d,
    ];
    let radius = ((a[0] - center[0]).powi(2) + (a[1] - center[1]).powi(2)).sqrt();
    (center.iter().all(|x| x.is_finite()) && radius.is_finite()).then_some((center, radius))
}

/// Triangles of a triangulation in progress
///
/// Nearly flat triangles have no usable circumcircle and are searched linearly.
#[derive(Default)]
struct Cells {
    tree: RTree<Cell>,
    unbounded: Vec<Cell>,
}
impl Cells {
    fn insert(&mut self, cell: Cell) {
        if cell.circle.is_some() {
            self.tree.insert(cell);
        } else {
            self.unbounded.push(cell);
        }
    }
    fn remove(&mut self, cell: &Cell) {
        if cell.circle.is_some() {
            self.tree.remove(cell);
        } else {
            self.unbounded.retain(|c| c.vertices != cell.vertices);
        }
    }
    /// Cells with `p` strictly inside their circumcircle
    fn enclosing(&self, p: [f64; 2]) -> Vec<Cell> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point(p))
            .chain(&self.unbounded)
            .filter(|cell| cell.encloses(p))
            .cloned()
            .collect()
    }
    fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.tree.iter().chain(&self.unbounded)
    }
}

/// Delaunay triangulation of scattered 2D points
#[derive(Debug, Clone)]
pub struct Triangulation {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
}
impl Triangulation {
    /// Triangulates the grid points
    ///
    /// Duplicated points are left out of the triangles but keep their index so that
    /// field values stay aligned with the grid.
    pub fn from_grid(grid: &GridAsset) -> Result<Self> {
        Self::delaunay(grid.points().collect())
    }
    /// Bowyer-Watson triangulation with exact orientation and in-circle predicates
    ///
    /// The triangles circumcircles are stored in a R-tree.
    pub fn delaunay(points: Vec<[f64; 2]>) -> Result<Self> {
        let n = points.len();
        if n < 3 {
            return Err(Error::Shape(format!(
                "cannot triangulate {n} points, at least 3 are required"
            )));
        }
        let ([x_min, y_min], [x_max, y_max]) = bounds(&points);
        let delta = (x_max - x_min).max(y_max - y_min).max(1.) * 64.;
        let (x_mid, y_mid) = ((x_min + x_max) * 0.5, (y_min + y_max) * 0.5);
        let mut work = points.clone();
        work.push([x_mid - delta, y_mid - delta]);
        work.push([x_mid + delta, y_mid - delta]);
        work.push([x_mid, y_mid + delta]);

        let mut cells = Cells::default();
        if let Some(cell) = Cell::new(&work, [n, n + 1, n + 2]) {
            cells.insert(cell);
        }
        let mut seen = HashSet::with_capacity(n);
        for (i, &p) in points.iter().enumerate() {
            if !seen.insert(p.map(f64::to_bits)) {
                debug!("skipping duplicated point #{i} {p:?}");
                continue;
            }
            let cavity = cells.enclosing(p);
            let mut edges: HashMap<(usize, usize), ((usize, usize), usize)> = HashMap::new();
            for cell in &cavity {
                for (a, b) in cell.edges() {
                    edges
                        .entry((a.min(b), a.max(b)))
                        .or_insert(((a, b), 0))
                        .1 += 1;
                }
                cells.remove(cell);
            }
            for ((a, b), count) in edges.into_values() {
                if count == 1 {
                    match Cell::new(&work, [a, b, i]) {
                        Some(cell) => cells.insert(cell),
                        None => warn!("point #{i} is aligned with the cavity edge ({a},{b})"),
                    }
                }
            }
        }
        let mut triangles: Vec<[usize; 3]> = cells
            .iter()
            .map(|cell| {
                let mut vertices = cell.vertices;
                vertices.sort_unstable();
                vertices
            })
            .filter(|v| v.iter().all(|&k| k < n))
            .collect();
        triangles.sort_unstable();
        debug!("{} points triangulated into {} triangles", n, triangles.len());
        Ok(Self { points, triangles })
    }
    /// Triangulation with explicit triangles
    pub fn from_triangles(points: Vec<[f64; 2]>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        if let Some(t) = triangles.iter().find(|t| t.iter().any(|&k| k >= points.len())) {
            return Err(Error::Shape(format!(
                "triangle {t:?} refers to a point beyond the {} grid points",
                points.len()
            )));
        }
        Ok(Self { points, triangles })
    }
    pub fn n_points(&self) -> usize {
        self.points.len()
    }
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }
    /// Lower left and upper right corners of the points bounding box
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        bounds(&self.points)
    }
    /// Total area of the triangles
    pub fn area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|t| triangle_area(t.map(|k| self.points[k])))
            .sum()
    }
}

fn bounds(points: &[[f64; 2]]) -> ([f64; 2], [f64; 2]) {
    points.iter().fold(
        ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]),
        |([x0, y0], [x1, y1]), [x, y]| ([x0.min(*x), y0.min(*y)], [x1.max(*x), y1.max(*y)]),
    )
}

pub(crate) fn triangle_area([a, b, c]: [[f64; 2]; 3]) -> f64 {
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs()
}
