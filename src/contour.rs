//! Filled contours of a field sampled at the vertices of a triangulation.
//!
//! Each triangle is clipped against the band lower and upper values, the field being
//! linearly interpolated along the triangle edges.

use super::Triangulation;

/// Closed interval of field values to fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
}
impl Band {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }
    fn contains(&self, v: f64) -> bool {
        self.lower <= v && v <= self.upper
    }
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    xy: [f64; 2],
    value: f64,
}

// Sutherland-Hodgman clipping of `polygon` against `inside(value)`
fn clip<F>(polygon: Vec<Vertex>, level: f64, inside: F) -> Vec<Vertex>
where
    F: Fn(f64) -> bool,
{
    let n = polygon.len();
    let mut clipped = Vec::with_capacity(n + 1);
    for k in 0..n {
        let p = polygon[k];
        let q = polygon[(k + 1) % n];
        match (inside(p.value), inside(q.value)) {
            (true, true) => clipped.push(q),
            (true, false) => clipped.push(crossing(p, q, level)),
            (false, true) => {
                clipped.push(crossing(p, q, level));
                clipped.push(q);
            }
            (false, false) => (),
        }
    }
    clipped
}

fn crossing(p: Vertex, q: Vertex, level: f64) -> Vertex {
    let t = (level - p.value) / (q.value - p.value);
    Vertex {
        xy: [
            p.xy[0] + t * (q.xy[0] - p.xy[0]),
            p.xy[1] + t * (q.xy[1] - p.xy[1]),
        ],
        value: level,
    }
}

/// Returns the polygons where `values` lies within `band`
///
/// `values` is aligned with the triangulation points, triangles with a NaN vertex are
/// left out.
pub fn fill_band(mesh: &Triangulation, values: &[f64], band: Band) -> Vec<Vec<[f64; 2]>> {
    let points = mesh.points();
    mesh.triangles()
        .iter()
        .filter_map(|triangle| {
            let vertices = triangle.map(|k| Vertex {
                xy: points[k],
                value: values[k],
            });
            if vertices.iter().any(|v| v.value.is_nan()) {
                return None;
            }
            if vertices.iter().all(|v| band.contains(v.value)) {
                return Some(vertices.iter().map(|v| v.xy).collect::<Vec<_>>());
            }
            if vertices.iter().all(|v| v.value < band.lower)
                || vertices.iter().all(|v| v.value > band.upper)
            {
                return None;
            }
            let polygon = clip(vertices.to_vec(), band.lower, |v| v >= band.lower);
            let polygon = clip(polygon, band.upper, |v| v <= band.upper);
            (polygon.len() > 2).then(|| polygon.into_iter().map(|v| v.xy).collect::<Vec<_>>())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon_area(polygon: &[[f64; 2]]) -> f64 {
        let n = polygon.len();
        0.5 * (0..n)
            .map(|k| {
                let (p, q) = (polygon[k], polygon[(k + 1) % n]);
                p[0] * q[1] - q[0] * p[1]
            })
            .sum::<f64>()
            .abs()
    }

    fn triangle() -> Triangulation {
        Triangulation::from_triangles(vec![[0., 0.], [2., 0.], [0., 2.]], vec![[0, 1, 2]]).unwrap()
    }

    #[test]
    fn whole_triangle() {
        let polygons = fill_band(&triangle(), &[3000., 2500., 2426.], Band::new(2425., 1e4));
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0], vec![[0., 0.], [2., 0.], [0., 2.]]);
    }

    #[test]
    fn empty_band() {
        let polygons = fill_band(&triangle(), &[2000., 2100., 2424.], Band::new(2425., 1e4));
        assert!(polygons.is_empty());
    }

    #[test]
    fn clipped_corner() {
        // above the level at the origin only, crossing at mid edges
        let polygons = fill_band(&triangle(), &[2., 0., 0.], Band::new(1., 1e4));
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 3);
        assert!((polygon_area(&polygons[0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clipped_on_both_sides() {
        let polygons = fill_band(&triangle(), &[0., 4., 4.], Band::new(1., 3.));
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].len(), 4);
        // area between the 1/4 and 3/4 iso-lines of a 2x2 right triangle
        let expected = 2. * (0.75f64.powi(2) - 0.25f64.powi(2));
        assert!((polygon_area(&polygons[0]) - expected).abs() < 1e-12);
    }

    #[test]
    fn nan_vertices_are_masked() {
        let polygons = fill_band(&triangle(), &[f64::NAN, 3000., 3000.], Band::new(2425., 1e4));
        assert!(polygons.is_empty());
    }
}
