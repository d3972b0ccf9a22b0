use derive_more::{Deref, From, Into};
use ndarray::Array2;

/// A single 3D coordinate. Meshes with 2D node tables are stored with `z = 0`
pub type Point = [f64; 3];

#[derive(Debug, Clone, PartialEq, Default, Deref, From, Into)]
/// A planar polygon built from the nodes bounding a single mesh element.
///
/// The ring is stored open: the first vertex is not repeated at the end. Use
/// [`Polygon::closed_ring`] for consumers that want an explicitly closed ring.
/// Winding follows the element's node order and is not canonicalized.
pub struct Polygon {
    ring: Vec<Point>,
}

impl Polygon {
    pub fn new(ring: Vec<Point>) -> Self {
        Self { ring }
    }

    pub fn ring(&self) -> &[Point] {
        &self.ring
    }

    /// the ring with its first vertex appended at the end
    pub fn closed_ring(&self) -> Vec<Point> {
        let mut closed = self.ring.clone();
        if let Some(first) = self.ring.first() {
            closed.push(*first);
        }
        closed
    }

    /// arithmetic mean of the ring vertices
    pub fn centroid(&self) -> Option<Point> {
        if self.ring.is_empty() {
            return None;
        }

        let n = self.ring.len() as f64;
        let mut sum = [0.0; 3];
        for point in &self.ring {
            sum[0] += point[0];
            sum[1] += point[1];
            sum[2] += point[2];
        }

        Some([sum[0] / n, sum[1] / n, sum[2] / n])
    }

    /// unsigned area of the polygon projected onto the x-y plane (shoelace formula)
    pub fn area_xy(&self) -> f64 {
        let n = self.ring.len();
        if n < 3 {
            return 0.0;
        }

        let twice_area: f64 = (0..n)
            .map(|i| {
                let a = self.ring[i];
                let b = self.ring[(i + 1) % n];
                a[0] * b[1] - b[0] * a[1]
            })
            .sum();

        twice_area.abs() / 2.0
    }

    /// axis aligned bounds of the ring
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.ring.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Axis aligned bounding box
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    fn from_points<'a>(points: impl Iterator<Item = &'a Point>) -> Option<Self> {
        let mut bounds: Option<Bounds> = None;

        for point in points {
            bounds = Some(match bounds {
                None => Bounds {
                    min: *point,
                    max: *point,
                },
                Some(b) => b.expand(point),
            });
        }

        bounds
    }

    fn expand(mut self, point: &Point) -> Self {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
        self
    }

    fn union(self, other: Bounds) -> Self {
        self.expand(&other.min).expand(&other.max)
    }
}

/// centroids of every polygon as an `(n, 3)` array, index aligned with the input
pub fn centroids(polygons: &[Polygon]) -> Array2<f64> {
    let mut out = Array2::zeros((polygons.len(), 3));

    for (mut row, polygon) in out.rows_mut().into_iter().zip(polygons) {
        if let Some(c) = polygon.centroid() {
            row[0] = c[0];
            row[1] = c[1];
            row[2] = c[2];
        } else {
            row.fill(f64::NAN);
        }
    }

    out
}

/// combined bounds of a collection of polygons
pub fn total_bounds(polygons: &[Polygon]) -> Option<Bounds> {
    polygons
        .iter()
        .filter_map(Polygon::bounds)
        .reduce(Bounds::union)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn square_area_and_centroid() {
        let square = unit_square();
        assert_eq!(square.area_xy(), 1.0);
        assert_eq!(square.centroid(), Some([0.5, 0.5, 0.0]));
    }

    #[test]
    fn reversed_winding_has_same_area() {
        let mut ring = unit_square().ring().to_vec();
        ring.reverse();
        assert_eq!(Polygon::new(ring).area_xy(), 1.0);
    }

    #[test]
    fn closed_ring_repeats_first_vertex() {
        let closed = unit_square().closed_ring();
        assert_eq!(closed.len(), 5);
        assert_eq!(closed[0], closed[4]);
    }

    #[test]
    fn empty_polygon() {
        let empty = Polygon::default();
        assert_eq!(empty.centroid(), None);
        assert_eq!(empty.bounds(), None);
        assert!(empty.closed_ring().is_empty());
    }

    #[test]
    fn bounds_of_many() {
        let a = unit_square();
        let b = Polygon::new(vec![[2.0, 2.0, 0.0], [2.0, 3.0, 1.0], [2.0, 3.0, 0.0]]);
        let bounds = total_bounds(&[a, b]).unwrap();
        assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [2.0, 3.0, 1.0]);
    }

    #[test]
    fn centroid_rows() {
        let c = centroids(&[unit_square(), Polygon::default()]);
        assert_eq!(c.dim(), (2, 3));
        assert_eq!(c[[0, 0]], 0.5);
        assert!(c[[1, 2]].is_nan());
    }
}
