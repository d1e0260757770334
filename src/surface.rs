//! Block face descriptions.
//!
//! Face `location` lies normal to direction `location / 2`, on the minus
//! side for even locations and the plus side for odd ones. A face is indexed
//! by the two remaining dimensions in increasing order, so face 0 runs over
//! `(y, z)` and face 4 over `(x, y)`. In 2D the second index has one point.

use crate::error::*;
use crate::util::*;

/// The two dimensions spanning faces normal to `direction`.
pub fn face_dims(direction: usize) -> [usize; 2] {
    match direction {
        0 => [1, 2],
        1 => [0, 2],
        _ => [0, 1],
    }
}

/// `-1` for minus faces, `+1` for plus faces.
pub fn face_sign(location: usize) -> f64 {
    if location % 2 == 0 {
        -1.0
    } else {
        1.0
    }
}

/// Orientation of `t_a x t_b` relative to the coordinate axis of the face
/// direction, with `t_a, t_b` along the face dimensions.
fn face_parity(direction: usize) -> f64 {
    if direction == 1 {
        -1.0
    } else {
        1.0
    }
}

pub trait Surface: Send + Sync {
    fn location(&self) -> usize;

    /// Point counts along the two face dimensions.
    fn n(&self) -> [usize; 2];

    fn x(&self, i: usize, j: usize) -> Vector3<f64>;

    /// Outward unit normal.
    fn normal(&self, i: usize, j: usize) -> Vector3<f64>;

    /// The points of `edge`: 0 and 1 hold the first index at its minimum and
    /// maximum, 2 and 3 hold the second index.
    fn edge(&self, edge: usize) -> Vec<Vector3<f64>> {
        let [n0, n1] = self.n();
        match edge {
            0 => (0..n1).map(|j| self.x(0, j)).collect(),
            1 => (0..n1).map(|j| self.x(n0 - 1, j)).collect(),
            2 => (0..n0).map(|i| self.x(i, 0)).collect(),
            _ => (0..n0).map(|i| self.x(i, n1 - 1)).collect(),
        }
    }

    /// Smallest distance between neighbouring points, infinite for a single
    /// point.
    fn min_spacing(&self) -> f64 {
        let [n0, n1] = self.n();
        let mut h = f64::INFINITY;
        for i in 0..n0 {
            for j in 0..n1 {
                let x = self.x(i, j);
                if i + 1 < n0 {
                    h = h.min((self.x(i + 1, j) - x).norm());
                }
                if j + 1 < n1 {
                    h = h.min((self.x(i, j + 1) - x).norm());
                }
            }
        }
        h
    }

    fn has_same_edge(&self, edge: usize, other_edge: usize, other: &dyn Surface) -> bool {
        let a = self.edge(edge);
        let b = other.edge(other_edge);
        let scale = a
            .iter()
            .chain(b.iter())
            .fold(1.0_f64, |s, p| s.max(p.amax()));
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(p, q)| (p - q).amax() <= 1e-10 * scale)
    }
}

/// Flat rectangular face given by a corner and two edge lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarSurface {
    location: usize,
    n: [usize; 2],
    corner: Vector3<f64>,
    lengths: [f64; 2],
}

impl PlanarSurface {
    pub fn new(location: usize, n: [usize; 2], corner: Vector3<f64>, lengths: [f64; 2]) -> Self {
        PlanarSurface {
            location,
            n,
            corner,
            lengths,
        }
    }

    /// The six (or four) faces of the box `[x, x + l]`, sampled at `nx`.
    pub fn box_faces(
        ndim: usize,
        nx: &Coord3,
        x: Vector3<f64>,
        l: Vector3<f64>,
    ) -> Vec<Box<dyn Surface>> {
        (0..2 * ndim)
            .map(|location| {
                let d = location / 2;
                let [a, b] = face_dims(d);
                let mut corner = x;
                if location % 2 == 1 {
                    corner[d] += l[d];
                }
                Box::new(PlanarSurface::new(
                    location,
                    [nx[a] as usize, nx[b] as usize],
                    corner,
                    [l[a], l[b]],
                )) as Box<dyn Surface>
            })
            .collect()
    }
}

fn fraction(i: usize, n: usize) -> f64 {
    if n > 1 {
        i as f64 / (n - 1) as f64
    } else {
        0.0
    }
}

impl Surface for PlanarSurface {
    fn location(&self) -> usize {
        self.location
    }

    fn n(&self) -> [usize; 2] {
        self.n
    }

    fn x(&self, i: usize, j: usize) -> Vector3<f64> {
        let [a, b] = face_dims(self.location / 2);
        let mut p = self.corner;
        p[a] += fraction(i, self.n[0]) * self.lengths[0];
        p[b] += fraction(j, self.n[1]) * self.lengths[1];
        p
    }

    fn normal(&self, _i: usize, _j: usize) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        n[self.location / 2] = face_sign(self.location);
        n
    }
}

/// A face stored point by point, for curved blocks.
///
/// Normals come from the cross product of second order differences of the
/// points along the two face dimensions. In 2D the second tangent is the
/// z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSurface {
    location: usize,
    ndim: usize,
    n: [usize; 2],
    points: Vec<Vector3<f64>>,
}

impl SampledSurface {
    pub fn from_fn<F: Fn(usize, usize) -> Vector3<f64>>(
        location: usize,
        ndim: usize,
        n: [usize; 2],
        f: F,
    ) -> Self {
        let mut points = Vec::with_capacity(n[0] * n[1]);
        for i in 0..n[0] {
            for j in 0..n[1] {
                points.push(f(i, j));
            }
        }
        SampledSurface {
            location,
            ndim,
            n,
            points,
        }
    }

    /// Faces of the image of the unit reference cube under `map`.
    pub fn mapped_faces<F: Fn(Vector3<f64>) -> Vector3<f64>>(
        ndim: usize,
        nx: &Coord3,
        map: F,
    ) -> Vec<Box<dyn Surface>> {
        (0..2 * ndim)
            .map(|location| {
                let d = location / 2;
                let [a, b] = face_dims(d);
                let n = [nx[a] as usize, nx[b] as usize];
                let side = (location % 2) as f64;
                let surface = SampledSurface::from_fn(location, ndim, n, |i, j| {
                    let mut xi = Vector3::zeros();
                    xi[d] = side;
                    xi[a] = fraction(i, n[0]);
                    xi[b] = fraction(j, n[1]);
                    map(xi)
                });
                Box::new(surface) as Box<dyn Surface>
            })
            .collect()
    }

    fn point(&self, i: usize, j: usize) -> Vector3<f64> {
        self.points[i * self.n[1] + j]
    }

    fn tangent(&self, i: usize, j: usize, along: usize) -> Vector3<f64> {
        let (k, n) = if along == 0 { (i, self.n[0]) } else { (j, self.n[1]) };
        let at = |k: usize| {
            if along == 0 {
                self.point(k, j)
            } else {
                self.point(i, k)
            }
        };
        if n < 2 {
            return Vector3::zeros();
        }
        if n == 2 {
            return at(1) - at(0);
        }
        if k == 0 {
            (-3.0 * at(0) + 4.0 * at(1) - at(2)) * 0.5
        } else if k == n - 1 {
            (3.0 * at(n - 1) - 4.0 * at(n - 2) + at(n - 3)) * 0.5
        } else {
            (at(k + 1) - at(k - 1)) * 0.5
        }
    }
}

impl Surface for SampledSurface {
    fn location(&self) -> usize {
        self.location
    }

    fn n(&self) -> [usize; 2] {
        self.n
    }

    fn x(&self, i: usize, j: usize) -> Vector3<f64> {
        self.point(i, j)
    }

    fn normal(&self, i: usize, j: usize) -> Vector3<f64> {
        let d = self.location / 2;
        let ta = self.tangent(i, j, 0);
        let tb = if self.ndim == 2 {
            Vector3::z()
        } else {
            self.tangent(i, j, 1)
        };
        let n = ta.cross(&tb) * (face_sign(self.location) * face_parity(d));
        n / n.norm()
    }
}

/// Normals of one face restricted to the points a process owns.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSurface {
    location: usize,
    n_loc: [usize; 2],
    normals: Vec<Vector3<f64>>,
}

impl LocalSurface {
    /// `offset` is the owned window minimum relative to the block minimum,
    /// along the two face dimensions.
    pub fn new(surface: &dyn Surface, offset: [usize; 2], n_loc: [usize; 2]) -> Self {
        let mut normals = Vec::with_capacity(n_loc[0] * n_loc[1]);
        for i in 0..n_loc[0] {
            for j in 0..n_loc[1] {
                normals.push(surface.normal(i + offset[0], j + offset[1]));
            }
        }
        LocalSurface {
            location: surface.location(),
            n_loc,
            normals,
        }
    }

    pub fn location(&self) -> usize {
        self.location
    }

    pub fn n_loc(&self) -> [usize; 2] {
        self.n_loc
    }

    pub fn normal(&self, i: usize, j: usize) -> Vector3<f64> {
        self.normals[i * self.n_loc[1] + j]
    }

    /// Normals in row-major order over the owned face points.
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }
}

/// Check that the faces of a block are sized for `nx` and meet along their
/// shared edges.
pub fn check_faces(ndim: usize, nx: &Coord3, surfaces: &[Box<dyn Surface>]) -> SolverResult<()> {
    if surfaces.len() != 2 * ndim {
        return Err(SolverError::Config(format!(
            "expected {} surfaces, got {}",
            2 * ndim,
            surfaces.len()
        )));
    }
    for (location, s) in surfaces.iter().enumerate() {
        let [a, b] = face_dims(location / 2);
        let expected = [nx[a] as usize, nx[b] as usize];
        if s.location() != location || s.n() != expected {
            return Err(SolverError::SurfaceSize {
                location,
                found: s.n(),
                expected,
            });
        }
    }

    // Faces normal to da and db share the edge where both coordinates sit at
    // a block extreme. On face a the edge fixes coordinate db, which is the
    // first or second face index depending on its position.
    for la in 0..2 * ndim {
        for lb in (la + 1)..2 * ndim {
            let (da, db) = (la / 2, lb / 2);
            if da == db {
                continue;
            }
            let pa = face_dims(da).iter().position(|d| *d == db).unwrap_or(0);
            let pb = face_dims(db).iter().position(|d| *d == da).unwrap_or(0);
            let edge_a = 2 * pa + lb % 2;
            let edge_b = 2 * pb + la % 2;
            if !surfaces[la].has_same_edge(edge_a, edge_b, surfaces[lb].as_ref()) {
                return Err(SolverError::SurfaceMismatch { a: la, b: lb });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn box_faces_match() {
        let nx = vector![5, 7, 4];
        let faces = PlanarSurface::box_faces(3, &nx, Vector3::new(1.0, -1.0, 0.0), Vector3::new(2.0, 3.0, 1.0));
        check_faces(3, &nx, &faces).unwrap();

        let nx2 = vector![5, 7, 1];
        let faces2 = PlanarSurface::box_faces(2, &nx2, Vector3::zeros(), Vector3::new(1.0, 1.0, 0.0));
        check_faces(2, &nx2, &faces2).unwrap();
        assert_eq!(faces2[1].normal(3, 0), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(faces2[2].normal(0, 0), Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn mismatched_faces() {
        let nx = vector![5, 5, 1];
        let mut faces = PlanarSurface::box_faces(2, &nx, Vector3::zeros(), Vector3::new(1.0, 1.0, 0.0));
        faces[3] = Box::new(PlanarSurface::new(3, [5, 1], Vector3::new(0.0, 1.5, 0.0), [1.0, 0.0]));
        assert!(matches!(
            check_faces(2, &nx, &faces),
            Err(SolverError::SurfaceMismatch { .. })
        ));

        faces[3] = Box::new(PlanarSurface::new(3, [4, 1], Vector3::new(0.0, 1.0, 0.0), [1.0, 0.0]));
        assert!(matches!(
            check_faces(2, &nx, &faces),
            Err(SolverError::SurfaceSize { location: 3, .. })
        ));
    }

    #[test]
    fn sampled_normals_are_outward() {
        let nx = vector![6, 5, 4];
        // sheared, stretched box
        let map = |xi: Vector3<f64>| Vector3::new(2.0 * xi[0] + 0.3 * xi[1], xi[1], 0.5 * xi[2] + 0.1 * xi[0]);
        let faces = SampledSurface::mapped_faces(3, &nx, map);
        check_faces(3, &nx, &faces).unwrap();
        let center = map(Vector3::new(0.5, 0.5, 0.5));
        for s in faces.iter() {
            let [n0, n1] = s.n();
            for i in 0..n0 {
                for j in 0..n1 {
                    let n = s.normal(i, j);
                    assert_approx_eq!(f64, n.norm(), 1.0, epsilon = 1e-12);
                    assert!(n.dot(&(s.x(i, j) - center)) > 0.0);
                }
            }
        }

        let planar = PlanarSurface::box_faces(3, &nx, Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0));
        let sampled = SampledSurface::mapped_faces(3, &nx, |xi| xi);
        for (p, s) in planar.iter().zip(sampled.iter()) {
            assert!((p.normal(1, 2) - s.normal(1, 2)).amax() < 1e-12);
            assert!((p.x(1, 2) - s.x(1, 2)).amax() < 1e-12);
        }
    }

    #[test]
    fn min_spacing_follows_stretching() {
        let nx = vector![11, 6, 1];
        let planar = PlanarSurface::box_faces(2, &nx, Vector3::zeros(), Vector3::new(1.0, 2.0, 0.0));
        assert_approx_eq!(f64, planar[0].min_spacing(), 0.4, epsilon = 1e-12);
        assert_approx_eq!(f64, planar[2].min_spacing(), 0.1, epsilon = 1e-12);

        // x = xi/2 + xi^2/2 is tightest next to xi = 0
        let stretched =
            SampledSurface::mapped_faces(2, &nx, |xi| Vector3::new(0.5 * xi[0] * (1.0 + xi[0]), 2.0 * xi[1], 0.0));
        assert_approx_eq!(f64, stretched[2].min_spacing(), 0.055, epsilon = 1e-12);
        assert_approx_eq!(f64, stretched[0].min_spacing(), 0.4, epsilon = 1e-12);

        let point = PlanarSurface::new(0, [1, 1], Vector3::zeros(), [0.0, 0.0]);
        assert_eq!(point.min_spacing(), f64::INFINITY);
    }

    #[test]
    fn local_surface_window() {
        let nx = vector![8, 6, 1];
        let faces = SampledSurface::mapped_faces(2, &nx, |xi| Vector3::new(xi[0], xi[1] + 0.2 * xi[0], 0.0));
        let local = LocalSurface::new(faces[2].as_ref(), [3, 0], [4, 1]);
        assert_eq!(local.normals().len(), 4);
        assert_eq!(local.normal(1, 0), faces[2].normal(4, 0));
    }
}
