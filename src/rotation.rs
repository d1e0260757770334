//! Local normal/tangential frames and characteristic targets.

use crate::util::*;

/// Velocity and symmetric stress at one point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundFields {
    pub v: Vector3<f64>,
    pub s: Matrix3<f64>,
}

impl BoundFields {
    /// Set `s[(a, b)]` and its mirror.
    pub fn set_stress(&mut self, a: usize, b: usize, value: f64) {
        self.s[(a, b)] = value;
        self.s[(b, a)] = value;
    }
}

/// An orthonormal triad, rows `n, t1, t2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    rotation: Matrix3<f64>,
}

impl Frame {
    pub fn new(n: &Vector3<f64>, t1: &Vector3<f64>, t2: &Vector3<f64>) -> Self {
        Frame {
            rotation: Matrix3::from_rows(&[n.transpose(), t1.transpose(), t2.transpose()]),
        }
    }

    /// Frame built from `n` with [`tangent_vectors`].
    pub fn from_normal(n: &Vector3<f64>) -> Self {
        let (t1, t2) = tangent_vectors(n);
        Frame::new(n, &t1, &t2)
    }

    /// The frame seen from the other side of a face: every axis flipped.
    pub fn flipped(&self) -> Self {
        Frame {
            rotation: -self.rotation,
        }
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.rotation.row(0).transpose()
    }
}

/// Two unit tangents completing `n` to a right-handed triad.
///
/// The first tangent lies in the plane of the two largest normal components
/// so it never degenerates for axis-aligned normals.
pub fn tangent_vectors(n: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let (a0, a1, a2) = (n[0].abs(), n[1].abs(), n[2].abs());
    let t1 = if a0 > a1 && a0 > a2 {
        let norm = (n[0] * n[0] + n[1] * n[1]).sqrt();
        Vector3::new(-n[1], n[0], 0.0) / norm
    } else if a1 > a2 {
        let norm = (n[0] * n[0] + n[1] * n[1]).sqrt();
        Vector3::new(n[1], -n[0], 0.0) / norm
    } else {
        let norm = (n[0] * n[0] + n[2] * n[2]).sqrt();
        Vector3::new(n[2], 0.0, -n[0]) / norm
    };
    let t2 = n.cross(&t1);
    (t1, t2)
}

/// `v' = R v`, `s' = R s R^T`.
pub fn rotate_xy_nt(b: &BoundFields, frame: &Frame) -> BoundFields {
    let r = &frame.rotation;
    BoundFields {
        v: r * b.v,
        s: r * b.s * r.transpose(),
    }
}

/// Inverse of [`rotate_xy_nt`].
pub fn rotate_nt_xy(b: &BoundFields, frame: &Frame) -> BoundFields {
    let r = &frame.rotation;
    BoundFields {
        v: r.transpose() * b.v,
        s: r.transpose() * b.s * r,
    }
}

/// One velocity/traction pair in a rotated frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Characteristic {
    pub v: f64,
    pub s: f64,
}

impl Characteristic {
    /// Wave leaving the domain through a face with outward normal along the
    /// first frame axis.
    pub fn outgoing(&self, z: f64) -> f64 {
        self.s - z * self.v
    }

    pub fn incoming(&self, z: f64) -> f64 {
        self.s + z * self.v
    }

    /// The `k`-th pair of a rotated state: normal for `k = 0`, tangents after.
    pub fn component(b: &BoundFields, k: usize) -> Self {
        Characteristic {
            v: b.v[k],
            s: b.s[(0, k)],
        }
    }
}

/// Boundary target keeping the outgoing wave and reflecting `r` times it.
///
/// `r = 0` absorbs, `r = -1` leaves the face traction free and `r = 1`
/// holds it rigid.
pub fn reflect(b: &Characteristic, z: f64, r: f64) -> Characteristic {
    let w = b.outgoing(z);
    Characteristic {
        v: (r - 1.0) * w / (2.0 * z),
        s: (1.0 + r) * w / 2.0,
    }
}

/// Welded contact between two sides, each in its own outward frame.
///
/// Returns side 1's target; side 2's is the same traction with the velocity
/// negated. `None` when the impedance sum vanishes.
pub fn locked(b1: &Characteristic, b2: &Characteristic, z1: f64, z2: f64) -> Option<Characteristic> {
    let zsum = z1 + z2;
    if !(zsum.abs() > f64::EPSILON) {
        return None;
    }
    let w1 = b1.outgoing(z1);
    let w2 = b2.outgoing(z2);
    Some(Characteristic {
        v: (w2 - w1) / zsum,
        s: (z2 * w1 + z1 * w2) / zsum,
    })
}

/// Traction-free slip: keep the outgoing wave and zero the traction.
pub fn free_slip(b: &Characteristic, z: f64) -> Characteristic {
    Characteristic {
        v: -b.outgoing(z) / z,
        s: 0.0,
    }
}

/// Split `rotated - target` into its normal (P) and tangential (S) parts,
/// both still in the rotated frame.
pub fn split_mismatch(rotated: &BoundFields, targets: &[Characteristic; 3]) -> (BoundFields, BoundFields) {
    let mut p = BoundFields::default();
    let mut s = BoundFields::default();
    p.v[0] = rotated.v[0] - targets[0].v;
    p.s[(0, 0)] = rotated.s[(0, 0)] - targets[0].s;
    for k in 1..3 {
        s.v[k] = rotated.v[k] - targets[k].v;
        s.set_stress(0, k, rotated.s[(0, k)] - targets[k].s);
    }
    (p, s)
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rand::prelude::*;

    fn random_state(rng: &mut StdRng) -> BoundFields {
        let mut b = BoundFields {
            v: Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            ..Default::default()
        };
        for a in 0..3 {
            for c in a..3 {
                b.set_stress(a, c, rng.gen_range(-1.0..1.0));
            }
        }
        b
    }

    fn random_normal(rng: &mut StdRng) -> Vector3<f64> {
        loop {
            let n = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
            if n.norm() > 0.1 {
                return n / n.norm();
            }
        }
    }

    #[test]
    fn tangents_are_orthonormal() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut normals: Vec<Vector3<f64>> = (0..200).map(|_| random_normal(&mut rng)).collect();
        normals.extend([Vector3::x(), -Vector3::y(), Vector3::z(), Vector3::new(1.0, 1.0, 0.0).normalize()]);
        for n in normals {
            let (t1, t2) = tangent_vectors(&n);
            assert_approx_eq!(f64, t1.norm(), 1.0, epsilon = 1e-12);
            assert_approx_eq!(f64, t2.norm(), 1.0, epsilon = 1e-12);
            assert_approx_eq!(f64, n.dot(&t1), 0.0, epsilon = 1e-12);
            assert_approx_eq!(f64, n.dot(&t2), 0.0, epsilon = 1e-12);
            assert_approx_eq!(f64, t1.dot(&t2), 0.0, epsilon = 1e-12);
            assert_approx_eq!(f64, n.cross(&t1).dot(&t2), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn rotation_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let b = random_state(&mut rng);
            let frame = Frame::from_normal(&random_normal(&mut rng));
            let back = rotate_nt_xy(&rotate_xy_nt(&b, &frame), &frame);
            assert!((back.v - b.v).amax() < 1e-13);
            assert!((back.s - b.s).amax() < 1e-13);
        }
    }

    #[test]
    fn rotated_components() {
        let n = Vector3::new(0.6, 0.8, 0.0);
        let frame = Frame::from_normal(&n);
        let mut b = BoundFields::default();
        b.v = Vector3::new(1.0, 2.0, 3.0);
        b.set_stress(0, 0, 1.0);
        b.set_stress(0, 1, 0.5);
        let r = rotate_xy_nt(&b, &frame);
        assert_approx_eq!(f64, r.v[0], n.dot(&b.v), epsilon = 1e-14);
        assert_approx_eq!(f64, r.s[(0, 0)], n.dot(&(b.s * n)), epsilon = 1e-14);
        assert_eq!(frame.normal(), n);
        assert_eq!(frame.flipped().normal(), -n);
    }

    #[test]
    fn reflection_targets() {
        let z = 2.0;
        // outgoing P wave: s = -z v
        let out = Characteristic { v: 0.3, s: -0.6 };
        let hat = reflect(&out, z, 0.0);
        assert_approx_eq!(f64, hat.v, out.v);
        assert_approx_eq!(f64, hat.s, out.s);

        let any = Characteristic { v: 0.7, s: 0.1 };
        for r in [-1.0, 0.0, 1.0] {
            let hat = reflect(&any, z, r);
            assert_approx_eq!(f64, hat.outgoing(z), any.outgoing(z), epsilon = 1e-14);
            assert_approx_eq!(f64, hat.incoming(z), r * any.outgoing(z), epsilon = 1e-14);
        }
        assert_approx_eq!(f64, reflect(&any, z, -1.0).s, 0.0);
        assert_approx_eq!(f64, reflect(&any, z, 1.0).v, 0.0);
    }

    #[test]
    fn locked_targets() {
        let (z1, z2) = (1.0, 3.0);
        // already welded: side 2 sees the velocity negated
        let b1 = Characteristic { v: 0.4, s: -0.2 };
        let b2 = Characteristic { v: -0.4, s: -0.2 };
        let hat = locked(&b1, &b2, z1, z2).unwrap();
        assert_approx_eq!(f64, hat.v, b1.v, epsilon = 1e-15);
        assert_approx_eq!(f64, hat.s, b1.s, epsilon = 1e-15);

        let c1 = Characteristic { v: 1.0, s: 0.5 };
        let c2 = Characteristic { v: 0.2, s: -0.3 };
        let hat = locked(&c1, &c2, z1, z2).unwrap();
        let hat2 = Characteristic { v: -hat.v, s: hat.s };
        assert_approx_eq!(f64, hat.outgoing(z1), c1.outgoing(z1), epsilon = 1e-14);
        assert_approx_eq!(f64, hat2.outgoing(z2), c2.outgoing(z2), epsilon = 1e-14);

        assert!(locked(&c1, &c2, 0.0, 0.0).is_none());

        let slip = free_slip(&c1, z1);
        assert_approx_eq!(f64, slip.s, 0.0);
        assert_approx_eq!(f64, slip.outgoing(z1), c1.outgoing(z1), epsilon = 1e-14);
    }
}
