//! Junction classification.
//!
//! Every junction between two consecutive boundary curves is classified
//! once, when the shape is built. Convex junctions with a real kink become
//! sharp points, concave ones become dull points and get a [`Corner`]
//! record, and near-smooth ones get a standard point just before the
//! junction.

use std::collections::BTreeMap;

use kurbo::{CubicBez, Vec2};

use crate::geom::unit_tangent;
use crate::point::{CurveId, PointKind};

/// Sine of roughly 0.25 degrees.
pub const CROSS_TANGENT_LIMIT: f64 = 0.0050;

/// Parameter of the fallback point placed on the incoming curve when the
/// junction itself is too close to smooth to seed from.
pub const FALLBACK_T: f64 = 0.9;

/// Stable key of a junction: junction `j` of a loop joins curve `j` to
/// curve `j + 1` (wrapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CornerKey {
    pub loop_idx: usize,
    pub junction: usize,
}

/// Tangent data of a concave junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    /// Incoming and outgoing curve.
    pub curves: [CubicBez; 2],
    /// Unit tangents at the junction (end of incoming, start of outgoing).
    pub tangents: [Vec2; 2],
}

/// How a junction turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Junction {
    /// Tangents are exactly parallel; no call either way.
    Inconclusive,
    /// Strongly convex.
    Sharp,
    /// Concave beyond the limit. `neg_dot` orders the two dull points.
    Dull { neg_dot: f64 },
    /// Within the limit of smooth. A slightly concave junction still
    /// records a [`Corner`].
    Shallow { concave: bool },
}

impl Junction {
    pub fn is_concave(self) -> bool {
        matches!(self, Junction::Dull { .. } | Junction::Shallow { concave: true })
    }
}

/// Classify a junction from the unit tangents on either side of it.
///
/// `incoming` is the end tangent of the first curve, `outgoing` the start
/// tangent of the second. Loops are oriented with the interior on the
/// right, so a convex turn has a negative cross product.
pub fn classify(incoming: Vec2, outgoing: Vec2, limit: f64) -> Junction {
    let cross = incoming.cross(outgoing);
    let neg_dot = -incoming.dot(outgoing);

    if cross == 0.0 || neg_dot == -1.0 {
        return Junction::Inconclusive;
    }
    if cross < -limit {
        return Junction::Sharp;
    }
    if cross > limit {
        return Junction::Dull { neg_dot };
    }
    Junction::Shallow {
        concave: cross > 0.0,
    }
}

/// A point the classifier wants seeded, before it is realised on a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunctionSeed {
    pub curve: CurveId,
    pub t: f64,
    pub kind: PointKind,
    pub order: f64,
}

/// Corner records and junction seeds for a whole shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub corners: BTreeMap<CornerKey, Corner>,
    pub seeds: Vec<JunctionSeed>,
}

/// Classify every junction of every loop.
pub fn classify_loops(loops: &[Vec<CubicBez>], limit: f64) -> Classification {
    let mut out = Classification::default();
    for (k, curves) in loops.iter().enumerate() {
        let n = curves.len();
        for j in 0..n {
            let next = (j + 1) % n;
            let (c0, c1) = (curves[j], curves[next]);
            let tangents = [unit_tangent(&c0, 1.0), unit_tangent(&c1, 0.0)];
            let junction = classify(tangents[0], tangents[1], limit);

            if junction.is_concave() {
                out.corners.insert(
                    CornerKey {
                        loop_idx: k,
                        junction: j,
                    },
                    Corner {
                        curves: [c0, c1],
                        tangents,
                    },
                );
            }

            let incoming = CurveId::new(k, j);
            match junction {
                Junction::Sharp => out.seeds.push(JunctionSeed {
                    curve: incoming,
                    t: 1.0,
                    kind: PointKind::Sharp,
                    order: 0.0,
                }),
                Junction::Dull { neg_dot } => {
                    out.seeds.push(JunctionSeed {
                        curve: incoming,
                        t: 1.0,
                        kind: PointKind::Dull,
                        order: -1.0,
                    });
                    out.seeds.push(JunctionSeed {
                        curve: CurveId::new(k, next),
                        t: 0.0,
                        kind: PointKind::Dull,
                        order: neg_dot,
                    });
                }
                Junction::Shallow { .. } | Junction::Inconclusive => {
                    out.seeds.push(JunctionSeed {
                        curve: incoming,
                        t: FALLBACK_T,
                        kind: PointKind::Standard,
                        order: 0.0,
                    })
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::line_to_cubic;
    use kurbo::Point;

    fn polygon(points: &[(f64, f64)]) -> Vec<CubicBez> {
        (0..points.len())
            .map(|i| {
                let a = Point::from(points[i]);
                let b = Point::from(points[(i + 1) % points.len()]);
                line_to_cubic(a, b)
            })
            .collect()
    }

    // Clockwise L: junction 2 at (10, 10) is the reflex corner.
    fn l_shape() -> Vec<CubicBez> {
        polygon(&[
            (0.0, 0.0),
            (0.0, 20.0),
            (10.0, 20.0),
            (10.0, 10.0),
            (20.0, 10.0),
            (20.0, 0.0),
        ])
    }

    #[test]
    fn right_angles_classify_by_turn_direction() {
        let up = Vec2::new(0.0, 1.0);
        let right = Vec2::new(1.0, 0.0);
        let left = Vec2::new(-1.0, 0.0);
        assert_eq!(classify(up, right, CROSS_TANGENT_LIMIT), Junction::Sharp);
        assert!(matches!(
            classify(up, left, CROSS_TANGENT_LIMIT),
            Junction::Dull { .. }
        ));
    }

    #[test]
    fn parallel_tangents_are_inconclusive() {
        let v = Vec2::new(0.6, 0.8);
        assert_eq!(classify(v, v, CROSS_TANGENT_LIMIT), Junction::Inconclusive);
    }

    #[test]
    fn tiny_turns_are_shallow() {
        let a = Vec2::new(1.0, 0.0);
        let ccw = Vec2::new(1.0, 0.001).normalize();
        let cw = Vec2::new(1.0, -0.001).normalize();
        assert_eq!(
            classify(a, ccw, CROSS_TANGENT_LIMIT),
            Junction::Shallow { concave: true }
        );
        assert_eq!(
            classify(a, cw, CROSS_TANGENT_LIMIT),
            Junction::Shallow { concave: false }
        );
    }

    #[test]
    fn square_has_four_sharp_corners() {
        let square = polygon(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]);
        let c = classify_loops(&[square], CROSS_TANGENT_LIMIT);
        assert!(c.corners.is_empty());
        assert_eq!(c.seeds.len(), 4);
        assert!(c.seeds.iter().all(|s| s.kind == PointKind::Sharp && s.t == 1.0));
    }

    #[test]
    fn reflex_notch_records_a_corner_and_two_dull_points() {
        let c = classify_loops(&[l_shape()], CROSS_TANGENT_LIMIT);
        let key = CornerKey {
            loop_idx: 0,
            junction: 2,
        };
        assert_eq!(c.corners.len(), 1);
        let corner = c.corners.get(&key).expect("corner at the notch");
        assert_eq!(corner.tangents[0], Vec2::new(0.0, -1.0));
        assert_eq!(corner.tangents[1], Vec2::new(1.0, 0.0));

        let dull: Vec<_> = c.seeds.iter().filter(|s| s.kind == PointKind::Dull).collect();
        assert_eq!(dull.len(), 2);
        assert_eq!((dull[0].curve.curve_idx, dull[0].t, dull[0].order), (2, 1.0, -1.0));
        assert_eq!((dull[1].curve.curve_idx, dull[1].t), (3, 0.0));
        assert_eq!(dull[1].order, 0.0);
    }

    #[test]
    fn smooth_junction_gets_a_nearby_standard_point() {
        // Two collinear segments followed by a return path.
        let curves = polygon(&[(0.0, 0.0), (0.0, 5.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]);
        let c = classify_loops(&[curves], CROSS_TANGENT_LIMIT);
        let fallback: Vec<_> = c
            .seeds
            .iter()
            .filter(|s| s.kind == PointKind::Standard)
            .collect();
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback[0].curve.curve_idx, 0);
        assert_eq!(fallback[0].t, FALLBACK_T);
    }

    #[test]
    fn classification_is_symmetric_under_reverse_and_mirror() {
        let forward = l_shape();
        // Reversing the loop and mirroring x keeps the interior on the right.
        let mirrored: Vec<CubicBez> = forward
            .iter()
            .rev()
            .map(|c| {
                let m = |p: Point| Point::new(-p.x, p.y);
                CubicBez::new(m(c.p3), m(c.p2), m(c.p1), m(c.p0))
            })
            .collect();

        let n = forward.len();
        for j in 0..n {
            let a = [
                unit_tangent(&forward[j], 1.0),
                unit_tangent(&forward[(j + 1) % n], 0.0),
            ];
            // Junction j of the forward loop is junction n - 2 - j of the
            // reversed one.
            let r = (2 * n - 2 - j) % n;
            let b = [
                unit_tangent(&mirrored[r], 1.0),
                unit_tangent(&mirrored[(r + 1) % n], 0.0),
            ];
            assert_eq!(
                classify(a[0], a[1], CROSS_TANGENT_LIMIT),
                classify(b[0], b[1], CROSS_TANGENT_LIMIT),
                "junction {j}"
            );
        }
    }

    #[test]
    fn classification_is_idempotent() {
        let loops = vec![l_shape()];
        let first = classify_loops(&loops, CROSS_TANGENT_LIMIT);
        let second = classify_loops(&loops, CROSS_TANGENT_LIMIT);
        assert_eq!(first, second);
    }
}
