use kurbo::{Circle, Point};
use log::debug;

use super::delta_pieces;
use crate::config::MatConfig;
use crate::contact::{compare, contact_rank, Contacts};
use crate::debug::{OneProngRecord, ProngObserver, TwoProngRecord};
use crate::geom::{dist_sq, equidistant_point_on_line, sq_dist_to_rect};
use crate::point::{PointKind, PointOnShape};
use crate::shape::{BoundaryPiece, Shape};

/// Where the second contact is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The region around `y` bounded by contacts found so far.
    Local,
    /// Every loop before `y`'s own, to connect a hole to the rest.
    HoleClosing,
}

/// Why a 2-prong search gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// The two contacts converged onto each other.
    Separation,
    /// The iteration cap was reached.
    SlowConvergence,
    /// The next center estimate was not finite.
    Divergent,
    /// Culling left nothing to search.
    NoCandidate,
}

/// A circle touching the boundary at `y` and `z`.
#[derive(Debug, Clone, Copy)]
pub struct TwoProng {
    pub circle: Circle,
    pub y: PointOnShape,
    pub z: PointOnShape,
}

#[derive(Debug, Clone, Copy)]
pub enum TwoProngOutcome {
    Found(TwoProng),
    /// No second contact exists; a 1-prong was added (or suppressed at a
    /// dull corner).
    OneProng,
    Failed(FailReason),
}

/// Find the circle touching the boundary at `y` and one other point.
///
/// Starting from `osculating`, the center is moved along the ray toward
/// `y` to the point equidistant from `y` and the closest other boundary
/// point, until it stops moving. A found 2-prong is returned, not
/// inserted; the caller adds it to `contacts` before the next search.
pub fn find_2_prong(
    shape: &Shape,
    contacts: &mut Contacts,
    y: PointOnShape,
    osculating: Circle,
    scope: Scope,
    config: &MatConfig,
    observer: &mut dyn ProngObserver,
) -> TwoProngOutcome {
    let mut pieces = search_pieces(shape, contacts, &y, scope);

    let sep_sq = config.separation_tolerance.powi(2);
    let one_prong_sq = config.one_prong_tolerance.powi(2);
    let error_sq = config.error_tolerance.powi(2);

    let mut x = osculating.center;
    let mut shortest = osculating.radius.powi(2);
    let mut record = TwoProngRecord {
        y,
        scope,
        estimates: vec![x],
        z: None,
        circle: None,
        failure: None,
        stalled_steps: 0,
    };

    let mut i = 0;
    let result = loop {
        i += 1;
        let r = dist_sq(x, y.p);
        pieces = cull(shape, pieces, x, r, config);

        let Some(z) = shape.closest_boundary_point(&pieces, x, Some(&y)) else {
            if i == 1 {
                break None;
            }
            break Some(Err(FailReason::NoCandidate));
        };
        record.z = Some(z);

        if i == 1 && dist_sq(x, z.p) + one_prong_sq >= r {
            break None;
        }
        if dist_sq(y.p, z.p) <= sep_sq {
            break Some(Err(FailReason::Separation));
        }

        let next = match next_estimate(x, y.p, z.p) {
            Ok(next) => next,
            Err(reason) => break Some(Err(reason)),
        };
        let step = dist_sq(x, next);

        // Oscillation guard: progress toward y is tracked, not enforced.
        let d = dist_sq(y.p, next);
        if d < shortest {
            shortest = d;
        } else {
            record.stalled_steps += 1;
        }

        x = next;
        record.estimates.push(x);

        if step <= error_sq {
            break Some(Ok(z));
        }
        if i >= config.max_two_prong_iterations {
            break Some(Err(FailReason::SlowConvergence));
        }
    };

    let outcome = match result {
        None => {
            observer.two_prong(&record);
            add_one_prong(shape, contacts, y, observer);
            return TwoProngOutcome::OneProng;
        }
        Some(Ok(z)) => {
            let circle = Circle::new(x, (x - z.p).length());
            record.circle = Some(circle);
            TwoProngOutcome::Found(TwoProng { circle, y, z })
        }
        Some(Err(reason)) => {
            debug!("2-prong from {:?} failed after {} steps: {:?}", y.p, i, reason);
            record.failure = Some(reason);
            TwoProngOutcome::Failed(reason)
        }
    };
    observer.two_prong(&record);
    outcome
}

/// The point on the ray from `x` through `y` equally far from `y` and `z`.
fn next_estimate(x: Point, y: Point, z: Point) -> Result<Point, FailReason> {
    let next = equidistant_point_on_line(x, y, z);
    if next.is_finite() {
        Ok(next)
    } else {
        Err(FailReason::Divergent)
    }
}

/// Insert a 1-prong at `pos` unless it sits at a dull corner or an existing
/// contact already occupies its place.
pub fn add_one_prong(
    shape: &Shape,
    contacts: &mut Contacts,
    pos: PointOnShape,
    observer: &mut dyn ProngObserver,
) {
    if pos.kind == PointKind::Dull {
        // Left for the branch pass; such 1-prongs usually merge into a
        // 3-prong at the corner.
        observer.one_prong(&OneProngRecord {
            pos,
            at_dull_corner: true,
        });
        return;
    }

    let circle = shape.osculating_circle(&pos);
    let rank = contact_rank(shape, &pos, circle.center);
    if let Some((prev, next)) = contacts.neighbors(&pos, rank) {
        let p = contacts.contact(prev);
        let n = contacts.contact(next);
        if compare(&p.pos, p.rank, &pos, rank).is_eq() || compare(&pos, rank, &n.pos, n.rank).is_eq() {
            return;
        }
    }
    contacts.add_prong(shape, circle, &[pos]);
    observer.one_prong(&OneProngRecord {
        pos,
        at_dull_corner: false,
    });
}

fn search_pieces(shape: &Shape, contacts: &Contacts, y: &PointOnShape, scope: Scope) -> Vec<BoundaryPiece> {
    let k = y.curve.loop_idx;
    match scope {
        Scope::HoleClosing => (0..k).flat_map(|j| shape.loop_pieces(j)).collect(),
        Scope::Local => {
            let Some((prev, _)) = contacts.neighbors(y, 0.0) else {
                return shape.loop_pieces(k);
            };
            match contacts.walk_piece(prev) {
                Some(deltas) => deltas
                    .into_iter()
                    .flat_map(|d| delta_pieces(shape, contacts, d))
                    .collect(),
                None => {
                    debug!("region walk from contact {} did not close", prev.index());
                    shape.loop_pieces(k)
                }
            }
        }
    }
}

/// Keep only pieces whose curve's bounding box comes within reach of the
/// current circle.
fn cull(shape: &Shape, pieces: Vec<BoundaryPiece>, x: Point, r_sq: f64, config: &MatConfig) -> Vec<BoundaryPiece> {
    if pieces.len() <= config.cull_threshold {
        return pieces;
    }
    pieces
        .into_iter()
        .filter(|p| sq_dist_to_rect(shape.curve_bbox(p.curve), x) <= r_sq + config.cull_margin)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::{DebugRecorder, NoopObserver};
    use crate::point::CurveId;
    use approx::assert_relative_eq;
    use kurbo::{BezPath, ParamCurve};

    fn shape(svg: &str) -> Shape {
        let path = BezPath::from_svg(svg).unwrap();
        Shape::from_paths(&[path], &MatConfig::default()).unwrap()
    }

    fn run(s: &Shape, contacts: &mut Contacts, y: PointOnShape) -> TwoProngOutcome {
        let osc = s.osculating_circle(&y);
        find_2_prong(s, contacts, y, osc, Scope::Local, &MatConfig::default(), &mut NoopObserver)
    }

    #[test]
    fn square_from_side_midpoint_reaches_center() {
        let s = shape("M0,0 L0,10 L10,10 L10,0 Z");
        let mut contacts = Contacts::new(1);
        let y = s.point_at(CurveId::new(0, 0), 0.5, PointKind::Standard, 0.0);
        let TwoProngOutcome::Found(prong) = run(&s, &mut contacts, y) else {
            panic!("expected a 2-prong");
        };
        assert_relative_eq!(prong.circle.center.x, 5.0, epsilon = 1e-6);
        assert_relative_eq!(prong.circle.center.y, 5.0, epsilon = 1e-6);
        assert_relative_eq!(prong.circle.radius, 5.0, epsilon = 1e-6);
        assert!(contacts.is_empty(), "found prongs are left to the caller");
    }

    #[test]
    fn contacts_are_equidistant_and_circle_is_empty() {
        let s = shape("M0,0 L0,10 L40,10 L40,0 Z");
        let mut contacts = Contacts::new(1);
        let y = s.point_at(CurveId::new(0, 3), 0.5, PointKind::Standard, 0.0);
        let TwoProngOutcome::Found(prong) = run(&s, &mut contacts, y) else {
            panic!("expected a 2-prong");
        };
        let c = prong.circle;
        let dy = (c.center - prong.y.p).length();
        let dz = (c.center - prong.z.p).length();
        assert_relative_eq!(dy, c.radius, epsilon = 1e-4);
        assert_relative_eq!(dz, c.radius, epsilon = 1e-4);

        for curve in s.loops()[0].curves() {
            for i in 0..=100 {
                let p = curve.eval(i as f64 / 100.0);
                let d = (p - c.center).length();
                assert!(d >= c.radius - 1e-4, "{p:?} lies inside the circle");
            }
        }
    }

    #[test]
    fn sharp_corner_degrades_to_one_prong() {
        let s = shape("M0,0 L0,10 L10,10 L10,0 Z");
        let mut contacts = Contacts::new(1);
        let corner = s.point_at(CurveId::new(0, 0), 1.0, PointKind::Sharp, 0.0);
        let mut rec = DebugRecorder::new();
        let osc = s.osculating_circle(&corner);
        let out = find_2_prong(&s, &mut contacts, corner, osc, Scope::Local, &MatConfig::default(), &mut rec);
        assert!(matches!(out, TwoProngOutcome::OneProng));
        assert_eq!(contacts.len(), 1);
        assert_eq!(rec.one_prongs.len(), 1);
        assert!(!rec.one_prongs[0].at_dull_corner);

        // A second 1-prong at the same spot is not added.
        let out = run(&s, &mut contacts, corner);
        assert!(matches!(out, TwoProngOutcome::OneProng));
        assert_eq!(contacts.len(), 1);
    }

    #[test]
    fn dull_one_prong_is_suppressed() {
        let s = shape("M0,0 L0,10 L10,10 L10,0 Z");
        let mut contacts = Contacts::new(1);
        let mut rec = DebugRecorder::new();
        let pos = s.point_at(CurveId::new(0, 1), 0.5, PointKind::Dull, 0.0);
        add_one_prong(&s, &mut contacts, pos, &mut rec);
        assert!(contacts.is_empty());
        assert!(rec.one_prongs[0].at_dull_corner);
    }

    #[test]
    fn round_shape_has_no_spurious_prongs() {
        let path = kurbo::Shape::to_path(&Circle::new((0.0, 0.0), 10.0), 1e-9);
        let s = Shape::from_paths(&[path], &MatConfig::default()).unwrap();
        for seed in s.seeds().to_vec() {
            let mut contacts = Contacts::new(1);
            if let TwoProngOutcome::Found(prong) = run(&s, &mut contacts, seed) {
                let off = prong.circle.center.to_vec2().length();
                assert!(off < 0.05, "spurious 2-prong centered {off} away");
            }
        }
    }

    #[test]
    fn iteration_cap_is_slow_convergence() {
        let s = shape("M0,0 L0,10 L10,10 L10,0 Z");
        let mut contacts = Contacts::new(1);
        let mut rec = DebugRecorder::new();
        let config = MatConfig {
            max_two_prong_iterations: 1,
            ..MatConfig::default()
        };
        let y = s.point_at(CurveId::new(0, 0), 0.5, PointKind::Standard, 0.0);
        let osc = s.osculating_circle(&y);
        let out = find_2_prong(&s, &mut contacts, y, osc, Scope::Local, &config, &mut rec);
        assert!(matches!(out, TwoProngOutcome::Failed(FailReason::SlowConvergence)));
        assert!(contacts.is_empty());
        assert_eq!(rec.failed_two_prongs().count(), 1);
        assert_eq!(rec.two_prongs[0].estimates.len(), 2);
    }

    #[test]
    fn contact_square_to_the_ray_diverges() {
        // z lies on the line through y perpendicular to the ray, so no
        // point on the ray is equidistant from both.
        let out = next_estimate(Point::new(5.0, 0.0), Point::new(0.0, 0.0), Point::new(0.0, 1.0));
        assert_eq!(out, Err(FailReason::Divergent));

        let out = next_estimate(Point::new(10.0, 0.0), Point::new(0.0, 0.0), Point::new(4.0, 4.0));
        let next = out.unwrap();
        assert_relative_eq!(next.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(next.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn separation_failure_is_reported() {
        // A thin spike: both sides converge onto the tip.
        let s = shape("M0,0 L5,100 L10,0 Z");
        let mut contacts = Contacts::new(1);
        let mut rec = DebugRecorder::new();
        let config = MatConfig {
            separation_tolerance: 50.0,
            ..MatConfig::default()
        };
        let y = s.point_at(CurveId::new(0, 0), 0.9, PointKind::Standard, 0.0);
        let osc = s.osculating_circle(&y);
        let out = find_2_prong(&s, &mut contacts, y, osc, Scope::Local, &config, &mut rec);
        assert!(matches!(out, TwoProngOutcome::Failed(FailReason::Separation)));
        assert_eq!(rec.failed_two_prongs().count(), 1);
    }
}
