use std::f64::consts::TAU;

use kurbo::{Circle, Point};
use log::debug;

use super::delta_pieces;
use crate::config::MatConfig;
use crate::contact::{Contacts, Delta};
use crate::debug::{ProngObserver, ThreeProngCandidate, ThreeProngRecord};
use crate::error::MatError;
use crate::geom::{circumcenter, clamped_asin, dist_sq, rotate90, unit_tangent};
use crate::point::{PointKind, PointOnShape};
use crate::shape::{BoundaryPiece, Shape};

/// A circle touching three boundary pieces: a branch point of the MAT.
#[derive(Debug, Clone, Copy)]
pub struct ThreeProng {
    pub circle: Circle,
    /// Contact on each of the three pieces, in delta order.
    pub points: [PointOnShape; 3],
    /// The deltas the contacts were found on.
    pub deltas: [Delta; 3],
    /// Radius mismatch plus tangent misalignment; lower is better.
    pub error: f64,
}

/// Find the best 3-prong for a region bounded by `deltas`.
///
/// Every split `(first, i, last)` with `i` strictly inside is fitted and
/// scored; the lowest error wins, earlier splits winning ties. A circle
/// whose contacts do not run clockwise in delta order is discarded, since
/// inserting it would not split the region. Returns `Ok(None)` if no split
/// yields a usable circle.
pub fn find_3_prong(
    shape: &Shape,
    contacts: &Contacts,
    deltas: &[Delta],
    config: &MatConfig,
    observer: &mut dyn ProngObserver,
) -> Result<Option<ThreeProng>, MatError> {
    let n = deltas.len();
    if n < 3 {
        return Err(MatError::TooFewDeltas(n));
    }

    let pieces: Vec<Vec<BoundaryPiece>> = deltas
        .iter()
        .map(|&d| delta_pieces(shape, contacts, d))
        .collect();
    let all_pieces: Vec<BoundaryPiece> = pieces.iter().flatten().copied().collect();

    let mut record = ThreeProngRecord {
        delta_count: n,
        candidates: Vec::new(),
        best: None,
    };
    let mut best: Option<ThreeProng> = None;

    for i in 1..n - 1 {
        let idx = [0, i, n - 1];
        let piece3 = [&pieces[0][..], &pieces[i][..], &pieces[n - 1][..]];
        let first = &contacts.contact(deltas[0].start).pos;
        let last = &contacts.contact(deltas[n - 1].end).pos;

        let Some((circle, points)) = fit(shape, first, last, piece3, config) else {
            debug!("3-prong split {i} of {n} gave no circle");
            continue;
        };
        if !runs_clockwise(circle.center, &points) {
            debug!("3-prong split {i} of {n} has its contacts out of order");
            continue;
        }

        let error = angle_error(shape, &points, circle.center)
            + radius_delta(shape, &all_pieces, circle);
        let error = if error.is_finite() { error } else { f64::INFINITY };

        record.candidates.push(ThreeProngCandidate {
            split: i,
            circle,
            error,
        });
        if error < best.map_or(f64::INFINITY, |b| b.error) {
            record.best = Some(record.candidates.len() - 1);
            best = Some(ThreeProng {
                circle,
                points,
                deltas: idx.map(|j| deltas[j]),
                error,
            });
        }
    }

    observer.three_prong(&record);
    Ok(best)
}

/// Refine a center for one triple of pieces.
fn fit(
    shape: &Shape,
    first: &PointOnShape,
    last: &PointOnShape,
    pieces: [&[BoundaryPiece]; 3],
    config: &MatConfig,
) -> Option<(Circle, [PointOnShape; 3])> {
    let mut x = initial_center(shape, first, last, pieces[1])?;
    let mut ps = closest_points(shape, pieces, x)?;

    let mut change = f64::INFINITY;
    let mut i = 0;
    while change > config.three_prong_tolerance && i < config.max_three_prong_iterations {
        i += 1;
        let target = circumcenter(ps[0].p, ps[1].p, ps[2].p);
        if !target.is_finite() {
            break;
        }
        let potential = (target - x).length();
        let (new_x, new_ps, new_potential) = step_toward(shape, pieces, x, target, potential, config)?;
        x = new_x;
        ps = new_ps;
        change = (potential - new_potential).abs();
    }
    if !x.is_finite() {
        return None;
    }

    let radius = ps.iter().map(|p| (x - p.p).length()).sum::<f64>() / 3.0;
    Some((Circle::new(x, radius), ps))
}

/// Move `x` toward `target`, halving the step while the potential does not
/// drop. The last step tried is kept either way.
fn step_toward(
    shape: &Shape,
    pieces: [&[BoundaryPiece]; 3],
    x: Point,
    target: Point,
    potential: f64,
    config: &MatConfig,
) -> Option<(Point, [PointOnShape; 3], f64)> {
    let v = target - x;
    let mut nu = 1.0;
    let mut tries = 0;
    loop {
        let new_x = x + v * nu;
        let new_ps = closest_points(shape, pieces, new_x)?;
        let new_target = circumcenter(new_ps[0].p, new_ps[1].p, new_ps[2].p);
        let new_potential = if new_target.is_finite() {
            (new_target - new_x).length()
        } else {
            f64::INFINITY
        };
        nu /= 2.0;
        tries += 1;
        if new_potential < potential || tries >= config.three_prong_backtracks {
            return Some((new_x, new_ps, new_potential));
        }
    }
}

/// Starting center: circumcenter of the two outer contacts and the point of
/// the middle piece closest to their midpoint.
fn initial_center(shape: &Shape, first: &PointOnShape, last: &PointOnShape, middle: &[BoundaryPiece]) -> Option<Point> {
    let mid = first.p.midpoint(last.p);
    let b = shape.closest_boundary_point(middle, mid, None)?;
    let pts = [first.p, b.p, last.p];

    let x = if first.kind == PointKind::Sharp {
        pts[0].midpoint(pts[1])
    } else {
        circumcenter(pts[0], pts[1], pts[2])
    };
    if x.is_finite() {
        return Some(x);
    }

    // Degenerate triple: fall back to the midpoint of the farthest pair.
    let pairs = [(0, 1), (1, 2), (0, 2)];
    let (a, b) = pairs
        .into_iter()
        .max_by(|&(a, b), &(c, d)| {
            crate::point::cmp_f64(dist_sq(pts[a], pts[b]), dist_sq(pts[c], pts[d]))
        })?;
    if dist_sq(pts[a], pts[b]) == 0.0 {
        return None;
    }
    Some(pts[a].midpoint(pts[b]))
}

/// Whether `points` are met in order going clockwise around `center`,
/// starting from the first.
fn runs_clockwise(center: Point, points: &[PointOnShape; 3]) -> bool {
    let [a0, a1, a2] = points.map(|p| (p.p - center).atan2());
    let k1 = (a0 - a1).rem_euclid(TAU);
    let k2 = (a0 - a2).rem_euclid(TAU);
    k1 <= k2
}

fn closest_points(shape: &Shape, pieces: [&[BoundaryPiece]; 3], x: Point) -> Option<[PointOnShape; 3]> {
    let a = shape.closest_boundary_point(pieces[0], x, None)?;
    let b = shape.closest_boundary_point(pieces[1], x, None)?;
    let c = shape.closest_boundary_point(pieces[2], x, None)?;
    Some([a, b, c])
}

/// Total misalignment between the circle and the boundary at each contact.
///
/// At a dull corner only deviation outside the corner's normal fan counts;
/// elsewhere the circle's tangent is compared with the curve's.
pub(crate) fn angle_error(shape: &Shape, points: &[PointOnShape], center: Point) -> f64 {
    points
        .iter()
        .map(|p| {
            let vv = (center - p.p).normalize();
            match shape.corner_at(p) {
                Some(corner) => {
                    let perps = corner.tangents.map(rotate90);
                    let e1 = clamped_asin(perps[0].cross(vv));
                    let e2 = clamped_asin(vv.cross(perps[1]));
                    e1.max(0.0) + e2.max(0.0)
                }
                None => {
                    let v1 = rotate90(vv);
                    let v2 = unit_tangent(&shape.curve(p.curve), p.t);
                    clamped_asin(v1.cross(v2)).abs()
                }
            }
        })
        .sum()
}

/// How far the circle is from being maximal: its radius against the
/// distance to the nearest point of the whole region boundary.
fn radius_delta(shape: &Shape, pieces: &[BoundaryPiece], circle: Circle) -> f64 {
    match shape.closest_boundary_point(pieces, circle.center, None) {
        Some(p) => (circle.radius - (circle.center - p.p).length()).abs(),
        None => f64::INFINITY,
    }
}
