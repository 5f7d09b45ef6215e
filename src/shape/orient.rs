//! Loop winding normalisation.
//!
//! The solvers assume the shape interior lies to the right of every
//! boundary loop: outer loops wind clockwise (y-up) and holes wind
//! counter-clockwise.

use kurbo::{CubicBez, ParamCurve, Point};

/// Samples per curve for the polygon used in area and containment tests.
const SAMPLES_PER_CURVE: usize = 8;

/// Orient every loop so the interior is on its right.
///
/// Nesting is decided by point-in-polygon testing: loops nested inside an
/// even number of others are outer boundaries (clockwise, negative area),
/// odd depth means a hole (counter-clockwise, positive area).
pub fn orient_loops(loops: Vec<Vec<CubicBez>>) -> Vec<Vec<CubicBez>> {
    let polygons: Vec<Vec<Point>> = loops.iter().map(|l| sample_polygon(l)).collect();

    loops
        .into_iter()
        .enumerate()
        .map(|(i, curves)| {
            // Any boundary point works as long as loops do not cross.
            let test_point = curves[0].eval(0.5);
            let depth = (0..polygons.len())
                .filter(|&j| j != i && point_in_polygon(test_point, &polygons[j]))
                .count();

            let should_be_cw = depth % 2 == 0;
            let is_cw = signed_area(&polygons[i]) < 0.0;
            if should_be_cw != is_cw {
                reverse_loop(&curves)
            } else {
                curves
            }
        })
        .collect()
}

/// Reverse a loop's direction: curve order and each curve's control points.
pub fn reverse_loop(curves: &[CubicBez]) -> Vec<CubicBez> {
    curves
        .iter()
        .rev()
        .map(|c| CubicBez::new(c.p3, c.p2, c.p1, c.p0))
        .collect()
}

fn sample_polygon(curves: &[CubicBez]) -> Vec<Point> {
    curves
        .iter()
        .flat_map(|c| (0..SAMPLES_PER_CURVE).map(move |i| c.eval(i as f64 / SAMPLES_PER_CURVE as f64)))
        .collect()
}

/// Shoelace area; positive = counter-clockwise in y-up.
pub(crate) fn signed_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    let mut area = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}

/// Ray-casting point-in-polygon test.
fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
