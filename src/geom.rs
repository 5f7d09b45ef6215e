//! Shared geometry utilities.

use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, Point, Rect, Vec2};

/// Squared distance between two points.
pub fn dist_sq(a: Point, b: Point) -> f64 {
    (a - b).length_squared()
}

/// Rotate a vector by 90 degrees counter-clockwise (y-up).
pub fn rotate90(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Rotate a vector by the angle with the given sine and cosine.
pub fn rotate(sin: f64, cos: f64, v: Vec2) -> Vec2 {
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Center of the circle through three points.
///
/// Non-finite when the points are collinear or coincident; callers check.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Point {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    let a2 = a.to_vec2().length_squared();
    let b2 = b.to_vec2().length_squared();
    let c2 = c.to_vec2().length_squared();
    let x = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let y = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    Point::new(x, y)
}

/// Intersection of two infinite lines, each given as a point and a direction.
///
/// Returns None when the lines are parallel (relative sine below 1e-9).
pub fn line_intersection(p0: Point, d0: Vec2, p1: Point, d1: Vec2) -> Option<Point> {
    let denom = d0.cross(d1);
    let scale = d0.length() * d1.length();
    if scale == 0.0 || denom.abs() <= 1e-9 * scale {
        return None;
    }
    let s = (p1 - p0).cross(d1) / denom;
    let p = p0 + d0 * s;
    p.is_finite().then_some(p)
}

/// Squared distance from a point to the closest point of a rectangle
/// (zero inside).
pub fn sq_dist_to_rect(rect: Rect, p: Point) -> f64 {
    let dx = (rect.x0 - p.x).max(0.0).max(p.x - rect.x1);
    let dy = (rect.y0 - p.y).max(0.0).max(p.y - rect.y1);
    dx * dx + dy * dy
}

/// The point on the line through `x` and `y` that is equidistant from
/// `y` and `z`.
///
/// Axes are swapped when the line is closer to vertical so the slope
/// stays within [-1, 1].
pub fn equidistant_point_on_line(x: Point, y: Point, z: Point) -> Point {
    let swap = ((x.y - y.y) / (x.x - y.x)).abs() > 1.0;
    let (x1, x2, y1, y2, z1, z2) = if swap {
        (x.y, x.x, y.y, y.x, z.y, z.x)
    } else {
        (x.x, x.y, y.x, y.y, z.x, z.y)
    };

    let a = (x2 - y2) / (x1 - y1);
    let b = y2 - a * y1;
    let c = (y1 * y1 + y2 * y2 - z1 * z1 - z2 * z2) + 2.0 * b * (z2 - y2);
    let d = y1 - z1 + a * (y2 - z2);
    let t1 = c / (2.0 * d);
    let t2 = a * t1 + b;

    if swap {
        Point::new(t2, t1)
    } else {
        Point::new(t1, t2)
    }
}

/// Unit tangent of a cubic at `t`.
///
/// Handles that coincide with their endpoint give a zero derivative there;
/// the direction to the next distinct control point is used instead.
pub fn unit_tangent(c: &CubicBez, t: f64) -> Vec2 {
    let d = c.deriv().eval(t).to_vec2();
    if d.length_squared() > 1e-24 {
        return d.normalize();
    }
    let candidates = if t < 0.5 {
        [c.p1 - c.p0, c.p2 - c.p0, c.p3 - c.p0]
    } else {
        [c.p3 - c.p2, c.p3 - c.p1, c.p3 - c.p0]
    };
    candidates
        .into_iter()
        .find(|v| v.length_squared() > 1e-24)
        .map(Vec2::normalize)
        .unwrap_or(Vec2::ZERO)
}

/// A cubic tracing the straight segment from `p0` to `p1`.
pub fn line_to_cubic(p0: Point, p1: Point) -> CubicBez {
    CubicBez::new(p0, p0.lerp(p1, 1.0 / 3.0), p0.lerp(p1, 2.0 / 3.0), p1)
}

/// Whether all four control points of a cubic coincide.
pub fn is_degenerate(c: &CubicBez) -> bool {
    c.p0 == c.p1 && c.p1 == c.p2 && c.p2 == c.p3
}

/// Clamp to [-1, 1] before `asin` so rounding cannot produce NaN.
pub fn clamped_asin(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}
