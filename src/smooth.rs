//! Smoothing the tree into bezier segments.
//!
//! Every tree edge becomes one segment from the parent's center to the
//! child's center, shaped by the direction the medial axis leaves each
//! center in.

use kurbo::{BezPath, CubicBez, Line, Point, QuadBez, Vec2};

use crate::contact::{ContactId, Contacts};
use crate::geom::{line_intersection, rotate, rotate90, unit_tangent};
use crate::point::{CurveId, PointKind};
use crate::shape::Shape;
use crate::tree::MatTree;

/// One smoothed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge {
    Line(Line),
    Quad(QuadBez),
    Cubic(CubicBez),
}

/// The smoothed MAT, segments grouped by order.
#[derive(Debug, Clone, Default)]
pub struct SmoothMat {
    pub lines: Vec<Line>,
    pub quads: Vec<QuadBez>,
    pub cubics: Vec<CubicBez>,
}

impl SmoothMat {
    fn push(&mut self, edge: Edge) {
        match edge {
            Edge::Line(l) => self.lines.push(l),
            Edge::Quad(q) => self.quads.push(q),
            Edge::Cubic(c) => self.cubics.push(c),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len() + self.quads.len() + self.cubics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All segments as one path, each its own subpath.
    pub fn to_bezpath(&self) -> BezPath {
        let mut path = BezPath::new();
        for l in &self.lines {
            path.move_to(l.p0);
            path.line_to(l.p1);
        }
        for q in &self.quads {
            path.move_to(q.p0);
            path.quad_to(q.p1, q.p2);
        }
        for c in &self.cubics {
            path.move_to(c.p0);
            path.curve_to(c.p1, c.p2, c.p3);
        }
        path
    }
}

/// Smooth every edge of `tree`.
pub fn smoothen(shape: &Shape, contacts: &Contacts, tree: &MatTree) -> SmoothMat {
    let mut out = SmoothMat::default();
    tree.traverse(|node, parent| {
        let (Some(parent), Some(link)) = (parent, node.link) else {
            return;
        };
        let pc = contacts.circle(parent.circle).circle.center;
        let cc = contacts.circle(node.circle).circle.center;

        let parent_other = contacts.next_on_circle(link.parent_contact);
        let child_other = contacts.prev_on_circle(link.contact);
        let dp = direction(shape, contacts, link.parent_contact, parent_other, pc);
        let dc = direction(shape, contacts, link.contact, child_other, cc);
        out.push(fit_edge(pc, dp, cc, dc));
    });
    out
}

/// Direction of the medial axis at `center`, given the contact the edge
/// leaves from and the next contact on the same circle.
fn direction(shape: &Shape, contacts: &Contacts, id: ContactId, other: ContactId, center: Point) -> Vec2 {
    let pos = contacts.contact(id).pos;
    let v = if other != id {
        rotate90(contacts.contact(other).pos.p - pos.p)
    } else if let (PointKind::Sharp, Some(j)) = (pos.kind, pos.junction()) {
        corner_bisector(shape, pos.curve, j)
    } else {
        center - pos.p
    };
    if v.length_squared() == 0.0 {
        return v;
    }
    v.normalize()
}

/// Interior bisector of the sharp corner at junction `j`.
fn corner_bisector(shape: &Shape, curve: CurveId, j: usize) -> Vec2 {
    let k = curve.loop_idx;
    let n = shape.loops()[k].len();
    let incoming = shape.curve(CurveId::new(k, j));
    let outgoing = shape.curve(CurveId::new(k, (j + 1) % n));

    let tan1 = unit_tangent(&outgoing, 0.0);
    let tan2 = -unit_tangent(&incoming, 1.0);
    let x = tan1.dot(tan2);
    let cos = ((1.0 + x) / 2.0).max(0.0).sqrt();
    let sin = ((1.0 - x) / 2.0).max(0.0).sqrt();
    rotate(sin, cos, tan2)
}

/// Fit one segment between two centers with the given end directions.
///
/// A quadratic whose control point is where the two direction lines meet,
/// unless they meet outside the band between the centers. Then the edge
/// bends both ways and a cubic is used, with control points where each
/// direction line crosses the perpendicular bisector of the centers.
/// Parallel directions give a straight line.
pub fn fit_edge(pc: Point, dp: Vec2, cc: Point, dc: Vec2) -> Edge {
    let Some(mid) = line_intersection(pc, dp, cc, dc) else {
        return Edge::Line(Line::new(pc, cc));
    };

    let a = mid - pc;
    let b = mid - cc;
    let c = cc - pc;
    let twisted = a.dot(c) < 0.0 || b.dot(c) > 0.0;
    if !twisted {
        return Edge::Quad(QuadBez::new(pc, mid, cc));
    }

    let m = pc.midpoint(cc);
    let bisector = rotate90(c);
    match (
        line_intersection(pc, dp, m, bisector),
        line_intersection(cc, dc, m, bisector),
    ) {
        (Some(q1), Some(q2)) => Edge::Cubic(CubicBez::new(pc, q1, q2, cc)),
        _ => Edge::Line(Line::new(pc, cc)),
    }
}
