//! Contact points and MAT circles.
//!
//! All contact points and circles live in one arena ([`Contacts`]) and are
//! addressed by index. Each contact sits in two cyclic orders at once:
//!
//! - loop order: position along its boundary loop, used for neighbour
//!   queries and for walking the boundary;
//! - circle order: clockwise around the circle it belongs to. A 1-prong's
//!   single contact links to itself.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use kurbo::{Circle, Point};

use crate::point::{cmp_f64, PointOnShape};
use crate::shape::Shape;

/// Handle of a contact point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactId(usize);

impl ContactId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle of a MAT circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CircleId(usize);

impl CircleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A boundary contact of one MAT circle.
#[derive(Debug, Clone)]
pub struct ContactPoint {
    pub pos: PointOnShape,
    pub circle: CircleId,
    /// Orders contacts that meet at the same dull corner; zero elsewhere.
    pub rank: f64,
    prev: ContactId,
    next: ContactId,
    prev_on_circle: ContactId,
    next_on_circle: ContactId,
}

/// An inscribed circle and its contacts in clockwise order.
#[derive(Debug, Clone)]
pub struct MatCircle {
    pub circle: Circle,
    pub contacts: Vec<ContactId>,
}

/// A pair of loop-adjacent contacts bounding one boundary piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub start: ContactId,
    pub end: ContactId,
}

/// Rank of a contact relative to its circle's center.
///
/// At a dull corner the rank grows as the direction to the center turns
/// from the incoming curve's normal toward the outgoing one, which is the
/// order in which circles touch the corner when walking the boundary.
pub fn contact_rank(shape: &Shape, pos: &PointOnShape, center: Point) -> f64 {
    let Some(corner) = shape.corner_at(pos) else {
        return 0.0;
    };
    let t = corner.tangents[0];
    let inward = kurbo::Vec2::new(t.y, -t.x);
    let v = center - pos.p;
    if v.length_squared() == 0.0 {
        return 0.0;
    }
    -inward.dot(v.normalize())
}

/// Loop order of two contact positions.
pub fn compare(a: &PointOnShape, a_rank: f64, b: &PointOnShape, b_rank: f64) -> Ordering {
    a.cmp_position(b)
        .then_with(|| cmp_f64(a_rank, b_rank))
        .then_with(|| cmp_f64(a.order, b.order))
}

/// Arena of contact points and circles.
#[derive(Debug, Clone)]
pub struct Contacts {
    points: Vec<ContactPoint>,
    circles: Vec<MatCircle>,
    heads: Vec<Option<ContactId>>,
}

impl Contacts {
    pub fn new(loop_count: usize) -> Self {
        Self {
            points: Vec::new(),
            circles: Vec::new(),
            heads: vec![None; loop_count],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn circle_count(&self) -> usize {
        self.circles.len()
    }

    pub fn contact(&self, id: ContactId) -> &ContactPoint {
        &self.points[id.0]
    }

    pub fn circle(&self, id: CircleId) -> &MatCircle {
        &self.circles[id.0]
    }

    pub fn contact_ids(&self) -> impl Iterator<Item = ContactId> {
        (0..self.points.len()).map(ContactId)
    }

    pub fn circle_ids(&self) -> impl Iterator<Item = CircleId> {
        (0..self.circles.len()).map(CircleId)
    }

    pub fn next(&self, id: ContactId) -> ContactId {
        self.points[id.0].next
    }

    pub fn prev(&self, id: ContactId) -> ContactId {
        self.points[id.0].prev
    }

    pub fn next_on_circle(&self, id: ContactId) -> ContactId {
        self.points[id.0].next_on_circle
    }

    pub fn prev_on_circle(&self, id: ContactId) -> ContactId {
        self.points[id.0].prev_on_circle
    }

    /// First contact of loop `k` in loop order.
    pub fn head(&self, k: usize) -> Option<ContactId> {
        self.heads.get(k).copied().flatten()
    }

    /// Contacts of loop `k` in loop order, starting at the head.
    pub fn loop_ids(&self, k: usize) -> Vec<ContactId> {
        let mut out = Vec::new();
        let Some(head) = self.head(k) else {
            return out;
        };
        let mut id = head;
        loop {
            out.push(id);
            id = self.next(id);
            if id == head || out.len() > self.points.len() {
                break;
            }
        }
        out
    }

    fn order_of(&self, id: ContactId, pos: &PointOnShape, rank: f64) -> Ordering {
        let c = &self.points[id.0];
        compare(&c.pos, c.rank, pos, rank)
    }

    /// Contacts on either side of `pos` in loop order: the last contact not
    /// after it (wrapping to the tail) and that contact's successor.
    pub fn neighbors(&self, pos: &PointOnShape, rank: f64) -> Option<(ContactId, ContactId)> {
        let head = self.head(pos.curve.loop_idx)?;
        let mut prev = None;
        let mut id = head;
        loop {
            if self.order_of(id, pos, rank) == Ordering::Greater {
                break;
            }
            prev = Some(id);
            id = self.next(id);
            if id == head {
                break;
            }
        }
        let prev = prev.unwrap_or_else(|| self.prev(head));
        Some((prev, self.next(prev)))
    }

    /// Add a circle touching the boundary at `positions`, inserting every
    /// contact at its place in loop order.
    pub fn add_prong(&mut self, shape: &Shape, circle: Circle, positions: &[PointOnShape]) -> CircleId {
        let circle_id = self.push_circle(circle);
        for pos in positions {
            let rank = contact_rank(shape, pos, circle.center);
            let after = self.neighbors(pos, rank).map(|(prev, _)| prev);
            self.insert(*pos, rank, circle_id, after);
        }
        self.link_circle(circle_id);
        circle_id
    }

    /// Add a 3-prong, inserting each contact directly after the start of
    /// the boundary piece it was found on.
    pub fn add_three_prong(
        &mut self,
        shape: &Shape,
        circle: Circle,
        points: &[PointOnShape; 3],
        after: [ContactId; 3],
    ) -> CircleId {
        let circle_id = self.push_circle(circle);
        for (pos, prev) in points.iter().zip(after) {
            let rank = contact_rank(shape, pos, circle.center);
            self.insert(*pos, rank, circle_id, Some(prev));
        }
        self.link_circle(circle_id);
        circle_id
    }

    fn push_circle(&mut self, circle: Circle) -> CircleId {
        let id = CircleId(self.circles.len());
        self.circles.push(MatCircle {
            circle,
            contacts: Vec::new(),
        });
        id
    }

    fn insert(&mut self, pos: PointOnShape, rank: f64, circle: CircleId, after: Option<ContactId>) -> ContactId {
        let id = ContactId(self.points.len());
        let k = pos.curve.loop_idx;
        self.points.push(ContactPoint {
            pos,
            circle,
            rank,
            prev: id,
            next: id,
            prev_on_circle: id,
            next_on_circle: id,
        });
        self.circles[circle.0].contacts.push(id);

        let after = after.or_else(|| self.heads[k].map(|head| self.points[head.0].prev));
        match (self.heads[k], after) {
            (Some(head), Some(prev)) => {
                let next = self.points[prev.0].next;
                self.points[id.0].prev = prev;
                self.points[id.0].next = next;
                self.points[prev.0].next = id;
                self.points[next.0].prev = id;
                if self.order_of(head, &pos, rank) == Ordering::Greater {
                    self.heads[k] = Some(id);
                }
            }
            _ => self.heads[k] = Some(id),
        }
        id
    }

    /// Sort a circle's contacts clockwise, starting from its first contact,
    /// and link them into a cycle.
    fn link_circle(&mut self, circle: CircleId) {
        let center = self.circles[circle.0].circle.center;
        let mut ids = self.circles[circle.0].contacts.clone();
        let angle = |p: Point| {
            let v = p - center;
            v.y.atan2(v.x)
        };
        let first = angle(self.points[ids[0].0].pos.p);
        ids.sort_by(|a, b| {
            let ka = (first - angle(self.points[a.0].pos.p)).rem_euclid(TAU);
            let kb = (first - angle(self.points[b.0].pos.p)).rem_euclid(TAU);
            cmp_f64(ka, kb)
        });

        let n = ids.len();
        for i in 0..n {
            let id = ids[i];
            self.points[id.0].next_on_circle = ids[(i + 1) % n];
            self.points[id.0].prev_on_circle = ids[(i + n - 1) % n];
        }
        self.circles[circle.0].contacts = ids;
    }

    /// Walk the boundary of the region that the piece after `start` belongs
    /// to: along the boundary to the next contact, across that contact's
    /// circle, and so on until back at `start`.
    ///
    /// Returns None if the walk does not close, which means the orders are
    /// inconsistent.
    pub fn walk_piece(&self, start: ContactId) -> Option<Vec<Delta>> {
        let mut deltas = Vec::new();
        let mut id = start;
        for _ in 0..=self.points.len() {
            let end = self.next(id);
            deltas.push(Delta { start: id, end });
            id = self.prev_on_circle(end);
            if id == start {
                return Some(deltas);
            }
        }
        None
    }
}
