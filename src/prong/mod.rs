//! Prong solvers.
//!
//! A prong is a circle inscribed in the shape that touches the boundary at
//! one, two or three points. 2-prongs trace the medial axis, 3-prongs are
//! its branch points and 1-prongs its ends.

mod three;
mod two;

pub use three::{find_3_prong, ThreeProng};
pub use two::{add_one_prong, find_2_prong, FailReason, Scope, TwoProng, TwoProngOutcome};

use crate::contact::{Contacts, Delta};
use crate::shape::{BoundaryPiece, Shape};

/// Boundary pieces covered by one delta.
pub(crate) fn delta_pieces(shape: &Shape, contacts: &Contacts, delta: Delta) -> Vec<BoundaryPiece> {
    let a = &contacts.contact(delta.start).pos;
    let b = &contacts.contact(delta.end).pos;
    shape.pieces_between(a, b, delta.start == delta.end)
}
