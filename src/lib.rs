//! bez2mat: medial axis transform of shapes bounded by cubic beziers.
//!
//! The medial axis of a shape is the set of centers of maximal inscribed
//! circles. Here it is computed as a tree of circles, each touching the
//! boundary at one, two or three points, and smoothed into bezier segments.
//!
//! # Example
//!
//! ```no_run
//! use bez2mat::{find_mat, kurbo::BezPath, MatConfig};
//!
//! let path = BezPath::from_svg("M0,0 L0,10 L40,10 L40,0 Z").unwrap();
//! let mat = find_mat(&[path], &MatConfig::default())?;
//! let axis = mat.smoothen().to_bezpath();
//! println!("{}", axis.to_svg());
//! # Ok::<(), bez2mat::MatError>(())
//! ```

#![forbid(unsafe_code)]

mod config;
mod geom;

pub mod contact;
pub mod corners;
pub mod debug;
pub mod error;
pub mod point;
pub mod prong;
pub mod shape;
pub mod smooth;
pub mod tree;

// Re-export kurbo so downstream users get the same version used in the
// public types.
pub use kurbo;

pub use config::MatConfig;
pub use contact::{CircleId, ContactId, Contacts, Delta};
pub use debug::{DebugRecorder, NoopObserver, ProngObserver};
pub use error::MatError;
pub use point::{CurveId, PointKind, PointOnShape};
pub use shape::Shape;
pub use smooth::SmoothMat;
pub use tree::MatTree;

use kurbo::{BezPath, Circle, Vec2};
use log::{debug, info, warn};

use contact::{compare, contact_rank};
use geom::dist_sq;
use prong::{find_2_prong, find_3_prong, Scope, TwoProngOutcome};

/// A computed medial axis transform.
#[derive(Debug, Clone)]
pub struct Mat {
    shape: Shape,
    contacts: Contacts,
    tree: MatTree,
}

impl Mat {
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn contacts(&self) -> &Contacts {
        &self.contacts
    }

    pub fn tree(&self) -> &MatTree {
        &self.tree
    }

    /// Circles of the tree, in traversal order.
    pub fn circles(&self) -> Vec<Circle> {
        let mut out = Vec::with_capacity(self.tree.len());
        self.tree.traverse(|node, _| out.push(self.contacts.circle(node.circle).circle));
        out
    }

    /// Smooth the tree into bezier segments.
    pub fn smoothen(&self) -> SmoothMat {
        smooth::smoothen(&self.shape, &self.contacts, &self.tree)
    }
}

/// Compute the MAT of the shape bounded by `paths`.
pub fn find_mat(paths: &[BezPath], config: &MatConfig) -> Result<Mat, MatError> {
    find_mat_with_observer(paths, config, &mut NoopObserver)
}

/// Like [`find_mat`], reporting every solver attempt to `observer`.
pub fn find_mat_with_observer(
    paths: &[BezPath],
    config: &MatConfig,
    observer: &mut dyn ProngObserver,
) -> Result<Mat, MatError> {
    // ── Shape ─────────────────────────────────────────────
    let shape = Shape::from_paths(paths, config)?;
    info!(
        "shape: {} loops, {} concave corners, {} seeds",
        shape.loop_count(),
        shape.corners().len(),
        shape.seeds().len()
    );
    let mut contacts = Contacts::new(shape.loop_count());

    // ── Hole closing ──────────────────────────────────────
    let r = shape.max_radius();
    for k in 1..shape.loop_count() {
        let y = shape.extreme_point(k);
        let osculating = Circle::new(y.p + Vec2::new(0.0, r), r);
        match find_2_prong(&shape, &mut contacts, y, osculating, Scope::HoleClosing, config, observer) {
            TwoProngOutcome::Found(prong) => {
                contacts.add_prong(&shape, prong.circle, &[prong.y, prong.z]);
            }
            TwoProngOutcome::OneProng => {}
            TwoProngOutcome::Failed(reason) => warn!("loop {k} could not be closed: {reason:?}"),
        }
    }

    // ── 2-prongs ──────────────────────────────────────────
    let sep_sq = config.separation_tolerance.powi(2);
    let mut found = 0;
    for &seed in shape.seeds() {
        let osculating = shape.osculating_circle(&seed);
        if is_covered(&shape, &contacts, &seed, osculating, sep_sq) {
            debug!("seed at {:?} already covered", seed.p);
            continue;
        }
        if let TwoProngOutcome::Found(prong) =
            find_2_prong(&shape, &mut contacts, seed, osculating, Scope::Local, config, observer)
        {
            contacts.add_prong(&shape, prong.circle, &[prong.y, prong.z]);
            found += 1;
        }
    }
    info!("2-prongs: {} added, {} contacts", found, contacts.len());

    // ── 3-prongs ──────────────────────────────────────────
    let added = add_three_prongs(&shape, &mut contacts, config, observer)?;
    info!("3-prongs: {} added, {} circles", added, contacts.circle_count());

    // ── Tree ──────────────────────────────────────────────
    if contacts.is_empty() {
        return Err(MatError::NoContacts);
    }
    let tree = MatTree::build(&contacts).ok_or(MatError::NoContacts)?;
    info!("tree: {} nodes", tree.len());

    Ok(Mat {
        shape,
        contacts,
        tree,
    })
}

/// Whether an existing contact already sits at `seed`.
fn is_covered(shape: &Shape, contacts: &Contacts, seed: &PointOnShape, osculating: Circle, sep_sq: f64) -> bool {
    let rank = contact_rank(shape, seed, osculating.center);
    let Some((prev, next)) = contacts.neighbors(seed, rank) else {
        return false;
    };
    [prev, next].into_iter().any(|id| {
        let c = contacts.contact(id);
        if seed.kind == PointKind::Dull {
            compare(&c.pos, c.rank, seed, rank).is_eq()
        } else {
            dist_sq(c.pos.p, seed.p) <= sep_sq
        }
    })
}

/// Split every region bounded by three or more pieces with a 3-prong until
/// none is left. Returns the number of 3-prongs added.
fn add_three_prongs(
    shape: &Shape,
    contacts: &mut Contacts,
    config: &MatConfig,
    observer: &mut dyn ProngObserver,
) -> Result<usize, MatError> {
    let cap = contacts.len();
    let mut settled = vec![false; contacts.len()];
    let mut added = 0;

    loop {
        settled.resize(contacts.len(), false);
        let Some(start) = contacts.contact_ids().find(|id| !settled[id.index()]) else {
            break;
        };
        let Some(deltas) = contacts.walk_piece(start) else {
            warn!("region walk from contact {} did not close", start.index());
            settled[start.index()] = true;
            continue;
        };
        for d in &deltas {
            settled[d.start.index()] = true;
        }
        if deltas.len() < 3 {
            continue;
        }
        if added >= cap {
            warn!("3-prong cap of {cap} reached, region of {} pieces left unsplit", deltas.len());
            break;
        }

        match find_3_prong(shape, contacts, &deltas, config, observer)? {
            Some(prong) => {
                let after = prong.deltas.map(|d| d.start);
                contacts.add_three_prong(shape, prong.circle, &prong.points, after);
                added += 1;
                for d in &deltas {
                    settled[d.start.index()] = false;
                }
            }
            None => debug!("no 3-prong for region of {} pieces", deltas.len()),
        }
    }
    Ok(added)
}
