use approx::assert_relative_eq;
use bez2mat::kurbo::{BezPath, ParamCurve, ParamCurveCurvature};
use bez2mat::{find_mat, find_mat_with_observer, DebugRecorder, Mat, MatConfig, MatError};

fn mat_of(svg: &str) -> Mat {
    let path = BezPath::from_svg(svg).expect("valid path data");
    find_mat(&[path], &MatConfig::default()).expect("a MAT")
}

/// Every circle touching two points is centered between them.
fn assert_two_prongs_equidistant(mat: &Mat) {
    let contacts = mat.contacts();
    for id in contacts.circle_ids() {
        let c = contacts.circle(id);
        if c.contacts.len() != 2 {
            continue;
        }
        let d0 = (contacts.contact(c.contacts[0]).pos.p - c.circle.center).length();
        let d1 = (contacts.contact(c.contacts[1]).pos.p - c.circle.center).length();
        assert_relative_eq!(d0, d1, epsilon = 1e-3);
        assert_relative_eq!(d0, c.circle.radius, epsilon = 1e-3);
    }
}

fn assert_tree_consistent(mat: &Mat) {
    let tree = mat.tree();
    let mut visited = 0;
    tree.traverse(|_, _| visited += 1);
    assert_eq!(visited, tree.len());
    assert!(tree.len() <= mat.contacts().circle_count());
    assert_eq!(mat.smoothen().len(), tree.len() - 1);
}

/// Every circle touching two or three points has no boundary inside it.
fn assert_multi_prongs_empty(mat: &Mat) {
    let contacts = mat.contacts();
    for id in contacts.circle_ids() {
        let c = contacts.circle(id);
        if c.contacts.len() < 2 {
            continue;
        }
        for l in mat.shape().loops() {
            for curve in l.curves() {
                for i in 0..=50 {
                    let p = curve.eval(i as f64 / 50.0);
                    let d = (p - c.circle.center).length();
                    assert!(
                        d >= c.circle.radius - 1e-3,
                        "{p:?} lies inside {}-contact circle {:?}",
                        c.contacts.len(),
                        c.circle
                    );
                }
            }
        }
    }
}

/// 1-prongs sit on sharp corners or where the boundary is convex.
fn assert_one_prongs_on_convex_boundary(mat: &Mat) {
    let contacts = mat.contacts();
    for id in contacts.circle_ids() {
        let c = contacts.circle(id);
        if c.contacts.len() != 1 {
            continue;
        }
        let pos = contacts.contact(c.contacts[0]).pos;
        if pos.kind == bez2mat::PointKind::Sharp {
            continue;
        }
        let kappa = mat.shape().curve(pos.curve).curvature(pos.t);
        assert!(kappa > 0.0, "1-prong at {:?} on curvature {kappa}", pos.p);
    }
}

/// Each 3-prong joins three branches, so a tree never has more of them
/// than it has ends.
fn assert_branch_count_bounded(mat: &Mat) {
    let contacts = mat.contacts();
    let count = |n: usize| {
        contacts
            .circle_ids()
            .filter(|&id| contacts.circle(id).contacts.len() == n)
            .count()
    };
    assert!(count(3) <= count(1), "{} 3-prongs for {} ends", count(3), count(1));
}

#[test]
fn rectangle() {
    let mat = mat_of("M0,0 L0,10 L40,10 L40,0 Z");
    assert_tree_consistent(&mat);
    assert_two_prongs_equidistant(&mat);

    // A maximal circle in a rectangle touches the nearest side.
    let contacts = mat.contacts();
    for id in contacts.circle_ids() {
        let c = contacts.circle(id);
        if c.contacts.len() == 2 {
            let p = c.circle.center;
            let nearest = p.x.min(40.0 - p.x).min(p.y).min(10.0 - p.y);
            assert_relative_eq!(c.circle.radius, nearest, epsilon = 1e-3);
        }
    }
}

#[test]
fn two_prong_circles_are_empty() {
    let mat = mat_of("M0,0 L0,10 L40,10 L40,0 Z");
    let contacts = mat.contacts();
    for id in contacts.circle_ids() {
        let c = contacts.circle(id);
        if c.contacts.len() != 2 {
            continue;
        }
        for l in mat.shape().loops() {
            for curve in l.curves() {
                for i in 0..=50 {
                    let p = curve.eval(i as f64 / 50.0);
                    assert!((p - c.circle.center).length() >= c.circle.radius - 1e-3);
                }
            }
        }
    }
}

#[test]
fn l_shape() {
    let mat = mat_of("M0,0 L0,20 L10,20 L10,10 L20,10 L20,0 Z");
    assert_eq!(mat.shape().corners().len(), 1);
    assert_tree_consistent(&mat);
    assert_two_prongs_equidistant(&mat);
}

#[test]
fn square_with_hole() {
    let mat = mat_of("M0,0 L0,30 L30,30 L30,0 Z M10,10 L20,10 L20,20 L10,20 Z");
    assert_eq!(mat.shape().loop_count(), 2);
    assert_tree_consistent(&mat);
    assert_two_prongs_equidistant(&mat);

    // The hole is tied to the outer loop by a circle touching both.
    let contacts = mat.contacts();
    let bridges = |node: &bez2mat::tree::MatNode| {
        let c = contacts.circle(node.circle);
        let first = contacts.contact(c.contacts[0]).pos.curve.loop_idx;
        c.contacts
            .iter()
            .any(|&id| contacts.contact(id).pos.curve.loop_idx != first)
    };
    assert!(mat.tree().nodes().iter().any(bridges));
}

#[test]
fn hole_closing_circle_sits_above_the_hole() {
    let path = BezPath::from_svg("M0,0 L0,30 L30,30 L30,0 Z M10,10 L20,10 L20,20 L10,20 Z").unwrap();
    let mut rec = DebugRecorder::new();
    find_mat_with_observer(&[path], &MatConfig::default(), &mut rec).unwrap();

    let first = &rec.two_prongs[0];
    assert_eq!(first.scope, bez2mat::prong::Scope::HoleClosing);
    let circle = first.circle.expect("hole-closing 2-prong");
    assert_relative_eq!(circle.center.x, 15.0, epsilon = 1e-3);
    assert_relative_eq!(circle.center.y, 25.0, epsilon = 1e-3);
    assert_relative_eq!(circle.radius, 5.0, epsilon = 1e-3);
}

#[test]
fn observer_sees_every_stage() {
    let path = BezPath::from_svg("M0,0 L0,10 L40,10 L40,0 Z").unwrap();
    let mut rec = DebugRecorder::new();
    let mat = find_mat_with_observer(&[path], &MatConfig::default(), &mut rec).unwrap();

    assert!(!rec.two_prongs.is_empty());
    // The four corners end the axis with 1-prongs.
    assert!(rec.one_prongs.iter().filter(|r| !r.at_dull_corner).count() >= 4);
    for r in &rec.three_prongs {
        assert!(r.delta_count >= 3);
        if let Some(best) = r.best {
            assert!(r.candidates[best].error.is_finite());
        }
    }
    assert!(mat.tree().len() > 1);
}

#[test]
fn empty_input_is_rejected() {
    let err = find_mat(&[BezPath::new()], &MatConfig::default());
    assert!(matches!(err, Err(MatError::NoLoops)));
}

#[test]
fn round_shape_collapses_to_its_center() {
    let circle = bez2mat::kurbo::Circle::new((0.0, 0.0), 10.0);
    let path = bez2mat::kurbo::Shape::to_path(&circle, 1e-9);
    let mat = find_mat(&[path], &MatConfig::default()).unwrap();
    for c in mat.circles() {
        assert!(c.center.to_vec2().length() < 0.05, "circle at {:?}", c.center);
    }
}

#[test]
fn curved_boundary_has_empty_circles() {
    // A concave notch in the top and a convex bulge along the bottom.
    let mat = mat_of("M0,0 L0,40 L15,40 C15,30 25,30 25,40 L40,40 L40,0 C40,-10 0,-10 0,0 Z");
    assert_tree_consistent(&mat);
    assert_two_prongs_equidistant(&mat);
    assert_multi_prongs_empty(&mat);
    assert_one_prongs_on_convex_boundary(&mat);
    assert_branch_count_bounded(&mat);
}

#[test]
fn rounded_rect_has_bounded_branching() {
    let rect = bez2mat::kurbo::RoundedRect::new(0.0, 0.0, 40.0, 20.0, 5.0);
    let path = bez2mat::kurbo::Shape::to_path(&rect, 1e-9);
    let mat = find_mat(&[path], &MatConfig::default()).unwrap();
    assert_tree_consistent(&mat);
    assert_multi_prongs_empty(&mat);
    assert_one_prongs_on_convex_boundary(&mat);
    assert_branch_count_bounded(&mat);
}
