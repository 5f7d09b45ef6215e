use crate::corners::CROSS_TANGENT_LIMIT;

/// All solver parameters in one struct.
///
/// The defaults are tuned for shapes whose extent is in the tens to
/// thousands of units (font outlines, SVG icons).
#[derive(Debug, Clone)]
pub struct MatConfig {
    // -- Corner classification --
    /// Sine of the turning angle below which a junction counts as smooth.
    pub cross_tangent_limit: f64,

    // -- Seeding --
    /// Number of evenly spaced interior seed points per curve.
    pub seeds_per_curve: usize,
    /// Radius cap for osculating circles. If None, the diagonal of the
    /// shape's bounding box is used.
    pub max_osculating_radius: Option<f64>,

    // -- 2-prong search --
    /// Iteration cap; reaching it is a slow-convergence failure.
    pub max_two_prong_iterations: usize,
    /// Contacts closer than this are indistinguishable (separation failure).
    pub separation_tolerance: f64,
    /// Slack for deciding on the first step that no second contact exists.
    pub one_prong_tolerance: f64,
    /// Center movement below which the search has converged.
    pub error_tolerance: f64,
    /// Culling is skipped when this many pieces or fewer remain.
    pub cull_threshold: usize,
    /// Extra squared distance allowed when culling pieces by bounding box.
    pub cull_margin: f64,

    // -- 3-prong search --
    /// Iteration cap for the center refinement.
    pub max_three_prong_iterations: usize,
    /// Change in potential below which refinement stops.
    pub three_prong_tolerance: f64,
    /// Number of step halvings tried before accepting a step.
    pub three_prong_backtracks: usize,

    // -- Curve queries --
    /// Accuracy passed to kurbo's nearest-point solver.
    pub nearest_accuracy: f64,
}

impl Default for MatConfig {
    fn default() -> Self {
        Self {
            cross_tangent_limit: CROSS_TANGENT_LIMIT,
            seeds_per_curve: 3,
            max_osculating_radius: None,
            max_two_prong_iterations: 50,
            separation_tolerance: 1e-3,
            one_prong_tolerance: 1e-4,
            error_tolerance: 1e-4,
            cull_threshold: 5,
            cull_margin: 0.1,
            max_three_prong_iterations: 10,
            three_prong_tolerance: 1e-7,
            three_prong_backtracks: 3,
            nearest_accuracy: 1e-9,
        }
    }
}
