use bez2mat::kurbo::{BezPath, Shape as _};
use bez2mat::MatConfig;
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "bez2mat", about = "Medial axis transform of bezier-bounded shapes")]
struct Cli {
    /// Input file with SVG path data (one or more subpaths)
    #[arg(short, long)]
    input: PathBuf,

    /// Output SVG document with the shape and its medial axis
    /// (path data goes to stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed points per curve
    #[arg(long, default_value = "3")]
    seeds: usize,

    /// Cap for osculating circle radii (bounding-box diagonal if omitted)
    #[arg(long)]
    max_radius: Option<f64>,

    /// Print circle and segment counts
    #[arg(long)]
    stats: bool,

    /// Log solver progress to stderr (repeat for debug detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Writes log records to stderr, indented under the progress header.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("  [{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);

    let config = MatConfig {
        seeds_per_curve: cli.seeds,
        max_osculating_radius: cli.max_radius,
        ..MatConfig::default()
    };

    eprintln!();
    eprintln!("  bez2mat \u{00b7} {}", cli.input.display());
    eprintln!();

    let t_start = Instant::now();
    let data = std::fs::read_to_string(&cli.input)?;
    let path = BezPath::from_svg(data.trim())?;
    let mat = bez2mat::find_mat(&[path], &config)?;
    let smooth = mat.smoothen();
    let elapsed = t_start.elapsed().as_millis();

    eprintln!(
        "  Shape       {} loops \u{00b7} {} concave corners",
        mat.shape().loop_count(),
        mat.shape().corners().len(),
    );
    eprintln!(
        "  MAT         {} circles \u{00b7} {} segments  ({}ms)",
        mat.tree().len(),
        smooth.len(),
        elapsed,
    );

    if cli.stats {
        let circles = mat.circles();
        let prongs = |n: usize| {
            mat.tree()
                .nodes()
                .iter()
                .filter(|node| mat.contacts().circle(node.circle).contacts.len() == n)
                .count()
        };
        let widest = circles.iter().map(|c| c.radius).fold(0.0, f64::max);
        eprintln!();
        eprintln!("  1-prongs    {}", prongs(1));
        eprintln!("  2-prongs    {}", prongs(2));
        eprintln!("  3-prongs    {}", prongs(3));
        eprintln!("  Contacts    {}", mat.contacts().len());
        eprintln!(
            "  Segments    {} lines \u{00b7} {} quads \u{00b7} {} cubics",
            smooth.lines.len(),
            smooth.quads.len(),
            smooth.cubics.len(),
        );
        eprintln!("  Max radius  {:.3}", widest);
    }

    let axis = smooth.to_bezpath();
    match &cli.output {
        Some(out) => {
            let mut boundary = BezPath::new();
            for l in mat.shape().loops() {
                for (i, c) in l.curves().iter().enumerate() {
                    if i == 0 {
                        boundary.move_to(c.p0);
                    }
                    boundary.curve_to(c.p1, c.p2, c.p3);
                }
                boundary.close_path();
            }
            std::fs::write(out, svg_document(&boundary, &axis)?)?;
            eprintln!();
            eprintln!("  \u{2713} {}", out.display());
        }
        None => println!("{}", axis.to_svg()),
    }

    Ok(())
}

/// A standalone SVG with the boundary filled and the axis stroked on top.
/// The y axis is flipped so shapes given y-up render upright.
fn svg_document(boundary: &BezPath, axis: &BezPath) -> Result<String, std::fmt::Error> {
    let bbox = boundary.bounding_box().inflate(10.0, 10.0);

    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
        bbox.x0,
        -bbox.y1,
        bbox.width(),
        bbox.height(),
    )?;
    writeln!(svg, r#"<g transform="scale(1,-1)">"#)?;
    writeln!(
        svg,
        r##"<path d="{}" fill="#dddddd" fill-rule="evenodd" stroke="#000000" stroke-width="1"/>"##,
        boundary.to_svg()
    )?;
    writeln!(
        svg,
        r##"<path d="{}" fill="none" stroke="#d02020" stroke-width="1.5"/>"##,
        axis.to_svg()
    )?;
    writeln!(svg, "</g>")?;
    writeln!(svg, "</svg>")?;
    Ok(svg)
}
