// Copyright © 2024-2025 The lamina authors <info@lamina.dev>
// SPDX-License-Identifier: AGPL-3.0-or-later

//! `lamina`: the command-line collaborator that reads a source file, drives
//! `lamina_csg::run_pipeline`, and hands the result to one of
//! `lamina_export`'s writers (§1 "out of scope: command-line argument
//! parsing ... file reading ... output writers", all of which live here
//! rather than in the core crates).

use std::io::Write;

use clap::{Parser, ValueEnum};
use lamina_core::policy::{Policy, PolicySet};
use lamina_core::{Config, Epsilon};
use lamina_csg::pipeline::Stage;
use lamina_lang::diag::DiagList;
use lamina_lang::src_ref::SourceBuffer;

/// Which output format to emit.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// ASCII STL.
    Stl,
    /// SCAD pretty-print (round-trips through `lamina-lang`'s lowering).
    Scad,
    /// PostScript.
    Postscript,
    /// JavaScript/WebGL viewer source.
    Webgl,
    /// Debug text dump of every reached IR stage.
    IrDump,
}

/// How far through the pipeline to run before emitting a result (§4 "Early
/// exit 'dump after stage X'").
#[derive(Debug, Clone, Copy, ValueEnum)]
enum StopAt {
    /// Stop after the SYN parse.
    Parsed,
    /// Stop after SCAD lowering.
    Scadded,
    /// Stop after the CSG3 tree is built.
    Csg3,
    /// Stop after per-layer slicing.
    Sliced,
    /// Stop after the per-layer Boolean evaluator runs.
    Evaluated,
    /// Stop after per-layer triangulation.
    Triangulated,
    /// Stop after the layer-difference pass.
    Diffed,
    /// Run the whole pipeline.
    Emitted,
}

impl From<StopAt> for Stage {
    fn from(value: StopAt) -> Self {
        match value {
            StopAt::Parsed => Stage::Parsed,
            StopAt::Scadded => Stage::Scadded,
            StopAt::Csg3 => Stage::Csg3Built,
            StopAt::Sliced => Stage::Sliced,
            StopAt::Evaluated => Stage::Evaluated,
            StopAt::Triangulated => Stage::Triangulated,
            StopAt::Diffed => Stage::Diffed,
            StopAt::Emitted => Stage::Emitted,
        }
    }
}

/// A CLI-selectable mirror of [`lamina_core::policy::Policy`] (`clap`
/// can't derive `ValueEnum` on a type from another crate).
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Abort the pipeline.
    Error,
    /// Warn and elide.
    Warn,
    /// Silently elide.
    Ignore,
}

impl From<PolicyArg> for Policy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Error => Policy::Error,
            PolicyArg::Warn => Policy::Warn,
            PolicyArg::Ignore => Policy::Ignore,
        }
    }
}

/// Slice a CSG model described in a small OpenSCAD-subset language into a
/// stack of 2D polygonal layers.
#[derive(Debug, Parser)]
#[command(name = "lamina", version, about)]
struct Cli {
    /// Source file to slice.
    input: std::path::PathBuf,

    /// Output file; stdout if omitted.
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "ir-dump")]
    format: Format,

    /// Stop the pipeline early at this stage.
    #[arg(long, value_enum, default_value = "emitted")]
    stop_at: StopAt,

    /// Override the lowest z-plane sampled.
    #[arg(long)]
    z_min: Option<f64>,
    /// Override the highest z-plane sampled.
    #[arg(long)]
    z_max: Option<f64>,
    /// Override the spacing between z-planes.
    #[arg(long)]
    z_step: Option<f64>,

    /// Cap on `$fn`-resolved polygon approximation counts.
    #[arg(long, default_value_t = 360)]
    max_fn: u32,

    /// Gap between adjacent printed layers (`-1` selects the per-writer
    /// special case; see `lamina_core::Config::layer_gap_for_stl`).
    #[arg(long, default_value_t = -1.0)]
    layer_gap: f64,

    /// Cap on simultaneous CSG2 Boolean operands per evaluation stage.
    #[arg(long, default_value_t = lamina_core::config::MAX_LAZY)]
    max_simultaneous: usize,

    /// Skip empty operand paths before evaluating a Boolean expression.
    #[arg(long, default_value_t = true)]
    skip_empty: bool,
    /// Collapse collinear edges in evaluator output.
    #[arg(long, default_value_t = true)]
    drop_collinear: bool,

    /// Policy for a primitive that is empty at the source.
    #[arg(long, value_enum, default_value = "error")]
    on_empty: PolicyArg,
    /// Policy for geometry collapsed by a transform.
    #[arg(long, value_enum, default_value = "error")]
    on_collapse: PolicyArg,
    /// Policy for a 3D object in a 2D-only context.
    #[arg(long, value_enum, default_value = "error")]
    on_3d_in_2d: PolicyArg,
    /// Policy for a 2D object in a 3D-only context.
    #[arg(long, value_enum, default_value = "error")]
    on_2d_in_3d: PolicyArg,

    /// Point-rasterisation grid step.
    #[arg(long, default_value_t = 1e-6)]
    eps_pt: f64,
    /// General equality epsilon.
    #[arg(long, default_value_t = 1e-9)]
    eps_eq: f64,
    /// Squared-quantity equality epsilon.
    #[arg(long, default_value_t = 1e-12)]
    eps_sqr: f64,

    /// Randomize per-layer color in the WebGL writer.
    #[arg(long)]
    color_rand: bool,

    /// Worker thread count for the per-layer data-parallel region; `0`
    /// uses `std::thread::available_parallelism()`.
    #[arg(long, default_value_t = 0)]
    jobs: usize,
}

impl Cli {
    fn config(&self) -> Config {
        Config::new(
            lamina_core::config::RangeOverride {
                z_min: self.z_min,
                z_max: self.z_max,
                z_step: self.z_step,
            },
            self.max_fn,
            self.layer_gap,
            self.max_simultaneous,
            lamina_core::config::OptimisationFlags {
                drop_collinear: self.drop_collinear,
                skip_empty: self.skip_empty,
            },
            PolicySet {
                empty_at_source: self.on_empty.into(),
                collapsed_by_transform: self.on_collapse.into(),
                object_3d_in_2d: self.on_3d_in_2d.into(),
                object_2d_in_3d: self.on_2d_in_3d.into(),
            },
            Epsilon::new(self.eps_pt, self.eps_eq, self.eps_sqr),
            self.color_rand,
            self.jobs,
        )
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.input)
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", cli.input.display()))?;

    let cfg = cli.config();
    let stop_after: Stage = cli.stop_at.into();

    let output = match lamina_csg::run_pipeline(&source, &cfg, stop_after) {
        Ok(output) => output,
        Err(err) => {
            report_error(&source, &err);
            std::process::exit(1);
        }
    };

    if output.diags.has_errors() {
        let buf = SourceBuffer::new(&source);
        let mut rendered = String::new();
        let _ = output.diags.pretty_print(&mut rendered, &buf);
        eprint!("{rendered}");
    }

    let mut sink: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    write_output(&mut sink, &output, &cli, &cfg)?;
    Ok(())
}

fn write_output(
    sink: &mut dyn Write,
    output: &lamina_csg::PipelineOutput,
    cli: &Cli,
    cfg: &Config,
) -> anyhow::Result<()> {
    use lamina_export::{IrDumpWriter, ScadWriter};

    match cli.format {
        Format::IrDump => {
            lamina_export::ir_dump::TextIrDumpWriter::new(sink).write_dump(output)?;
        }
        Format::Scad => {
            let Some(scad) = &output.scad else {
                anyhow::bail!("--format scad requires --stop-at scadded or later");
            };
            lamina_export::scad::PrettyScadWriter::new(sink).write_forest(scad)?;
        }
        Format::Stl => {
            let mut writer = lamina_export::stl::AsciiStlWriter::new(sink)?;
            lamina_export::stl::write_layers(&mut writer, &output.layers, cfg.layer_gap_for_stl())?;
        }
        Format::Postscript => {
            let bounds = output
                .csg3
                .as_ref()
                .map(|tree| lamina_csg::range::bounds_of(tree, true))
                .unwrap_or_default();
            let (min, max) = match (bounds.min, bounds.max) {
                (Some(min), Some(max)) => (min, max),
                _ => (lamina_core::Vec3::new(0.0, 0.0, 0.0), lamina_core::Vec3::new(0.0, 0.0, 0.0)),
            };
            let rect = geo::Rect::new(
                geo::Coord { x: min.x, y: min.y },
                geo::Coord { x: max.x, y: max.y },
            );
            let mut writer = lamina_export::postscript::MinimalPostscriptWriter::new(sink, rect)?;
            lamina_export::postscript::write_layers(&mut writer, &output.layers)?;
        }
        Format::Webgl => {
            let mut writer = lamina_export::webgl::JsWebglWriter::new(sink)?;
            lamina_export::webgl::write_layers(&mut writer, &output.layers, cfg.color_rand)?;
        }
    }
    Ok(())
}

fn report_error(source: &str, err: &lamina_csg::error::PipelineError) {
    let buf = SourceBuffer::new(source);
    let mut diags = DiagList::default();
    diags.push(lamina_lang::diag::Diagnostic::error(err.src_ref(), err.to_string()));
    let mut rendered = String::new();
    let _ = diags.pretty_print(&mut rendered, &buf);
    eprint!("{rendered}");
}
