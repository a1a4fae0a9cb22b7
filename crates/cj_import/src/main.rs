//! Import a CityJSON file and report what was built.
//!
//! Run with: cargo run --bin cj_import -- data/delft.city.json --tree

use std::path::PathBuf;

use anyhow::{Context, Result};
use cj_core::cityjson::{load_cityjson, GeometryMerge};
use cj_core::{CommitMode, EntityHandle, ImportOptions, ImportSummary, Scene};
use cj_math::Aabb;
use clap::{Parser, ValueEnum};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "cj_import", version, about = "Import a CityJSON file into a scene graph")]
struct Args {
    /// CityJSON file to import
    input: PathBuf,

    /// JSON file with import options
    #[arg(long)]
    config: Option<PathBuf>,

    /// How multiple geometry entries per object combine
    #[arg(long, value_enum)]
    merge: Option<MergeArg>,

    /// How entities are committed to the scene
    #[arg(long, value_enum)]
    commit: Option<CommitArg>,

    /// Print the parent/child tree
    #[arg(long)]
    tree: bool,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MergeArg {
    LastEntry,
    Union,
}

impl From<MergeArg> for GeometryMerge {
    fn from(arg: MergeArg) -> Self {
        match arg {
            MergeArg::LastEntry => GeometryMerge::LastEntry,
            MergeArg::Union => GeometryMerge::Union,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CommitArg {
    Atomic,
    Incremental,
}

impl From<CommitArg> for CommitMode {
    fn from(arg: CommitArg) -> Self {
        match arg {
            CommitArg::Atomic => CommitMode::Atomic,
            CommitArg::Incremental => CommitMode::Incremental,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let options = resolve_options(&args)?;
    log::debug!("Import options: {:?}", options);

    let (scene, summary) = load_cityjson(&args.input, options)
        .with_context(|| format!("Failed to import {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&scene, &summary);
    }

    if args.tree {
        println!("\n--- Hierarchy ---");
        for root in scene.roots() {
            print_tree(&scene, root, 1);
        }
    }

    Ok(())
}

/// Options from `--config`, then command-line overrides.
fn resolve_options(args: &Args) -> Result<ImportOptions> {
    let mut options = match &args.config {
        Some(path) => ImportOptions::from_json_file(path)
            .with_context(|| format!("Failed to read options from {}", path.display()))?,
        None => ImportOptions::default(),
    };

    if let Some(merge) = args.merge {
        options = options.with_geometry_merge(merge.into());
    }
    if let Some(commit) = args.commit {
        options = options.with_commit(commit.into());
    }

    Ok(options)
}

fn print_summary(scene: &Scene, summary: &ImportSummary) {
    println!("=== Scene: {} ===", scene.name);
    println!("Objects: {}", summary.objects);
    println!("Vertices: {}", summary.vertices);
    println!("Faces: {}", summary.faces);
    println!("Triangles: {}", summary.triangles);
    println!("Hierarchy links: {}", summary.hierarchy_edges);
    println!("Skipped attributes: {}", summary.skipped_attributes);

    println!("\n--- World Bounds ---");
    println!("{}", format_bounds(&scene.world_bounds()));
}

fn format_bounds(bounds: &Aabb) -> String {
    if bounds.is_empty() {
        return "  (no geometry)".to_string();
    }
    let center = bounds.centroid();
    let size = bounds.size();
    format!(
        "  Min: ({:.3}, {:.3}, {:.3})\n  Max: ({:.3}, {:.3}, {:.3})\n  Center: ({:.3}, {:.3}, {:.3})\n  Size: ({:.3}, {:.3}, {:.3})",
        bounds.x.min,
        bounds.y.min,
        bounds.z.min,
        bounds.x.max,
        bounds.y.max,
        bounds.z.max,
        center.x,
        center.y,
        center.z,
        size.x,
        size.y,
        size.z
    )
}

fn print_tree(scene: &Scene, handle: EntityHandle, depth: usize) {
    let Some(entity) = scene.entity(handle) else {
        return;
    };

    let kind = entity
        .properties
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("?");
    println!(
        "{}{} [{}] {} faces",
        "  ".repeat(depth),
        entity.name,
        kind,
        entity.mesh.face_count()
    );

    for child in scene.children_of(handle) {
        print_tree(scene, child, depth + 1);
    }
}
