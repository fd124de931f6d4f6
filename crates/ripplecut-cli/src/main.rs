//! Ripplecut CLI
//!
//! Headless front end for the timeline core: inspect project snapshots and
//! build export plans without a GUI.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ripplecut_core::project::ProjectSnapshot;
use ripplecut_core::render::{build_plan, ExportPreset, ExportProfile};

#[derive(Parser)]
#[command(name = "ripplecut", version, about = "Non-linear editing timeline toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a project snapshot: tracks, clips, markers, duration
    Inspect {
        /// Path to a project snapshot (JSON)
        project: PathBuf,
    },
    /// Build an export plan from a project snapshot
    Plan {
        /// Path to a project snapshot (JSON)
        project: PathBuf,
        /// Export preset name (see `ripplecut presets`)
        #[arg(long, default_value = "youtube-1080p")]
        preset: String,
        /// Write the plan to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List available export presets
    Presets,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Inspect { project } => inspect(&project),
        Commands::Plan {
            project,
            preset,
            output,
        } => plan(&project, &preset, output.as_deref()),
        Commands::Presets => {
            for preset in ExportPreset::all() {
                let profile = ExportProfile::from_preset(preset.clone());
                println!(
                    "{:<16} {}x{} @ {} fps",
                    preset.as_str(),
                    profile.width,
                    profile.height,
                    profile.fps
                );
            }
            Ok(())
        }
    }
}

fn load_snapshot(path: &std::path::Path) -> anyhow::Result<ProjectSnapshot> {
    ProjectSnapshot::load_from(path)
        .with_context(|| format!("failed to load project snapshot from {}", path.display()))
}

fn inspect(path: &std::path::Path) -> anyhow::Result<()> {
    let snapshot = load_snapshot(path)?;
    let timeline = &snapshot.project.timeline;

    println!("Project: {}", snapshot.project.name);
    println!(
        "Timeline: {} ({} fps, {:.3}s)",
        timeline.name,
        timeline.fps.as_f64(),
        timeline.duration_sec
    );
    if let Some(region) = &timeline.loop_region {
        println!(
            "Loop region: {:.3}s - {:.3}s",
            region.start_sec, region.end_sec
        );
    }

    for track in &timeline.tracks {
        let mut flags = Vec::new();
        if track.hidden {
            flags.push("hidden");
        }
        if track.muted {
            flags.push("muted");
        }
        if track.locked {
            flags.push("locked");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {:?} track \"{}\": {} clips{}",
            track.kind,
            track.name,
            track.clips.len(),
            flags
        );

        for clip in &track.clips {
            println!(
                "    {:>8.3}s - {:>8.3}s  {} (source {:.3}s..{:.3}s, speed {}x{})",
                clip.place.timeline_in_sec,
                clip.place.timeline_out_sec(),
                clip.name,
                clip.range.source_in_sec,
                clip.range.source_out_sec,
                clip.speed,
                if clip.is_freeze_frame { ", freeze" } else { "" }
            );
        }
    }

    if !timeline.markers.is_empty() {
        println!("Markers:");
        for marker in &timeline.markers {
            println!(
                "  {:>8.3}s  {}{}",
                marker.time_sec,
                marker.name,
                if marker.is_chapter { " (chapter)" } else { "" }
            );
        }
    }

    Ok(())
}

fn plan(
    path: &std::path::Path,
    preset: &str,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let snapshot = load_snapshot(path)?;
    let preset: ExportPreset = preset
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("unknown preset; run `ripplecut presets` for the list")?;
    let profile = ExportProfile::from_preset(preset);

    let plan = build_plan(&snapshot.project.timeline, &profile)
        .context("failed to build a render plan")?;
    let json = serde_json::to_string_pretty(&plan)?;

    match output {
        Some(out_path) => {
            std::fs::write(out_path, &json)
                .with_context(|| format!("failed to write {}", out_path.display()))?;
            info!(path = %out_path.display(), "wrote render plan");
        }
        None => println!("{}", json),
    }

    Ok(())
}
