use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::debug;
use pcb_board::load_board;
use pcb_panel::{
    DEFAULT_MARGIN, DEFAULT_NAME_PATTERN, EDGE_CUTS_LAYER, PanelConfig, detect_boards,
    split_panel,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(about = "Split a multi-board panel into one .kicad_pcb per board outline")]
pub struct PanelArgs {
    /// Panel board file (.kicad_pcb)
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Directory to write the extracted boards into
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Extra room kept around each outline, in nanometres
    #[arg(long, value_name = "NM", default_value_t = DEFAULT_MARGIN)]
    pub margin: i64,

    /// Layer holding the board outlines
    #[arg(long, value_name = "NAME", default_value = EDGE_CUTS_LAYER)]
    pub layer: String,

    /// Output file name; `{}` is replaced by the board number
    #[arg(long, value_name = "PATTERN", default_value = DEFAULT_NAME_PATTERN)]
    pub name: String,

    /// Only report the outlines found, write nothing
    #[arg(long)]
    pub dry_run: bool,
}

pub fn execute(args: PanelArgs) -> Result<()> {
    let config = PanelConfig {
        margin: args.margin,
        edge_layer: args.layer,
        name_pattern: args.name,
    };
    config.validate()?;

    let panel = load_board(&args.file)
        .with_context(|| format!("Failed to load panel {}", args.file.display()))?;
    let detection = detect_boards(&panel, &config);

    println!(
        "Identified {} PCB rectangles from {} unique {}",
        detection.rectangles.len().to_string().bold(),
        detection.unique_edges,
        config.edge_layer
    );
    for (i, rect) in detection.rectangles.iter().enumerate() {
        println!("Found PCB #{} at {}", i + 1, rect.bounds);
    }

    if args.dry_run {
        debug!("Dry run, nothing written");
        return Ok(());
    }
    if detection.rectangles.is_empty() {
        println!(
            "{} No closed outlines on {}",
            "Warning:".yellow(),
            config.edge_layer
        );
        return Ok(());
    }

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_dir.display()
        )
    })?;
    let written = split_panel(&panel, &detection, &args.output_dir, &config)
        .with_context(|| format!("Failed to split {}", args.file.display()))?;

    for board in &written {
        println!(
            "{} {} ({} items removed)",
            "Wrote".green().bold(),
            board.path.display(),
            board.pruned.total()
        );
    }
    Ok(())
}
