use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pcb_textvars::{DEFAULT_DATE_FORMAT, ExpandOptions, expand_files, help_epilog, parse_override};
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(
    about = "Replace ${VAR} references in board text with concrete values",
    after_help = help_epilog()
)]
pub struct VarsArgs {
    /// Board file (.kicad_pcb), or a directory containing board files
    #[arg(value_name = "FILE/DIR", required = true, value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Allow input files to be overwritten
    #[arg(short = 'c', long)]
    pub clobber: bool,

    /// Put generated files into this directory
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// SCM revision output format (currently unused)
    #[arg(long, value_name = "FORMAT")]
    pub rev_format: Option<String>,

    /// Date formatting (strftime syntax)
    #[arg(long, value_name = "FORMAT", default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// Set an additional variable or override a built-in (repeatable)
    #[arg(long = "var", value_name = "NAME:VALUE", value_parser = parse_override)]
    pub vars: Vec<(String, String)>,
}

pub fn execute(args: VarsArgs) -> Result<()> {
    let options = ExpandOptions {
        output_dir: args.output_dir,
        clobber: args.clobber,
        date_format: args.date_format,
        overrides: args.vars,
        rev_format: args.rev_format,
    };

    for file in expand_files(&args.paths, &options)? {
        println!(
            "{} {} -> {} ({} substitutions)",
            "Expanded".green().bold(),
            file.input.display(),
            file.output.display(),
            file.substitutions
        );
    }
    Ok(())
}
