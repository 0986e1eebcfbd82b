use anyhow::{Context, Result};
use card_print::constants::pt_to_mm;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardprint", about = "Card print sheet generator", version)]
struct Cli {
    /// Service configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a print sheet from a card manifest
    Sheet {
        /// JSON array of cards (card_id, name, set_code, collector_number, file_path)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Layout name (a4_9up, letter_9up, a4_18up)
        #[arg(short, long)]
        layout: Option<String>,

        /// Add bleed around each card and draw cut marks
        #[arg(long)]
        bleed: bool,

        /// Output format
        #[arg(long, default_value = "pdf", value_enum)]
        format: FormatArg,

        /// Spacing between cards in mm (overrides the layout)
        #[arg(long)]
        spacing: Option<f32>,

        /// Page margin in mm (overrides the layout)
        #[arg(long)]
        margin: Option<f32>,

        /// Place each card this many times
        #[arg(long, default_value_t = 1)]
        copies: usize,

        /// How images are scaled into their card boxes
        #[arg(long, default_value = "fit", value_enum)]
        fit: FitArg,

        /// Fraction of each image edge to trim before placement (0 to 0.25)
        #[arg(long, default_value_t = 0.0)]
        crop: f32,

        /// Output directory (overrides the configuration)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List the available layouts and their geometry
    Layouts {
        /// Show card boxes with bleed applied
        #[arg(long)]
        bleed: bool,
    },

    /// Delete a generated print file
    Delete {
        /// Path of the print file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Png,
}

#[derive(Clone, Copy, ValueEnum)]
enum FitArg {
    Fit,
    Stretch,
}

impl From<FitArg> for card_print::ImageFit {
    fn from(arg: FitArg) -> Self {
        match arg {
            FitArg::Fit => Self::Fit,
            FitArg::Stretch => Self::Stretch,
        }
    }
}

impl From<FormatArg> for card_print::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Png => Self::Png,
        }
    }
}

fn get_log_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(path: Option<&PathBuf>) -> Result<card_print::ServiceConfig> {
    match path {
        Some(path) => card_print::ServiceConfig::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(card_print::ServiceConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(get_log_level(cli.verbose, cli.quiet));

    let mut config = load_config(cli.config.as_ref()).await?;

    match cli.command {
        Commands::Sheet {
            manifest,
            layout,
            bleed,
            format,
            spacing,
            margin,
            copies,
            fit,
            crop,
            output_dir,
        } => {
            let bytes = tokio::fs::read(&manifest)
                .await
                .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;
            let cards: Vec<card_print::CardPrintInput> = serde_json::from_slice(&bytes)
                .with_context(|| format!("Invalid manifest {}", manifest.display()))?;

            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            let layout = card_print::SheetLayout::from_name(layout.as_deref())?;
            let options = card_print::PrintSheetOptions {
                include_bleed: bleed,
                output_format: format.into(),
                card_spacing_mm: spacing,
                margin_size_mm: margin,
                copies_per_card: copies,
                image_fit: fit.into(),
                crop_fraction: crop,
            };

            let service = card_print::PrintService::new(config);
            let sheet = service
                .generate_print_sheet(&cards, &layout, &options)
                .await?;

            for warning in &sheet.warnings {
                eprintln!("warning: {}", warning);
            }
            println!("{}", serde_json::to_string_pretty(&sheet.record)?);
        }

        Commands::Layouts { bleed } => {
            let options = card_print::PrintSheetOptions {
                include_bleed: bleed,
                ..Default::default()
            };
            for layout in card_print::SheetLayout::NAMED {
                let dims = card_print::calculate_layout(&layout, &options)?;
                println!("{}:", layout.name());
                println!(
                    "  Page: {:.1} x {:.1} mm",
                    pt_to_mm(dims.page_width_pt),
                    pt_to_mm(dims.page_height_pt)
                );
                println!(
                    "  Card: {:.2} x {:.2} mm",
                    pt_to_mm(dims.card_width_pt),
                    pt_to_mm(dims.card_height_pt)
                );
                println!(
                    "  Grid: {} rows x {} cols ({} cards per page)",
                    dims.rows,
                    dims.cols,
                    dims.slots_per_page()
                );
            }
        }

        Commands::Delete { path } => {
            let service = card_print::PrintService::new(config);
            let deleted = service.delete_print_file(&path).await?;
            if deleted.removed_from_disk {
                println!("Deleted {}", path.display());
            } else {
                println!("{} was already gone", path.display());
            }
        }
    }

    Ok(())
}
