//! pptx-carousel CLI - definitions, Morph transitions and carousel decks
//!
//! A command-line front end for the pptx-carousel library.

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use pptx_carousel::carousel::{create_carousel, CarouselOptions};
use pptx_carousel::compose::{create_grid_carousel, rebuild_presentation, GridOptions, RebuildOptions};
use pptx_carousel::events::{BuildEvent, Reporter, TracingReporter};
use pptx_carousel::export::{export_definition_images, CommandExporter};
use pptx_carousel::pipeline::{create_carousel_end_to_end, PipelineOptions, TempPaths};
use pptx_carousel::pptx::{add_morph_transitions, MorphOption, MorphOptions, TransitionSpeed};
use pptx_carousel::render::{save_definition, JsonFormat};
use pptx_carousel::{DefinitionFormat, ExtractOptions, PptxParser, ShapeKind};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// PowerPoint definitions, Morph transitions and carousel decks
#[derive(Parser)]
#[command(
    name = "pptx-carousel",
    author = "iyulab",
    version,
    about = "Build carousel decks from PowerPoint presentations",
    long_about = "pptx-carousel - PowerPoint deck tooling.\n\n\
                  Extracts structural definitions, adds Morph transitions and builds \
                  template-driven or grid carousel decks from slide images."
)]
struct Cli {
    /// Log library activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a deck's structural definition
    #[command(visible_alias = "def")]
    Definition {
        /// Input .pptx file
        input: PathBuf,

        /// Output file (default: <input>_definition.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format when no output file is given
        #[arg(short, long, default_value = "json")]
        format: FormatArg,

        /// Limit the number of slides processed
        #[arg(long)]
        max_slides: Option<usize>,

        /// Compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        /// Export slide images to <input>_images with this command
        /// ({input}, {output} and {index} are substituted)
        #[arg(long, value_name = "COMMAND")]
        export_command: Option<String>,
    },

    /// Add Morph transitions to every slide
    Morph {
        /// Input .pptx file
        input: PathBuf,

        /// Output .pptx file
        output: PathBuf,

        /// Transition speed
        #[arg(long, default_value = "slow")]
        speed: SpeedArg,

        /// Transition duration in milliseconds
        #[arg(long, default_value = "2000")]
        duration: u32,

        /// What Morph matches between slides
        #[arg(long, default_value = "by-object")]
        option: MorphArg,
    },

    /// Build a carousel deck from a template definition and slide images
    Carousel {
        /// Template definition (.json, .yaml or .yml)
        template: PathBuf,

        /// Folder containing slide images
        images_folder: PathBuf,

        /// Output .pptx file
        output: PathBuf,

        /// File pattern for slide images
        #[arg(long, default_value = "slide_*.png")]
        pattern: String,

        /// Don't draw borders around pictures
        #[arg(long)]
        no_borders: bool,

        /// Don't draw the template's edge panels
        #[arg(long)]
        no_edge_panels: bool,
    },

    /// Build overview pages with several slide thumbnails each
    Grid {
        /// Folder containing slide images
        images_folder: PathBuf,

        /// Output .pptx file
        output: PathBuf,

        /// Thumbnails per page (1-9)
        #[arg(short, long, default_value = "4")]
        slides_per_page: usize,

        /// Slide width in inches
        #[arg(long, default_value = "16.0")]
        width: f64,

        /// Slide height in inches
        #[arg(long, default_value = "9.0")]
        height: f64,

        /// Don't add page titles
        #[arg(long)]
        no_titles: bool,

        /// Don't add borders around thumbnails
        #[arg(long)]
        no_borders: bool,

        /// File pattern for slide images
        #[arg(long, default_value = "slide_*.png")]
        pattern: String,
    },

    /// Rebuild a deck from a definition as full-slide images
    Rebuild {
        /// Definition file (.json, .yaml or .yml)
        definition: PathBuf,

        /// Folder containing slide images
        images_folder: PathBuf,

        /// Output .pptx file
        output: PathBuf,

        /// Slide width in inches
        #[arg(long, default_value = "16.0")]
        width: f64,

        /// Slide height in inches
        #[arg(long, default_value = "9.0")]
        height: f64,
    },

    /// Export, extract and build a carousel in one step
    Pipeline {
        /// Input .pptx file
        input: PathBuf,

        /// Template definition (.json, .yaml or .yml)
        template: PathBuf,

        /// Output .pptx file
        output: PathBuf,

        /// Slide image export command ({input}, {output} and {index} are substituted)
        #[arg(long, value_name = "COMMAND")]
        export_command: String,

        /// Keep the intermediate definition and images
        #[arg(long)]
        keep_temp: bool,
    },

    /// Show deck information
    Info {
        /// Input .pptx file
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Definition file format
#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for DefinitionFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => DefinitionFormat::Json,
            FormatArg::Yaml => DefinitionFormat::Yaml,
        }
    }
}

/// Transition speed
#[derive(Clone, Copy, ValueEnum)]
enum SpeedArg {
    Slow,
    Medium,
    Fast,
}

impl From<SpeedArg> for TransitionSpeed {
    fn from(speed: SpeedArg) -> Self {
        match speed {
            SpeedArg::Slow => TransitionSpeed::Slow,
            SpeedArg::Medium => TransitionSpeed::Medium,
            SpeedArg::Fast => TransitionSpeed::Fast,
        }
    }
}

/// Morph matching mode
#[derive(Clone, Copy, ValueEnum)]
enum MorphArg {
    ByObject,
    ByWord,
    ByChar,
}

impl From<MorphArg> for MorphOption {
    fn from(option: MorphArg) -> Self {
        match option {
            MorphArg::ByObject => MorphOption::ByObject,
            MorphArg::ByWord => MorphOption::ByWord,
            MorphArg::ByChar => MorphOption::ByChar,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter),
        )
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Definition {
            input,
            output,
            format,
            max_slides,
            compact,
            export_command,
        } => {
            let format = match &output {
                Some(path) => DefinitionFormat::from_path(path)?,
                None => format.into(),
            };
            let output = output.unwrap_or_else(|| {
                let temp = TempPaths::for_input(&input);
                temp.definition.with_extension(format.extension())
            });

            let progress = ProgressReporter::new("Extracting definition...");
            let mut options = ExtractOptions::new();
            if let Some(max) = max_slides {
                options = options.with_max_slides(max);
            }
            let mut definition = PptxParser::open(&input)?.parse_with(&options, &progress)?;

            let images = TempPaths::for_input(&input).images;
            if let Some(command) = &export_command {
                let exporter = CommandExporter::from_command_line(command)?;
                progress.set_message("Exporting slide images...");
                export_definition_images(&mut definition, &input, &exporter, &images, &progress)?;
            }

            if format == DefinitionFormat::Json && compact {
                let json = pptx_carousel::render::to_json(&definition, JsonFormat::Compact)?;
                std::fs::write(&output, json)?;
            } else {
                save_definition(&definition, &output, format)?;
            }
            progress.finish();

            println!(
                "{} Definition written to: {}",
                "✓".green().bold(),
                output.display()
            );
            if export_command.is_some() {
                println!(
                    "{} Images exported to folder: {}",
                    "✓".green().bold(),
                    images.display()
                );
            }
        }

        Commands::Morph {
            input,
            output,
            speed,
            duration,
            option,
        } => {
            let options = MorphOptions::new()
                .with_speed(speed.into())
                .with_duration_ms(duration)
                .with_option(option.into());

            let progress = ProgressReporter::new("Adding Morph transitions...");
            let count = add_morph_transitions(&input, &output, &options, &progress)?;
            progress.finish();

            println!(
                "{} Added Morph transitions to {} slides: {}",
                "✓".green().bold(),
                count,
                output.display()
            );
        }

        Commands::Carousel {
            template,
            images_folder,
            output,
            pattern,
            no_borders,
            no_edge_panels,
        } => {
            let mut options = CarouselOptions::new()
                .with_image_pattern(pattern)
                .with_edge_panels(!no_edge_panels);
            if no_borders {
                options = options.with_border(None);
            }

            let progress = ProgressReporter::new("Building carousel...");
            let summary = create_carousel(&template, &images_folder, &output, &options, &progress)?;
            progress.finish();

            println!(
                "{} Created carousel with {} pages: {}",
                "✓".green().bold(),
                summary.pages,
                output.display()
            );
            if summary.images_skipped > 0 {
                println!(
                    "{} {} pictures could not be added",
                    "!".yellow().bold(),
                    summary.images_skipped
                );
            }
        }

        Commands::Grid {
            images_folder,
            output,
            slides_per_page,
            width,
            height,
            no_titles,
            no_borders,
            pattern,
        } => {
            let options = GridOptions::new()
                .with_slides_per_page(slides_per_page)
                .with_slide_size(width, height)
                .with_titles(!no_titles)
                .with_borders(!no_borders)
                .with_image_pattern(pattern);

            let progress = ProgressReporter::new("Building grid carousel...");
            let pages = create_grid_carousel(&images_folder, &output, &options, &progress)?;
            progress.finish();

            println!(
                "{} Created grid carousel with {} pages: {}",
                "✓".green().bold(),
                pages,
                output.display()
            );
        }

        Commands::Rebuild {
            definition,
            images_folder,
            output,
            width,
            height,
        } => {
            let options = RebuildOptions::new().with_slide_size(width, height);

            let progress = ProgressReporter::new("Rebuilding presentation...");
            let slides =
                rebuild_presentation(&definition, &images_folder, &output, &options, &progress)?;
            progress.finish();

            println!(
                "{} Rebuilt {} slides: {}",
                "✓".green().bold(),
                slides,
                output.display()
            );
        }

        Commands::Pipeline {
            input,
            template,
            output,
            export_command,
            keep_temp,
        } => {
            let exporter = CommandExporter::from_command_line(&export_command)?;
            let options = PipelineOptions::new().with_keep_temp(keep_temp);

            let progress = ProgressReporter::new("Running carousel pipeline...");
            let summary = create_carousel_end_to_end(
                &input, &template, &output, &exporter, &options, &progress,
            )?;
            progress.finish();

            println!(
                "{} Carousel presentation created: {} ({} pages from {} slide images)",
                "✓".green().bold(),
                output.display(),
                summary.carousel.pages,
                summary.slides_exported
            );
            if summary.kept_temp {
                println!("Keeping temporary files:");
                println!("  - {}", summary.temp.definition.display());
                println!("  - {}", summary.temp.images.display());
            }
        }

        Commands::Info { input, json } => {
            let pb = create_spinner("Analyzing presentation...");
            let definition = PptxParser::open(&input)?.parse()?;
            pb.finish_and_clear();

            if json {
                let slides: Vec<serde_json::Value> = definition
                    .slides
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "index": s.index,
                            "layout": s.layout_name,
                            "shapes": s.shapes.len(),
                            "pictures": s.pictures().count(),
                            "has_notes": s.notes.is_some(),
                        })
                    })
                    .collect();
                let info = serde_json::json!({
                    "file": definition.source_file,
                    "slide_width_inches": definition.metadata.slide_width_inches,
                    "slide_height_inches": definition.metadata.slide_height_inches,
                    "slide_count": definition.metadata.slide_count,
                    "slides": slides,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
                return Ok(());
            }

            println!("{}", "Presentation Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!("{}: {}", "File".bold(), file_name(&input));
            println!(
                "{}: {} x {} in",
                "Slide size".bold(),
                definition.metadata.slide_width_inches,
                definition.metadata.slide_height_inches
            );
            println!("{}: {}", "Slides".bold(), definition.metadata.slide_count);

            println!("\n{}", "Slides".cyan().bold());
            println!("{}", "─".repeat(40));
            for slide in &definition.slides {
                let tables = slide.shapes_of_kind(ShapeKind::Table).count();
                let charts = slide.shapes_of_kind(ShapeKind::Chart).count();
                println!(
                    "{:>3}  {:<20} {} shapes, {} pictures, {} tables, {} charts{}",
                    slide.index,
                    slide.layout_name.as_deref().unwrap_or("-"),
                    slide.shapes.len(),
                    slide.pictures().count(),
                    tables,
                    charts,
                    if slide.notes.is_some() { ", notes" } else { "" }
                );
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!(
        "{} {}",
        "pptx-carousel".green().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("PowerPoint definitions, Morph transitions and carousel decks");
    println!();
    println!("Definition formats: JSON, YAML");
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Drives a progress bar from build events and forwards them to `tracing`.
struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    fn new(message: &str) -> Self {
        Self {
            bar: create_spinner(message),
        }
    }

    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Reporter for ProgressReporter {
    fn report(&self, event: &BuildEvent) {
        TracingReporter.report(event);
        match event {
            BuildEvent::Started { task, total } => {
                self.bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{spinner:.blue} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=> "),
                );
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
                self.bar.set_message(task.to_string());
            }
            BuildEvent::SlideExtracted { .. }
            | BuildEvent::PageWritten { .. }
            | BuildEvent::TransitionApplied { .. }
            | BuildEvent::SlideImageExported { .. } => self.bar.inc(1),
            BuildEvent::SlideSkipped { slide, reason } => {
                self.bar.inc(1);
                self.bar.println(format!(
                    "{} Skipped slide {}: {}",
                    "!".yellow().bold(),
                    slide,
                    reason
                ));
            }
            BuildEvent::ImageSkipped { page, path, reason } => {
                self.bar.println(format!(
                    "{} Page {}: could not add {}: {}",
                    "!".yellow().bold(),
                    page,
                    path.display(),
                    reason
                ));
            }
            BuildEvent::Removed { path } => {
                self.bar
                    .println(format!("  Deleted: {}", path.display()));
            }
            BuildEvent::Saved { .. } => {}
        }
    }
}
