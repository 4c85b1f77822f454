//! Display Preview
//!
//! Host-side companion for the `tinydisplay` driver library. Renders scene
//! files into offscreen surfaces and traces the exact command/data bytes a
//! controller driver would put on the wire for the same drawing calls.
//!
//! # Features
//!
//! - **Controller Profiles**: Geometry, bus wiring and init tables for every supported controller
//! - **Scene Rendering**: Draw a TOML scene into a 1/4/8/16bpp surface and export it as netpbm
//! - **Wire Traces**: Replay a scene through the SPI or I2C framing layer and dump the transactions
//! - **Font Inspection**: Parse fixed, free and squix glyph tables and preview text
//!
//! # Usage
//!
//! ```bash
//! # List supported controllers
//! display-preview controllers list
//!
//! # Show controller details and its init table
//! display-preview controllers show ssd1351
//!
//! # Render a scene to a PBM file and print it as ASCII art
//! display-preview render scenes/hello.toml -o hello.pbm --ascii
//!
//! # Render every scene in a directory
//! display-preview render-dir scenes/
//!
//! # Trace the bytes an SH1106 would receive over I2C
//! display-preview trace scenes/hello.toml --controller sh1106 --bus i2c
//!
//! # Inspect a font table
//! display-preview font builtin --text "Hello"
//! ```

mod controllers;
mod font;
mod render;
mod scene;
mod trace;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tinydisplay::device::LcdMode;
use walkdir::WalkDir;

use controllers::{get_profile, profile_ids, Bus, ControllerProfile};
use scene::{FontKind, Scene};
use trace::TraceOptions;

/// Display Preview
///
/// Offscreen rendering and wire tracing for tiny display controllers
#[derive(Parser)]
#[command(name = "display-preview")]
#[command(version = "0.1.0")]
#[command(about = "Render scenes and trace controller traffic for small displays")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Controller profile operations
    #[command(subcommand)]
    Controllers(ControllerCommands),

    /// Render a scene file into a framebuffer
    Render {
        /// Path to the scene (TOML)
        scene: PathBuf,

        /// Write the framebuffer as netpbm (pbm/pgm/ppm)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the framebuffer as ASCII art
        #[arg(long)]
        ascii: bool,

        /// Print the CRC-32 of the packed framebuffer
        #[arg(long)]
        checksum: bool,
    },

    /// Render every scene below a directory
    RenderDir {
        /// Directory searched recursively for *.toml scenes
        dir: PathBuf,
    },

    /// Trace the bytes a controller receives for a scene
    Trace {
        /// Path to the scene (TOML)
        scene: PathBuf,

        /// Controller profile (e.g., ssd1306, sh1106, ili9341)
        #[arg(short, long, default_value = "ssd1306")]
        controller: String,

        /// Addressing mode
        #[arg(short, long, value_enum, default_value_t = ModeArg::Compatible)]
        mode: ModeArg,

        /// Bus (default: the controller's preferred bus)
        #[arg(short, long, value_enum)]
        bus: Option<Bus>,

        /// Skip the controller init table
        #[arg(long)]
        no_init: bool,

        /// Maximum data bytes shown per transaction
        #[arg(short, long, default_value_t = 16)]
        limit: usize,
    },

    /// Inspect a font table
    Font {
        /// Font table file, or "builtin" for the 6x8 ASCII font
        file: PathBuf,

        /// Table format
        #[arg(short, long, value_enum, default_value_t = FontKind::Fixed)]
        format: FontKind,

        /// Sample text to measure and preview
        #[arg(short, long, default_value = "Hello!")]
        text: String,
    },
}

#[derive(Subcommand)]
enum ControllerCommands {
    /// List all supported controllers
    List,

    /// Show detailed information about a controller
    Show {
        /// Controller profile name (e.g., ssd1306, pcd8544, ssd1351)
        controller: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Compatible,
    Normal,
}

impl From<ModeArg> for LcdMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Compatible => LcdMode::Compatible,
            ModeArg::Normal => LcdMode::Normal,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    match cli.command {
        Commands::Controllers(cmd) => handle_controllers(cmd),
        Commands::Render {
            scene,
            output,
            ascii,
            checksum,
        } => handle_render(&scene, output.as_deref(), ascii, checksum),
        Commands::RenderDir { dir } => handle_render_dir(&dir),
        Commands::Trace {
            scene,
            controller,
            mode,
            bus,
            no_init,
            limit,
        } => handle_trace(&scene, &controller, mode.into(), bus, !no_init, limit),
        Commands::Font { file, format, text } => handle_font(&file, format, &text),
    }
}

fn lookup(controller: &str) -> Result<&'static ControllerProfile> {
    get_profile(controller).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown controller: {}. Use 'display-preview controllers list' to see available profiles.",
            controller
        )
    })
}

fn handle_controllers(cmd: ControllerCommands) -> Result<()> {
    match cmd {
        ControllerCommands::List => {
            println!("{}", "=".repeat(60));
            println!("{}", "Supported Controllers".cyan().bold());
            println!("{}", "=".repeat(60));

            for id in profile_ids() {
                if let Some(profile) = get_profile(id) {
                    println!("\n  {}: {}", id.white().bold(), profile.description);
                    println!("    Geometry: {}x{}", profile.width, profile.height);
                    println!("    Depth: {} bpp", profile.depth.bits());
                    println!("    Buses: {}", join(profile.buses));
                }
            }

            println!("\n{}", "=".repeat(60));
            println!(
                "Use {} to see detailed profile information",
                "display-preview controllers show <controller>".cyan()
            );
        }

        ControllerCommands::Show { controller } => {
            print_controller_profile(lookup(&controller)?);
        }
    }

    Ok(())
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_controller_profile(profile: &ControllerProfile) {
    println!("{}", "=".repeat(70));
    println!("{}", format!("Controller Profile: {}", profile.name).cyan().bold());
    println!("{}", "=".repeat(70));

    println!("\n{}", "Basic Information:".white().bold());
    println!("  ID: {}", profile.id);
    println!("  Driver: {}", profile.kind());
    println!("  Description: {}", profile.description);
    println!("  Geometry: {}x{}", profile.width, profile.height);
    println!(
        "  Native depth: {} bpp ({} byte framebuffer)",
        profile.depth.bits(),
        profile.framebuffer_bytes()
    );

    println!("\n{}", "Wiring:".white().bold());
    println!("  Buses: {}", join(profile.buses));
    if profile.supports(Bus::Spi) {
        println!(
            "  SPI: mode {} @ {} Hz",
            profile.spi.mode, profile.spi.frequency_hz
        );
    }

    println!("\n{}", "Addressing:".white().bold());
    println!("  Modes: {}", join(profile.modes));
    println!("  Window: {}", profile.addressing.dimmed());

    println!("\n{}", "Init Table:".white().bold());
    let layout = if profile.init_has_args {
        "commands with data arguments"
    } else {
        "command bytes only"
    };
    println!("  {} bytes, {}", profile.init_table.len(), layout);
    for chunk in profile.init_table.chunks(16) {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        println!("  {}", hex.join(" ").dimmed());
    }

    println!("\n{}", "=".repeat(70));
}

fn handle_render(
    path: &Path,
    output: Option<&Path>,
    ascii: bool,
    checksum: bool,
) -> Result<()> {
    let scene = Scene::load(path)?;
    let fb = render::render(&scene)?;

    println!(
        "{} {} {}x{} {} ({} ops, {} lit pixels)",
        "[OK]".green().bold(),
        path.display(),
        fb.width,
        fb.height,
        fb.format,
        scene.ops.len(),
        fb.lit_pixels()
    );

    if checksum {
        println!("  CRC-32: {:08x}", fb.checksum());
    }
    if ascii {
        print!("{}", fb.to_ascii());
    }
    if let Some(out) = output {
        let expected = render::netpbm_extension(fb.format);
        if out.extension().and_then(|e| e.to_str()) != Some(expected) {
            log::warn!("{} output is conventionally .{}", fb.format, expected);
        }
        fb.write_netpbm(out)?;
        println!("  Written to {}", out.display().to_string().cyan());
    }
    Ok(())
}

fn handle_render_dir(dir: &Path) -> Result<()> {
    println!("{}", "=".repeat(70));
    println!("{}", format!("Rendering scenes in {}", dir.display()).cyan().bold());
    println!("{}", "=".repeat(70));

    let mut passed = 0;
    let mut failed = 0;
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("toml"))
    {
        let path = entry.path();
        match Scene::load(path).and_then(|scene| render::render(&scene)) {
            Ok(fb) => {
                passed += 1;
                println!(
                    "  {} {} {}x{} {} crc {:08x}",
                    "[OK]".green(),
                    path.display(),
                    fb.width,
                    fb.height,
                    fb.format,
                    fb.checksum()
                );
            }
            Err(e) => {
                failed += 1;
                println!("  {} {}: {:#}", "[FAIL]".red(), path.display(), e);
            }
        }
    }

    println!("\n{}", "=".repeat(70));
    println!(
        "{} rendered, {} failed",
        passed.to_string().green(),
        failed.to_string().red()
    );
    if failed > 0 {
        bail!("{} scene(s) failed to render", failed);
    }
    Ok(())
}

fn handle_trace(
    path: &Path,
    controller: &str,
    mode: LcdMode,
    bus: Option<Bus>,
    init: bool,
    limit: usize,
) -> Result<()> {
    let profile = lookup(controller)?;
    let bus = match bus.or_else(|| profile.buses.first().copied()) {
        Some(bus) => bus,
        None => bail!("{} has no bus wiring", profile.name),
    };
    let scene = Scene::load(path)?;
    let trace = trace::run_trace(profile, &scene, TraceOptions { mode, bus, init })?;
    let ops = trace::bus_ops(&trace, profile, bus);
    trace::print_report(profile, &trace, &ops, limit);

    if !trace.balanced {
        bail!(
            "unbalanced wire trace: {} starts, {} stops, {} violations",
            trace.starts,
            trace.stops,
            trace.violations
        );
    }
    Ok(())
}

fn handle_font(file: &Path, format: FontKind, text: &str) -> Result<()> {
    let bytes = font::load_font_bytes(file)?;
    let table = font::parse_font(&bytes, format.into())?;
    font::print_font_report(&table, text);
    Ok(())
}
