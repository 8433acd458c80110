use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use onenote_export::{Capture, Config, Destination, OneNoteDependencies, OneNoteDestination};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ONENOTE_EXPORT_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "onenote-export")]
#[command(
    version,
    long_version = LONG_VERSION,
    about = "Export screenshots into Microsoft OneNote"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show where OneNote was found and whether the destination is active
    Status,

    /// List the OneNote destinations (new page plus every page on screen)
    List,

    /// Export a PNG image to OneNote
    Export {
        /// PNG file to export
        #[arg(value_name = "PNG")]
        image: PathBuf,

        /// Append to the open page with this name instead of creating a new page
        #[arg(long, value_name = "NAME")]
        page: Option<String>,

        /// Title for the exported capture
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
    },

    /// Write the example configuration file
    InitConfig,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("onenote-export: Export screenshots into Microsoft OneNote");
        println!();
        println!("Usage:");
        println!("  onenote-export status              Show OneNote availability");
        println!("  onenote-export list                List OneNote destinations");
        println!("  onenote-export export <PNG>        Export to a new page");
        println!("  onenote-export export <PNG> --page <NAME>");
        println!("                                     Append to an open page");
        println!("  onenote-export init-config         Write the example config");
        println!();
        println!("Requirements:");
        println!("  - Microsoft OneNote installed");
        println!("  - The automation bridge (default: onenote-bridge) on PATH");
        return Ok(());
    };

    match command {
        Commands::InitConfig => {
            let path = Config::create_default_file()?;
            println!("Wrote {}", path.display());
        }
        Commands::Status => print_status(&load_destination()?),
        Commands::List => list_destinations(&load_destination()?),
        Commands::Export { image, page, title } => {
            export(&load_destination()?, image, page.as_deref(), title)?
        }
    }

    Ok(())
}

fn load_destination() -> Result<OneNoteDestination> {
    let config = Config::load()?;
    Ok(OneNoteDestination::new(OneNoteDependencies::from_config(
        &config,
    )))
}

fn print_status(onenote: &OneNoteDestination) {
    match onenote.executable() {
        Some(path) => println!("Executable: {}", path.display()),
        None => println!("Executable: not found"),
    }
    println!(
        "Active: {}",
        if onenote.is_active() { "yes" } else { "no" }
    );
}

fn list_destinations(onenote: &OneNoteDestination) {
    println!("[new page] {}", onenote.description());

    let pages: Vec<Box<dyn Destination>> = onenote.dynamic_destinations().collect();
    if pages.is_empty() {
        println!("No open OneNote pages");
        return;
    }

    for page in pages {
        println!("[page] {}", page.description());
    }
}

fn export(
    onenote: &OneNoteDestination,
    image: PathBuf,
    page: Option<&str>,
    title: Option<String>,
) -> Result<()> {
    let capture = Capture::from_png_file(&image, title)
        .with_context(|| format!("Failed to load {}", image.display()))?;

    if !onenote.is_active() {
        return Err(anyhow!(
            "OneNote is not available (executable not found or destination excluded)"
        ));
    }

    let target = match page {
        Some(name) => onenote
            .page_destinations()
            .find(|candidate| candidate.description() == name)
            .ok_or_else(|| anyhow!("OneNote page '{}' is not open", name))?,
        None => onenote.clone(),
    };

    let info = target.export_capture(true, &capture);
    if info.export_made {
        println!("Exported to {}", info.description);
        Ok(())
    } else {
        Err(anyhow!(
            "Export to {} failed: {}",
            info.description,
            info.error_message
                .unwrap_or_else(|| "OneNote did not accept the capture".to_string())
        ))
    }
}
