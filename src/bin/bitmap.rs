use anyhow::Context;
use clap::{Parser, Subcommand};
use thermalprinter::Raster;

/// Shows what a picture looks like once converted for the print head
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converts a picture and prints a text preview
    Convert {
        image: String,
        /// Only print the dimensions
        #[clap(long)]
        quiet: bool,
    },
}

pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Convert { image, quiet } => {
            let img = image::open(image).with_context(|| format!("cannot load {}", image))?;
            let raster = Raster::from_image(&img)?;
            println!(
                "{}: {}x{} dots, {} bytes per row",
                image,
                raster.width(),
                raster.height(),
                raster.row_bytes()
            );
            if !quiet {
                print!("{}", raster);
            }
        }
    }
    Ok(())
}
