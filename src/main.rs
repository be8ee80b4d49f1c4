use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

use ezcode::logging::init_cli_logger;
use ezcode::{
    classify, decode_file, display_qr, encode_for_terminal, encode_to_file, DecodeHints,
    DisplaySize, Symbology,
};

#[derive(Parser)]
#[command(name = "ezcode")]
#[command(author, version, about = "Generate and scan QR codes and barcodes", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text into a QR code image
    Encode {
        /// Text to encode
        text: String,

        /// Output image file
        #[arg(short, long, default_value = "qr.png")]
        output: PathBuf,

        /// Side length of the image in pixels
        #[arg(short, long, conflicts_with = "display")]
        size: Option<u32>,

        /// Display the code will be shown on; the image is 7/8 of its shorter side
        #[arg(short, long, default_value_t = DisplaySize::default())]
        display: DisplaySize,

        /// Print the code in the terminal instead of saving an image
        #[arg(short, long)]
        terminal: bool,
    },

    /// Decode QR codes and barcodes from image files
    Decode {
        /// Images to scan
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Comma separated formats to look for, e.g. QR_CODE,EAN_13 (default: all)
        #[arg(short, long, value_delimiter = ',')]
        formats: Vec<Symbology>,

        /// Sample more rows when looking for 1D barcodes
        #[arg(long)]
        try_harder: bool,
    },

    /// Print whether text is an email address, URL, number or plain text
    Classify {
        /// Text to classify
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    match cli.command {
        Commands::Encode {
            text,
            output,
            size,
            display,
            terminal,
        } => {
            if terminal {
                let qr = encode_for_terminal(&text)?;
                display_qr(&qr);
            } else {
                let dimension = size.unwrap_or_else(|| display.target_dimension());
                let image = encode_to_file(&text, dimension, &output)?;

                println!(
                    "Wrote {}x{} QR code to {}",
                    image.width(),
                    image.height(),
                    output.display()
                );
                println!("Type: {}", classify(&text));
            }
        }

        Commands::Decode {
            images,
            formats,
            try_harder,
        } => {
            let mut hints = if formats.is_empty() {
                DecodeHints::default()
            } else {
                DecodeHints::with_formats(formats)
            };
            hints.try_harder = try_harder;

            let mut failed = 0;
            for path in &images {
                let result = decode_file(path, &hints)?;
                println!("{}:", path.display());
                match &result.outcome {
                    Ok(decoded) => {
                        println!("  Text:   {}", decoded.text);
                        println!("  Format: {}", decoded.symbology);
                        println!("  Type:   {}", decoded.decode_type());
                    }
                    Err(e) => {
                        warn!("No code decoded from {}: {}", path.display(), e);
                        println!("  Not decoded: {}", e);
                        failed += 1;
                    }
                }
                println!("  Time:   {}s", result.handling_time_secs());
            }

            if failed > 0 {
                anyhow::bail!("{} of {} image(s) could not be decoded", failed, images.len());
            }
        }

        Commands::Classify { text } => {
            println!("{}", classify(&text));
        }
    }

    Ok(())
}
