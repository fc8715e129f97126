use clap::{Parser, Subcommand};
use rpcgen::cmds;
use rpcgen::cmds::analyze::ReportFormat;
use rpcgen::cmds::codegen::OutputDirs;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "rpcgen")]
#[command(about = "RPC encoder/decoder generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate encoder, decoder and wrapper sources */
    Codegen {
        /* Directory holding <basename>.in, .attrib and .types */
        #[arg(short = 'i', long = "input-dir", value_name = "DIR", default_value = ".")]
        input_dir: PathBuf,

        /* Output directory for the encoder (client) side */
        #[arg(short = 'E', long = "encoder", value_name = "DIR")]
        encoder: Option<PathBuf>,

        /* Output directory for the decoder (server) side */
        #[arg(short = 'D', long = "decoder", value_name = "DIR")]
        decoder: Option<PathBuf>,

        /* Output directory for the pass-through wrapper */
        #[arg(short = 'W', long = "wrapper", value_name = "DIR")]
        wrapper: Option<PathBuf>,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,

        basename: String,
    },

    /* Write an attribute overlay skeleton for entries with pointer parameters */
    Template {
        #[arg(short = 'i', long = "input-dir", value_name = "DIR", default_value = ".")]
        input_dir: PathBuf,

        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: PathBuf,

        #[arg(short = 'v', long = "verbose")]
        verbose: bool,

        basename: String,
    },

    /* Print the parsed table with opcodes and packet layouts */
    Analyze {
        #[arg(short = 'i', long = "input-dir", value_name = "DIR", default_value = ".")]
        input_dir: PathBuf,

        #[arg(long = "format", value_enum, default_value = "json")]
        format: ReportFormat,

        /* Restrict the report to one entry point */
        #[arg(long = "entry", value_name = "NAME")]
        entry: Option<String>,

        basename: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            input_dir,
            encoder,
            decoder,
            wrapper,
            verbose,
            basename,
        } => {
            let outputs = OutputDirs {
                encoder,
                decoder,
                wrapper,
            };
            cmds::codegen::run(input_dir, basename, outputs, verbose)?;
        }

        Commands::Template {
            input_dir,
            output,
            verbose,
            basename,
        } => {
            cmds::template::run(input_dir, basename, output, verbose)?;
        }

        Commands::Analyze {
            input_dir,
            format,
            entry,
            basename,
        } => {
            cmds::analyze::run(input_dir, basename, format, entry)?;
        }
    }

    Ok(())
}
