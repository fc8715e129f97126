/* Binary for decoding a captured packet stream and printing JSON results */

use clap::Parser as ClapParser;
use rpcgen::spec::{self, SpecSources};
use rpcgen_reflect::Decoder;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(ClapParser)]
#[command(name = "rpcgen-reflect")]
#[command(about = "Decode a captured packet stream and print JSON reflection results")]
struct Args {
  /* Directory holding <basename>.in, .attrib and .types */
  #[arg(short = 'i', long = "input-dir", default_value = ".")]
  input_dir: PathBuf,

  /* Captured bytes to decode */
  #[arg(short, long, required = true)]
  data_file: PathBuf,

  /* Pretty print JSON output */
  #[arg(short, long)]
  pretty: bool,

  basename: String,
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .init();

  let args = Args::parse();

  let sources = SpecSources::from_dir(&args.input_dir, &args.basename);
  let loaded = spec::load(&args.basename, &sources)?;

  let binary_data = std::fs::read(&args.data_file)?;
  let outcome = Decoder::new(&loaded.table).decode(&binary_data);

  if outcome.consumed < binary_data.len() {
    tracing::warn!(
      consumed = outcome.consumed,
      total = binary_data.len(),
      halt = ?outcome.halt,
      "decoder stopped before the end of the capture"
    );
  }

  let json = if args.pretty {
    serde_json::to_string_pretty(&outcome)?
  } else {
    serde_json::to_string(&outcome)?
  };
  println!("{}", json);

  Ok(())
}
