/* Codegen command - generate encoder, decoder and wrapper sources */

use super::common::load_interface;
use crate::codegen::{Bundle, generate_bundle};
use crate::output::write_bundle;
use std::path::PathBuf;

/* Output directory per requested bundle */
#[derive(Debug, Clone, Default)]
pub struct OutputDirs {
  pub encoder: Option<PathBuf>,
  pub decoder: Option<PathBuf>,
  pub wrapper: Option<PathBuf>,
}

impl OutputDirs {
  pub fn requested(&self) -> Vec<(Bundle, &PathBuf)> {
    [
      (Bundle::Encoder, self.encoder.as_ref()),
      (Bundle::Decoder, self.decoder.as_ref()),
      (Bundle::Wrapper, self.wrapper.as_ref()),
    ]
    .into_iter()
    .filter_map(|(bundle, dir)| dir.map(|dir| (bundle, dir)))
    .collect()
  }
}

/* Execute the codegen command */
pub fn run(input_dir: PathBuf, basename: String, outputs: OutputDirs, verbose: bool) -> anyhow::Result<()> {
  let requested = outputs.requested();
  if requested.is_empty() {
    anyhow::bail!("nothing to generate: pass at least one of -E, -D or -W");
  }

  if verbose {
    println!("RPC Generator - Code Generation Tool");
    println!("====================================\n");
    println!("[~] Configuration:");
    println!("  Input directory: {}", input_dir.display());
    println!("  Basename: {}", basename);
    for (bundle, dir) in &requested {
      println!("  {:?} output: {}", bundle, dir.display());
    }
    println!();
  }

  let loaded = load_interface(&input_dir, &basename, verbose)?;

  for (bundle, dir) in requested {
    let files = generate_bundle(&loaded.table, bundle);
    let written = write_bundle(dir, &files)?;
    tracing::info!(?bundle, dir = %dir.display(), files = written.len(), "generated bundle");

    if verbose {
      println!("[✓] Generated {:?} sources in {}:", bundle, dir.display());
      for path in &written {
        println!("    - {}", path.display());
      }
    }
  }

  Ok(())
}
