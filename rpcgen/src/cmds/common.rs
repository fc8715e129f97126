/* Common utilities shared between the codegen, template and analyze commands */

use crate::spec::{self, LoadedSpec, SpecSources};
use anyhow::Context;
use std::path::Path;

/* Load `<input_dir>/<basename>.{types,in,attrib}` into a frozen table */
pub fn load_interface(input_dir: &Path, basename: &str, verbose: bool) -> anyhow::Result<LoadedSpec> {
  let sources = SpecSources::from_dir(input_dir, basename);

  if verbose {
    println!("[~] Loading interface '{}'", basename);
    println!("    Spec: {}", sources.spec.display());
    match &sources.attributes {
      Some(path) => println!("    Attributes: {}", path.display()),
      None => println!("    Attributes: (none)"),
    }
    if let Some(path) = &sources.types {
      println!("    Types: {}", path.display());
    }
    println!();
  }

  let loaded = spec::load(basename, &sources)
    .with_context(|| format!("loading interface '{}' from {}", basename, input_dir.display()))?;

  if verbose {
    println!(
      "[~] {} entry point(s), opcodes {}..{}",
      loaded.table.len(),
      loaded.table.settings.base_opcode,
      loaded.table.last_opcode()
    );
    print_diagnostics(&loaded);
  }

  Ok(loaded)
}

/* Diagnostics are already logged as they are reported; this is the summary */
pub fn print_diagnostics(loaded: &LoadedSpec) {
  if loaded.diagnostics.is_empty() {
    println!("[✓] No warnings");
    return;
  }
  println!("[!] {} warning(s):", loaded.diagnostics.len());
  for diagnostic in loaded.diagnostics.iter() {
    println!("    - {}", diagnostic);
  }
}
