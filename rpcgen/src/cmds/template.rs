/* Template command - write an attribute overlay skeleton */

use super::common::load_interface;
use crate::codegen::template::emit_attribute_template;
use crate::output::write_atomic;
use std::path::PathBuf;

/* Execute the template command */
pub fn run(input_dir: PathBuf, basename: String, output: PathBuf, verbose: bool) -> anyhow::Result<()> {
  let loaded = load_interface(&input_dir, &basename, verbose)?;
  let contents = emit_attribute_template(&loaded.table);
  write_atomic(&output, &contents)?;

  if verbose {
    let count = loaded.table.iter().filter(|e| e.has_pointers()).count();
    println!("[✓] Wrote template for {} entry point(s) to {}", count, output.display());
  }
  Ok(())
}
