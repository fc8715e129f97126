/* Loading a specification: spec lines, attribute overlay, types file */

pub mod attributes;
pub mod parser;
pub mod type_file;
pub mod validate;

pub use attributes::apply_overlay;
pub use parser::parse_spec_line;
pub use type_file::load_types;
pub use validate::validate;

use crate::diag::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{GenError, GenResult};
use rpcgen_types::{SpecTable, TypeRegistry};
use std::path::{Path, PathBuf};

/// Input files for one interface.
#[derive(Debug, Clone)]
pub struct SpecSources {
    pub spec: PathBuf,
    pub attributes: Option<PathBuf>,
    pub types: Option<PathBuf>,
}

impl SpecSources {
    /// `<dir>/<basename>.in`, plus `.attrib` and `.types` when they exist.
    pub fn from_dir(dir: &Path, basename: &str) -> Self {
        let existing = |ext: &str| {
            let path = dir.join(format!("{}.{}", basename, ext));
            path.is_file().then_some(path)
        };
        Self {
            spec: dir.join(format!("{}.in", basename)),
            attributes: existing("attrib"),
            types: existing("types"),
        }
    }
}

/// A table ready for generation, together with everything reported while
/// building it.
#[derive(Debug)]
pub struct LoadedSpec {
    pub table: SpecTable,
    pub registry: TypeRegistry,
    pub diagnostics: Diagnostics,
}

/// Parse every line of a spec file into a new table.
pub fn parse_spec(
    basename: &str,
    text: &str,
    registry: &TypeRegistry,
    diags: &mut Diagnostics,
) -> SpecTable {
    let mut table = SpecTable::new(basename);
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        match parse_spec_line(line_no, line, registry) {
            Ok(Some(entry)) => {
                if let Err(entry) = table.push(entry) {
                    diags.warn(Diagnostic::at_line(
                        DiagnosticKind::DuplicateEntryPoint,
                        line_no,
                        format!("entry point {} already defined, ignoring", entry.name),
                    ));
                }
            }
            Ok(None) => {}
            Err(diagnostic) => diags.warn(diagnostic),
        }
    }
    table
}

fn read(path: &Path) -> GenResult<String> {
    std::fs::read_to_string(path).map_err(|source| GenError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the types file, the spec and the overlay (in that order), then
/// validate the result. The returned table is what every generator sees.
pub fn load(basename: &str, sources: &SpecSources) -> GenResult<LoadedSpec> {
    let mut registry = TypeRegistry::with_builtins();
    let mut diagnostics = Diagnostics::new();

    if let Some(types_path) = &sources.types {
        let count = load_types(&read(types_path)?, types_path, &mut registry)?;
        tracing::info!(path = %types_path.display(), count, "loaded types");
    }

    let mut table = parse_spec(basename, &read(&sources.spec)?, &registry, &mut diagnostics);
    tracing::info!(path = %sources.spec.display(), entries = table.len(), "parsed spec");

    if let Some(attrib_path) = &sources.attributes {
        apply_overlay(&mut table, &read(attrib_path)?, &mut diagnostics);
        tracing::info!(path = %attrib_path.display(), "applied attribute overlay");
    }

    validate(&table, &mut diagnostics);

    Ok(LoadedSpec {
        table,
        registry,
        diagnostics,
    })
}
