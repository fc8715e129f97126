/* Types file: `<type name> <size in bits> <print format> <true|false>` per line */

use crate::error::{GenError, GenResult};
use rpcgen_types::{TypeDesc, TypeRegistry};
use std::path::Path;

/// Load type definitions into `registry`, overriding builtins of the same
/// name. Returns the number of definitions read. `origin` is only used for
/// error reporting.
pub fn load_types(text: &str, origin: &Path, registry: &mut TypeRegistry) -> GenResult<usize> {
    let mut count = 0;
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let ty = parse_type_line(line).map_err(|reason| GenError::TypeDefinition {
            path: origin.to_path_buf(),
            line: idx + 1,
            reason,
        })?;
        tracing::debug!(name = %ty.name, bytes = ty.byte_size, "registered type");
        registry.insert(ty);
        count += 1;
    }
    Ok(count)
}

/* Fields are taken from the right so that names may contain spaces */
fn parse_type_line(line: &str) -> Result<TypeDesc, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(format!("expected 4 fields, found {}", tokens.len()));
    }
    let n = tokens.len();
    let name = tokens[..n - 3].join(" ");
    let bits: u32 = tokens[n - 3]
        .parse()
        .map_err(|_| format!("invalid size '{}'", tokens[n - 3]))?;
    if bits % 8 != 0 {
        return Err(format!("size {} of '{}' is not a whole number of bytes", bits, name));
    }
    let is_pointer = match tokens[n - 1] {
        "true" => true,
        "false" => false,
        other => return Err(format!("invalid pointer flag '{}'", other)),
    };
    Ok(TypeDesc::new(&name, bits / 8, tokens[n - 2], is_pointer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_with_spaces() {
        let ty = parse_type_line("const GLchar* 32 0x%08x true").unwrap();
        assert_eq!(ty.name, "const GLchar*");
        assert_eq!(ty.byte_size, 4);
        assert_eq!(ty.print_format, "0x%08x");
        assert!(ty.is_pointer);
    }

    #[test]
    fn rejects_partial_bytes() {
        assert!(parse_type_line("GLbit 3 %d false").is_err());
        assert!(parse_type_line("GLenum 32 %d maybe").is_err());
        assert!(parse_type_line("GLenum 32").is_err());
    }

    #[test]
    fn reports_line_number() {
        let mut registry = TypeRegistry::new();
        let err = load_types("GLenum 32 %d false\n\nbroken\n", Path::new("gl.types"), &mut registry)
            .unwrap_err();
        match err {
            GenError::TypeDefinition { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
