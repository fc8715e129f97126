/* Spec-line parser: one C prototype per line */

use crate::diag::{Diagnostic, DiagnosticKind};
use rpcgen_types::{EntryPoint, TypeRegistry, VarDesc};

/// Parse one line of a spec file.
///
/// Blank and comment lines (`#`, `//`) yield `Ok(None)`. A line that looks
/// like it was meant to be a prototype but cannot be parsed yields a
/// diagnostic carrying `line_no`.
pub fn parse_spec_line(
    line_no: usize,
    text: &str,
    registry: &TypeRegistry,
) -> Result<Option<EntryPoint>, Diagnostic> {
    let line = text.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
        return Ok(None);
    }
    let line = line.trim_end_matches(';').trim_end();

    let malformed = |reason: &str| {
        Diagnostic::at_line(
            DiagnosticKind::MalformedSpecLine,
            line_no,
            format!("{}: '{}'", reason, line),
        )
    };

    let open = line.find('(').ok_or_else(|| malformed("expected a parameter list"))?;
    let close = line.rfind(')').ok_or_else(|| malformed("unterminated parameter list"))?;
    if close < open || !line[close + 1..].trim().is_empty() {
        return Err(malformed("unexpected text after parameter list"));
    }

    let head = line[..open].trim();
    let (ret_spelling, name) = split_declaration(head)
        .filter(|(ty, _)| !ty.is_empty())
        .ok_or_else(|| malformed("expected '<return type> <name>'"))?;
    let ret_type = registry.resolve(ret_spelling).ok_or_else(|| {
        Diagnostic::at_line(
            DiagnosticKind::UnknownType,
            line_no,
            format!("unknown return type '{}' for {}", ret_spelling, name),
        )
    })?;

    let mut params: Vec<VarDesc> = Vec::new();
    let list = line[open + 1..close].trim();
    if !list.is_empty() && list != "void" {
        for (index, piece) in list.split(',').enumerate() {
            let piece = piece.trim();
            if piece.is_empty() {
                return Err(malformed("empty parameter"));
            }
            let param = parse_param(line_no, index, piece, registry)?;
            if params.iter().any(|p| p.name == param.name) {
                return Err(malformed(&format!("duplicate parameter name '{}'", param.name)));
            }
            params.push(param);
        }
    }

    Ok(Some(EntryPoint::new(
        name,
        VarDesc::new("retval", ret_type),
        params,
    )))
}

fn parse_param(
    line_no: usize,
    index: usize,
    piece: &str,
    registry: &TypeRegistry,
) -> Result<VarDesc, Diagnostic> {
    /* `<type> <name>` first, then the whole piece as an unnamed type */
    if let Some((spelling, name)) = split_declaration(piece) {
        if !spelling.is_empty() {
            if let Some(ty) = registry.resolve(spelling) {
                return Ok(VarDesc::new(name, ty));
            }
        }
    }
    if let Some(ty) = registry.resolve(piece) {
        if !ty.is_void() {
            return Ok(VarDesc::new(&format!("arg{}", index), ty));
        }
    }

    let spelling = split_declaration(piece)
        .map(|(ty, _)| ty)
        .filter(|ty| !ty.is_empty())
        .unwrap_or(piece);
    Err(Diagnostic::at_line(
        DiagnosticKind::UnknownType,
        line_no,
        format!("unknown parameter type '{}'", spelling),
    ))
}

/// Split `const char *name` into (`const char *`, `name`). The name is the
/// trailing identifier; the type part may be empty.
fn split_declaration(decl: &str) -> Option<(&str, &str)> {
    let decl = decl.trim();
    let name_start = decl
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map(|(i, _)| i)?;
    let name = &decl[name_start..];
    if !is_identifier(name) {
        return None;
    }
    Some((decl[..name_start].trim(), name))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_pointer_declarations() {
        assert_eq!(split_declaration("const char *name"), Some(("const char *", "name")));
        assert_eq!(split_declaration("void* data"), Some(("void*", "data")));
        assert_eq!(split_declaration("int"), Some(("", "int")));
        assert_eq!(split_declaration("void*"), None);
        assert_eq!(split_declaration("int 9lives"), None);
    }
}
