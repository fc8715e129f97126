/* Attribute overlay: extra semantics attached to parsed entry points
 *
 * The overlay is a sequence of blocks. A block starts with a name line at
 * column 0 (`GLOBAL` or an entry-point name) and continues with indented
 * attribute lines until a blank line or the next column-0 line:
 *
 *   glReadPixels
 *     dir pixels out
 *     len pixels glUtilsPixelBitSize(format, type) * width * height / 8
 *
 *   GLOBAL
 *     base_opcode 1024
 *     encoder_headers "glUtils.h"
 */

use crate::diag::{Diagnostic, DiagnosticKind, Diagnostics};
use rpcgen_types::{EntryPoint, HeaderKind, PointerAttrs, SpecTable};

enum State {
    Name,
    Attribute,
}

enum Target {
    Global,
    Entry(String),
    Unknown,
}

/// Apply an overlay to a freshly parsed table. Problems are reported as
/// warnings; the offending line is ignored and processing continues.
pub fn apply_overlay(table: &mut SpecTable, text: &str, diags: &mut Diagnostics) {
    let mut state = State::Name;
    let mut target = Target::Unknown;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        if raw.starts_with('#') {
            continue;
        }

        let first = raw.find(|c: char| !c.is_whitespace());
        if matches!(state, State::Attribute) && matches!(first, None | Some(0)) {
            state = State::Name;
        }

        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match state {
            State::Name => {
                target = if line == "GLOBAL" {
                    Target::Global
                } else if table.find(line).is_some() {
                    Target::Entry(line.to_string())
                } else {
                    diags.warn(Diagnostic::at_line(
                        DiagnosticKind::UnknownEntryPoint,
                        line_no,
                        format!("attribute of non existent entry point {}", line),
                    ));
                    Target::Unknown
                };
                state = State::Attribute;
            }
            State::Attribute => match &target {
                Target::Global => apply_global_attribute(table, line, line_no, diags),
                Target::Entry(name) => {
                    if let Some(entry) = table.find_mut(name) {
                        apply_entry_attribute(entry, line, line_no, diags);
                    }
                }
                Target::Unknown => {}
            },
        }
    }
}

/// Split off the first whitespace-delimited token; the remainder keeps its
/// inner spacing so expressions survive intact.
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], s[end..].trim()),
        None => (s, ""),
    }
}

fn apply_global_attribute(table: &mut SpecTable, line: &str, line_no: usize, diags: &mut Diagnostics) {
    let (key, rest) = split_token(line);

    let header_kind = match key {
        "base_opcode" => {
            let (value, _) = split_token(rest);
            if value.is_empty() {
                diags.warn(Diagnostic::at_line(
                    DiagnosticKind::MissingValue,
                    line_no,
                    "missing value for base_opcode",
                ));
            } else {
                match value.parse::<u32>() {
                    Ok(base) if table.base_opcode_fits(base) => table.settings.base_opcode = base,
                    Ok(base) => diags.warn(Diagnostic::at_line(
                        DiagnosticKind::InvalidAttributeValue,
                        line_no,
                        format!(
                            "base_opcode {} leaves no room for {} entry points, keeping {}",
                            base,
                            table.len(),
                            table.settings.base_opcode
                        ),
                    )),
                    Err(_) => diags.warn(Diagnostic::at_line(
                        DiagnosticKind::InvalidAttributeValue,
                        line_no,
                        format!("invalid base_opcode '{}'", value),
                    )),
                }
            }
            return;
        }
        "encoder_headers" => HeaderKind::Encoder,
        "decoder_headers" => HeaderKind::Decoder,
        "client_context_headers" => HeaderKind::ClientContext,
        "server_context_headers" => HeaderKind::ServerContext,
        _ => {
            diags.warn(Diagnostic::at_line(
                DiagnosticKind::UnknownGlobalKey,
                line_no,
                format!("unknown global attribute {}", line),
            ));
            return;
        }
    };

    for header in rest.split_whitespace() {
        table.settings.add_header(header_kind, header);
    }
}

fn apply_entry_attribute(entry: &mut EntryPoint, line: &str, line_no: usize, diags: &mut Diagnostics) {
    let (keyword, rest) = split_token(line);
    let entry_name = entry.name.clone();
    let warn = |diags: &mut Diagnostics, kind: DiagnosticKind, message: String| {
        diags.warn(Diagnostic::at_line(kind, line_no, message).with_entry(&entry_name));
    };

    match keyword {
        "flag" => {
            if rest.is_empty() {
                warn(diags, DiagnosticKind::MissingValue, "missing flag name".to_string());
            }
            for flag in rest.split_whitespace() {
                match flag {
                    "unsupported" => entry.unsupported = true,
                    "custom_decoder" | "customDecoder" => entry.custom_decoder = true,
                    _ => warn(diags, DiagnosticKind::UnknownAttribute, format!("unknown flag '{}'", flag)),
                }
            }
        }
        "dir" | "len" | "var_flag" | "custom_pack" | "custom_unpack" => {
            let (param_name, value) = split_token(rest);
            if param_name.is_empty() || value.is_empty() {
                warn(diags, DiagnosticKind::MissingValue, format!("'{}' expects a parameter name and a value", keyword));
                return;
            }
            let Some(param) = entry.param_mut(param_name) else {
                warn(diags, DiagnosticKind::UnknownParameter, format!("unknown parameter '{}'", param_name));
                return;
            };
            let Some(attrs) = param.pointer_attrs_mut() else {
                warn(diags, DiagnosticKind::NotAPointer, format!("'{}' applied to non-pointer parameter '{}'", keyword, param_name));
                return;
            };
            if let Err(message) = apply_pointer_attribute(attrs, keyword, value) {
                warn(diags, DiagnosticKind::InvalidAttributeValue, message);
            }
        }
        _ => warn(diags, DiagnosticKind::UnknownAttribute, format!("unknown attribute '{}'", keyword)),
    }
}

fn apply_pointer_attribute(attrs: &mut PointerAttrs, keyword: &str, value: &str) -> Result<(), String> {
    match keyword {
        "dir" => attrs.dir = value.parse().map_err(|e| format!("{}", e))?,
        "len" => attrs.len_expr = value.to_string(),
        "custom_pack" => attrs.pack_expr = Some(value.to_string()),
        "custom_unpack" => attrs.unpack_expr = Some(value.to_string()),
        "var_flag" => {
            for flag in value.split_whitespace() {
                match flag {
                    "nullAllowed" => attrs.null_allowed = true,
                    _ => return Err(format!("unknown var_flag '{}'", flag)),
                }
            }
        }
        _ => unreachable!("caller filters pointer attribute keywords"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_token_keeps_expression_spacing() {
        assert_eq!(split_token("len data  n * sizeof(int)"), ("len", "data  n * sizeof(int)"));
        assert_eq!(split_token("  flag"), ("flag", ""));
    }
}
