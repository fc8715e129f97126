use crate::diag::{Diagnostic, DiagnosticKind, Diagnostics};
use rpcgen_types::SpecTable;

/// Report the problems the generators would otherwise paper over: pointer
/// parameters with no length expression (rendered as `0`) and pointer
/// return values (rendered as a `NULL` return). Unsupported entries have no
/// encoder body and are not checked. Also reports an opcode range that
/// runs past `u32::MAX`.
pub fn validate(table: &SpecTable, diags: &mut Diagnostics) {
    if !table.base_opcode_fits(table.settings.base_opcode) {
        diags.warn(Diagnostic::new(
            DiagnosticKind::InvalidAttributeValue,
            format!(
                "opcodes from base {} overflow for {} entry points",
                table.settings.base_opcode,
                table.len()
            ),
        ));
    }
    for entry in table.iter().filter(|e| !e.unsupported) {
        for param in &entry.params {
            if let Some(attrs) = param.pointer_attrs() {
                if attrs.len_expr.trim().is_empty() {
                    diags.warn(Diagnostic::for_entry(
                        DiagnosticKind::MissingLengthExpression,
                        &entry.name,
                        format!("data len is undefined for '{}'", param.name),
                    ));
                }
            }
        }
        if entry.ret.is_pointer() {
            diags.warn(Diagnostic::for_entry(
                DiagnosticKind::PointerReturn,
                &entry.name,
                "return value of pointer is unsupported",
            ));
        }
    }
}
