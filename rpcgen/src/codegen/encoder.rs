/* Client-side encoder: one function per entry that serializes the call into
 * a packet, then reads back OUT data and the return value. */

use super::Side;
use super::context::{context_type_name, proc_type_name};
use super::helpers::{GENERATED_BANNER, encoder_size_var, len_or_zero, prototype};
use crate::layout::{LENGTH_FIELD_SIZE, PacketPlan, SlotKind};
use rpcgen_types::{EntryPoint, HeaderKind, SpecTable};
use std::fmt::Write;

const SELF_PARAM: &str = "void *self";

pub fn encoder_type_name(table: &SpecTable) -> String {
    context_type_name(table, Side::Encoder)
}

pub fn emit_encoder_header(table: &SpecTable) -> String {
    let base = &table.basename;
    let enc_type = encoder_type_name(table);
    let mut output = String::from(GENERATED_BANNER);

    writeln!(output, "#ifndef GUARD_{}", enc_type).unwrap();
    writeln!(output, "#define GUARD_{}\n", enc_type).unwrap();
    output.push_str("#include \"IOStream.h\"\n");
    writeln!(output, "#include \"{}_client_context.h\"\n", base).unwrap();
    for header in table.settings.headers(HeaderKind::Encoder) {
        writeln!(output, "#include {}", header).unwrap();
    }

    writeln!(output, "\nstruct {} {{\n", enc_type).unwrap();
    writeln!(output, "\t{} dispatch;", context_type_name(table, Side::Client)).unwrap();
    output.push_str("\tIOStream *m_stream;\n\n");
    writeln!(output, "\t{}(IOStream *stream);\n", enc_type).unwrap();
    output.push_str("};\n\n");

    output.push_str("extern \"C\" {\n");
    for entry in table.iter().filter(|e| !e.unsupported) {
        writeln!(output, "\t{};", prototype(entry, "_enc", Some(SELF_PARAM))).unwrap();
    }
    output.push_str("};\n");
    output.push_str("#endif\n");
    output
}

pub fn emit_encoder_impl(table: &SpecTable) -> String {
    let base = &table.basename;
    let enc_type = encoder_type_name(table);
    let mut output = String::from(GENERATED_BANNER);

    output.push_str("\n\n#include <string.h>\n");
    writeln!(output, "#include \"{}_opcodes.h\"\n", base).unwrap();
    writeln!(output, "#include \"{}_enc.h\"\n\n", base).unwrap();
    output.push_str("#include <stdio.h>\n\n");

    output.push_str("static void enc_unsupported()\n{\n");
    output.push_str("\tfprintf(stderr, \"Function is unsupported\\n\");\n");
    output.push_str("}\n\n");

    for (idx, entry) in table.iter().enumerate() {
        if entry.unsupported {
            continue;
        }
        let plan = PacketPlan::build(table, idx);
        emit_encoder_body(&mut output, &enc_type, entry, &plan);
    }

    writeln!(output, "{enc_type}::{enc_type}(IOStream *stream)\n{{").unwrap();
    output.push_str("\tm_stream = stream;\n\n");
    for entry in table.iter() {
        if entry.unsupported {
            writeln!(
                output,
                "\tdispatch.set_{}(({})(enc_unsupported));",
                entry.name,
                proc_type_name(entry, Side::Client)
            )
            .unwrap();
        } else {
            writeln!(output, "\tdispatch.set_{n}({n}_enc);", n = entry.name).unwrap();
        }
    }
    output.push_str("}\n\n");
    output
}

fn emit_encoder_body(output: &mut String, enc_type: &str, entry: &EntryPoint, plan: &PacketPlan) {
    writeln!(output, "{}\n{{\n", prototype(entry, "_enc", Some(SELF_PARAM))).unwrap();
    writeln!(output, "\t{enc_type} *ctx = ({enc_type} *)self;\n").unwrap();

    // Length fields, computed once and reused for the size, copy and readback.
    for slot in plan.pointers() {
        let var = &entry.params[slot.index];
        let Some(attrs) = var.pointer_attrs() else {
            continue;
        };
        let len = len_or_zero(attrs);
        let value = if attrs.null_allowed {
            format!("(({} != NULL) ? {} : 0)", var.name, len)
        } else {
            len
        };
        writeln!(output, "\tconst unsigned int {} = {};", encoder_size_var(var), value).unwrap();
    }

    let packet_size = plan
        .packet_size
        .render(|idx| encoder_size_var(&entry.params[idx]));
    // Only `ctx`, `ptr`, `packetSize` and `retval` are introduced as locals.
    writeln!(output, "\tconst unsigned int packetSize = {};", packet_size).unwrap();
    output.push_str("\tunsigned char *ptr = ctx->m_stream->alloc(packetSize);\n");
    writeln!(output, "\t*(unsigned int *)(ptr) = OP_{}; ptr += 4;", entry.name).unwrap();
    output.push_str("\t*(unsigned int *)(ptr) = packetSize; ptr += 4;\n\n");

    for slot in &plan.slots {
        let var = &entry.params[slot.index];
        match &slot.kind {
            SlotKind::Scalar { size } => {
                writeln!(output, "\tmemcpy(ptr, &{}, {}); ptr += {};", var.name, size, size).unwrap();
            }
            SlotKind::Pointer {
                dir, null_allowed, ..
            } => {
                let size_var = encoder_size_var(var);
                writeln!(
                    output,
                    "\tmemcpy(ptr, &{}, {}); ptr += {};",
                    size_var, LENGTH_FIELD_SIZE, LENGTH_FIELD_SIZE
                )
                .unwrap();
                if !dir.sends_data() {
                    continue;
                }
                let copy = match var.pointer_attrs().and_then(|a| a.pack_expr.as_deref()) {
                    Some(pack) => format!("{};", pack),
                    None => format!("memcpy(ptr, {}, {});", var.name, size_var),
                };
                if *null_allowed {
                    writeln!(output, "\tif ({} != NULL) {}", var.name, copy).unwrap();
                } else {
                    writeln!(output, "\t{}", copy).unwrap();
                }
                writeln!(output, "\tptr += {};", size_var).unwrap();
            }
        }
    }

    for slot in plan.pointers() {
        let var = &entry.params[slot.index];
        let Some(attrs) = var.pointer_attrs() else {
            continue;
        };
        if !attrs.dir.receives_data() {
            continue;
        }
        let readback = match attrs.unpack_expr.as_deref() {
            Some(unpack) => format!("{};", unpack),
            None => format!("ctx->m_stream->readback({}, {});", var.name, encoder_size_var(var)),
        };
        if attrs.null_allowed {
            writeln!(output, "\tif ({} != NULL) {}", var.name, readback).unwrap();
        } else {
            writeln!(output, "\t{}", readback).unwrap();
        }
    }

    if entry.ret.is_pointer() {
        output.push_str("\n\treturn NULL;\n");
    } else if entry.returns_value() {
        writeln!(output, "\n\t{} retval;", entry.ret.type_name()).unwrap();
        writeln!(output, "\tctx->m_stream->readback(&retval, {});", entry.ret.byte_size()).unwrap();
        output.push_str("\treturn retval;\n");
    }
    output.push_str("}\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcgen_types::{PointerDir, TypeDesc, VarDesc};

    fn foo_table() -> SpecTable {
        let int = TypeDesc::new("int", 4, "%d", false);
        let ptr = TypeDesc::new("void*", 8, "%p", true);
        let mut b = VarDesc::new("b", ptr);
        if let Some(attrs) = b.pointer_attrs_mut() {
            attrs.dir = PointerDir::Out;
            attrs.len_expr = "4".to_string();
        }
        let mut table = SpecTable::new("gl");
        table
            .push(EntryPoint::new("foo", VarDesc::new("retval", int.clone()), vec![
                VarDesc::new("a", int),
                b,
            ]))
            .unwrap();
        table
    }

    #[test]
    fn out_pointer_sends_length_field_only() {
        let code = emit_encoder_impl(&foo_table());
        assert!(code.contains("const unsigned int __size_b = 4;"));
        assert!(code.contains("const unsigned int packetSize = 16;"));
        assert!(!code.contains("memcpy(ptr, b,"));
        assert!(code.contains("ctx->m_stream->readback(b, __size_b);"));
        assert!(code.contains("ctx->m_stream->readback(&retval, 4);"));
    }
}
