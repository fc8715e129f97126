/* Server-side decoder: a single loop that walks a buffer of packets and
 * dispatches each one to the server context. */

use super::Side;
use super::context::context_type_name;
use super::helpers::{GENERATED_BANNER, decoder_size_var, decoder_tmp_ptr};
use crate::layout::{EntryLayout, HEADER_SIZE, ParamSlot, SizeExpr, SlotKind};
use rpcgen_types::{EntryPoint, HeaderKind, PointerDir, SpecTable};
use std::fmt::Write;

pub fn decoder_type_name(table: &SpecTable) -> String {
    context_type_name(table, Side::Decoder)
}

pub fn emit_decoder_header(table: &SpecTable) -> String {
    let base = &table.basename;
    let dec_type = decoder_type_name(table);
    let mut output = String::from(GENERATED_BANNER);

    writeln!(output, "#ifndef GUARD_{}", dec_type).unwrap();
    writeln!(output, "#define GUARD_{}\n", dec_type).unwrap();
    output.push_str("#include \"IOStream.h\"\n");
    writeln!(output, "#include \"{}_server_context.h\"\n", base).unwrap();
    for header in table.settings.headers(HeaderKind::Decoder) {
        writeln!(output, "#include {}", header).unwrap();
    }

    writeln!(output, "\nstruct {} {{\n", dec_type).unwrap();
    writeln!(output, "\t{} dispatch;\n", context_type_name(table, Side::Server)).unwrap();
    output.push_str("\tsize_t decode(void *buf, size_t bufsize, IOStream *stream);\n\n");
    output.push_str("};\n\n");
    output.push_str("#endif\n");
    output
}

pub fn emit_decoder_impl(table: &SpecTable) -> String {
    let base = &table.basename;
    let dec_type = decoder_type_name(table);
    let mut output = String::from(GENERATED_BANNER);

    output.push_str("\n\n#include <string.h>\n");
    writeln!(output, "#include \"{}_opcodes.h\"\n", base).unwrap();
    writeln!(output, "#include \"{}_dec.h\"\n\n", base).unwrap();
    output.push_str("#include <stdio.h>\n\n");

    writeln!(
        output,
        "size_t {}::decode(void *buf, size_t len, IOStream *stream)\n{{\n",
        dec_type
    )
    .unwrap();
    output.push_str("\tsize_t pos = 0;\n");
    writeln!(output, "\tif (len < {}) return pos;", HEADER_SIZE).unwrap();
    output.push_str("\tunsigned char *ptr = (unsigned char *)buf;\n");
    output.push_str("\tbool unknownOpcode = false;\n");
    writeln!(output, "\twhile ((len - pos >= {}) && !unknownOpcode) {{", HEADER_SIZE).unwrap();
    output.push_str("\t\tunsigned int opcode = *(unsigned int *)ptr;\n");
    output.push_str("\t\tunsigned int packetLen = *(unsigned int *)(ptr + 4);\n");
    output.push_str("\t\tif (len - pos < packetLen)  return pos;\n");
    writeln!(output, "\t\tif (packetLen < {}) return pos;", HEADER_SIZE).unwrap();
    output.push_str("\t\tswitch(opcode) {\n");

    // Every entry gets a case; `unsupported` only stubs out the encoder.
    for (idx, entry) in table.iter().enumerate() {
        let layout = EntryLayout::build(table, idx);
        emit_decoder_case(&mut output, entry, &layout);
    }

    output.push_str("\t\tdefault:\n");
    output.push_str("\t\t\tunknownOpcode = true;\n");
    output.push_str("\t\t} //switch\n");
    output.push_str("\t} // while\n");
    output.push_str("\treturn pos;\n");
    output.push_str("}\n");
    output
}

/// `ptr + <offset>`, with length fields named by the decoder locals.
fn at(offset: &SizeExpr) -> String {
    format!("ptr + {}", offset.render(decoder_size_var))
}

/// The argument passed for one parameter in the invocation pass.
fn call_arg(slot: &ParamSlot) -> String {
    match &slot.kind {
        SlotKind::Scalar { .. } => format!("*({} *)({})", slot.type_name, at(&slot.offset)),
        SlotKind::Pointer {
            dir, null_allowed, ..
        } => {
            let view = match dir {
                PointerDir::In => format!("({})({})", slot.type_name, at(&slot.data_offset())),
                PointerDir::Out | PointerDir::InOut => {
                    format!("({})({})", slot.type_name, decoder_tmp_ptr(slot.index))
                }
            };
            if *null_allowed {
                format!("({} == 0 ? NULL : {})", decoder_size_var(slot.index), view)
            } else {
                view
            }
        }
    }
}

fn emit_decoder_case(output: &mut String, entry: &EntryPoint, layout: &EntryLayout) {
    let packet = &layout.packet;
    let scratch = &layout.scratch;

    writeln!(output, "\t\tcase OP_{}: {{", entry.name).unwrap();

    // Pass 1: every length field, then the scratch total.
    for slot in packet.pointers() {
        writeln!(
            output,
            "\t\t\tsize_t {} = (size_t)*(unsigned int *)({});",
            decoder_size_var(slot.index),
            at(&slot.offset)
        )
        .unwrap();
    }
    if !scratch.is_empty() {
        writeln!(
            output,
            "\t\t\tsize_t totalTmpSize = {};",
            scratch.total.render(decoder_size_var)
        )
        .unwrap();
    }

    // Pass 2: one allocation, carved into disjoint regions.
    if !scratch.is_empty() {
        output.push_str("\t\t\tunsigned char *tmpBuf = stream->alloc(totalTmpSize);\n");
        for region in &scratch.regions {
            writeln!(
                output,
                "\t\t\tunsigned char *{} = &tmpBuf[{}];",
                decoder_tmp_ptr(region.param),
                region.offset.render(decoder_size_var)
            )
            .unwrap();
        }
        for slot in packet.pointers().filter(|s| s.dir() == Some(PointerDir::InOut)) {
            writeln!(
                output,
                "\t\t\tmemcpy({}, {}, {});",
                decoder_tmp_ptr(slot.index),
                at(&slot.data_offset()),
                decoder_size_var(slot.index)
            )
            .unwrap();
        }
    }

    // Pass 3: invocation.
    let mut args: Vec<String> = Vec::with_capacity(packet.slots.len() + 1);
    if entry.custom_decoder {
        args.push("this".to_string());
    }
    args.extend(packet.slots.iter().map(call_arg));
    let call = format!("this->dispatch.{}({})", entry.name, args.join(", "));
    match &scratch.ret {
        Some(ret) => writeln!(
            output,
            "\t\t\t*({} *)(&tmpBuf[{}]) = {};",
            ret.type_name,
            ret.offset.render(decoder_size_var),
            call
        )
        .unwrap(),
        None => writeln!(output, "\t\t\t{};", call).unwrap(),
    }

    // Pass 4: trace.
    output.push_str("#ifdef DEBUG_PRINTOUT\n");
    let mut formats: Vec<String> = Vec::with_capacity(packet.slots.len());
    let mut values: Vec<String> = Vec::with_capacity(packet.slots.len() * 2);
    for (slot, var) in packet.slots.iter().zip(&entry.params) {
        match &slot.kind {
            SlotKind::Scalar { .. } => {
                formats.push(var.ty.print_format.clone());
                values.push(call_arg(slot));
            }
            SlotKind::Pointer { dir, .. } => {
                formats.push("%p(%u)".to_string());
                let addr = match dir {
                    PointerDir::In => format!("({})", at(&slot.data_offset())),
                    PointerDir::Out | PointerDir::InOut => decoder_tmp_ptr(slot.index),
                };
                values.push(format!("(void *){}", addr));
                values.push(format!("(unsigned int){}", decoder_size_var(slot.index)));
            }
        }
    }
    let mut trace_args = vec![format!("\"{}({})\\n\"", entry.name, formats.join(" "))];
    trace_args.extend(values);
    writeln!(output, "\t\t\tfprintf(stderr, {});", trace_args.join(", ")).unwrap();
    output.push_str("#endif\n");

    // Pass 5: epilog.
    if !scratch.is_empty() {
        output.push_str("\t\t\tstream->flush();\n");
    }
    output.push_str("\t\t\tpos += packetLen;\n");
    output.push_str("\t\t\tptr += packetLen;\n");
    output.push_str("\t\t\tbreak;\n");
    output.push_str("\t\t}\n");
}
