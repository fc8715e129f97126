/* Dispatch tables: proc typedefs, context structs and name-based init */

use super::Side;
use super::helpers::{GENERATED_BANNER, param_types};
use rpcgen_types::{EntryPoint, HeaderKind, SpecTable};
use std::fmt::Write;

/// Whether procs of `side` take an opaque context as first argument.
pub fn takes_context(entry: &EntryPoint, side: Side) -> bool {
    match side {
        Side::Client | Side::Encoder => true,
        Side::Server | Side::Decoder => entry.custom_decoder,
        Side::Wrapper => false,
    }
}

pub fn proc_type_name(entry: &EntryPoint, side: Side) -> String {
    format!("{}_{}_proc_t", entry.name, side.as_str())
}

pub fn context_type_name(table: &SpecTable, side: Side) -> String {
    format!("{}_{}_context_t", table.basename, side.as_str())
}

pub fn emit_proc_types(table: &SpecTable, side: Side) -> String {
    let base = &table.basename;
    let s = side.as_str();
    let mut output = String::from(GENERATED_BANNER);

    writeln!(output, "#ifndef __{}_{}_proc_t_h", base, s).unwrap();
    writeln!(output, "#define __{}_{}_proc_t_h", base, s).unwrap();
    output.push_str("\n\n");
    writeln!(output, "\n#include \"{}_types.h\"", base).unwrap();

    for entry in table.iter() {
        let mut args: Vec<&str> = Vec::new();
        if takes_context(entry, side) {
            args.push("void * ctx");
        }
        args.extend(param_types(entry));
        writeln!(
            output,
            "typedef {} (* {}) ({});",
            entry.ret.type_name(),
            proc_type_name(entry, side),
            args.join(", ")
        )
        .unwrap();
    }
    output.push_str("\n\n#endif\n");
    output
}

pub fn emit_context_header(table: &SpecTable, side: Side) -> String {
    let base = &table.basename;
    let s = side.as_str();
    let ctx_type = context_type_name(table, side);
    let mut output = String::from(GENERATED_BANNER);

    writeln!(output, "#ifndef __{}_{}_context_t_h", base, s).unwrap();
    writeln!(output, "#define __{}_{}_context_t_h", base, s).unwrap();
    writeln!(output, "\n#include \"{}_{}_proc.h\"", base, s).unwrap();

    let headers = match side {
        Side::Client | Side::Encoder => table.settings.headers(HeaderKind::ClientContext),
        _ => table.settings.headers(HeaderKind::ServerContext),
    };
    for header in headers {
        writeln!(output, "#include {}", header).unwrap();
    }
    output.push('\n');

    writeln!(output, "\nstruct {} {{\n", ctx_type).unwrap();
    for entry in table.iter() {
        writeln!(output, "\t{} {};", proc_type_name(entry, side), entry.name).unwrap();
    }

    output.push_str("\t//Accessors \n");
    for entry in table.iter() {
        let proc_t = proc_type_name(entry, side);
        let n = &entry.name;
        writeln!(
            output,
            "\t{proc_t} set_{n}({proc_t} f) {{ {proc_t} retval = {n}; {n} = f; return retval;}}"
        )
        .unwrap();
    }

    if matches!(side, Side::Client | Side::Wrapper) {
        writeln!(output, "\n\ttypedef {} *CONTEXT_ACCESSOR_TYPE(void);", ctx_type).unwrap();
        output.push_str("\tstatic void setContextAccessor(CONTEXT_ACCESSOR_TYPE *f);\n");
    }

    output.push_str(
        "\tint initDispatchByName( void *(*getProc)(const char *name, void *userData), void *userData);\n",
    );
    output.push_str("};\n");
    output.push_str("\n#endif\n");
    output
}

pub fn emit_context_impl(table: &SpecTable, side: Side) -> String {
    let ctx_type = context_type_name(table, side);
    let mut output = String::from(GENERATED_BANNER);

    output.push_str("\n\n#include <string.h>\n");
    writeln!(output, "#include \"{}_{}_context.h\"\n\n", table.basename, side.as_str()).unwrap();
    output.push_str("#include <stdio.h>\n\n");

    writeln!(
        output,
        "int {}::initDispatchByName(void *(*getProc)(const char *, void *userData), void *userData)\n{{",
        ctx_type
    )
    .unwrap();
    if !table.is_empty() {
        output.push_str("\tvoid *ptr;\n\n");
    }
    for entry in table.iter() {
        writeln!(
            output,
            "\tptr = getProc(\"{n}\", userData); set_{n}(({p})ptr);",
            n = entry.name,
            p = proc_type_name(entry, side)
        )
        .unwrap();
    }
    output.push_str("\treturn 0;\n");
    output.push_str("}\n\n");
    output
}
