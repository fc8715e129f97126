/* Exported entry-point trampolines and the name -> function table */

use super::Side;
use super::context::{context_type_name, takes_context};
use super::helpers::{GENERATED_BANNER, prototype};
use rpcgen_types::SpecTable;
use std::fmt::Write;

/// `extern "C"` functions that look up the current context through the
/// installed accessor and forward the call. Only client and wrapper sides
/// export entry points.
pub fn emit_entry_points(table: &SpecTable, side: Side) -> String {
    let ctx_type = context_type_name(table, side);
    let mut output = String::from(GENERATED_BANNER);

    output.push_str("#include <stdio.h>\n");
    output.push_str("#include <stdlib.h>\n");
    writeln!(output, "#include \"{}_{}_context.h\"\n", table.basename, side.as_str()).unwrap();

    output.push_str("extern \"C\" {\n");
    for entry in table.iter() {
        writeln!(output, "\t{};", prototype(entry, "", None)).unwrap();
    }
    output.push_str("};\n\n");

    writeln!(
        output,
        "static {}::CONTEXT_ACCESSOR_TYPE *getCurrentContext = NULL;",
        ctx_type
    )
    .unwrap();
    writeln!(
        output,
        "void {}::setContextAccessor(CONTEXT_ACCESSOR_TYPE *f) {{ getCurrentContext = f; }}\n",
        ctx_type
    )
    .unwrap();

    for entry in table.iter() {
        let mut args: Vec<&str> = Vec::new();
        if takes_context(entry, side) {
            args.push("ctx");
        }
        args.extend(entry.params.iter().map(|p| p.name.as_str()));

        writeln!(output, "{}\n{{", prototype(entry, "", None)).unwrap();
        writeln!(output, "\t{} *ctx = getCurrentContext();", ctx_type).unwrap();
        writeln!(
            output,
            "\t{}ctx->{}({});",
            if entry.returns_value() { "return " } else { "" },
            entry.name,
            args.join(", ")
        )
        .unwrap();
        output.push_str("}\n\n");
    }
    output
}

/// Static table mapping exported names to the trampolines above.
pub fn emit_func_table(table: &SpecTable, side: Side) -> String {
    let base = &table.basename;
    let s = side.as_str();
    let table_name = format!("{}_{}_funcs_by_name", base, s);
    let mut output = String::from(GENERATED_BANNER);

    writeln!(output, "#ifndef __{}_{}_ftable_t_h", base, s).unwrap();
    writeln!(output, "#define __{}_{}_ftable_t_h\n\n", base, s).unwrap();
    writeln!(output, "static const struct _{} {{", table_name).unwrap();
    output.push_str("\tconst char *name;\n");
    output.push_str("\tvoid *proc;\n");
    writeln!(output, "}} {}[] = {{", table_name).unwrap();
    for entry in table.iter() {
        writeln!(output, "\t{{\"{n}\", (void*){n}}},", n = entry.name).unwrap();
    }
    output.push_str("};\n");
    writeln!(
        output,
        "static const int {base}_{s}_num_funcs = sizeof({t}) / sizeof(struct _{t});",
        t = table_name
    )
    .unwrap();
    output.push_str("\n\n#endif\n");
    output
}
