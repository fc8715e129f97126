use super::helpers::GENERATED_BANNER;
use rpcgen_types::SpecTable;
use std::fmt::Write;

pub fn emit_opcodes(table: &SpecTable) -> String {
    let base = &table.basename;
    let mut output = String::from(GENERATED_BANNER);

    writeln!(output, "#ifndef __GUARD_{}_opcodes_h_", base).unwrap();
    writeln!(output, "#define __GUARD_{}_opcodes_h_\n", base).unwrap();
    for (idx, entry) in table.iter().enumerate() {
        writeln!(output, "#define OP_{} \t\t\t\t\t{}", entry.name, table.opcode(idx)).unwrap();
    }
    writeln!(output, "#define OP_last \t\t\t\t\t{}", table.last_opcode()).unwrap();
    output.push_str("\n\n#endif\n");
    output
}
