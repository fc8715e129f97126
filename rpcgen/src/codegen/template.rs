use rpcgen_types::SpecTable;
use std::fmt::Write;

/// Skeleton overlay listing every entry that has pointer parameters, with
/// its prototype as a comment, ready to be filled in with `len`/`dir`
/// attributes.
pub fn emit_attribute_template(table: &SpecTable) -> String {
    let mut output = String::new();
    for entry in table.iter().filter(|e| e.has_pointers()) {
        writeln!(output, "#{}", entry).unwrap();
        writeln!(output, "{}\n", entry.name).unwrap();
    }
    output
}
