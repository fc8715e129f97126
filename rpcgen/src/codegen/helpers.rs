use rpcgen_types::{EntryPoint, PointerAttrs, VarDesc};

pub const GENERATED_BANNER: &str = "// Generated Code - DO NOT EDIT !!\n// generated by 'rpcgen'\n";

/// `int foo_enc(void *self , int a, void* b)`: the entry's prototype with an
/// optional name suffix and an optional leading parameter.
pub fn prototype(entry: &EntryPoint, name_suffix: &str, first_param: Option<&str>) -> String {
    let mut out = format!("{} {}{}(", entry.ret.type_name(), entry.name, name_suffix);
    if let Some(first) = first_param {
        out.push_str(first);
        if !entry.params.is_empty() {
            out.push_str(" , ");
        }
    }
    let params: Vec<String> = entry.params.iter().map(param_decl).collect();
    out.push_str(&params.join(", "));
    out.push(')');
    out
}

pub fn param_decl(var: &VarDesc) -> String {
    format!("{} {}", var.type_name(), var.name)
}

/// Parameter types only, for function-pointer typedefs.
pub fn param_types(entry: &EntryPoint) -> Vec<&str> {
    entry.params.iter().map(VarDesc::type_name).collect()
}

/// Wrap an expression in parentheses unless it is a bare identifier or
/// number.
pub fn paren(expr: &str) -> String {
    let simple = !expr.is_empty() && expr.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        expr.to_string()
    } else {
        format!("({})", expr)
    }
}

/// The length expression, or `0` when none was given (already reported by
/// validation).
pub fn len_or_zero(attrs: &PointerAttrs) -> String {
    let len = attrs.len_expr.trim();
    if len.is_empty() {
        "0".to_string()
    } else {
        paren(len)
    }
}

/// Encoder-side local holding a pointer's length-field value.
pub fn encoder_size_var(var: &VarDesc) -> String {
    format!("__size_{}", var.name)
}

/// Decoder-side local holding a pointer's length-field value.
pub fn decoder_size_var(index: usize) -> String {
    format!("tmpPtr{}Size", index)
}

/// Decoder-side local pointing into the scratch buffer.
pub fn decoder_tmp_ptr(index: usize) -> String {
    format!("tmpPtr{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paren_leaves_simple_terms_alone() {
        assert_eq!(paren("count"), "count");
        assert_eq!(paren("16"), "16");
        assert_eq!(paren("n * 4"), "(n * 4)");
        assert_eq!(paren("sizeof(int)"), "(sizeof(int))");
    }
}
