use crate::types::TypeDesc;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which way the pointed-to data travels.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerDir {
    /// caller -> callee
    #[default]
    In,
    /// callee -> caller, storage provided by the decoder
    Out,
    /// both
    InOut,
}

impl PointerDir {
    /// Data bytes follow the length field inside the packet.
    pub fn sends_data(self) -> bool {
        matches!(self, PointerDir::In | PointerDir::InOut)
    }

    /// Data is read back by the encoder after the call.
    pub fn receives_data(self) -> bool {
        matches!(self, PointerDir::Out | PointerDir::InOut)
    }
}

impl fmt::Display for PointerDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointerDir::In => write!(f, "in"),
            PointerDir::Out => write!(f, "out"),
            PointerDir::InOut => write!(f, "inout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePointerDirError(pub String);

impl fmt::Display for ParsePointerDirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown pointer direction '{}' (expected in, out or inout)", self.0)
    }
}

impl std::error::Error for ParsePointerDirError {}

impl FromStr for PointerDir {
    type Err = ParsePointerDirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" => Ok(PointerDir::In),
            "out" => Ok(PointerDir::Out),
            "inout" => Ok(PointerDir::InOut),
            _ => Err(ParsePointerDirError(s.to_string())),
        }
    }
}

/// Metadata only a pointer parameter can carry.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PointerAttrs {
    pub dir: PointerDir,
    #[serde(default)]
    pub null_allowed: bool,
    /// Source-level byte length of the pointed-to data, in terms of sibling
    /// parameter names. Empty until an overlay provides one.
    #[serde(default)]
    pub len_expr: String,
    #[serde(default)]
    pub pack_expr: Option<String>,
    #[serde(default)]
    pub unpack_expr: Option<String>,
}

/// One parameter or return value of an entry point.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct VarDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
    /// Present iff the type is a pointer.
    #[serde(default)]
    pub pointer: Option<PointerAttrs>,
}

impl VarDesc {
    pub fn new(name: &str, ty: TypeDesc) -> Self {
        let pointer = ty.is_pointer.then(PointerAttrs::default);
        Self {
            name: name.to_string(),
            ty,
            pointer,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer.is_some()
    }

    pub fn is_void(&self) -> bool {
        self.pointer.is_none() && self.ty.is_void()
    }

    pub fn type_name(&self) -> &str {
        &self.ty.name
    }

    pub fn byte_size(&self) -> u32 {
        self.ty.byte_size
    }

    pub fn pointer_attrs(&self) -> Option<&PointerAttrs> {
        self.pointer.as_ref()
    }

    pub fn pointer_attrs_mut(&mut self) -> Option<&mut PointerAttrs> {
        self.pointer.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_has_no_pointer_metadata() {
        let var = VarDesc::new("count", TypeDesc::new("int", 4, "%d", false));
        assert!(!var.is_pointer());
        assert!(var.pointer_attrs().is_none());
    }

    #[test]
    fn pointer_defaults_to_in_without_length() {
        let var = VarDesc::new("data", TypeDesc::new("void*", 8, "%p", true));
        let attrs = var.pointer_attrs().unwrap();
        assert_eq!(attrs.dir, PointerDir::In);
        assert!(!attrs.null_allowed);
        assert!(attrs.len_expr.is_empty());
    }

    #[test]
    fn direction_parses_case_insensitively() {
        assert_eq!("OUT".parse::<PointerDir>().unwrap(), PointerDir::Out);
        assert_eq!("inout".parse::<PointerDir>().unwrap(), PointerDir::InOut);
        assert!("sideways".parse::<PointerDir>().is_err());
    }
}
