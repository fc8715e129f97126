use crate::var::VarDesc;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// One RPC-callable function. Parameter order fixes the wire order.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct EntryPoint {
    pub name: String,
    #[serde(rename = "return")]
    pub ret: VarDesc,
    pub params: Vec<VarDesc>,
    #[serde(default)]
    pub custom_decoder: bool,
    #[serde(default)]
    pub unsupported: bool,
}

impl EntryPoint {
    pub fn new(name: &str, ret: VarDesc, params: Vec<VarDesc>) -> Self {
        Self {
            name: name.to_string(),
            ret,
            params,
            custom_decoder: false,
            unsupported: false,
        }
    }

    pub fn has_pointers(&self) -> bool {
        self.params.iter().any(VarDesc::is_pointer)
    }

    pub fn returns_value(&self) -> bool {
        !self.ret.is_void()
    }

    pub fn param(&self, name: &str) -> Option<&VarDesc> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut VarDesc> {
        self.params.iter_mut().find(|p| p.name == name)
    }
}

/* Plain C prototype, e.g. `int foo(int a, void* b)` */
impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.ret.type_name(), self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", param.type_name(), param.name)?;
        }
        write!(f, ")")
    }
}
