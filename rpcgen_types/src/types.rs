use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

/// Size used for pointer spellings that are not registered explicitly.
pub const DEFAULT_POINTER_SIZE: u32 = 8;

/// A named C type as seen on the wire: its byte size and the printf format
/// used when tracing decoded values.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypeDesc {
    pub name: String,
    pub byte_size: u32,
    pub print_format: String,
    #[serde(default)]
    pub is_pointer: bool,
}

impl TypeDesc {
    pub fn new(name: &str, byte_size: u32, print_format: &str, is_pointer: bool) -> Self {
        Self {
            name: name.to_string(),
            byte_size,
            print_format: print_format.to_string(),
            is_pointer,
        }
    }

    pub fn is_void(&self) -> bool {
        !self.is_pointer && self.name == "void"
    }
}

const BUILTINS: &[(&str, u32, &str)] = &[
    ("void", 0, ""),
    ("char", 1, "%d"),
    ("signed char", 1, "%d"),
    ("unsigned char", 1, "%u"),
    ("short", 2, "%d"),
    ("unsigned short", 2, "%u"),
    ("int", 4, "%d"),
    ("unsigned int", 4, "%u"),
    ("long long", 8, "%lld"),
    ("unsigned long long", 8, "%llu"),
    ("float", 4, "%f"),
    ("double", 8, "%f"),
    ("int8_t", 1, "%d"),
    ("uint8_t", 1, "%u"),
    ("int16_t", 2, "%d"),
    ("uint16_t", 2, "%u"),
    ("int32_t", 4, "%d"),
    ("uint32_t", 4, "%u"),
    ("int64_t", 8, "%lld"),
    ("uint64_t", 8, "%llu"),
    ("size_t", 8, "%zu"),
    ("intptr_t", 8, "%ld"),
    ("uintptr_t", 8, "%lu"),
];

/// Name -> type lookup. Insertion order is preserved so that dumps of the
/// registry are stable across runs.
#[derive(Serialize, Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDesc>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the fixed-width C builtins and `void*`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, size, format) in BUILTINS {
            registry.insert(TypeDesc::new(name, *size, format, false));
        }
        registry.insert(TypeDesc::new("void*", DEFAULT_POINTER_SIZE, "%p", true));
        registry
    }

    /// Register a type, replacing (and returning) any previous entry with the
    /// same normalized name.
    pub fn insert(&mut self, mut ty: TypeDesc) -> Option<TypeDesc> {
        ty.name = normalize_type_name(&ty.name);
        self.types.insert(ty.name.clone(), ty)
    }

    /// Exact lookup by normalized name.
    pub fn get(&self, name: &str) -> Option<&TypeDesc> {
        self.types.get(&normalize_type_name(name))
    }

    /// Resolve a type spelling from a prototype. Unregistered pointer
    /// spellings resolve to a synthesized pointer type.
    pub fn resolve(&self, spelling: &str) -> Option<TypeDesc> {
        let name = normalize_type_name(spelling);
        if let Some(ty) = self.types.get(&name) {
            return Some(ty.clone());
        }
        if name.ends_with('*') {
            return Some(TypeDesc::new(&name, DEFAULT_POINTER_SIZE, "%p", true));
        }
        None
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDesc> {
        self.types.values()
    }
}

/// Canonical spelling of a C type: single spaces between words, `*` glued to
/// the preceding token (`const char * *` -> `const char**`).
pub fn normalize_type_name(spelling: &str) -> String {
    let spaced = spelling.replace('*', " * ");
    let mut out = String::with_capacity(spelling.len());
    for token in spaced.split_whitespace() {
        if token == "*" {
            out.push('*');
        } else {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_pointer_spacing() {
        assert_eq!(normalize_type_name("const   char *"), "const char*");
        assert_eq!(normalize_type_name("void * *"), "void**");
        assert_eq!(normalize_type_name(" unsigned  int "), "unsigned int");
    }

    #[test]
    fn builtins_resolve_with_sizes() {
        let registry = TypeRegistry::with_builtins();
        assert_eq!(registry.resolve("int").unwrap().byte_size, 4);
        assert_eq!(registry.resolve("unsigned   char").unwrap().byte_size, 1);
        assert!(registry.resolve("void").unwrap().is_void());
        assert!(registry.resolve("void *").unwrap().is_pointer);
    }

    #[test]
    fn unregistered_pointer_is_synthesized() {
        let registry = TypeRegistry::with_builtins();
        let ty = registry.resolve("const GLfloat *").unwrap();
        assert!(ty.is_pointer);
        assert_eq!(ty.name, "const GLfloat*");
        assert_eq!(ty.byte_size, DEFAULT_POINTER_SIZE);
        assert!(registry.resolve("GLfloat").is_none());
    }

    #[test]
    fn insert_overrides_existing_entry() {
        let mut registry = TypeRegistry::with_builtins();
        let previous = registry.insert(TypeDesc::new("size_t", 4, "%u", false));
        assert_eq!(previous.unwrap().byte_size, 8);
        assert_eq!(registry.get("size_t").unwrap().byte_size, 4);
    }
}
