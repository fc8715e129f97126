use crate::entry::EntryPoint;
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

/// Which generated file a `GLOBAL` include list feeds.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderKind {
    Encoder,
    Decoder,
    ClientContext,
    ServerContext,
}

/// Generator-wide settings, set by the `GLOBAL` overlay block and frozen
/// before any generator runs.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalSettings {
    #[serde(default)]
    pub base_opcode: u32,
    #[serde(default)]
    pub encoder_headers: Vec<String>,
    #[serde(default)]
    pub decoder_headers: Vec<String>,
    #[serde(default)]
    pub client_context_headers: Vec<String>,
    #[serde(default)]
    pub server_context_headers: Vec<String>,
}

impl GlobalSettings {
    pub fn headers(&self, kind: HeaderKind) -> &[String] {
        match kind {
            HeaderKind::Encoder => &self.encoder_headers,
            HeaderKind::Decoder => &self.decoder_headers,
            HeaderKind::ClientContext => &self.client_context_headers,
            HeaderKind::ServerContext => &self.server_context_headers,
        }
    }

    /// Append an include directive unless it is already listed. Returns true
    /// when the list changed.
    pub fn add_header(&mut self, kind: HeaderKind, header: &str) -> bool {
        let list = match kind {
            HeaderKind::Encoder => &mut self.encoder_headers,
            HeaderKind::Decoder => &mut self.decoder_headers,
            HeaderKind::ClientContext => &mut self.client_context_headers,
            HeaderKind::ServerContext => &mut self.server_context_headers,
        };
        if list.iter().any(|h| h == header) {
            return false;
        }
        list.push(header.to_string());
        true
    }
}

/// Ordered entry points of one interface. Position in the table is the wire
/// identity: opcode = base opcode + index.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SpecTable {
    pub basename: String,
    pub settings: GlobalSettings,
    entries: Vec<EntryPoint>,
    #[serde(skip)]
    index: IndexMap<String, usize>,
    max_param_count: usize,
}

impl SpecTable {
    pub fn new(basename: &str) -> Self {
        Self {
            basename: basename.to_string(),
            ..Self::default()
        }
    }

    /// Append an entry. A name already present is rejected and the entry is
    /// handed back unchanged.
    pub fn push(&mut self, entry: EntryPoint) -> Result<usize, EntryPoint> {
        if self.index.contains_key(&entry.name) {
            return Err(entry);
        }
        let idx = self.entries.len();
        self.max_param_count = self.max_param_count.max(entry.params.len());
        self.index.insert(entry.name.clone(), idx);
        self.entries.push(entry);
        Ok(idx)
    }

    pub fn entries(&self) -> &[EntryPoint] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn find(&self, name: &str) -> Option<&EntryPoint> {
        self.position(name).map(|idx| &self.entries[idx])
    }

    /// Mutable lookup used by the attribute overlay. Renaming through this
    /// reference is not supported.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut EntryPoint> {
        let idx = self.position(name)?;
        self.entries.get_mut(idx)
    }

    /// Opcode of the entry at `index`, or `None` when `base + index` does
    /// not fit in a `u32`.
    pub fn checked_opcode(&self, index: usize) -> Option<u32> {
        let index = u32::try_from(index).ok()?;
        self.settings.base_opcode.checked_add(index)
    }

    /// Opcode of the entry at `index`. The overlay keeps `base + len` within
    /// `u32`; a table built around that check saturates instead of wrapping.
    pub fn opcode(&self, index: usize) -> u32 {
        self.checked_opcode(index).unwrap_or(u32::MAX)
    }

    /// True when every opcode of this table, `OP_last` included, fits in a
    /// `u32` for the given base.
    pub fn base_opcode_fits(&self, base: u32) -> bool {
        u32::try_from(self.entries.len())
            .ok()
            .and_then(|len| base.checked_add(len))
            .is_some()
    }

    pub fn opcode_of(&self, name: &str) -> Option<u32> {
        self.position(name).map(|idx| self.opcode(idx))
    }

    /// Sentinel one past the last assigned opcode.
    pub fn last_opcode(&self) -> u32 {
        self.opcode(self.entries.len())
    }

    pub fn entry_for_opcode(&self, opcode: u32) -> Option<(usize, &EntryPoint)> {
        let idx = opcode.checked_sub(self.settings.base_opcode)? as usize;
        self.entries.get(idx).map(|e| (idx, e))
    }

    /// Largest parameter count across all entries.
    pub fn max_param_count(&self) -> usize {
        self.max_param_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDesc;
    use crate::var::VarDesc;

    fn entry(name: &str, nparams: usize) -> EntryPoint {
        let int = TypeDesc::new("int", 4, "%d", false);
        let params = (0..nparams)
            .map(|i| VarDesc::new(&format!("p{}", i), int.clone()))
            .collect();
        EntryPoint::new(name, VarDesc::new("retval", int), params)
    }

    #[test]
    fn opcodes_follow_position_and_base() {
        let mut table = SpecTable::new("gl");
        table.push(entry("a", 0)).unwrap();
        table.push(entry("b", 3)).unwrap();
        table.settings.base_opcode = 1024;
        assert_eq!(table.opcode_of("a"), Some(1024));
        assert_eq!(table.opcode_of("b"), Some(1025));
        assert_eq!(table.last_opcode(), 1026);
        assert_eq!(table.max_param_count(), 3);
        assert_eq!(table.entry_for_opcode(1025).unwrap().1.name, "b");
        assert!(table.entry_for_opcode(1023).is_none());
        assert!(table.entry_for_opcode(1026).is_none());
    }

    #[test]
    fn opcodes_near_u32_max_do_not_wrap() {
        let mut table = SpecTable::new("gl");
        table.push(entry("a", 0)).unwrap();
        table.push(entry("b", 0)).unwrap();
        assert!(table.base_opcode_fits(u32::MAX - 2));
        assert!(!table.base_opcode_fits(u32::MAX - 1));
        table.settings.base_opcode = u32::MAX;
        assert_eq!(table.checked_opcode(0), Some(u32::MAX));
        assert_eq!(table.checked_opcode(1), None);
        assert_eq!(table.last_opcode(), u32::MAX);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut table = SpecTable::new("gl");
        table.push(entry("a", 1)).unwrap();
        let rejected = table.push(entry("a", 2)).unwrap_err();
        assert_eq!(rejected.params.len(), 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.max_param_count(), 1);
    }

    #[test]
    fn header_lists_skip_duplicates() {
        let mut settings = GlobalSettings::default();
        assert!(settings.add_header(HeaderKind::Encoder, "\"foo.h\""));
        assert!(!settings.add_header(HeaderKind::Encoder, "\"foo.h\""));
        assert!(settings.add_header(HeaderKind::Decoder, "\"foo.h\""));
        assert_eq!(settings.headers(HeaderKind::Encoder).len(), 1);
    }
}
