//! Packet layout planning shared by the encoder and decoder generators.
//!
//! Every packet is `[opcode: u32][packetSize: u32][payload]`. A scalar
//! parameter occupies its type's byte size. A pointer parameter occupies a
//! 4-byte length field, followed by the data itself only when the data
//! travels towards the callee (IN/INOUT). OUT pointers never carry inline
//! data; a null nullable pointer has a zero length field.
//!
//! Offsets are kept symbolic ([`SizeExpr`]): a constant plus a sum of
//! length-field values. The encoder renders a length field from the
//! parameter's length expression, the decoder from the value it reads out
//! of the payload, and tests evaluate it against concrete lengths. All three
//! views come from the same plan, which is what keeps them in agreement.

use rpcgen_types::{EntryPoint, PointerDir, SpecTable, VarDesc};
use serde_derive::Serialize;

/// Opcode plus packet size.
pub const HEADER_SIZE: u64 = 8;
/// Width of the length field preceding pointer data.
pub const LENGTH_FIELD_SIZE: u64 = 4;

/// `constant + Σ lengthField(param)` for the listed parameter indices.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SizeExpr {
    pub constant: u64,
    pub fields: Vec<usize>,
}

impl SizeExpr {
    pub fn constant(value: u64) -> Self {
        Self {
            constant: value,
            fields: Vec::new(),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn add_constant(&mut self, value: u64) {
        self.constant += value;
    }

    pub fn add_field(&mut self, param: usize) {
        self.fields.push(param);
    }

    pub fn plus(&self, value: u64) -> Self {
        let mut out = self.clone();
        out.add_constant(value);
        out
    }

    /// Evaluate with concrete length-field values.
    pub fn eval(&self, field: impl Fn(usize) -> u64) -> u64 {
        self.fields.iter().fold(self.constant, |acc, &idx| acc + field(idx))
    }

    /// Render as a C expression, `term` naming each length field. The
    /// constant leads; a zero constant is dropped unless it is all there is.
    pub fn render(&self, term: impl Fn(usize) -> String) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.fields.len() + 1);
        if self.constant != 0 || self.fields.is_empty() {
            parts.push(self.constant.to_string());
        }
        parts.extend(self.fields.iter().map(|&idx| term(idx)));
        parts.join(" + ")
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SlotKind {
    Scalar {
        size: u32,
    },
    Pointer {
        dir: PointerDir,
        null_allowed: bool,
        len_expr: String,
    },
}

/// Where one parameter sits in the packet.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParamSlot {
    pub index: usize,
    pub name: String,
    pub type_name: String,
    #[serde(flatten)]
    pub kind: SlotKind,
    /// Offset of the first byte (the length field for pointers), from the
    /// start of the packet.
    pub offset: SizeExpr,
}

impl ParamSlot {
    pub fn is_pointer(&self) -> bool {
        matches!(self.kind, SlotKind::Pointer { .. })
    }

    pub fn dir(&self) -> Option<PointerDir> {
        match self.kind {
            SlotKind::Pointer { dir, .. } => Some(dir),
            SlotKind::Scalar { .. } => None,
        }
    }

    /// Offset of the inline data; for pointers this skips the length field.
    pub fn data_offset(&self) -> SizeExpr {
        match self.kind {
            SlotKind::Scalar { .. } => self.offset.clone(),
            SlotKind::Pointer { .. } => self.offset.plus(LENGTH_FIELD_SIZE),
        }
    }

    /// Bytes this parameter occupies in the packet.
    pub fn wire_size(&self) -> SizeExpr {
        match &self.kind {
            SlotKind::Scalar { size } => SizeExpr::constant(u64::from(*size)),
            SlotKind::Pointer { dir, .. } => {
                let mut size = SizeExpr::constant(LENGTH_FIELD_SIZE);
                if dir.sends_data() {
                    size.add_field(self.index);
                }
                size
            }
        }
    }
}

/// Byte layout of one entry point's packet.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PacketPlan {
    pub entry: String,
    pub opcode: u32,
    pub slots: Vec<ParamSlot>,
    pub packet_size: SizeExpr,
}

impl PacketPlan {
    pub fn for_entry(entry: &EntryPoint, opcode: u32) -> Self {
        let mut cursor = SizeExpr::constant(HEADER_SIZE);
        let mut slots = Vec::with_capacity(entry.params.len());

        for (index, param) in entry.params.iter().enumerate() {
            let kind = match param.pointer_attrs() {
                Some(attrs) => SlotKind::Pointer {
                    dir: attrs.dir,
                    null_allowed: attrs.null_allowed,
                    len_expr: attrs.len_expr.trim().to_string(),
                },
                None => SlotKind::Scalar {
                    size: param.byte_size(),
                },
            };
            let slot = ParamSlot {
                index,
                name: param.name.clone(),
                type_name: param.type_name().to_string(),
                kind,
                offset: cursor.clone(),
            };
            let size = slot.wire_size();
            cursor.add_constant(size.constant);
            cursor.fields.extend(size.fields);
            slots.push(slot);
        }

        Self {
            entry: entry.name.clone(),
            opcode,
            slots,
            packet_size: cursor,
        }
    }

    pub fn build(table: &SpecTable, index: usize) -> Self {
        Self::for_entry(&table.entries()[index], table.opcode(index))
    }

    pub fn pointer_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_pointer()).count()
    }

    pub fn pointers(&self) -> impl Iterator<Item = &ParamSlot> {
        self.slots.iter().filter(|s| s.is_pointer())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScratchRegion {
    pub param: usize,
    pub offset: SizeExpr,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ReturnSlot {
    pub type_name: String,
    pub size: u32,
    pub offset: SizeExpr,
}

/// Decoder-side scratch storage for one call: one region per pointer the
/// encoder reads back (OUT and INOUT), in parameter order, followed by the
/// return value. INOUT regions start as a copy of the inbound data.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ScratchPlan {
    pub regions: Vec<ScratchRegion>,
    pub ret: Option<ReturnSlot>,
    pub total: SizeExpr,
}

impl ScratchPlan {
    /// Pointer return values get no slot; they are not transported.
    pub fn build(packet: &PacketPlan, ret: &VarDesc) -> Self {
        let mut running = SizeExpr::default();
        let mut regions = Vec::new();
        for slot in packet
            .slots
            .iter()
            .filter(|s| s.dir().is_some_and(PointerDir::receives_data))
        {
            regions.push(ScratchRegion {
                param: slot.index,
                offset: running.clone(),
            });
            running.add_field(slot.index);
        }

        let ret = (!ret.is_void() && !ret.is_pointer()).then(|| ReturnSlot {
            type_name: ret.type_name().to_string(),
            size: ret.byte_size(),
            offset: running.clone(),
        });
        if let Some(slot) = &ret {
            running.add_constant(u64::from(slot.size));
        }

        Self {
            regions,
            ret,
            total: running,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.ret.is_none()
    }

    pub fn region_for(&self, param: usize) -> Option<&ScratchRegion> {
        self.regions.iter().find(|r| r.param == param)
    }
}

/// Both plans for one entry point.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EntryLayout {
    pub packet: PacketPlan,
    pub scratch: ScratchPlan,
}

impl EntryLayout {
    pub fn build(table: &SpecTable, index: usize) -> Self {
        let packet = PacketPlan::build(table, index);
        let scratch = ScratchPlan::build(&packet, &table.entries()[index].ret);
        Self { packet, scratch }
    }
}

/// Layouts for every entry, in opcode order.
pub fn plan_table(table: &SpecTable) -> Vec<EntryLayout> {
    (0..table.len()).map(|idx| EntryLayout::build(table, idx)).collect()
}
