/* Call arguments on the encode side, decoded values on the decode side */

use rpcgen_types::PointerDir;
use serde::Serialize;

/// One argument of a call to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Raw little-endian bytes, exactly the parameter type's size.
    Scalar(Vec<u8>),
    /// Pointed-to buffer; its length is the value of the length
    /// expression. `None` is a null pointer.
    Pointer(Option<Vec<u8>>),
}

impl Arg {
    pub fn i32(value: i32) -> Self {
        Arg::Scalar(value.to_le_bytes().to_vec())
    }

    pub fn u32(value: u32) -> Self {
        Arg::Scalar(value.to_le_bytes().to_vec())
    }

    pub fn u64(value: u64) -> Self {
        Arg::Scalar(value.to_le_bytes().to_vec())
    }

    pub fn f32(value: f32) -> Self {
        Arg::Scalar(value.to_le_bytes().to_vec())
    }

    pub fn bytes(data: &[u8]) -> Self {
        Arg::Pointer(Some(data.to_vec()))
    }

    /// Caller-owned output storage of `len` bytes.
    pub fn out(len: usize) -> Self {
        Arg::Pointer(Some(vec![0; len]))
    }

    pub fn null() -> Self {
        Arg::Pointer(None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ArgValue {
    Scalar {
        bytes: Vec<u8>,
        /* Rendered with the type's print format */
        formatted: String,
    },
    Pointer {
        dir: PointerDir,
        length: u32,
        /* IN/INOUT: the inbound bytes; OUT: zeroed scratch; null: absent */
        data: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DecodedArg {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// Offset of the argument within its packet.
    pub offset: u64,
    pub value: ArgValue,
}

impl DecodedArg {
    /// Mutable view of a pointer argument's buffer, if it has one.
    pub fn buffer_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.value {
            ArgValue::Pointer { data, .. } => data.as_mut(),
            ArgValue::Scalar { .. } => None,
        }
    }

    pub fn scalar_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            ArgValue::Scalar { bytes, .. } => Some(bytes),
            ArgValue::Pointer { .. } => None,
        }
    }
}

/// One dispatched packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DecodedCall {
    pub opcode: u32,
    pub entry: String,
    /// Offset of the packet within the decoded buffer.
    pub position: usize,
    pub packet_size: u32,
    pub args: Vec<DecodedArg>,
    /// Bytes flushed back for OUT/INOUT data and the return value.
    pub reply: Vec<u8>,
    /// Same text the generated decoder prints under DEBUG_PRINTOUT.
    pub trace: String,
}

/// Why the decode loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum Halt {
    /// Fewer than a header's worth of bytes left (including none).
    Exhausted,
    /// The declared packet size runs past the end of the buffer.
    Truncated { declared: u32, available: usize },
    /// The declared packet size is smaller than a header.
    BadPacketSize { declared: u32 },
    /// The parameter layout runs past the declared packet size.
    Malformed { opcode: u32 },
    UnknownOpcode { opcode: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DecodeOutcome {
    pub calls: Vec<DecodedCall>,
    /// Bytes fully consumed; everything before this offset was dispatched.
    pub consumed: usize,
    pub halt: Halt,
}
