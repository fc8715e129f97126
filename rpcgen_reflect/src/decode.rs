/* Reference decode loop with the same halting rules, offsets and scratch
 * layout as the generated `decode()` */

use crate::formatter::{format_scalar, format_trace};
use crate::value::{ArgValue, DecodeOutcome, DecodedArg, DecodedCall, Halt};
use rpcgen::layout::{EntryLayout, HEADER_SIZE, SlotKind, plan_table};
use rpcgen_types::{EntryPoint, SpecTable};

/// The server side of a call. OUT/INOUT buffers in `args` and `ret` are
/// flushed back once it returns.
pub trait CallHandler {
    fn handle(&mut self, entry: &EntryPoint, args: &mut [DecodedArg], ret: &mut [u8]);
}

impl<F> CallHandler for F
where
    F: FnMut(&EntryPoint, &mut [DecodedArg], &mut [u8]),
{
    fn handle(&mut self, entry: &EntryPoint, args: &mut [DecodedArg], ret: &mut [u8]) {
        self(entry, args, ret)
    }
}

/// Where scratch regions are flushed.
pub trait ReplyStream {
    fn flush(&mut self, data: &[u8]);
}

/// Records every flush.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStream {
    pub flushes: Vec<Vec<u8>>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_flushed(&self) -> usize {
        self.flushes.iter().map(Vec::len).sum()
    }
}

impl ReplyStream for MemoryStream {
    fn flush(&mut self, data: &[u8]) {
        self.flushes.push(data.to_vec());
    }
}

fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn slice(buf: &[u8], offset: u64, len: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(len).ok()?)?;
    buf.get(start..end)
}

pub struct Decoder<'a> {
    table: &'a SpecTable,
    layouts: Vec<EntryLayout>,
}

impl<'a> Decoder<'a> {
    pub fn new(table: &'a SpecTable) -> Self {
        Self {
            table,
            layouts: plan_table(table),
        }
    }

    /// Decode with a handler that leaves outputs zeroed, discarding flushes.
    pub fn decode(&self, buf: &[u8]) -> DecodeOutcome {
        let mut sink = MemoryStream::new();
        let mut noop = |_: &EntryPoint, _: &mut [DecodedArg], _: &mut [u8]| {};
        self.decode_with(buf, &mut noop, &mut sink)
    }

    pub fn decode_with(
        &self,
        buf: &[u8],
        handler: &mut impl CallHandler,
        stream: &mut impl ReplyStream,
    ) -> DecodeOutcome {
        let mut calls = Vec::new();
        let mut pos = 0usize;

        let halt = loop {
            let rest = &buf[pos..];
            let (Some(opcode), Some(declared)) = (read_u32(rest, 0), read_u32(rest, 4)) else {
                break Halt::Exhausted;
            };
            if declared as usize > rest.len() {
                break Halt::Truncated {
                    declared,
                    available: rest.len(),
                };
            }
            if u64::from(declared) < HEADER_SIZE {
                break Halt::BadPacketSize { declared };
            }
            let Some((idx, entry)) = self.table.entry_for_opcode(opcode) else {
                break Halt::UnknownOpcode { opcode };
            };

            let packet = &rest[..declared as usize];
            match self.dispatch(&self.layouts[idx], entry, pos, packet, handler, stream) {
                Some(call) => calls.push(call),
                None => break Halt::Malformed { opcode },
            }
            pos += declared as usize;
        };

        tracing::debug!(calls = calls.len(), consumed = pos, ?halt, "decode loop stopped");
        DecodeOutcome {
            calls,
            consumed: pos,
            halt,
        }
    }

    fn dispatch(
        &self,
        layout: &EntryLayout,
        entry: &EntryPoint,
        position: usize,
        packet: &[u8],
        handler: &mut impl CallHandler,
        stream: &mut impl ReplyStream,
    ) -> Option<DecodedCall> {
        let plan = &layout.packet;

        // Length fields first; later offsets depend on them.
        let mut lens = vec![0u64; plan.slots.len()];
        for slot in plan.pointers() {
            let offset = usize::try_from(slot.offset.eval(|i| lens[i])).ok()?;
            lens[slot.index] = u64::from(read_u32(packet, offset)?);
        }
        if plan.packet_size.eval(|i| lens[i]) > packet.len() as u64 {
            return None;
        }

        let mut args = Vec::with_capacity(plan.slots.len());
        for (slot, param) in plan.slots.iter().zip(&entry.params) {
            let offset = slot.offset.eval(|i| lens[i]);
            let value = match &slot.kind {
                SlotKind::Scalar { size } => {
                    let bytes = slice(packet, offset, u64::from(*size))?.to_vec();
                    let formatted = format_scalar(&bytes, &param.ty.print_format);
                    ArgValue::Scalar { bytes, formatted }
                }
                SlotKind::Pointer {
                    dir, null_allowed, ..
                } => {
                    let length = lens[slot.index];
                    let data = if *null_allowed && length == 0 {
                        None
                    } else if dir.sends_data() {
                        Some(slice(packet, slot.data_offset().eval(|i| lens[i]), length)?.to_vec())
                    } else {
                        Some(vec![0; usize::try_from(length).ok()?])
                    };
                    ArgValue::Pointer {
                        dir: *dir,
                        length: u32::try_from(length).ok()?,
                        data,
                    }
                }
            };
            args.push(DecodedArg {
                name: param.name.clone(),
                type_name: param.type_name().to_string(),
                offset,
                value,
            });
        }

        let scratch = &layout.scratch;
        let mut ret = vec![0u8; scratch.ret.as_ref().map_or(0, |r| r.size as usize)];
        handler.handle(entry, &mut args, &mut ret);

        let mut reply = vec![0u8; usize::try_from(scratch.total.eval(|i| lens[i])).ok()?];
        for region in &scratch.regions {
            let start = usize::try_from(region.offset.eval(|i| lens[i])).ok()?;
            let len = lens[region.param] as usize;
            if let ArgValue::Pointer { data: Some(data), .. } = &args[region.param].value {
                let n = data.len().min(len);
                reply[start..start + n].copy_from_slice(&data[..n]);
            }
        }
        if let Some(slot) = &scratch.ret {
            let start = usize::try_from(slot.offset.eval(|i| lens[i])).ok()?;
            reply[start..start + ret.len()].copy_from_slice(&ret);
        }
        if !scratch.is_empty() {
            stream.flush(&reply);
        }

        let trace = format_trace(&entry.name, &args);
        tracing::trace!(%trace, "dispatched");
        Some(DecodedCall {
            opcode: plan.opcode,
            entry: entry.name.clone(),
            position,
            packet_size: packet.len() as u32,
            args,
            reply,
            trace,
        })
    }
}

