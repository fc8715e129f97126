/* Reference encoder: builds the exact bytes the generated `<name>_enc`
 * functions put on the wire, and applies the reply they read back. */

use crate::errors::{ReflectError, ReflectResult};
use crate::value::Arg;
use rpcgen::layout::{PacketPlan, SlotKind};
use rpcgen_types::{EntryPoint, SpecTable};

pub struct Encoder<'a> {
    table: &'a SpecTable,
}

impl<'a> Encoder<'a> {
    pub fn new(table: &'a SpecTable) -> Self {
        Self { table }
    }

    fn lookup(&self, name: &str, args: &[Arg]) -> ReflectResult<(usize, &'a EntryPoint)> {
        let idx = self
            .table
            .position(name)
            .ok_or_else(|| ReflectError::UnknownEntryPoint {
                name: name.to_string(),
            })?;
        let entry = &self.table.entries()[idx];
        if entry.params.len() != args.len() {
            return Err(ReflectError::ArgumentCount {
                entry: entry.name.clone(),
                expected: entry.params.len(),
                got: args.len(),
            });
        }
        Ok((idx, entry))
    }

    /// Length-field value per parameter (zero for scalars).
    fn length_fields(entry: &EntryPoint, plan: &PacketPlan, args: &[Arg]) -> ReflectResult<Vec<u64>> {
        let mut lens = vec![0u64; plan.slots.len()];
        for (slot, arg) in plan.slots.iter().zip(args) {
            let param = entry.params[slot.index].name.clone();
            match (&slot.kind, arg) {
                (SlotKind::Scalar { size }, Arg::Scalar(bytes)) => {
                    if bytes.len() != *size as usize {
                        return Err(ReflectError::ScalarWidth {
                            entry: entry.name.clone(),
                            param,
                            expected: *size,
                            got: bytes.len(),
                        });
                    }
                }
                (SlotKind::Pointer { .. }, Arg::Pointer(Some(data))) => {
                    lens[slot.index] = data.len() as u64;
                }
                (SlotKind::Pointer { null_allowed, .. }, Arg::Pointer(None)) => {
                    if !null_allowed {
                        return Err(ReflectError::NullNotAllowed {
                            entry: entry.name.clone(),
                            param,
                        });
                    }
                }
                (SlotKind::Scalar { .. }, Arg::Pointer(_)) => {
                    return Err(ReflectError::ArgumentKind {
                        entry: entry.name.clone(),
                        param,
                        expected: "scalar",
                    });
                }
                (SlotKind::Pointer { .. }, Arg::Scalar(_)) => {
                    return Err(ReflectError::ArgumentKind {
                        entry: entry.name.clone(),
                        param,
                        expected: "pointer",
                    });
                }
            }
        }
        Ok(lens)
    }

    /// Serialize one call into a packet.
    pub fn encode(&self, name: &str, args: &[Arg]) -> ReflectResult<Vec<u8>> {
        let (idx, entry) = self.lookup(name, args)?;
        let plan = PacketPlan::build(self.table, idx);
        let lens = Self::length_fields(entry, &plan, args)?;
        let too_large = || ReflectError::PacketTooLarge {
            entry: entry.name.clone(),
        };

        let packet_size = u32::try_from(plan.packet_size.eval(|i| lens[i])).map_err(|_| too_large())?;
        let mut out = Vec::with_capacity(packet_size as usize);
        out.extend_from_slice(&plan.opcode.to_le_bytes());
        out.extend_from_slice(&packet_size.to_le_bytes());

        for (slot, arg) in plan.slots.iter().zip(args) {
            debug_assert_eq!(out.len() as u64, slot.offset.eval(|i| lens[i]));
            match arg {
                Arg::Scalar(bytes) => out.extend_from_slice(bytes),
                Arg::Pointer(data) => {
                    let len = u32::try_from(lens[slot.index]).map_err(|_| too_large())?;
                    out.extend_from_slice(&len.to_le_bytes());
                    if let (Some(dir), Some(data)) = (slot.dir(), data) {
                        if dir.sends_data() {
                            out.extend_from_slice(data);
                        }
                    }
                }
            }
        }
        debug_assert_eq!(out.len(), packet_size as usize);
        Ok(out)
    }

    /// Bytes the encoder reads back after sending this call: OUT/INOUT data
    /// of non-null pointers, then the return value.
    pub fn readback_len(&self, name: &str, args: &[Arg]) -> ReflectResult<usize> {
        let (_, entry) = self.lookup(name, args)?;
        let data: usize = entry
            .params
            .iter()
            .zip(args)
            .filter(|(param, _)| param.pointer_attrs().is_some_and(|a| a.dir.receives_data()))
            .map(|(_, arg)| match arg {
                Arg::Pointer(Some(buf)) => buf.len(),
                _ => 0,
            })
            .sum();
        Ok(data + Self::return_size(entry))
    }

    fn return_size(entry: &EntryPoint) -> usize {
        if entry.ret.is_void() || entry.ret.is_pointer() {
            0
        } else {
            entry.ret.byte_size() as usize
        }
    }

    /// Copy a reply into the OUT/INOUT buffers of `args`, in parameter order,
    /// and return the return-value bytes (empty for void).
    pub fn apply_reply(&self, name: &str, args: &mut [Arg], reply: &[u8]) -> ReflectResult<Vec<u8>> {
        let (_, entry) = self.lookup(name, args)?;
        let mut cursor = 0usize;
        for (param, arg) in entry.params.iter().zip(args.iter_mut()) {
            if !param.pointer_attrs().is_some_and(|a| a.dir.receives_data()) {
                continue;
            }
            if let Arg::Pointer(Some(buf)) = arg {
                // A short reply fills what it covers and leaves the rest.
                let start = cursor.min(reply.len());
                let end = (cursor + buf.len()).min(reply.len());
                buf[..end - start].copy_from_slice(&reply[start..end]);
                cursor += buf.len();
            }
        }
        let start = cursor.min(reply.len());
        let end = (cursor + Self::return_size(entry)).min(reply.len());
        Ok(reply[start..end].to_vec())
    }
}
