/* printf-style rendering of decoded values */

use crate::value::{ArgValue, DecodedArg};

fn le_unsigned(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

fn le_signed(bytes: &[u8]) -> i64 {
    let width = bytes.len().min(8);
    if width == 0 {
        return 0;
    }
    let raw = le_unsigned(bytes);
    let shift = 64 - 8 * width as u32;
    ((raw << shift) as i64) >> shift
}

/// Render raw little-endian `bytes` the way `printf(format, value)` would
/// for the conversions type files use. Unknown conversions fall back to hex.
pub fn format_scalar(bytes: &[u8], format: &str) -> String {
    let conversion = format.trim_start_matches('%').trim_start_matches(&['l', 'h', 'z', 'j'][..]);
    match conversion {
        "d" | "i" => le_signed(bytes).to_string(),
        "u" => le_unsigned(bytes).to_string(),
        "x" => format!("{:x}", le_unsigned(bytes)),
        "X" => format!("{:X}", le_unsigned(bytes)),
        "p" => format!("0x{:x}", le_unsigned(bytes)),
        "c" => char::from(bytes.first().copied().unwrap_or(0)).to_string(),
        "f" | "g" | "e" => match bytes.len() {
            4 => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(bytes);
                format!("{:.6}", f32::from_le_bytes(raw))
            }
            8 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(bytes);
                format!("{:.6}", f64::from_le_bytes(raw))
            }
            _ => format!("0x{:x}", le_unsigned(bytes)),
        },
        _ => format!("0x{:x}", le_unsigned(bytes)),
    }
}

/// `name(v1 v2 @off(len))`: scalars formatted, pointers as packet offset
/// and length.
pub fn format_trace(entry: &str, args: &[DecodedArg]) -> String {
    let parts: Vec<String> = args
        .iter()
        .map(|arg| match &arg.value {
            ArgValue::Scalar { formatted, .. } => formatted.clone(),
            ArgValue::Pointer { data: None, .. } => "NULL(0)".to_string(),
            ArgValue::Pointer { length, .. } => format!("@{}({})", arg.offset, length),
        })
        .collect();
    format!("{}({})", entry, parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_values_sign_extend() {
        assert_eq!(format_scalar(&(-3i32).to_le_bytes(), "%d"), "-3");
        assert_eq!(format_scalar(&[0xff], "%d"), "-1");
        assert_eq!(format_scalar(&[0xff], "%u"), "255");
    }

    #[test]
    fn length_modifiers_are_ignored() {
        assert_eq!(format_scalar(&7u64.to_le_bytes(), "%llu"), "7");
        assert_eq!(format_scalar(&9u64.to_le_bytes(), "%zu"), "9");
    }

    #[test]
    fn floats_use_six_decimals() {
        assert_eq!(format_scalar(&1.5f32.to_le_bytes(), "%f"), "1.500000");
    }
}
