//! Sample unpacking and mapping to the 8-bit output range

use crate::dicom::PixelDescriptor;

/// Read every sample of `frame`, masked to bits stored and sign-extended
/// for two's complement pixel representation.
///
/// Pixel data is normalized to little-endian by the parser.
#[must_use]
pub fn unpack_samples(frame: &[u8], descriptor: &PixelDescriptor) -> Vec<i32> {
    let mask = descriptor.bit_depth.stored_mask();
    let stored = descriptor.bit_depth.stored;
    let signed = descriptor.signed;

    let convert = move |raw: u32| {
        let value = raw & mask;
        if signed { sign_extend(value, stored) } else { value as i32 }
    };

    match descriptor.bit_depth.bytes_per_sample() {
        1 => frame.iter().map(|&b| convert(u32::from(b))).collect(),
        _ => frame
            .chunks_exact(2)
            .map(|chunk| convert(u32::from(u16::from_le_bytes([chunk[0], chunk[1]]))))
            .collect(),
    }
}

#[inline]
fn sign_extend(value: u32, bits: u16) -> i32 {
    if bits == 0 || bits >= 32 {
        return value as i32;
    }
    let shift = 32 - u32::from(bits);
    ((value << shift) as i32) >> shift
}

#[inline]
#[must_use]
pub fn find_min_max(values: &[i32]) -> Option<(i32, i32)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Linear stretch of `[min, max]` onto `0..=255`, truncating.
/// A constant input maps to 0.
#[must_use]
pub fn stretch_to_u8(values: &[i32]) -> Vec<u8> {
    let Some((min, max)) = find_min_max(values) else {
        return Vec::new();
    };
    let range = i64::from(max) - i64::from(min);
    if range == 0 {
        return vec![0; values.len()];
    }

    values
        .iter()
        .map(|&v| ((i64::from(v) - i64::from(min)) * 255 / range) as u8)
        .collect()
}

/// Map unpacked samples to 8 bits: 8-bit data passes through (signed data
/// offset by 128), wider data is stretched over the range present.
#[must_use]
pub fn samples_to_u8(values: &[i32], descriptor: &PixelDescriptor) -> Vec<u8> {
    if descriptor.bits_allocated() == 8 {
        let offset = if descriptor.signed { 128 } else { 0 };
        values.iter().map(|&v| (v + offset).clamp(0, 255) as u8).collect()
    } else {
        stretch_to_u8(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x0FFF, 12), -1);
        assert_eq!(sign_extend(0x0800, 12), -2048);
        assert_eq!(sign_extend(0x07FF, 12), 2047);
        assert_eq!(sign_extend(0x80, 8), -128);
    }

    #[test]
    fn test_stretch() {
        assert_eq!(stretch_to_u8(&[0, 2048, 4095]), vec![0, 127, 255]);
        assert_eq!(stretch_to_u8(&[-100, 0, 100]), vec![0, 127, 255]);
        assert_eq!(stretch_to_u8(&[7, 7, 7]), vec![0, 0, 0]);
        assert!(stretch_to_u8(&[]).is_empty());
    }

    #[test]
    fn test_min_max() {
        assert_eq!(find_min_max(&[3, -2, 9]), Some((-2, 9)));
        assert_eq!(find_min_max(&[]), None);
    }
}
