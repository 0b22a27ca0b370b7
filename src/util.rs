//! Byte order utilities and other private helpers.
use byteordered::Endianness;
use std::path::Path;

/// Obtain the byte order of the running system.
///
/// This is reported as metadata only: whether a file needs swapping is
/// decided from the file contents, see [`needs_swap`].
///
/// [`needs_swap`]: ./fn.needs_swap.html
pub fn host_byte_order() -> Endianness {
    Endianness::native()
}

/// Reverse the byte order of `count` contiguous groups of `element_size`
/// bytes each, in place.
///
/// Groups that would extend past the end of `buffer` are left untouched.
/// Element sizes of 0 or 1 are no-ops.
pub fn swap_bytes(count: usize, element_size: usize, buffer: &mut [u8]) {
    if element_size < 2 {
        return;
    }
    for group in buffer.chunks_exact_mut(element_size).take(count) {
        group.reverse();
    }
}

/// Whether a header whose `dim[0]`, read in host byte order, equals
/// `raw_rank` was written with the opposite byte order.
///
/// A valid rank is within 1 and 7, so a byte-swapped one is either negative
/// or larger than 7.
pub fn needs_swap(raw_rank: i16) -> bool {
    raw_rank < 0 || raw_rank > 7
}

/// The byte order in which a file was written, given whether its header
/// needed swapping.
pub fn file_byte_order(swapped: bool) -> Endianness {
    if swapped {
        host_byte_order().to_opposite()
    } else {
        host_byte_order()
    }
}

/// The lowercase extension of a file name, if any.
pub fn lowercase_extension<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

/// Narrow an IEEE 754 binary128 value, given as its 16 bytes in host order,
/// to the nearest `f64` by truncating the significand.
///
/// Magnitudes beyond the `f64` range become infinite, those below it
/// become (signed) zero. NaN payloads are not preserved.
pub fn f128_bytes_to_f64(bytes: [u8; 16]) -> f64 {
    let bits = u128::from_ne_bytes(bytes);
    let sign = ((bits >> 127) as u64) << 63;
    let exponent = ((bits >> 112) & 0x7FFF) as i32;
    let mantissa = bits & ((1u128 << 112) - 1);

    if exponent == 0x7FFF {
        if mantissa == 0 {
            return f64::from_bits(sign | 0x7FF0_0000_0000_0000);
        }
        return f64::NAN;
    }
    if exponent == 0 {
        // binary128 subnormals are far below the smallest f64
        return f64::from_bits(sign);
    }

    let unbiased = exponent - 16383;
    if unbiased > 1023 {
        return f64::from_bits(sign | 0x7FF0_0000_0000_0000);
    }
    if unbiased < -1074 {
        return f64::from_bits(sign);
    }
    if unbiased < -1022 {
        // subnormal in f64: shift the implicit bit into the fraction
        let full = (1u128 << 112) | mantissa;
        let shift = 112 - 52 + (-1022 - unbiased) as u32;
        let fraction = (full >> shift) as u64;
        return f64::from_bits(sign | fraction);
    }
    let fraction = (mantissa >> (112 - 52)) as u64;
    let biased = (unbiased + 1023) as u64;
    f64::from_bits(sign | (biased << 52) | fraction)
}
