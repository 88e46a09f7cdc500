//! Bit-field packer.
//!
//! Packs an arbitrary list of `(bit_width, value)` pairs MSB-first into a
//! single integer, then into the minimum number of bytes. Grounded on
//! `examples/original_source/bitfun.py::bit_packer`/`bit_unpacker`, which
//! backs the format byte of the (out-of-scope) dm-crypt table packer.

/// One field in a bit-packed record: its width in bits and its value.
///
/// `value` must fit in `bits` bits; no negative numbers are supported.
#[derive(Debug, Clone, Copy)]
pub struct BitField {
    pub bits: u32,
    pub value: u64,
}

impl BitField {
    pub fn new(bits: u32, value: u64) -> Self {
        Self { bits, value }
    }
}

/// Packs fields MSB-first into bytes, padding the front of the final byte
/// with zero bits if the total bit width is not a multiple of 8.
pub fn bit_packer(fields: &[BitField]) -> Result<Vec<u8>, String> {
    let mut bitstring = String::new();
    for field in fields {
        if field.bits == 0 || field.bits > 63 {
            return Err(format!("invalid bit width {}", field.bits));
        }
        if field.value >= (1u64 << field.bits) {
            return Err(format!("not enough bits allocated for {}", field.value));
        }
        bitstring.push_str(&format!("{:0width$b}", field.value, width = field.bits as usize));
    }
    let total_bits = bitstring.len();
    let pad = (8 - total_bits % 8) % 8;
    let padded: String = "0".repeat(pad) + &bitstring;

    let mut out = Vec::with_capacity(padded.len() / 8);
    for chunk in padded.as_bytes().chunks(8) {
        let byte_str = std::str::from_utf8(chunk).unwrap();
        out.push(u8::from_str_radix(byte_str, 2).unwrap());
    }
    Ok(out)
}

/// Unpacks a byte buffer into fields of the given bit widths, in order.
pub fn bit_unpacker(data: &[u8], widths: &[u32]) -> Result<Vec<u64>, String> {
    let mut bitstring = String::with_capacity(data.len() * 8);
    for &b in data {
        bitstring.push_str(&format!("{b:08b}"));
    }
    let needed: u32 = widths.iter().sum();
    if (needed as usize) > bitstring.len() {
        return Err("not enough bits in data to unpack".to_owned());
    }
    // Fields are packed MSB-first at the tail of the bitstring.
    let start_pad = bitstring.len() - needed as usize;
    let bitstring = &bitstring[start_pad..];

    let mut out = Vec::with_capacity(widths.len());
    let mut ptr = 0usize;
    for &w in widths {
        let slice = &bitstring[ptr..ptr + w as usize];
        out.push(u64::from_str_radix(slice, 2).unwrap());
        ptr += w as usize;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_two_fields() {
        let fields = [BitField::new(3, 5), BitField::new(5, 17)];
        let packed = bit_packer(&fields).unwrap();
        let unpacked = bit_unpacker(&packed, &[3, 5]).unwrap();
        assert_eq!(unpacked, vec![5, 17]);
    }

    #[test]
    fn rejects_overflowing_value() {
        let fields = [BitField::new(2, 4)];
        assert!(bit_packer(&fields).is_err());
    }

    #[test]
    fn single_byte_format_field() {
        // 3 bits format + 5 bits partition number, matching the dm-crypt
        // format byte layout in bitfun.py::make_format_byte.
        let fields = [BitField::new(3, 2), BitField::new(5, 9)];
        let packed = bit_packer(&fields).unwrap();
        assert_eq!(packed.len(), 1);
        let unpacked = bit_unpacker(&packed, &[3, 5]).unwrap();
        assert_eq!(unpacked, vec![2, 9]);
    }
}
