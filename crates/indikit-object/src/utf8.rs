//! Code point to UTF-8 encoding for the JSON string decoder.

/// Appends the UTF-8 encoding of `cp` to `out`.
///
/// Each code point is encoded independently. In particular a UTF-16
/// surrogate half coming from a `\uXXXX` escape is encoded as its own
/// three-byte sequence, never combined with a following escape into a
/// supplementary-plane character. The caller is responsible for
/// validating the accumulated bytes.
pub(crate) fn encode_code_point(cp: u32, out: &mut Vec<u8>) {
    if cp <= 0x7f {
        out.push(cp as u8);
    } else if cp <= 0x7ff {
        out.push(0xc0 | (cp >> 6) as u8);
        out.push(0x80 | (cp & 0x3f) as u8);
    } else if cp <= 0xffff {
        out.push(0xe0 | (cp >> 12) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3f) as u8);
        out.push(0x80 | (cp & 0x3f) as u8);
    } else {
        out.push(0xf0 | (cp >> 18) as u8);
        out.push(0x80 | ((cp >> 12) & 0x3f) as u8);
        out.push(0x80 | ((cp >> 6) & 0x3f) as u8);
        out.push(0x80 | (cp & 0x3f) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(cp: u32) -> Vec<u8> {
        let mut out = Vec::new();
        encode_code_point(cp, &mut out);
        out
    }

    #[test]
    fn ascii_is_one_byte() {
        assert_eq!(encode(0x41), b"A");
    }

    #[test]
    fn two_byte_boundaries() {
        assert_eq!(encode(0x80), vec![0xc2, 0x80]);
        assert_eq!(encode(0x7ff), vec![0xdf, 0xbf]);
    }

    #[test]
    fn three_byte_boundaries() {
        assert_eq!(encode(0x800), vec![0xe0, 0xa0, 0x80]);
        assert_eq!(encode(0xffff), vec![0xef, 0xbf, 0xbf]);
    }

    #[test]
    fn four_byte_form() {
        assert_eq!(encode(0x1f600), vec![0xf0, 0x9f, 0x98, 0x80]);
    }

    #[test]
    fn surrogate_half_encodes_alone() {
        // Not valid UTF-8; the decoder rejects it after accumulation.
        assert_eq!(encode(0xd83d), vec![0xed, 0xa0, 0xbd]);
    }
}
