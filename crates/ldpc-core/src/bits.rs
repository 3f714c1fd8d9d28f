//! Conversion between '0'/'1' strings and bit vectors (one bit per byte)

use crate::LdpcErr;

/// Parse a bitstring such as "1100100001" into one byte per bit.
/// Spaces and underscores are accepted as group separators and skipped.
pub fn parse_bitstr(bitstr: &str) -> Result<Vec<u8>, LdpcErr> {
    let mut bits = Vec::with_capacity(bitstr.len());
    for (i, c) in bitstr.chars().enumerate() {
        match c {
            '0' => bits.push(0),
            '1' => bits.push(1),
            ' ' | '_' => {}
            other => return Err(LdpcErr::InvalidBitstr { offset: i, found: other }),
        }
    }
    Ok(bits)
}

/// Dump a bit vector as a string of '0'/'1'. Any nonzero byte prints as '1'.
pub fn to_bitstr(bits: &[u8]) -> String {
    bits.iter().map(|&b| if b != 0 { '1' } else { '0' }).collect()
}

/// Number of nonzero entries, i.e. the Hamming weight of a syndrome or error pattern
#[inline]
pub fn weight(bits: &[u8]) -> usize {
    bits.iter().filter(|&&b| b != 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bitstr() {
        assert_eq!(parse_bitstr("1100_1").unwrap(), vec![1, 1, 0, 0, 1]);
        assert_eq!(parse_bitstr("").unwrap(), Vec::<u8>::new());
        assert!(parse_bitstr("10x1").is_err());
    }

    #[test]
    fn test_to_bitstr() {
        assert_eq!(to_bitstr(&[1, 0, 0, 1, 1]), "10011");
        assert_eq!(weight(&[1, 0, 0, 1, 1]), 3);
    }
}
