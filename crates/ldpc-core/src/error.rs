use core::fmt;

use crate::side::Side;

#[derive(Debug, Clone, PartialEq)]
pub enum LdpcErr {
    /// Received word does not match the block length
    InvalidInput { expected: usize, found: usize },
    /// Received symbol is not a hard binary symbol
    InvalidSymbol { position: usize, value: u8 },
    UnknownNodeId { side: Side, id: u32 },
    /// Id lookup that is not restricted to one side
    UnknownNode { id: u32 },
    UnknownNodeName { side: Side, name: String },
    /// Name-based lookup matched more than one node
    AmbiguousName { side: Side, name: String, matches: usize },
    DuplicateNodeId { id: u32 },
    /// Every node id up to u32::MAX has been handed out
    NodeIdsExhausted,
    InvalidMatrix { reason: String },
    ShapeMismatch { what: &'static str, expected: usize, found: usize },
    InvalidChannel { reason: String },
    InvalidBitstr { offset: usize, found: char },
}

impl fmt::Display for LdpcErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LdpcErr::InvalidInput { expected, found } => {
                write!(f, "incorrect block size: expected {} symbols, got {}", expected, found)
            }
            LdpcErr::InvalidSymbol { position, value } => {
                write!(f, "invalid channel symbol {} at position {}, expected 0 or 1", value, position)
            }
            LdpcErr::UnknownNodeId { side, id } => write!(f, "no {} with uid {} in graph", side, id),
            LdpcErr::UnknownNode { id } => write!(f, "no node with uid {} in graph", id),
            LdpcErr::UnknownNodeName { side, name } => write!(f, "no {} with name {} in graph", side, name),
            LdpcErr::AmbiguousName { side, name, matches } => {
                write!(f, "{} name {} is ambiguous, matches {} nodes", side, name, matches)
            }
            LdpcErr::DuplicateNodeId { id } => write!(f, "node uid {} already present in graph", id),
            LdpcErr::NodeIdsExhausted => write!(f, "no node uids left to allocate"),
            LdpcErr::InvalidMatrix { reason } => write!(f, "invalid parity-check matrix: {}", reason),
            LdpcErr::ShapeMismatch { what, expected, found } => {
                write!(f, "shape mismatch in {}: expected {}, found {}", what, expected, found)
            }
            LdpcErr::InvalidChannel { reason } => write!(f, "invalid channel model: {}", reason),
            LdpcErr::InvalidBitstr { offset, found } => {
                write!(f, "invalid character `{}` at offset {}; only '0' or '1' allowed", found, offset)
            }
        }
    }
}

impl std::error::Error for LdpcErr {}

/// Checks whether a received word has the expected length. If not, returns LdpcErr::InvalidInput
#[macro_export]
macro_rules! expect_len {
    ($found:expr, $expected:expr) => {{
        let found = $found;
        let expected = $expected;
        if found == expected {
            Ok(())
        } else {
            Err($crate::LdpcErr::InvalidInput { expected, found })
        }
    }};
}

/// Checks whether two dimensions agree. If not, returns LdpcErr::ShapeMismatch
#[macro_export]
macro_rules! expect_shape {
    ($found:expr, $expected:expr, $what:expr) => {{
        let found = $found;
        let expected = $expected;
        if found == expected {
            Ok(())
        } else {
            Err($crate::LdpcErr::ShapeMismatch { what: $what, expected, found })
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_len() {
        assert_eq!(expect_len!(10usize, 10usize), Ok(()));
        assert_eq!(
            expect_len!(9usize, 10usize),
            Err(LdpcErr::InvalidInput { expected: 10, found: 9 })
        );
    }

    #[test]
    fn test_display() {
        let e = LdpcErr::UnknownNodeName { side: Side::Check, name: "c7".to_string() };
        assert_eq!(e.to_string(), "no c-node with name c7 in graph");
    }
}
