use core::fmt;

use serde::{Deserialize, Serialize};

/// Which half of the bipartite Tanner graph a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// One per code bit (matrix column)
    Variable,
    /// One per parity constraint (matrix row)
    Check,
}

impl Side {
    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self, Side::Variable)
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        matches!(self, Side::Check)
    }

    /// Default name prefix used when nodes are created from a matrix
    #[inline]
    pub fn name_prefix(&self) -> &'static str {
        match self {
            Side::Variable => "v",
            Side::Check => "c",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Variable => write!(f, "v-node"),
            Side::Check => write!(f, "c-node"),
        }
    }
}
