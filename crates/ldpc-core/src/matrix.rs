use core::fmt;

use crate::{LdpcErr, bits, expect_len};

/// Dense binary parity-check matrix H of shape M x N.
/// Row j is the constraint of check node j, column i is code bit i.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityCheckMatrix {
    rows: usize,
    cols: usize,
    /// Row-major, one byte per entry, every entry 0 or 1
    data: Vec<u8>,
}

impl ParityCheckMatrix {
    /// All-zero matrix of the given shape
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0; rows * cols] }
    }

    /// Build from a list of rows. All rows must have the same nonzero length
    /// and contain only 0 and 1.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, LdpcErr> {
        let Some(first) = rows.first() else {
            return Err(LdpcErr::InvalidMatrix { reason: "matrix has no rows".to_string() });
        };
        let cols = first.as_ref().len();
        if cols == 0 {
            return Err(LdpcErr::InvalidMatrix { reason: "matrix has no columns".to_string() });
        }

        let mut data = Vec::with_capacity(rows.len() * cols);
        for (j, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(LdpcErr::InvalidMatrix {
                    reason: format!("row {} has {} entries, expected {}", j, row.len(), cols),
                });
            }
            if let Some(i) = row.iter().position(|&v| v > 1) {
                return Err(LdpcErr::InvalidMatrix {
                    reason: format!("entry ({}, {}) is {}, only 0 or 1 allowed", j, i, row[i]),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self { rows: rows.len(), cols, data })
    }

    /// Build from one '0'/'1' string per row
    pub fn from_bitstrs<S: AsRef<str>>(rows: &[S]) -> Result<Self, LdpcErr> {
        let parsed = rows
            .iter()
            .map(|r| bits::parse_bitstr(r.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(&parsed)
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// Entry at (row, col). Panics when out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of range", row, col);
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, bit: bool) {
        assert!(row < self.rows && col < self.cols, "index ({}, {}) out of range", row, col);
        self.data[row * self.cols + col] = bit as u8;
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Positions (row, col) of all 1-entries, row by row
    pub fn iter_ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 1)
            .map(move |(k, _)| (k / self.cols, k % self.cols))
    }

    /// Number of 1-entries, which equals the number of Tanner graph edges
    pub fn num_ones(&self) -> usize {
        bits::weight(&self.data)
    }

    /// (H . word) mod 2. Any nonzero byte in `word` counts as a 1.
    pub fn syndrome(&self, word: &[u8]) -> Result<Vec<u8>, LdpcErr> {
        expect_len!(word.len(), self.cols)?;
        let syndrome = (0..self.rows)
            .map(|j| {
                self.row(j)
                    .iter()
                    .zip(word)
                    .fold(0u8, |acc, (&h, &w)| acc ^ (h & (w != 0) as u8))
            })
            .collect();
        Ok(syndrome)
    }

    /// True if `word` satisfies every parity constraint
    pub fn is_codeword(&self, word: &[u8]) -> Result<bool, LdpcErr> {
        Ok(self.syndrome(word)?.iter().all(|&s| s == 0))
    }
}

impl fmt::Display for ParityCheckMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for j in 0..self.rows {
            writeln!(f, "{}", bits::to_bitstr(self.row(j)))?;
        }
        Ok(())
    }
}
