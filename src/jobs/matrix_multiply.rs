//! Matrix product `A x B` over CSV cells `matrix,row,col,value`.
//!
//! One reducer per output cell. With `A` of size M x N and `B` of size N x P:
//! - `A[i][j]` is sent to every result cell `(i, k)`, `k in 0..P`;
//! - `B[j][k]` is sent to every result cell `(i, k)`, `i in 0..M`.
//! The reducer for `(i, k)` sums `A[i][j] * B[j][k]` over the `j` present in both.
//! Missing cells are zero, so sparse inputs work.

use crate::emit::{Collector, Emitter};
use crate::engine::{Mapper, Reducer};
use crate::error::JobError;
use crate::record::RawRecord;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Matrix {
    A,
    B,
}

/// One input cell, forwarded unchanged to every reducer that needs it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub matrix: Matrix,
    pub row: usize,
    pub col: usize,
    pub value: i64,
}

impl Cell {
    pub fn parse(record: &RawRecord) -> Result<Self> {
        let matrix = match record.field(0)?.trim() {
            "A" | "a" => Matrix::A,
            "B" | "b" => Matrix::B,
            other => bail!("unknown matrix name {other:?} (expected A or B)"),
        };
        let row = parse_field(record, 1, "row")?;
        let col = parse_field(record, 2, "column")?;
        let value = parse_field(record, 3, "value")?;
        Ok(Self { matrix, row, col, value })
    }
}

fn parse_field<T>(record: &RawRecord, idx: usize, what: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = record.field(idx)?.trim();
    raw.parse::<T>().with_context(|| format!("{what} {raw:?} is not a number"))
}

/// Dimensions of the result: rows of `A` and columns of `B`.
#[derive(Clone, Copy, Debug)]
pub struct MatrixMultiply {
    rows_a: usize,
    cols_b: usize,
}

impl MatrixMultiply {
    pub fn new(rows_a: usize, cols_b: usize) -> Self {
        Self { rows_a, cols_b }
    }
}

impl Mapper<(usize, usize), Cell> for MatrixMultiply {
    fn map(&self, _source_id: &str, record: RawRecord, out: &mut Emitter<(usize, usize), Cell>) -> Result<()> {
        let cell = Cell::parse(&record)?;
        match cell.matrix {
            Matrix::A => {
                if cell.row >= self.rows_a {
                    return Err(JobError::configuration(format!(
                        "A[{}][{}] lies outside the declared {} rows of A",
                        cell.row, cell.col, self.rows_a
                    ))
                    .into());
                }
                for k in 0..self.cols_b {
                    out.emit_intermediate((cell.row, k), cell);
                }
            }
            Matrix::B => {
                if cell.col >= self.cols_b {
                    return Err(JobError::configuration(format!(
                        "B[{}][{}] lies outside the declared {} columns of B",
                        cell.row, cell.col, self.cols_b
                    ))
                    .into());
                }
                for i in 0..self.rows_a {
                    out.emit_intermediate((i, cell.col), cell);
                }
            }
        }
        Ok(())
    }
}

impl Reducer<(usize, usize), Cell, (usize, usize, i64)> for MatrixMultiply {
    fn reduce(&self, key: &(usize, usize), values: Vec<Cell>, out: &mut Collector<(usize, usize, i64)>) -> Result<()> {
        // A cells keyed by their column, B cells by their row: both are the shared index j.
        let mut a_by_j: BTreeMap<usize, i64> = BTreeMap::new();
        let mut b_by_j: BTreeMap<usize, i64> = BTreeMap::new();
        for cell in values {
            match cell.matrix {
                Matrix::A => a_by_j.insert(cell.col, cell.value),
                Matrix::B => b_by_j.insert(cell.row, cell.value),
            };
        }
        let (i, k) = *key;
        let mut total: i64 = 0;
        for (j, a) in &a_by_j {
            let Some(b) = b_by_j.get(j) else { continue };
            total = a
                .checked_mul(*b)
                .and_then(|product| total.checked_add(product))
                .with_context(|| format!("product overflows i64 at cell ({i},{k})"))?;
        }
        out.emit((i, k, total));
        Ok(())
    }
}
