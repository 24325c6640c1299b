//! Adaptors between nalgebra-sparse storage and the faer solver backend.

use crate::{FemError, FemResult};

use faer::linalg::solvers::Solve;

use std::mem;

pub trait CooMatrixExt {
  fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(usize, usize) -> bool;
}

impl CooMatrixExt for nas::CooMatrix<f64> {
  fn set_zero<F>(&mut self, predicate: F)
  where
    F: Fn(usize, usize) -> bool,
  {
    let nrows = self.nrows();
    let ncols = self.ncols();
    let (mut rows, mut cols, mut vals) = mem::replace(self, Self::new(0, 0)).disassemble();
    let mut i = 0;
    while i < rows.len() {
      if predicate(rows[i], cols[i]) {
        rows.swap_remove(i);
        cols.swap_remove(i);
        vals.swap_remove(i);
      } else {
        i += 1;
      }
    }
    *self = Self::try_from_triplets(nrows, ncols, rows, cols, vals).unwrap()
  }
}

type SparseMatrixFaer = faer::sparse::SparseRowMat<usize, f64>;

pub fn nalgebra2faer(m: nas::CsrMatrix<f64>) -> SparseMatrixFaer {
  let nrows = m.nrows();
  let ncols = m.ncols();
  let (row_offsets, col_indices, values) = m.disassemble();

  let symbolic =
    faer::sparse::SymbolicSparseRowMat::new_checked(nrows, ncols, row_offsets, None, col_indices);
  faer::sparse::SparseRowMat::new(symbolic, values)
}

/// Sparse Cholesky factorization; factorize once, back-substitute per solve.
pub struct FaerCholesky {
  raw: faer::sparse::linalg::solvers::Llt<usize, f64>,
}

impl FaerCholesky {
  pub fn new(a: nas::CsrMatrix<f64>) -> FemResult<Self> {
    let raw = nalgebra2faer(a)
      .sp_cholesky(faer::Side::Upper)
      .map_err(|e| FemError::LinearSolve {
        reason: format!("cholesky factorization failed: {e:?}"),
      })?;
    Ok(Self { raw })
  }

  pub fn solve(&self, b: &na::DVector<f64>) -> na::DVector<f64> {
    let b = faer::Col::from_fn(b.nrows(), |i| b[i]);
    let x = self.raw.solve(b);
    na::DVector::from_iterator(x.nrows(), x.iter().copied())
  }
}
