//! Assembly of the Galerkin matrix and vector, plus constraint application.

use crate::{
  bc::DirichletBc,
  fe::{ElmatProvider, ElvecProvider},
  linalg::CooMatrixExt,
  space::FeSpace,
};

use itertools::Itertools;
use rayon::prelude::*;

pub type GalMat = nas::CooMatrix<f64>;
pub type GalVec = na::DVector<f64>;

/// Assembly algorithm for the Galerkin matrix.
pub fn assemble_galmat(space: &FeSpace, elmat: &impl ElmatProvider) -> GalMat {
  let ndofs = space.ndofs();
  let mesh = space.mesh();

  let triplets: Vec<(usize, usize, f64)> = (0..mesh.ncells())
    .into_par_iter()
    .flat_map(|icell| {
      let geo = mesh.cell_geometry(icell);
      let elmat = elmat.eval(&geo);
      let dofs = space.local2global(icell);

      let mut local_triplets = Vec::new();
      for (ilocal, &iglobal) in dofs.iter().enumerate() {
        for (jlocal, &jglobal) in dofs.iter().enumerate() {
          let val = elmat[(ilocal, jlocal)];
          if val != 0.0 {
            local_triplets.push((iglobal, jglobal, val));
          }
        }
      }
      local_triplets
    })
    .collect();

  let (rows, cols, values) = triplets.into_iter().multiunzip();
  GalMat::try_from_triplets(ndofs, ndofs, rows, cols, values).unwrap()
}

/// Assembly algorithm for the Galerkin vector.
pub fn assemble_galvec(space: &FeSpace, elvec: &impl ElvecProvider) -> GalVec {
  let ndofs = space.ndofs();
  let mesh = space.mesh();

  let entries: Vec<(usize, f64)> = (0..mesh.ncells())
    .into_par_iter()
    .flat_map(|icell| {
      let geo = mesh.cell_geometry(icell);
      let elvec = elvec.eval(&geo);
      let dofs = space.local2global(icell);

      let mut local_entries = Vec::new();
      for (ilocal, &iglobal) in dofs.iter().enumerate() {
        if elvec[ilocal] != 0.0 {
          local_entries.push((iglobal, elvec[ilocal]));
        }
      }
      local_entries
    })
    .collect();

  let mut galvec = na::DVector::zeros(ndofs);
  for (irow, val) in entries {
    galvec[irow] += val;
  }
  galvec
}

/// Applies a Dirichlet constraint by symmetric elimination with lifting.
///
/// Modifies the matrix and vector such that the solution attains the
/// prescribed coefficients on the constrained dofs:
/// $mat(A_0, 0; 0, I) vec(mu_0, mu_diff) = vec(phi - A_(0 diff) gamma, gamma)$
///
/// Symmetry is preserved, so an SPD system stays SPD.
pub fn apply_dirichlet_bc(bc: &DirichletBc, galmat: &mut GalMat, galvec: &mut GalVec) {
  let ndofs = galmat.nrows();

  let mut constrained = vec![false; ndofs];
  let mut prescribed = na::DVector::zeros(ndofs);
  for (idof, value) in bc.dof_values() {
    constrained[idof] = true;
    prescribed[idof] = value;
  }

  // Move the constrained columns to the right-hand side.
  let galmat_csr = nas::CsrMatrix::from(&*galmat);
  *galvec -= galmat_csr * prescribed;
  for (idof, value) in bc.dof_values() {
    galvec[idof] = value;
  }

  galmat.set_zero(|r, c| constrained[r] || constrained[c]);
  for (idof, _) in bc.dof_values() {
    galmat.push(idof, idof, 1.0);
  }
}

#[cfg(test)]
mod test {
  use super::{assemble_galmat, assemble_galvec, apply_dirichlet_bc};
  use crate::bc::DirichletBc;
  use crate::fe::{LaplacianElmat, SourceElvec};
  use crate::form::SourceTerm;
  use crate::mesh::QuadMesh;
  use crate::space::{ElementFamily, FeSpace};

  use approx::{assert_abs_diff_eq, assert_relative_eq};
  use std::sync::Arc;

  #[test]
  fn galvec_of_constant_source_sums_to_domain_integral() {
    let mesh = Arc::new(QuadMesh::new_unit(4).unwrap());
    let space = FeSpace::new(mesh, ElementFamily::Lagrange, 1).unwrap();
    let galvec = assemble_galvec(&space, &SourceElvec::new(1, SourceTerm::Constant(-6.0)));
    assert_relative_eq!(galvec.sum(), -6.0, epsilon = 1e-12);
  }

  #[test]
  fn galmat_annihilates_constants() {
    let mesh = Arc::new(QuadMesh::new_unit(3).unwrap());
    let space = FeSpace::new(mesh, ElementFamily::Lagrange, 2).unwrap();
    let galmat = assemble_galmat(&space, &LaplacianElmat::new(2));
    let csr = nas::CsrMatrix::from(&galmat);
    let ones = na::DVector::from_element(space.ndofs(), 1.0);
    let image = csr * ones;
    assert_abs_diff_eq!(image.norm(), 0.0, epsilon = 1e-11);
  }

  #[test]
  fn dirichlet_rows_become_identity() {
    let mesh = Arc::new(QuadMesh::new_unit(2).unwrap());
    let space = FeSpace::new(mesh, ElementFamily::Lagrange, 1).unwrap();
    let boundary_fn = space.interpolate(|x, y| x + y);
    let bc = DirichletBc::assemble(&space, &boundary_fn).unwrap();

    let mut galmat = assemble_galmat(&space, &LaplacianElmat::new(1));
    let mut galvec = assemble_galvec(&space, &SourceElvec::new(1, SourceTerm::Constant(0.0)));
    apply_dirichlet_bc(&bc, &mut galmat, &mut galvec);

    let dense = nas::convert::serial::convert_coo_dense(&galmat);
    for (idof, value) in bc.dof_values() {
      assert_eq!(galvec[idof], value);
      for jdof in 0..space.ndofs() {
        let expected = if jdof == idof { 1.0 } else { 0.0 };
        assert_abs_diff_eq!(dense[(idof, jdof)], expected, epsilon = 1e-13);
        assert_abs_diff_eq!(dense[(jdof, idof)], expected, epsilon = 1e-13);
      }
    }
  }
}
