//! Hand-verified global stiffness matrices on small structured meshes.

extern crate nalgebra_sparse as nas;

use poissoniq::{
  assemble::assemble_galmat,
  fe::LaplacianElmat,
  mesh::QuadMesh,
  space::{ElementFamily, FeSpace},
};

use approx::assert_abs_diff_eq;
use std::sync::Arc;

/// An interior row of the assembled bilinear stiffness matrix is the
/// 9-point stencil with center 8/3 and -1/3 on all eight neighbors,
/// independent of the mesh width.
#[test]
fn interior_stencil_of_bilinear_laplacian() {
  for n in [3, 5] {
    let mesh = Arc::new(QuadMesh::new_unit(n).unwrap());
    let space = FeSpace::new(Arc::clone(&mesh), ElementFamily::Lagrange, 1).unwrap();
    let galmat = assemble_galmat(&space, &LaplacianElmat::new(1));
    let dense = nas::convert::serial::convert_coo_dense(&galmat);

    let ndofs_x = n + 1;
    let center = ndofs_x + 1;
    for idof in 0..space.ndofs() {
      let dx = (idof % ndofs_x) as isize - 1;
      let dy = (idof / ndofs_x) as isize - 1;
      let expected = match (dx.abs(), dy.abs()) {
        (0, 0) => 8.0 / 3.0,
        (0, 1) | (1, 0) | (1, 1) => -1.0 / 3.0,
        _ => 0.0,
      };
      assert_abs_diff_eq!(dense[(center, idof)], expected, epsilon = 1e-13);
    }
  }
}

#[test]
fn galmat_is_symmetric() {
  for degree in 1..=3 {
    let mesh = Arc::new(QuadMesh::new_unit(3).unwrap());
    let space = FeSpace::new(mesh, ElementFamily::Lagrange, degree).unwrap();
    let galmat = assemble_galmat(&space, &LaplacianElmat::new(degree));
    let dense = nas::convert::serial::convert_coo_dense(&galmat);
    assert!((&dense - dense.transpose()).norm() < 1e-12);
  }
}
