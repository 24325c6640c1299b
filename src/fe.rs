//! Tensor-product Lagrange elements on the reference square $[-1, 1]^2$.

use crate::{
  form::{FormExpr, Integral, SourceTerm},
  mesh::CellGeometry,
  quadrature::QuadRule,
  FemError, FemResult,
};

/// 1d Lagrange basis on equispaced nodes over $[-1, 1]$.
pub struct LagrangeBasis1d {
  nodes: Vec<f64>,
}

impl LagrangeBasis1d {
  pub fn new(degree: usize) -> Self {
    assert!(degree >= 1);
    let nodes = (0..=degree)
      .map(|i| -1.0 + 2.0 * i as f64 / degree as f64)
      .collect();
    Self { nodes }
  }

  pub fn nnodes(&self) -> usize {
    self.nodes.len()
  }

  pub fn eval(&self, i: usize, x: f64) -> f64 {
    self
      .nodes
      .iter()
      .enumerate()
      .filter(|&(j, _)| j != i)
      .map(|(_, &xj)| (x - xj) / (self.nodes[i] - xj))
      .product()
  }

  pub fn deriv(&self, i: usize, x: f64) -> f64 {
    let xi = self.nodes[i];
    (0..self.nnodes())
      .filter(|&m| m != i)
      .map(|m| {
        let partial: f64 = (0..self.nnodes())
          .filter(|&j| j != i && j != m)
          .map(|j| (x - self.nodes[j]) / (xi - self.nodes[j]))
          .product();
        partial / (xi - self.nodes[m])
      })
      .sum()
  }
}

/// Scalar shape functions on the reference square, one per node of the
/// $(k+1) times (k+1)$ tensor grid, in row-major order.
pub struct TensorBasis {
  basis1d: LagrangeBasis1d,
}

impl TensorBasis {
  pub fn new(degree: usize) -> Self {
    Self {
      basis1d: LagrangeBasis1d::new(degree),
    }
  }

  pub fn ndofs(&self) -> usize {
    self.basis1d.nnodes() * self.basis1d.nnodes()
  }

  pub fn eval(&self, xi: [f64; 2]) -> na::DVector<f64> {
    let n1 = self.basis1d.nnodes();
    na::DVector::from_iterator(
      n1 * n1,
      (0..n1).flat_map(|j| {
        (0..n1).map(move |i| self.basis1d.eval(i, xi[0]) * self.basis1d.eval(j, xi[1]))
      }),
    )
  }

  /// Reference gradients as a 2 x ndofs matrix.
  pub fn grad(&self, xi: [f64; 2]) -> na::DMatrix<f64> {
    let n1 = self.basis1d.nnodes();
    let mut grad = na::DMatrix::zeros(2, n1 * n1);
    for j in 0..n1 {
      for i in 0..n1 {
        let a = j * n1 + i;
        grad[(0, a)] = self.basis1d.deriv(i, xi[0]) * self.basis1d.eval(j, xi[1]);
        grad[(1, a)] = self.basis1d.eval(i, xi[0]) * self.basis1d.deriv(j, xi[1]);
      }
    }
    grad
  }
}

pub type ElMat = na::DMatrix<f64>;
pub trait ElmatProvider: Sync {
  fn eval(&self, cell: &CellGeometry) -> ElMat;
}
impl<F> ElmatProvider for F
where
  F: Fn(&CellGeometry) -> ElMat + Sync,
{
  fn eval(&self, cell: &CellGeometry) -> ElMat {
    self(cell)
  }
}

pub type ElVec = na::DVector<f64>;
pub trait ElvecProvider: Sync {
  fn eval(&self, cell: &CellGeometry) -> ElVec;
}
impl<F> ElvecProvider for F
where
  F: Fn(&CellGeometry) -> ElVec + Sync,
{
  fn eval(&self, cell: &CellGeometry) -> ElVec {
    self(cell)
  }
}

/// Element matrix provider for the stiffness form $integral grad u dot grad v dx$.
///
/// Exact for axis-aligned cells: the integrand is polynomial of degree
/// $2k$ per axis and the rule uses $k + 1$ points per axis.
pub struct LaplacianElmat {
  basis: TensorBasis,
  rule: QuadRule,
}

impl LaplacianElmat {
  pub fn new(degree: usize) -> Self {
    Self {
      basis: TensorBasis::new(degree),
      rule: QuadRule::on_square(degree + 1),
    }
  }
}

impl ElmatProvider for LaplacianElmat {
  fn eval(&self, cell: &CellGeometry) -> ElMat {
    let ndofs = self.basis.ndofs();
    let widths = cell.widths();
    let detj = cell.vol() / 4.0;
    let scale_x = (2.0 / widths.x).powi(2);
    let scale_y = (2.0 / widths.y).powi(2);

    let mut elmat = na::DMatrix::zeros(ndofs, ndofs);
    for (weight, xi) in self.rule.iter() {
      let grad = self.basis.grad(xi);
      for a in 0..ndofs {
        for b in 0..ndofs {
          elmat[(a, b)] += weight
            * detj
            * (scale_x * grad[(0, a)] * grad[(0, b)] + scale_y * grad[(1, a)] * grad[(1, b)]);
        }
      }
    }
    elmat
  }
}

/// Element vector provider for the load form $integral f v dx$.
pub struct SourceElvec {
  basis: TensorBasis,
  rule: QuadRule,
  term: SourceTerm,
}

impl SourceElvec {
  pub fn new(degree: usize, term: SourceTerm) -> Self {
    Self {
      basis: TensorBasis::new(degree),
      // one extra point per axis over the stiffness rule, for varying sources
      rule: QuadRule::on_square(degree + 2),
      term,
    }
  }
}

impl ElvecProvider for SourceElvec {
  fn eval(&self, cell: &CellGeometry) -> ElVec {
    let ndofs = self.basis.ndofs();
    let detj = cell.vol() / 4.0;

    let mut elvec = na::DVector::zeros(ndofs);
    for (weight, xi) in self.rule.iter() {
      let pos = cell.map_reference(xi);
      let source = self.term.eval(pos.x, pos.y);
      let phi = self.basis.eval(xi);
      elvec.axpy(weight * detj * source, &phi, 1.0);
    }
    elvec
  }
}

/// Lowers a symbolic bilinear form onto an element matrix provider.
///
/// The only supported shape is the stiffness form
/// $integral grad u dot grad v dx$.
pub fn lower_bilinear(form: &Integral, degree: usize) -> FemResult<LaplacianElmat> {
  if let FormExpr::Dot(lhs, rhs) = form.integrand() {
    if let (FormExpr::Grad(a), FormExpr::Grad(b)) = (lhs.as_ref(), rhs.as_ref()) {
      if matches!(
        (a.as_ref(), b.as_ref()),
        (FormExpr::Trial, FormExpr::Test) | (FormExpr::Test, FormExpr::Trial)
      ) {
        return Ok(LaplacianElmat::new(degree));
      }
    }
  }
  Err(unsupported_form(form))
}

/// Lowers a symbolic linear form onto an element vector provider.
///
/// The only supported shape is the load form $integral f v dx$.
pub fn lower_linear(form: &Integral, degree: usize) -> FemResult<SourceElvec> {
  if let FormExpr::Mul(lhs, rhs) = form.integrand() {
    match (lhs.as_ref(), rhs.as_ref()) {
      (FormExpr::Source(term), FormExpr::Test) | (FormExpr::Test, FormExpr::Source(term)) => {
        return Ok(SourceElvec::new(degree, term.clone()));
      }
      _ => {}
    }
  }
  Err(unsupported_form(form))
}

fn unsupported_form(form: &Integral) -> FemError {
  FemError::InvalidConfiguration {
    reason: format!("unsupported weak form {:?}", form.integrand()),
  }
}

#[cfg(test)]
mod test {
  use super::{ElmatProvider, ElvecProvider, LagrangeBasis1d, LaplacianElmat, SourceElvec, TensorBasis};
  use crate::form::{integral, FormExpr, SourceTerm};
  use crate::mesh::QuadMesh;

  use approx::{assert_abs_diff_eq, assert_relative_eq};

  #[test]
  fn lagrange_nodes_are_interpolatory() {
    for degree in 1..=3 {
      let basis = LagrangeBasis1d::new(degree);
      for i in 0..basis.nnodes() {
        for j in 0..basis.nnodes() {
          let node = -1.0 + 2.0 * j as f64 / degree as f64;
          let expected = if i == j { 1.0 } else { 0.0 };
          assert_abs_diff_eq!(basis.eval(i, node), expected, epsilon = 1e-13);
        }
      }
    }
  }

  #[test]
  fn partition_of_unity() {
    for degree in 1..=3 {
      let basis = TensorBasis::new(degree);
      let phi = basis.eval([0.217, -0.56]);
      assert_relative_eq!(phi.sum(), 1.0, epsilon = 1e-12);

      let grad = basis.grad([0.217, -0.56]);
      assert_abs_diff_eq!(grad.row(0).sum(), 0.0, epsilon = 1e-12);
      assert_abs_diff_eq!(grad.row(1).sum(), 0.0, epsilon = 1e-12);
    }
  }

  #[test]
  fn bilinear_stiffness_matrix() {
    // independent of the cell size for square cells
    for ncells in [1, 2] {
      let mesh = QuadMesh::new_unit(ncells).unwrap();
      let computed = LaplacianElmat::new(1).eval(&mesh.cell_geometry(0));

      #[rustfmt::skip]
      let expected = na::dmatrix![
         4.0, -1.0, -1.0, -2.0;
        -1.0,  4.0, -2.0, -1.0;
        -1.0, -2.0,  4.0, -1.0;
        -2.0, -1.0, -1.0,  4.0;
      ] / 6.0;

      assert_relative_eq!(computed, expected, epsilon = 1e-13);
    }
  }

  #[test]
  fn stiffness_rows_sum_to_zero() {
    let min = na::Vector2::new(0.0, 0.0);
    let max = na::Vector2::new(3.0, 1.0);
    let mesh = QuadMesh::new_min_max(min, max, 3, 2).unwrap();
    for degree in 1..=3 {
      let elmat = LaplacianElmat::new(degree).eval(&mesh.cell_geometry(0));
      for irow in 0..elmat.nrows() {
        assert_abs_diff_eq!(elmat.row(irow).sum(), 0.0, epsilon = 1e-12);
      }
    }
  }

  #[test]
  fn constant_source_load_vector() {
    let mesh = QuadMesh::new_unit(2).unwrap();
    let elvec = SourceElvec::new(1, SourceTerm::Constant(1.0)).eval(&mesh.cell_geometry(0));
    // each bilinear shape function integrates to a quarter of the cell volume
    for a in 0..4 {
      assert_relative_eq!(elvec[a], 0.25 * 0.25, epsilon = 1e-13);
    }
  }

  #[test]
  fn lowering_rejects_unsupported_forms() {
    let mass = integral(FormExpr::trial().mul(FormExpr::test()));
    assert!(super::lower_bilinear(&mass, 1).is_err());

    let flipped = integral(FormExpr::trial().grad().dot(FormExpr::test()));
    assert!(super::lower_bilinear(&flipped, 1).is_err());

    let load = integral(FormExpr::constant(-6.0).mul(FormExpr::test()));
    assert!(super::lower_linear(&load, 1).is_ok());
    assert!(super::lower_linear(&integral(FormExpr::test()), 1).is_err());
  }
}
