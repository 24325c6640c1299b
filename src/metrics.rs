//! Error metrics between a computed solution and the exact solution.

use crate::{
  comm::{Collective, Partition},
  fe::TensorBasis,
  quadrature::QuadRule,
  space::{FeFunction, FeSpace},
  FemResult,
};

use std::sync::Arc;

/// Aggregated error of a run. Derived, never persisted beyond reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorMetrics {
  pub l2: f64,
  pub max: f64,
}

/// Compares the computed solution against the exact solution.
///
/// The exact solution is interpolated into a space one degree higher than
/// the solution's, so the comparison is not aliased by the approximation
/// error being measured. The squared difference is integrated over the
/// worker's owned cells only; the cross-worker sum and max are collective,
/// so every worker must call this even if it does not report.
pub fn compute_error<F, C>(
  solution: &FeFunction,
  boundary_fn: &FeFunction,
  exact: F,
  space: &FeSpace,
  partition: &Partition,
  comm: &C,
) -> FemResult<ErrorMetrics>
where
  F: Fn(f64, f64) -> f64,
  C: Collective,
{
  let mesh = space.mesh();
  let comparison = FeSpace::new(Arc::clone(mesh), space.family(), space.degree() + 1)?;
  let exact_hi = comparison.interpolate(&exact);

  let basis_lo = TensorBasis::new(space.degree());
  let basis_hi = TensorBasis::new(comparison.degree());
  let rule = QuadRule::on_square(space.degree() + 2);

  let mut local_sq = 0.0;
  for icell in partition.owned_cells() {
    let geo = mesh.cell_geometry(icell);
    let dofs_lo = space.local2global(icell);
    let dofs_hi = comparison.local2global(icell);

    for (weight, xi) in rule.iter() {
      let phi_lo = basis_lo.eval(xi);
      let phi_hi = basis_hi.eval(xi);
      let computed: f64 = dofs_lo
        .iter()
        .enumerate()
        .map(|(a, &idof)| solution[idof] * phi_lo[a])
        .sum();
      let reference: f64 = dofs_hi
        .iter()
        .enumerate()
        .map(|(a, &idof)| exact_hi[idof] * phi_hi[a])
        .sum();
      local_sq += weight * (geo.vol() / 4.0) * (computed - reference).powi(2);
    }
  }
  let l2 = comm.all_reduce_sum(local_sq)?.sqrt();

  // Pointwise maximum over the dofs of the original space.
  let mut seen = vec![false; space.ndofs()];
  let mut local_max = 0.0_f64;
  for icell in partition.owned_cells() {
    for idof in space.local2global(icell) {
      if !seen[idof] {
        seen[idof] = true;
        local_max = local_max.max((boundary_fn[idof] - solution[idof]).abs());
      }
    }
  }
  let max = comm.all_reduce_max(local_max)?;

  Ok(ErrorMetrics { l2, max })
}

/// Prints the aggregated metrics, on the reporting worker only.
pub fn report<C: Collective>(metrics: &ErrorMetrics, comm: &C) {
  if comm.is_reporting_worker() {
    println!("Error_L2 : {:.2e}", metrics.l2);
    println!("Error_max : {:.2e}", metrics.max);
  }
}
