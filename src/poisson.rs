//! The Poisson equation, the prototypical elliptic PDE.

use crate::{
  bc::DirichletBc,
  form::{integral, FormExpr, SourceTerm},
  solve::{self, SolverConfig},
  space::{FeFunction, FeSpace},
  FemResult,
};

/// Solves $-Delta u = f$ with Dirichlet data on the exterior boundary.
///
/// Declares the stiffness form $a(u, v) = integral grad u dot grad v dx$
/// and the load form $L(v) = integral f v dx$, constrains the boundary
/// dofs to the boundary function's values and hands the system to the
/// configured solver.
pub fn solve_poisson(
  space: &FeSpace,
  source: SourceTerm,
  boundary_fn: &FeFunction,
  config: &SolverConfig,
) -> FemResult<FeFunction> {
  let bc = DirichletBc::assemble(space, boundary_fn)?;

  let a = integral(FormExpr::trial().grad().dot(FormExpr::test().grad()));
  let l = integral(FormExpr::source(source).mul(FormExpr::test()));

  solve::solve(&a, &l, &bc, space, config)
}
