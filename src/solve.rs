//! Direct solution of the assembled linear system.

use crate::{
  assemble,
  bc::DirichletBc,
  fe,
  form::Integral,
  linalg::FaerCholesky,
  space::{FeFunction, FeSpace},
  FemError, FemResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverStrategy {
  #[default]
  Direct,
  Iterative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preconditioner {
  #[default]
  None,
  Jacobi,
}

/// Named solver options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverConfig {
  pub strategy: SolverStrategy,
  pub preconditioner: Preconditioner,
}

/// Assembles the weak forms into a sparse system, applies the boundary
/// constraint and solves by a single factorize-and-back-substitute.
///
/// The solution lives in the trial function's space. A singular or
/// inconsistent system is fatal and never retried.
pub fn solve(
  a: &Integral,
  l: &Integral,
  bc: &DirichletBc,
  space: &FeSpace,
  config: &SolverConfig,
) -> FemResult<FeFunction> {
  if !matches!(
    (config.strategy, config.preconditioner),
    (SolverStrategy::Direct, Preconditioner::None)
  ) {
    return Err(FemError::InvalidConfiguration {
      reason: format!("unsupported solver configuration {config:?}"),
    });
  }

  let elmat = fe::lower_bilinear(a, space.degree())?;
  let elvec = fe::lower_linear(l, space.degree())?;

  let mut galmat = assemble::assemble_galmat(space, &elmat);
  let mut galvec = assemble::assemble_galvec(space, &elvec);
  tracing::debug!(
    ndofs = space.ndofs(),
    nnz = galmat.nnz(),
    nconstrained = bc.ndofs_constrained(),
    "assembled galerkin system"
  );

  assemble::apply_dirichlet_bc(bc, &mut galmat, &mut galvec);

  let galmat = nas::CsrMatrix::from(&galmat);
  let solution = FaerCholesky::new(galmat)?.solve(&galvec);
  tracing::info!(ndofs = space.ndofs(), "direct solve complete");

  Ok(FeFunction::new(solution))
}
