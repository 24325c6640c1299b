//! Dirichlet boundary conditions over exterior facets.

use crate::{
  space::{DofIdx, FeFunction, FeSpace},
  FemError, FemResult,
};

/// A set of (dof, prescribed value) pairs on the exterior boundary.
///
/// Every referenced dof lies on an exterior facet by construction.
pub struct DirichletBc {
  dof_values: Vec<(DofIdx, f64)>,
}

impl DirichletBc {
  /// Assembles the constraint from a boundary function.
  ///
  /// Exterior facets are those adjacent to exactly one cell; their dof
  /// closures are paired with the boundary function's values. A mesh
  /// without exterior facets yields an empty constraint, which restrains
  /// nothing; guarding against the resulting under-constrained system is
  /// the caller's concern.
  pub fn assemble(space: &FeSpace, boundary_fn: &FeFunction) -> FemResult<Self> {
    if boundary_fn.len() != space.ndofs() {
      return Err(FemError::InvalidConfiguration {
        reason: format!(
          "boundary function has {} coefficients for a space with {} dofs",
          boundary_fn.len(),
          space.ndofs()
        ),
      });
    }

    let facet_dim = space.mesh().dim() - 1;
    tracing::debug!(facet_dim, "assembling dirichlet constraint on exterior facets");

    let boundary_dofs = space.boundary_dofs()?;
    let dof_values = boundary_dofs
      .into_iter()
      .map(|idof| (idof, boundary_fn[idof]))
      .collect();
    Ok(Self { dof_values })
  }

  pub fn ndofs_constrained(&self) -> usize {
    self.dof_values.len()
  }
  pub fn is_empty(&self) -> bool {
    self.dof_values.is_empty()
  }
  pub fn dof_values(&self) -> impl Iterator<Item = (DofIdx, f64)> + '_ {
    self.dof_values.iter().copied()
  }
}
