//! Finite element spaces of continuous tensor-product Lagrange polynomials.

use crate::{
  mesh::{
    cartesian_index2linear_index, linear_index2cartesian_index, CellIdx, FacetIdx, QuadMesh,
  },
  FemError, FemResult,
};

use itertools::Itertools;

use std::sync::Arc;

pub type DofIdx = usize;

/// Element family of a function space.
///
/// Only continuous Lagrange elements exist here; the variant keeps the
/// builder contract explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementFamily {
  #[default]
  Lagrange,
}

/// A space of continuous piecewise-polynomial basis functions of fixed
/// degree over a quadrilateral mesh.
///
/// Dofs live on the tensor grid refined `degree`-fold per axis, so the dof
/// count is determined solely by mesh subdivisions and element degree.
pub struct FeSpace {
  mesh: Arc<QuadMesh>,
  family: ElementFamily,
  degree: usize,
}

impl FeSpace {
  pub fn new(mesh: Arc<QuadMesh>, family: ElementFamily, degree: usize) -> FemResult<Self> {
    if degree == 0 {
      return Err(FemError::InvalidConfiguration {
        reason: "element degree must be positive".to_string(),
      });
    }
    Ok(Self {
      mesh,
      family,
      degree,
    })
  }

  pub fn mesh(&self) -> &Arc<QuadMesh> {
    &self.mesh
  }
  pub fn family(&self) -> ElementFamily {
    self.family
  }
  pub fn degree(&self) -> usize {
    self.degree
  }
  pub fn ndofs_x(&self) -> usize {
    self.mesh.ncells_x() * self.degree + 1
  }
  pub fn ndofs_y(&self) -> usize {
    self.mesh.ncells_y() * self.degree + 1
  }
  pub fn ndofs(&self) -> usize {
    self.ndofs_x() * self.ndofs_y()
  }

  /// Geometric position of a dof node.
  pub fn dof_pos(&self, idof: DofIdx) -> na::Vector2<f64> {
    let [ix, iy] = linear_index2cartesian_index(idof, self.ndofs_x());
    let rect = self.mesh.rect();
    let side_lengths = rect.side_lengths();
    na::Vector2::new(
      rect.min().x + side_lengths.x * ix as f64 / (self.ndofs_x() - 1) as f64,
      rect.min().y + side_lengths.y * iy as f64 / (self.ndofs_y() - 1) as f64,
    )
  }

  /// Global dof indices of a cell, row-major over the local node grid.
  pub fn local2global(&self, icell: CellIdx) -> Vec<DofIdx> {
    let k = self.degree;
    let [cx, cy] = linear_index2cartesian_index(icell, self.mesh.ncells_x());
    let ndofs_x = self.ndofs_x();
    (0..=k)
      .flat_map(|j| (0..=k).map(move |i| (cy * k + j) * ndofs_x + cx * k + i))
      .collect()
  }

  /// Dofs in the topological closure of a facet: the `degree + 1` nodes
  /// along that edge.
  pub fn facet_dofs(&self, ifacet: FacetIdx) -> FemResult<Vec<DofIdx>> {
    let k = self.degree;
    let conn = self.mesh.connectivity()?;
    let [va, vb] = conn.facet_vertices(ifacet)?;
    let [ax, ay] = linear_index2cartesian_index(va, self.mesh.nvertices_x());
    let [bx, by] = linear_index2cartesian_index(vb, self.mesh.nvertices_x());

    let dofs = if ay == by {
      // horizontal edge
      (0..=k)
        .map(|t| cartesian_index2linear_index([ax.min(bx) * k + t, ay * k], self.ndofs_x()))
        .collect()
    } else {
      // vertical edge
      (0..=k)
        .map(|t| cartesian_index2linear_index([ax * k, ay.min(by) * k + t], self.ndofs_x()))
        .collect()
    };
    Ok(dofs)
  }

  /// Dofs supported on the exterior boundary, via the facet closures.
  pub fn boundary_dofs(&self) -> FemResult<Vec<DofIdx>> {
    let exterior = self.mesh.exterior_facets()?;
    let dofs = exterior
      .into_iter()
      .map(|ifacet| self.facet_dofs(ifacet))
      .collect::<FemResult<Vec<_>>>()?
      .into_iter()
      .flatten()
      .unique()
      .collect();
    Ok(dofs)
  }

  /// Interpolates an analytic expression by pointwise evaluation at the
  /// dof nodes.
  pub fn interpolate<F>(&self, f: F) -> FeFunction
  where
    F: Fn(f64, f64) -> f64,
  {
    let coeffs = na::DVector::from_iterator(
      self.ndofs(),
      (0..self.ndofs()).map(|idof| {
        let pos = self.dof_pos(idof);
        f(pos.x, pos.y)
      }),
    );
    FeFunction::new(coeffs)
  }

  pub fn zeros(&self) -> FeFunction {
    FeFunction::new(na::DVector::zeros(self.ndofs()))
  }
}

/// An assignment of one scalar coefficient to every dof of a space.
///
/// Mutable only at construction; treated as a read-only sampled field
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FeFunction {
  coeffs: na::DVector<f64>,
}

impl FeFunction {
  pub fn new(coeffs: na::DVector<f64>) -> Self {
    Self { coeffs }
  }

  pub fn len(&self) -> usize {
    self.coeffs.len()
  }
  pub fn is_empty(&self) -> bool {
    self.coeffs.is_empty()
  }
  pub fn coeffs(&self) -> &na::DVector<f64> {
    &self.coeffs
  }
}

impl std::ops::Index<DofIdx> for FeFunction {
  type Output = f64;
  fn index(&self, idof: DofIdx) -> &f64 {
    &self.coeffs[idof]
  }
}
