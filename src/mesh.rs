//! Structured quadrilateral meshes over axis-aligned rectangles.

use crate::{FemError, FemResult};

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

pub type CellIdx = usize;
pub type VertexIdx = usize;
pub type FacetIdx = usize;

/// converts linear index in 0..nx*ny to cartesian index in (0,0)..(nx,ny)
pub fn linear_index2cartesian_index(lin_idx: usize, nx: usize) -> [usize; 2] {
  [lin_idx % nx, lin_idx / nx]
}

/// converts cartesian index in (0,0)..(nx,ny) to linear index in 0..nx*ny
pub fn cartesian_index2linear_index(cart_idx: [usize; 2], nx: usize) -> usize {
  cart_idx[1] * nx + cart_idx[0]
}

/// An axis-aligned rectangle.
pub struct Rect {
  min: na::Vector2<f64>,
  max: na::Vector2<f64>,
}

impl Rect {
  pub fn new_min_max(min: na::Vector2<f64>, max: na::Vector2<f64>) -> FemResult<Self> {
    if !(min.x < max.x && min.y < max.y) {
      return Err(FemError::InvalidConfiguration {
        reason: format!("malformed rectangle bounds: min={min:?} max={max:?}"),
      });
    }
    Ok(Self { min, max })
  }
  pub fn new_unit() -> Self {
    Self {
      min: na::Vector2::zeros(),
      max: na::Vector2::new(1.0, 1.0),
    }
  }

  pub fn min(&self) -> &na::Vector2<f64> {
    &self.min
  }
  pub fn max(&self) -> &na::Vector2<f64> {
    &self.max
  }
  pub fn side_lengths(&self) -> na::Vector2<f64> {
    self.max - self.min
  }
}

/// The axis-aligned geometry of a single cell.
pub struct CellGeometry {
  origin: na::Vector2<f64>,
  widths: na::Vector2<f64>,
}

impl CellGeometry {
  pub fn widths(&self) -> &na::Vector2<f64> {
    &self.widths
  }
  pub fn vol(&self) -> f64 {
    self.widths.x * self.widths.y
  }
  /// Maps a point on the reference square $[-1, 1]^2$ into the cell.
  pub fn map_reference(&self, xi: [f64; 2]) -> na::Vector2<f64> {
    na::Vector2::new(
      self.origin.x + 0.5 * (xi[0] + 1.0) * self.widths.x,
      self.origin.y + 0.5 * (xi[1] + 1.0) * self.widths.y,
    )
  }
}

/// A structured mesh of axis-aligned quadrilateral cells tiling a rectangle.
///
/// Cells and vertices are indexed row-major along the x axis. The mesh is
/// immutable once created; facet connectivity is derived on demand.
pub struct QuadMesh {
  rect: Rect,
  ncells_axis: [usize; 2],
  connectivity: OnceCell<Connectivity>,
}

// constructors
impl QuadMesh {
  pub fn new_unit(ncells_axis: usize) -> FemResult<Self> {
    Self::with_rect(Rect::new_unit(), ncells_axis, ncells_axis)
  }
  pub fn new_min_max(
    min: na::Vector2<f64>,
    max: na::Vector2<f64>,
    ncells_x: usize,
    ncells_y: usize,
  ) -> FemResult<Self> {
    Self::with_rect(Rect::new_min_max(min, max)?, ncells_x, ncells_y)
  }

  fn with_rect(rect: Rect, ncells_x: usize, ncells_y: usize) -> FemResult<Self> {
    if ncells_x == 0 || ncells_y == 0 {
      return Err(FemError::InvalidConfiguration {
        reason: format!("subdivision counts must be positive, got {ncells_x}x{ncells_y}"),
      });
    }
    Ok(Self {
      rect,
      ncells_axis: [ncells_x, ncells_y],
      connectivity: OnceCell::new(),
    })
  }
}

// getters
impl QuadMesh {
  pub fn dim(&self) -> crate::Dim {
    2
  }
  pub fn rect(&self) -> &Rect {
    &self.rect
  }
  pub fn ncells_x(&self) -> usize {
    self.ncells_axis[0]
  }
  pub fn ncells_y(&self) -> usize {
    self.ncells_axis[1]
  }
  pub fn ncells(&self) -> usize {
    self.ncells_axis[0] * self.ncells_axis[1]
  }
  pub fn nvertices_x(&self) -> usize {
    self.ncells_axis[0] + 1
  }
  pub fn nvertices_y(&self) -> usize {
    self.ncells_axis[1] + 1
  }
  pub fn nvertices(&self) -> usize {
    self.nvertices_x() * self.nvertices_y()
  }

  pub fn vertex_pos(&self, ivertex: VertexIdx) -> na::Vector2<f64> {
    let [ix, iy] = linear_index2cartesian_index(ivertex, self.nvertices_x());
    let side_lengths = self.rect.side_lengths();
    na::Vector2::new(
      self.rect.min().x + side_lengths.x * ix as f64 / self.ncells_x() as f64,
      self.rect.min().y + side_lengths.y * iy as f64 / self.ncells_y() as f64,
    )
  }

  /// The four vertices of a cell in counterclockwise order.
  pub fn cell_vertices(&self, icell: CellIdx) -> [VertexIdx; 4] {
    let [cx, cy] = linear_index2cartesian_index(icell, self.ncells_x());
    let nvx = self.nvertices_x();
    let v00 = cartesian_index2linear_index([cx, cy], nvx);
    let v10 = cartesian_index2linear_index([cx + 1, cy], nvx);
    let v11 = cartesian_index2linear_index([cx + 1, cy + 1], nvx);
    let v01 = cartesian_index2linear_index([cx, cy + 1], nvx);
    [v00, v10, v11, v01]
  }

  pub fn cell_geometry(&self, icell: CellIdx) -> CellGeometry {
    let [cx, cy] = linear_index2cartesian_index(icell, self.ncells_x());
    let side_lengths = self.rect.side_lengths();
    let widths = na::Vector2::new(
      side_lengths.x / self.ncells_x() as f64,
      side_lengths.y / self.ncells_y() as f64,
    );
    let origin = na::Vector2::new(
      self.rect.min().x + widths.x * cx as f64,
      self.rect.min().y + widths.y * cy as f64,
    );
    CellGeometry { origin, widths }
  }

  pub fn mesh_width(&self) -> f64 {
    let side_lengths = self.rect.side_lengths();
    let hx = side_lengths.x / self.ncells_x() as f64;
    let hy = side_lengths.y / self.ncells_y() as f64;
    hx.max(hy)
  }
}

// topology
impl QuadMesh {
  /// Facet-to-cell connectivity, built lazily on first access.
  ///
  /// Repeated calls reuse the same structure, so callers never have to
  /// remember a build-before-query ordering.
  pub fn connectivity(&self) -> FemResult<&Connectivity> {
    self.connectivity.get_or_try_init(|| Connectivity::build(self))
  }

  /// Facets adjacent to exactly one cell.
  ///
  /// Empty for a mesh without exterior boundary; that is not an error.
  pub fn exterior_facets(&self) -> FemResult<Vec<FacetIdx>> {
    Ok(self.connectivity()?.exterior_facets())
  }
}

type SortedEdge = [VertexIdx; 2];

#[derive(Default, Debug, Clone)]
struct FacetData {
  cofacets: Vec<CellIdx>,
}

/// Facet (edge) incidence of a quadrilateral mesh.
///
/// Facets are enumerated in first-encounter order over the cell boundaries.
pub struct Connectivity {
  facets: IndexMap<SortedEdge, FacetData>,
  cell_facets: Vec<[FacetIdx; 4]>,
}

impl Connectivity {
  fn build(mesh: &QuadMesh) -> FemResult<Self> {
    let mut facets = IndexMap::new();
    let mut cell_facets = Vec::with_capacity(mesh.ncells());

    for icell in 0..mesh.ncells() {
      let [v00, v10, v11, v01] = mesh.cell_vertices(icell);
      let edges = [[v00, v10], [v10, v11], [v01, v11], [v00, v01]];

      let mut ifacets = [0; 4];
      for (iedge, edge) in edges.into_iter().enumerate() {
        let key = if edge[0] < edge[1] {
          edge
        } else {
          [edge[1], edge[0]]
        };
        let entry = facets.entry(key);
        ifacets[iedge] = entry.index();
        let data: &mut FacetData = entry.or_default();
        data.cofacets.push(icell);
      }
      cell_facets.push(ifacets);
    }

    for (edge, data) in &facets {
      if data.cofacets.len() > 2 {
        return Err(FemError::Topology {
          reason: format!("facet {edge:?} is adjacent to {} cells", data.cofacets.len()),
        });
      }
    }

    Ok(Self { facets, cell_facets })
  }

  pub fn nfacets(&self) -> usize {
    self.facets.len()
  }

  pub fn facet_vertices(&self, ifacet: FacetIdx) -> FemResult<SortedEdge> {
    self
      .facets
      .get_index(ifacet)
      .map(|(&edge, _)| edge)
      .ok_or_else(|| FemError::Topology {
        reason: format!("facet index {ifacet} out of range"),
      })
  }

  pub fn facet_cells(&self, ifacet: FacetIdx) -> FemResult<&[CellIdx]> {
    self
      .facets
      .get_index(ifacet)
      .map(|(_, data)| data.cofacets.as_slice())
      .ok_or_else(|| FemError::Topology {
        reason: format!("facet index {ifacet} out of range"),
      })
  }

  pub fn cell_facets(&self, icell: CellIdx) -> FemResult<&[FacetIdx; 4]> {
    self.cell_facets.get(icell).ok_or_else(|| FemError::Topology {
      reason: format!("cell index {icell} out of range"),
    })
  }

  pub fn exterior_facets(&self) -> Vec<FacetIdx> {
    self
      .facets
      .values()
      .enumerate()
      .filter(|(_, data)| data.cofacets.len() == 1)
      .map(|(ifacet, _)| ifacet)
      .collect()
  }
}
