//! Conversion of solutions into renderable unstructured grids.
//!
//! Pure presentation: only the array shapes and the field name matter to
//! the rest of the pipeline.

use crate::space::{FeFunction, FeSpace};

use vtkio::{
  model::{
    Attribute, Attributes, ByteOrder, CellType, Cells, UnstructuredGridPiece, Version,
    VertexNumbers, Vtk,
  },
  IOBuffer,
};

use std::path::Path;

/// Converts a solution into a VTK unstructured grid.
///
/// The display grid is the dof node grid, so a degree-k solution renders on
/// its own nodes with each mesh cell split into k^2 display quads. `warp`
/// displaces each point along the z axis proportional to its value.
pub fn solution_to_vtk(space: &FeSpace, solution: &FeFunction, warp: Option<f64>) -> Vtk {
  let ndx = space.ndofs_x();
  let ndy = space.ndofs_y();

  let mut points = Vec::with_capacity(3 * space.ndofs());
  for idof in 0..space.ndofs() {
    let pos = space.dof_pos(idof);
    points.push(pos.x);
    points.push(pos.y);
    points.push(warp.map_or(0.0, |factor| factor * solution[idof]));
  }

  let ncells = (ndx - 1) * (ndy - 1);
  let mut connectivity = Vec::with_capacity(4 * ncells);
  for cy in 0..ndy - 1 {
    for cx in 0..ndx - 1 {
      let n00 = cy * ndx + cx;
      connectivity.push(n00 as u64);
      connectivity.push((n00 + 1) as u64);
      connectivity.push((n00 + ndx + 1) as u64);
      connectivity.push((n00 + ndx) as u64);
    }
  }
  let offsets = (1..=ncells).map(|i| (4 * i) as u64).collect();

  let cells = Cells {
    cell_verts: VertexNumbers::XML {
      connectivity,
      offsets,
    },
    types: vec![CellType::Quad; ncells],
  };

  let data = Attributes {
    point: vec![Attribute::scalars("solution", 1)
      .with_data(solution.coeffs().iter().copied().collect::<Vec<f64>>())],
    cell: Vec::new(),
  };

  let grid = UnstructuredGridPiece {
    points: IOBuffer::new(points),
    cells,
    data,
  };

  Vtk {
    version: Version::new((4, 2)),
    title: String::from("poissoniq solution"),
    byte_order: ByteOrder::native(),
    data: grid.into(),
    file_path: None,
  }
}

/// Writes the grid as a legacy ASCII artifact.
pub fn write_vtk(vtk: Vtk, path: impl AsRef<Path>) -> Result<(), vtkio::Error> {
  vtk.export_ascii(path)
}

#[cfg(test)]
mod test {
  use super::solution_to_vtk;
  use crate::mesh::QuadMesh;
  use crate::space::{ElementFamily, FeSpace};

  use vtkio::model::{Attribute, CellType, DataSet, Piece, VertexNumbers};

  use std::sync::Arc;

  #[test]
  fn grid_shape_follows_dof_grid() {
    let mesh = Arc::new(QuadMesh::new_unit(2).unwrap());
    let space = FeSpace::new(mesh, ElementFamily::Lagrange, 2).unwrap();
    let solution = space.interpolate(|x, y| x + y);
    let vtk = solution_to_vtk(&space, &solution, None);

    let DataSet::UnstructuredGrid { pieces, .. } = vtk.data else {
      panic!("expected an unstructured grid");
    };
    let Piece::Inline(piece) = pieces.into_iter().next().unwrap() else {
      panic!("expected an inline piece");
    };

    // 5x5 dof nodes and 4x4 display quads
    assert_eq!(piece.points.len(), 3 * 25);
    assert_eq!(piece.cells.types.len(), 16);
    assert!(piece.cells.types.iter().all(|&t| t == CellType::Quad));
    let VertexNumbers::XML {
      connectivity,
      offsets,
    } = piece.cells.cell_verts
    else {
      panic!("expected xml cell vertices");
    };
    assert_eq!(connectivity.len(), 4 * 16);
    assert_eq!(offsets.last().copied(), Some(64));

    let Attribute::DataArray(array) = piece.data.point.into_iter().next().unwrap() else {
      panic!("expected a point data array");
    };
    assert_eq!(array.name, "solution");
    assert_eq!(array.data.len(), 25);
  }

  #[test]
  fn warp_displaces_points_by_value() {
    let mesh = Arc::new(QuadMesh::new_unit(1).unwrap());
    let space = FeSpace::new(mesh, ElementFamily::Lagrange, 1).unwrap();
    let solution = space.interpolate(|x, y| x + 2.0 * y);
    let vtk = solution_to_vtk(&space, &solution, Some(0.5));

    let DataSet::UnstructuredGrid { pieces, .. } = vtk.data else {
      panic!("expected an unstructured grid");
    };
    let Piece::Inline(piece) = pieces.into_iter().next().unwrap() else {
      panic!("expected an inline piece");
    };
    let points: Vec<f64> = piece.points.cast_into().unwrap();

    for idof in 0..space.ndofs() {
      let z = points[3 * idof + 2];
      assert_eq!(z, 0.5 * solution[idof]);
    }
  }
}
