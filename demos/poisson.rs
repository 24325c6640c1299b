//! Solves the Poisson equation on the unit square and reports the error
//! against the manufactured solution $u = 1 + x^2 + 2 y^2$.

use poissoniq::{
  comm::{Partition, SerialComm},
  form::SourceTerm,
  io,
  mesh::QuadMesh,
  metrics,
  poisson::solve_poisson,
  solve::SolverConfig,
  space::{ElementFamily, FeSpace},
};

use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt::init();

  let mesh = Arc::new(QuadMesh::new_unit(8)?);
  let space = FeSpace::new(Arc::clone(&mesh), ElementFamily::Lagrange, 1)?;

  let exact = |x: f64, y: f64| 1.0 + x * x + 2.0 * y * y;
  let boundary_fn = space.interpolate(exact);

  let solution = solve_poisson(
    &space,
    SourceTerm::Constant(-6.0),
    &boundary_fn,
    &SolverConfig::default(),
  )?;

  let comm = SerialComm;
  let partition = Partition::block(mesh.ncells(), &comm);
  let metrics = metrics::compute_error(&solution, &boundary_fn, exact, &space, &partition, &comm)?;
  metrics::report(&metrics, &comm);

  let vtk = io::solution_to_vtk(&space, &solution, Some(1.0));
  io::write_vtk(vtk, "poisson.vtk")?;

  Ok(())
}
