//! Solves the manufactured Poisson problem on a sequence of refined meshes
//! and reports the algebraic convergence rate of the L2 error.

use poissoniq::{
  comm::{Partition, SerialComm},
  form::SourceTerm,
  mesh::QuadMesh,
  metrics::compute_error,
  poisson::solve_poisson,
  solve::SolverConfig,
  space::{ElementFamily, FeSpace},
};

use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt::init();

  fn print_separator() {
    println!("{}", "-".repeat(46));
  }

  print_separator();
  println!(
    "| {:>2} | {:>10} | {:>9} | {:>9} |",
    "k", "mesh width", "L2 error", "conv rate"
  );
  print_separator();

  let exact = |x: f64, y: f64| 1.0 + x * x + 2.0 * y * y;
  let comm = SerialComm;

  let mut errors: Vec<f64> = Vec::new();
  for refinement in 0..5 {
    let ncells_axis = 8 << refinement;
    let mesh = Arc::new(QuadMesh::new_unit(ncells_axis)?);
    let space = FeSpace::new(Arc::clone(&mesh), ElementFamily::Lagrange, 1)?;
    let boundary_fn = space.interpolate(exact);

    let solution = solve_poisson(
      &space,
      SourceTerm::Constant(-6.0),
      &boundary_fn,
      &SolverConfig::default(),
    )?;

    let partition = Partition::block(mesh.ncells(), &comm);
    let metrics = compute_error(&solution, &boundary_fn, exact, &space, &partition, &comm)?;

    let conv_rate = if let Some(&prev_error) = errors.last() {
      -(metrics.l2 / prev_error).log2()
    } else {
      f64::INFINITY
    };
    errors.push(metrics.l2);

    println!(
      "| {:>2} | {:>10.3e} | {:>9.3e} | {:>9.2} |",
      refinement,
      mesh.mesh_width(),
      metrics.l2,
      conv_rate
    );
  }
  print_separator();

  Ok(())
}
