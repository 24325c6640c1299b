extern crate nalgebra as na;
extern crate nalgebra_sparse as nas;

pub mod assemble;
pub mod bc;
pub mod comm;
pub mod error;
pub mod fe;
pub mod form;
pub mod io;
pub mod linalg;
pub mod mesh;
pub mod metrics;
pub mod poisson;
pub mod quadrature;
pub mod solve;
pub mod space;

pub use error::{FemError, FemResult};

pub type Dim = usize;
