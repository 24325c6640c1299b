//! Symbolic weak forms over trial and test function placeholders.
//!
//! Forms are purely declarative; no numeric work happens until assembly
//! lowers them onto element providers.

use std::fmt;
use std::sync::Arc;

/// A source term of the linear form, constant or spatially varying.
#[derive(Clone)]
pub enum SourceTerm {
  Constant(f64),
  Spatial(Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>),
}

impl SourceTerm {
  pub fn spatial(f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
    Self::Spatial(Arc::new(f))
  }

  pub fn eval(&self, x: f64, y: f64) -> f64 {
    match self {
      Self::Constant(value) => *value,
      Self::Spatial(f) => f(x, y),
    }
  }
}

impl fmt::Debug for SourceTerm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Constant(value) => write!(f, "Constant({value})"),
      Self::Spatial(_) => write!(f, "Spatial(..)"),
    }
  }
}

/// Expression tree over trial/test placeholders and source terms.
#[derive(Debug, Clone)]
pub enum FormExpr {
  Trial,
  Test,
  Source(SourceTerm),
  Grad(Box<FormExpr>),
  Dot(Box<FormExpr>, Box<FormExpr>),
  Mul(Box<FormExpr>, Box<FormExpr>),
}

impl FormExpr {
  pub fn trial() -> Self {
    Self::Trial
  }
  pub fn test() -> Self {
    Self::Test
  }
  pub fn constant(value: f64) -> Self {
    Self::Source(SourceTerm::Constant(value))
  }
  pub fn source(term: SourceTerm) -> Self {
    Self::Source(term)
  }

  pub fn grad(self) -> Self {
    Self::Grad(Box::new(self))
  }
  pub fn dot(self, other: Self) -> Self {
    Self::Dot(Box::new(self), Box::new(other))
  }
  pub fn mul(self, other: Self) -> Self {
    Self::Mul(Box::new(self), Box::new(other))
  }
}

/// A form integrated over the whole domain.
#[derive(Debug, Clone)]
pub struct Integral {
  integrand: FormExpr,
}

pub fn integral(integrand: FormExpr) -> Integral {
  Integral { integrand }
}

impl Integral {
  pub fn integrand(&self) -> &FormExpr {
    &self.integrand
  }
}
