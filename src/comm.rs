//! Collectives for SPMD runs.
//!
//! Every worker executes the identical pipeline on its own slice of cells;
//! workers meet only at the reductions. All workers must reach each
//! collective call, otherwise the run stalls.

use crate::{FemError, FemResult};

use std::sync::{Arc, Barrier, Mutex};

pub trait Collective {
  fn rank(&self) -> usize;
  fn size(&self) -> usize;
  fn all_reduce_sum(&self, local: f64) -> FemResult<f64>;
  fn all_reduce_max(&self, local: f64) -> FemResult<f64>;

  /// Reporting is restricted to a single nominated worker.
  fn is_reporting_worker(&self) -> bool {
    self.rank() == 0
  }
}

/// Single-worker collective; reductions are the identity.
pub struct SerialComm;

impl Collective for SerialComm {
  fn rank(&self) -> usize {
    0
  }
  fn size(&self) -> usize {
    1
  }
  fn all_reduce_sum(&self, local: f64) -> FemResult<f64> {
    Ok(local)
  }
  fn all_reduce_max(&self, local: f64) -> FemResult<f64> {
    Ok(local)
  }
}

struct Shared {
  size: usize,
  barrier: Barrier,
  slots: Mutex<Vec<f64>>,
}

/// In-process SPMD collective backed by one thread per worker.
///
/// `split` hands out one handle per worker; each handle must participate in
/// every reduction. A worker that panicked mid-collective poisons the
/// exchange and surfaces as a reduction failure on the survivors.
pub struct ThreadComm {
  rank: usize,
  shared: Arc<Shared>,
}

impl ThreadComm {
  pub fn split(size: usize) -> FemResult<Vec<ThreadComm>> {
    if size == 0 {
      return Err(FemError::InvalidConfiguration {
        reason: "worker count must be positive".to_string(),
      });
    }
    let shared = Arc::new(Shared {
      size,
      barrier: Barrier::new(size),
      slots: Mutex::new(vec![0.0; size]),
    });
    Ok(
      (0..size)
        .map(|rank| ThreadComm {
          rank,
          shared: Arc::clone(&shared),
        })
        .collect(),
    )
  }

  fn all_reduce(&self, local: f64, init: f64, combine: impl Fn(f64, f64) -> f64) -> FemResult<f64> {
    {
      let mut slots = self.shared.slots.lock().map_err(|_| FemError::Reduction {
        reason: format!("worker {} found the exchange poisoned", self.rank),
      })?;
      slots[self.rank] = local;
    }
    self.shared.barrier.wait();

    let result = {
      let slots = self.shared.slots.lock().map_err(|_| FemError::Reduction {
        reason: format!("worker {} found the exchange poisoned", self.rank),
      })?;
      slots.iter().copied().fold(init, &combine)
    };
    // all workers read before any slot is reused
    self.shared.barrier.wait();
    Ok(result)
  }
}

impl Collective for ThreadComm {
  fn rank(&self) -> usize {
    self.rank
  }
  fn size(&self) -> usize {
    self.shared.size
  }
  fn all_reduce_sum(&self, local: f64) -> FemResult<f64> {
    self.all_reduce(local, 0.0, |acc, v| acc + v)
  }
  fn all_reduce_max(&self, local: f64) -> FemResult<f64> {
    self.all_reduce(local, f64::NEG_INFINITY, f64::max)
  }
}

/// Contiguous block ownership of a cell range.
///
/// Each worker owns a disjoint slice; together the slices cover all cells.
#[derive(Debug, Clone)]
pub struct Partition {
  begin: usize,
  end: usize,
}

impl Partition {
  pub fn block(ncells: usize, comm: &impl Collective) -> Self {
    let size = comm.size();
    let rank = comm.rank();
    let chunk = ncells / size;
    let remainder = ncells % size;
    let begin = rank * chunk + rank.min(remainder);
    let end = begin + chunk + usize::from(rank < remainder);
    Self { begin, end }
  }

  pub fn owned_cells(&self) -> std::ops::Range<usize> {
    self.begin..self.end
  }
  pub fn ncells_owned(&self) -> usize {
    self.end - self.begin
  }
}

#[cfg(test)]
mod test {
  use super::{Collective, Partition, SerialComm, ThreadComm};

  struct FakeComm {
    rank: usize,
    size: usize,
  }
  impl Collective for FakeComm {
    fn rank(&self) -> usize {
      self.rank
    }
    fn size(&self) -> usize {
      self.size
    }
    fn all_reduce_sum(&self, local: f64) -> crate::FemResult<f64> {
      Ok(local)
    }
    fn all_reduce_max(&self, local: f64) -> crate::FemResult<f64> {
      Ok(local)
    }
  }

  #[test]
  fn block_partition_covers_all_cells() {
    let ncells = 10;
    let size = 3;
    let mut covered = vec![0; ncells];
    for rank in 0..size {
      let partition = Partition::block(ncells, &FakeComm { rank, size });
      for icell in partition.owned_cells() {
        covered[icell] += 1;
      }
      assert!(partition.ncells_owned() >= ncells / size);
    }
    assert!(covered.iter().all(|&c| c == 1));
  }

  #[test]
  fn serial_comm_is_identity() {
    let comm = SerialComm;
    assert!(comm.is_reporting_worker());
    assert_eq!(comm.all_reduce_sum(3.5).unwrap(), 3.5);
    assert_eq!(comm.all_reduce_max(-1.0).unwrap(), -1.0);
  }

  #[test]
  fn thread_comm_reduces_across_workers() {
    let comms = ThreadComm::split(4).unwrap();
    let handles: Vec<_> = comms
      .into_iter()
      .map(|comm| {
        std::thread::spawn(move || {
          let sum = comm.all_reduce_sum((comm.rank() + 1) as f64).unwrap();
          let max = comm.all_reduce_max(comm.rank() as f64).unwrap();
          (sum, max, comm.is_reporting_worker())
        })
      })
      .collect();

    let mut nreporting = 0;
    for handle in handles {
      let (sum, max, reporting) = handle.join().unwrap();
      assert_eq!(sum, 10.0);
      assert_eq!(max, 3.0);
      nreporting += usize::from(reporting);
    }
    assert_eq!(nreporting, 1);
  }

  #[test]
  fn rejects_empty_worker_group() {
    assert!(ThreadComm::split(0).is_err());
  }
}
