//! Monte Carlo slip sampling
//!
//! Each worker owns a private RNG stream seeded from the run seed, slip size,
//! round and worker index, so a fixed seed reproduces the same draws no matter
//! how the threads are scheduled.

use super::combinator::{is_legal, score};
use super::ranking::TopN;
use super::DrawOrder;
use crate::edge::EdgeProp;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

/// Parameters shared by every worker in a sampling round
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoundSpec<'a> {
    pub pool: &'a [EdgeProp],
    pub size: usize,
    pub min_distinct_teams: usize,
    pub breakeven_combined: f64,
    pub capacity: usize,
    pub seed: u64,
    pub round: u32,
    pub workers: usize,
    /// Draws across all workers
    pub budget: u64,
}

/// What one worker found
#[derive(Debug, Clone)]
pub(crate) struct WorkerOutput {
    pub top: TopN,
    pub evaluated: u64,
    pub legal: u64,
}

/// Seed for one worker's RNG stream
pub fn stream_seed(seed: u64, size: usize, round: u32, worker: u32) -> u64 {
    seed ^ ((size as u64) << 56) ^ (u64::from(round) << 32) ^ u64::from(worker)
}

/// Share of `budget` drawn by `worker`
fn worker_budget(budget: u64, workers: usize, worker: usize) -> u64 {
    let workers = workers as u64;
    let worker = worker as u64;
    budget / workers + u64::from(worker < budget % workers)
}

fn run_worker(spec: &RoundSpec<'_>, worker: u32) -> WorkerOutput {
    let mut rng = StdRng::seed_from_u64(stream_seed(spec.seed, spec.size, spec.round, worker));
    let draws = worker_budget(spec.budget, spec.workers, worker as usize);
    let mut top = TopN::new(spec.capacity);
    let mut legal = 0u64;

    for sample in 0..draws {
        let mut legs = index::sample(&mut rng, spec.pool.len(), spec.size).into_vec();
        legs.sort_unstable();

        if !is_legal(spec.pool, &legs, spec.min_distinct_teams) {
            continue;
        }
        legal += 1;

        let draw = DrawOrder {
            round: spec.round,
            worker,
            sample,
        };
        top.offer(score(spec.pool, legs, spec.breakeven_combined, draw));
    }

    WorkerOutput {
        top,
        evaluated: draws,
        legal,
    }
}

/// Run one sampling round across scoped worker threads
///
/// Outputs are returned in worker order.
pub(crate) fn run_round(spec: &RoundSpec<'_>) -> Vec<WorkerOutput> {
    if spec.workers <= 1 {
        return vec![run_worker(spec, 0)];
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..spec.workers as u32)
            .map(|worker| scope.spawn(move || run_worker(spec, worker)))
            .collect();

        handles
            .into_iter()
            .enumerate()
            .filter_map(|(worker, handle)| match handle.join() {
                Ok(output) => Some(output),
                Err(_) => {
                    tracing::error!(size = spec.size, worker, "Sampling worker panicked");
                    None
                }
            })
            .collect()
    })
}
