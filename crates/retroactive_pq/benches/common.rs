use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{apply_medium_runtime_config, apply_small_runtime_config, iter_rng, seed_base};
use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, BenchmarkId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use retroactive_pq::{RetroError, RetroactivePriorityQueue};

const SIZES: [usize; 4] = [1_000, 4_000, 16_000, 64_000];
const REPLAY_MAX_SIZE: usize = 4_000;
const EDITS_PER_ITER: usize = 100;
const MAX_TIME: u64 = 1 << 40;
const MAX_VALUE: u64 = 1 << 20;
const INSERT_PERCENT: u64 = 70;

trait Timeline {
    fn new(seed: u64) -> Self;
    fn add_insert(&mut self, time: u64, value: u64) -> Result<(), RetroError>;
    fn add_delete_min(&mut self, time: u64) -> Result<(), RetroError>;
    fn remove(&mut self, time: u64) -> Result<(), RetroError>;
    fn len(&self) -> usize;
}

impl Timeline for RetroactivePriorityQueue<u64, u64> {
    fn new(seed: u64) -> Self {
        Self::with_seed(seed)
    }

    fn add_insert(&mut self, time: u64, value: u64) -> Result<(), RetroError> {
        RetroactivePriorityQueue::add_insert(self, time, value)
    }

    fn add_delete_min(&mut self, time: u64) -> Result<(), RetroError> {
        RetroactivePriorityQueue::add_delete_min(self, time)
    }

    fn remove(&mut self, time: u64) -> Result<(), RetroError> {
        RetroactivePriorityQueue::remove(self, &time)
    }

    fn len(&self) -> usize {
        RetroactivePriorityQueue::len(self)
    }
}

/// Baseline that replays the whole timeline after every edit.
struct ReplayQueue {
    ops: BTreeMap<u64, Option<u64>>,
    contents: Vec<u64>,
}

impl ReplayQueue {
    fn replay(&self) -> Option<Vec<u64>> {
        let mut heap = BinaryHeap::with_capacity(self.ops.len());
        for op in self.ops.values() {
            match *op {
                Some(value) => heap.push(Reverse(value)),
                None => {
                    heap.pop()?;
                }
            }
        }
        let mut contents: Vec<u64> = heap.into_iter().map(|Reverse(v)| v).collect();
        contents.sort_unstable();
        Some(contents)
    }

    fn apply(&mut self, time: u64, op: Option<Option<u64>>) -> Result<(), RetroError> {
        let previous = match op {
            Some(op) => self.ops.insert(time, op),
            None => self.ops.remove(&time),
        };
        match self.replay() {
            Some(contents) => {
                self.contents = contents;
                Ok(())
            }
            None => {
                match previous {
                    Some(previous) => self.ops.insert(time, previous),
                    None => self.ops.remove(&time),
                };
                Err(RetroError::WouldUnderflow)
            }
        }
    }
}

impl Timeline for ReplayQueue {
    fn new(_seed: u64) -> Self {
        Self {
            ops: BTreeMap::new(),
            contents: Vec::new(),
        }
    }

    fn add_insert(&mut self, time: u64, value: u64) -> Result<(), RetroError> {
        if self.ops.contains_key(&time) {
            return Err(RetroError::AlreadyExists);
        }
        self.apply(time, Some(Some(value)))
    }

    fn add_delete_min(&mut self, time: u64) -> Result<(), RetroError> {
        if self.ops.contains_key(&time) {
            return Err(RetroError::AlreadyExists);
        }
        self.apply(time, Some(None))
    }

    fn remove(&mut self, time: u64) -> Result<(), RetroError> {
        if !self.ops.contains_key(&time) {
            return Err(RetroError::NotFound);
        }
        self.apply(time, None)
    }

    fn len(&self) -> usize {
        self.contents.len()
    }
}

#[derive(Clone, Copy)]
enum Edit {
    Insert { time: u64, value: u64 },
    DeleteMin { time: u64 },
}

fn build_timeline<Q: Timeline>(size: usize, seed: u64) -> Q {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut queue = Q::new(seed);
    let mut recorded = 0;
    while recorded < size {
        let time = rng.random_range(0..MAX_TIME);
        let result = if rng.random_range(0..100) < INSERT_PERCENT {
            queue.add_insert(time, rng.random_range(0..MAX_VALUE))
        } else {
            queue.add_delete_min(time)
        };
        if result.is_ok() {
            recorded += 1;
        }
    }
    queue
}

fn generate_edits(rng: &mut StdRng, delete_min: bool) -> Vec<Edit> {
    (0..EDITS_PER_ITER)
        .map(|_| {
            // Odd times never collide with the even times of the base timeline.
            let time = rng.random_range(0..MAX_TIME) | 1;
            if delete_min {
                Edit::DeleteMin { time }
            } else {
                Edit::Insert {
                    time,
                    value: rng.random_range(0..MAX_VALUE),
                }
            }
        })
        .collect()
}

/// Applies each edit and immediately takes it back, leaving `queue` unchanged.
fn run_edits<Q: Timeline>(queue: &mut Q, edits: &[Edit]) {
    for edit in edits {
        match *edit {
            Edit::Insert { time, value } => {
                if queue.add_insert(time, value).is_ok() {
                    black_box(queue.remove(time)).ok();
                }
            }
            Edit::DeleteMin { time } => {
                if queue.add_delete_min(time).is_ok() {
                    black_box(queue.remove(time)).ok();
                }
            }
        }
    }
}

fn bench_edits<Q, T>(group: &mut BenchmarkGroup<'_, T>, label: &str, delete_min: bool, max_size: usize)
where
    Q: Timeline,
    T: Measurement<Value = Duration>,
{
    for &size in SIZES.iter().filter(|&&size| size <= max_size) {
        if size <= REPLAY_MAX_SIZE {
            apply_small_runtime_config(group);
        } else {
            apply_medium_runtime_config(group);
        }
        let base_seed = seed_base(delete_min as u64, size as u64);
        let mut queue = build_timeline::<EvenTimes<Q>>(size, base_seed).0;

        group.bench_function(BenchmarkId::new(label, size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                for iter in 0..iters {
                    let mut rng = iter_rng(base_seed, iter);
                    let edits = generate_edits(&mut rng, delete_min);
                    let start = Instant::now();
                    run_edits(&mut queue, &edits);
                    black_box(queue.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
}

/// Records the base timeline at even times only.
struct EvenTimes<Q>(Q);

impl<Q: Timeline> Timeline for EvenTimes<Q> {
    fn new(seed: u64) -> Self {
        Self(Q::new(seed))
    }

    fn add_insert(&mut self, time: u64, value: u64) -> Result<(), RetroError> {
        self.0.add_insert(time & !1, value)
    }

    fn add_delete_min(&mut self, time: u64) -> Result<(), RetroError> {
        self.0.add_delete_min(time & !1)
    }

    fn remove(&mut self, time: u64) -> Result<(), RetroError> {
        self.0.remove(time & !1)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

pub fn bench_all_insert_remove<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_edits::<RetroactivePriorityQueue<u64, u64>, _>(group, "treap", false, usize::MAX);
    bench_edits::<ReplayQueue, _>(group, "replay", false, REPLAY_MAX_SIZE);
}

pub fn bench_all_delete_min_remove<T>(group: &mut BenchmarkGroup<'_, T>)
where
    T: Measurement<Value = Duration>,
{
    bench_edits::<RetroactivePriorityQueue<u64, u64>, _>(group, "treap", true, usize::MAX);
    bench_edits::<ReplayQueue, _>(group, "replay", true, REPLAY_MAX_SIZE);
}
