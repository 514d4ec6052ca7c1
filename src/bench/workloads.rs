//! Workload catalog
//!
//! Each workload has a sequential path and a parallel path that produce
//! equivalent output. The parallel paths dispatch through a
//! [`WorkerPool`] and time themselves, since pool construction is part
//! of what they pay for.

use std::f64::consts::PI;
use std::num::IntErrorKind;
use std::ops::RangeInclusive;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::bench::cancel::CancellationToken;
use crate::bench::pool::WorkerPool;
use crate::bench::timer::try_measure;
use crate::config::HarnessConfig;
use crate::{ParbenchError, Result};

/// Symbols allowed in the local part of a generated email
pub const EMAIL_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";
/// Length of the local part
pub const EMAIL_LOCAL_LEN: usize = 8;
/// Fixed domain suffix
pub const EMAIL_DOMAIN: &str = "@mail.ru";

/// Radii benchmarked by default
pub const DEFAULT_RADII: RangeInclusive<u32> = 10..=100;

// ---------------------------------------------------------------------------
// Circle areas

/// Area of a circle of `radius`
pub fn circle_area(radius: u32) -> f64 {
    let r = radius as f64;
    PI * r * r
}

/// Lazy, restartable sequence of areas for radii 10..=100
pub fn circle_areas() -> impl Iterator<Item = f64> + Clone {
    circle_areas_in(DEFAULT_RADII)
}

/// Lazy, restartable sequence of areas over `radii`, in order
pub fn circle_areas_in(radii: RangeInclusive<u32>) -> impl Iterator<Item = f64> + Clone {
    radii.map(circle_area)
}

/// Areas over `radii` computed on `pool`, in radius order
pub fn parallel_circle_areas(radii: RangeInclusive<u32>, pool: &WorkerPool) -> Result<Vec<f64>> {
    pool.map(radii.collect::<Vec<u32>>(), circle_area)
}

// ---------------------------------------------------------------------------
// Email generation

/// Build one address from `rng`: 8 symbols of [`EMAIL_ALPHABET`] then [`EMAIL_DOMAIN`]
pub fn generate_email<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut email = String::with_capacity(EMAIL_LOCAL_LEN + EMAIL_DOMAIN.len());
    for _ in 0..EMAIL_LOCAL_LEN {
        let idx = rng.gen_range(0..EMAIL_ALPHABET.len());
        email.push(EMAIL_ALPHABET[idx] as char);
    }
    email.push_str(EMAIL_DOMAIN);
    email
}

/// Whether `email` has the generated shape
pub fn is_valid_email(email: &str) -> bool {
    match email.strip_suffix(EMAIL_DOMAIN) {
        Some(local) => {
            local.len() == EMAIL_LOCAL_LEN && local.bytes().all(|b| EMAIL_ALPHABET.contains(&b))
        }
        None => false,
    }
}

/// Infinite stream of random addresses drawn from an owned random source
pub struct EmailGenerator<R> {
    rng: R,
}

impl EmailGenerator<SmallRng> {
    /// Generator seeded from system entropy
    pub fn from_entropy() -> Self {
        Self::new(SmallRng::from_entropy())
    }

    /// Deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> EmailGenerator<R> {
    /// Generator drawing from `rng`
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Iterator for EmailGenerator<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(generate_email(&mut self.rng))
    }
}

/// Generate `count` addresses on `pool`, one contiguous batch per worker.
/// Each batch owns an [`EmailGenerator`]; with a seed, batch `b` is seeded
/// with `seed + b`, so output is reproducible for a fixed worker count.
pub fn parallel_emails(count: usize, seed: Option<u64>, pool: &WorkerPool) -> Result<Vec<String>> {
    let batches = pool.threads().min(count).max(1);
    let base = count / batches;
    let extra = count % batches;
    let jobs: Vec<(u64, usize)> = (0..batches)
        .map(|b| (b as u64, base + usize::from(b < extra)))
        .collect();

    let emails = pool.map(jobs, move |(batch, len)| {
        let generator = match seed {
            Some(seed) => EmailGenerator::seeded(seed.wrapping_add(batch)),
            None => EmailGenerator::from_entropy(),
        };
        generator.take(len).collect::<Vec<_>>()
    })?;
    Ok(emails.into_iter().flatten().collect())
}

// ---------------------------------------------------------------------------
// Two-digit magnitude filter

/// Retention predicate: |n| in 10..=99
pub fn is_two_digit(n: i64) -> bool {
    (10..=99).contains(&n.unsigned_abs())
}

/// Parse whitespace-separated signed integers. Empty input yields no numbers.
/// Integers beyond the `i64` range are skipped, since no filter can keep them.
pub fn parse_numbers(input: &str) -> Result<Vec<i64>> {
    let mut numbers = Vec::new();
    for (position, token) in input.split_whitespace().enumerate() {
        match token.parse::<i64>() {
            Ok(n) => numbers.push(n),
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {}
            Err(_) => {
                return Err(ParbenchError::Parse {
                    token: token.to_string(),
                    position,
                })
            }
        }
    }
    Ok(numbers)
}

/// Keep, in order, the integers of `input` whose magnitude has two digits
pub fn filter_two_digit(input: &str) -> Result<Vec<i64>> {
    let numbers = parse_numbers(input)?;
    Ok(numbers.into_iter().filter(|&n| is_two_digit(n)).collect())
}

/// Same as [`filter_two_digit`], evaluating the predicate on `pool`
pub fn parallel_filter_two_digit(input: &str, pool: &WorkerPool) -> Result<Vec<i64>> {
    let numbers = parse_numbers(input)?;
    let mask = pool.map(numbers.clone(), is_two_digit)?;
    Ok(numbers
        .into_iter()
        .zip(mask)
        .filter_map(|(n, keep)| keep.then_some(n))
        .collect())
}

/// `count` space-separated integers drawn uniformly from [-bound, bound]
pub fn random_number_string<R: Rng + ?Sized>(count: usize, bound: i64, rng: &mut R) -> String {
    (0..count)
        .map(|_| rng.gen_range(-bound..=bound).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Catalog

/// One benchmarked computation with its canonical input
pub trait Workload: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Run the sequential path over the canonical input
    fn run_sequential(&self) -> Result<()>;

    /// Run the parallel path over the canonical input and return its own duration
    fn run_parallel(&self, cancel: &CancellationToken) -> Result<Duration>;
}

/// Circle areas over a radius range
#[derive(Debug, Clone)]
pub struct CircleAreas {
    radii: RangeInclusive<u32>,
    threads: Option<usize>,
}

impl CircleAreas {
    /// Workload over `radii`; `threads` of `None` sizes the pool to the host
    pub fn new(radii: RangeInclusive<u32>, threads: Option<usize>) -> Self {
        Self { radii, threads }
    }
}

impl Workload for CircleAreas {
    fn name(&self) -> &str {
        "Circle areas"
    }

    fn run_sequential(&self) -> Result<()> {
        let areas: Vec<f64> = circle_areas_in(self.radii.clone()).collect();
        debug!(count = areas.len(), "sequential circle areas");
        Ok(())
    }

    fn run_parallel(&self, cancel: &CancellationToken) -> Result<Duration> {
        let timed = try_measure(|| {
            let pool = WorkerPool::compute()
                .with_threads(self.threads)
                .with_cancellation(cancel.clone());
            parallel_circle_areas(self.radii.clone(), &pool)
        })?;
        debug!(count = timed.value.len(), "parallel circle areas");
        Ok(timed.elapsed)
    }
}

/// Random email generation
#[derive(Debug, Clone)]
pub struct EmailGeneration {
    count: usize,
    seed: Option<u64>,
    threads: Option<usize>,
}

impl EmailGeneration {
    /// Workload generating `count` addresses per path
    pub fn new(count: usize, seed: Option<u64>, threads: Option<usize>) -> Self {
        Self { count, seed, threads }
    }
}

impl Workload for EmailGeneration {
    fn name(&self) -> &str {
        "Email generation"
    }

    fn run_sequential(&self) -> Result<()> {
        let emails: Vec<String> = match self.seed {
            Some(seed) => EmailGenerator::seeded(seed).take(self.count).collect(),
            None => EmailGenerator::from_entropy().take(self.count).collect(),
        };
        debug!(count = emails.len(), "sequential emails");
        Ok(())
    }

    fn run_parallel(&self, cancel: &CancellationToken) -> Result<Duration> {
        let timed = try_measure(|| {
            let pool = WorkerPool::threaded()
                .with_threads(self.threads)
                .with_cancellation(cancel.clone());
            parallel_emails(self.count, self.seed, &pool)
        })?;
        debug!(count = timed.value.len(), "parallel emails");
        Ok(timed.elapsed)
    }
}

/// Two-digit magnitude filter over a fixed input string
#[derive(Debug, Clone)]
pub struct MagnitudeFilter {
    input: String,
    threads: Option<usize>,
}

impl MagnitudeFilter {
    /// Workload filtering the fixed `input` string
    pub fn new(input: impl Into<String>, threads: Option<usize>) -> Self {
        Self {
            input: input.into(),
            threads,
        }
    }

    /// The input string both paths filter
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Workload for MagnitudeFilter {
    fn name(&self) -> &str {
        "Magnitude filter"
    }

    fn run_sequential(&self) -> Result<()> {
        let kept = filter_two_digit(&self.input)?;
        debug!(kept = kept.len(), "sequential filter");
        Ok(())
    }

    fn run_parallel(&self, cancel: &CancellationToken) -> Result<Duration> {
        let timed = try_measure(|| {
            let pool = WorkerPool::compute()
                .with_threads(self.threads)
                .with_cancellation(cancel.clone());
            parallel_filter_two_digit(&self.input, &pool)
        })?;
        debug!(kept = timed.value.len(), "parallel filter");
        Ok(timed.elapsed)
    }
}

/// Ordered set of workloads run by the benchmark runner
#[derive(Default)]
pub struct WorkloadCatalog {
    workloads: Vec<Box<dyn Workload>>,
}

impl WorkloadCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The three standard workloads built from `config`
    pub fn standard(config: &HarnessConfig) -> Self {
        let filter_input = match config.seed {
            Some(seed) => random_number_string(
                config.filter_token_count,
                config.filter_value_bound,
                &mut SmallRng::seed_from_u64(seed),
            ),
            None => random_number_string(
                config.filter_token_count,
                config.filter_value_bound,
                &mut rand::thread_rng(),
            ),
        };

        Self::new()
            .with(CircleAreas::new(
                config.radius_min..=config.radius_max,
                config.worker_threads,
            ))
            .with(EmailGeneration::new(
                config.email_count,
                config.seed,
                config.worker_threads,
            ))
            .with(MagnitudeFilter::new(filter_input, config.worker_threads))
    }

    /// Append a workload
    pub fn with(mut self, workload: impl Workload + 'static) -> Self {
        self.workloads.push(Box::new(workload));
        self
    }

    /// Number of workloads
    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    /// Whether the catalog holds no workloads
    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    /// Workload names in run order
    pub fn names(&self) -> Vec<&str> {
        self.workloads.iter().map(|w| w.name()).collect()
    }

    /// Workloads in run order
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Workload + 'static)> {
        self.workloads.iter().map(|w| w.as_ref())
    }
}
