//! Timing-isolation bencher and the registry of benchmark cases.
//!
//! A case body receives a [`Bencher`] and measures exactly one primitive
//! through one of its entry points:
//!
//! * [`Bencher::iter`] times the whole routine.
//! * [`Bencher::iter_isolated`] builds fresh inputs with the timer paused,
//!   then times the routine alone.
//! * [`Bencher::iter_with_state`] does the same against state that outlives
//!   the loop, such as a scheme with its table already loaded.
//!
//! Inputs and outputs are dropped after the timer stops.

use std::fmt;
use std::hint::black_box;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{LheError, Result};
use crate::report::CaseReport;
use crate::storage::TableStorage;
use crate::timer::{Clock, Stopwatch};

/// Which preparation steps are kept out of the timed region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Isolation {
    /// Nothing is excluded.
    Whole,
    /// Fresh instance, key pair and operands are built per iteration while paused.
    PerIteration,
    /// State is prepared once before the loop, per-iteration inputs while paused.
    SharedState,
}

impl Isolation {
    /// Stable lowercase name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Isolation::Whole => "whole",
            Isolation::PerIteration => "per-iteration",
            Isolation::SharedState => "shared-state",
        }
    }
}

impl fmt::Display for Isolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a case body gets to work with.
pub struct CaseContext<'a, P> {
    /// Source of fresh scheme instances.
    pub provider: &'a P,
    /// Where the precomputed decryption table is kept.
    pub storage: &'a dyn TableStorage,
}

/// Runs a fixed number of iterations and records one sample per iteration.
pub struct Bencher<'c> {
    watch: Stopwatch<'c>,
    iterations: u64,
    samples: Vec<Duration>,
    mode: Option<Isolation>,
}

impl<'c> Bencher<'c> {
    /// Bencher that records `iterations` samples against `clock`.
    pub fn new(clock: &'c dyn Clock, iterations: u64) -> Self {
        Self {
            watch: Stopwatch::paused(clock),
            iterations,
            samples: Vec::with_capacity(iterations as usize),
            mode: None,
        }
    }

    /// Number of samples each entry point must produce.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Time `routine` in full on every iteration.
    pub fn iter<O, R>(&mut self, mut routine: R) -> Result<()>
    where
        R: FnMut() -> Result<O>,
    {
        self.mode = Some(Isolation::Whole);
        for _ in 0..self.iterations {
            self.watch.resume();
            let output = routine()?;
            self.samples.push(self.watch.lap());
            drop(black_box(output));
        }
        Ok(())
    }

    /// Build a fresh input with the timer paused, then time `routine` on it.
    pub fn iter_isolated<I, O, S, R>(&mut self, mut setup: S, mut routine: R) -> Result<()>
    where
        S: FnMut() -> Result<I>,
        R: FnMut(&I) -> Result<O>,
    {
        self.run_paused(
            Isolation::PerIteration,
            &mut (),
            |_| setup(),
            |_, input| routine(input),
        )
    }

    /// Like [`Bencher::iter_isolated`], with `state` prepared once by the caller.
    pub fn iter_with_state<St, I, O, S, R>(
        &mut self,
        state: &mut St,
        setup: S,
        routine: R,
    ) -> Result<()>
    where
        S: FnMut(&mut St) -> Result<I>,
        R: FnMut(&St, &I) -> Result<O>,
    {
        self.run_paused(Isolation::SharedState, state, setup, routine)
    }

    fn run_paused<St, I, O, S, R>(
        &mut self,
        mode: Isolation,
        state: &mut St,
        mut setup: S,
        mut routine: R,
    ) -> Result<()>
    where
        S: FnMut(&mut St) -> Result<I>,
        R: FnMut(&St, &I) -> Result<O>,
    {
        self.mode = Some(mode);
        for _ in 0..self.iterations {
            debug_assert!(!self.watch.is_running());
            let input = setup(state)?;
            self.watch.resume();
            let output = routine(state, &input)?;
            self.samples.push(self.watch.lap());
            drop(black_box((output, input)));
        }
        Ok(())
    }

    fn finish(self) -> (Option<Isolation>, Vec<Duration>) {
        (self.mode, self.samples)
    }
}

type CaseFn<P> = Box<dyn Fn(&mut Bencher<'_>, &CaseContext<'_, P>) -> Result<()>>;

/// A named primitive bound to an iteration count and an isolation protocol.
pub struct CaseDescriptor<P> {
    name: String,
    iterations: u64,
    isolation: Isolation,
    body: CaseFn<P>,
}

impl<P> CaseDescriptor<P> {
    /// Case name, unique within a registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Samples recorded by [`CaseDescriptor::run`].
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// How setup is kept out of the timed region.
    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Run the body for `iterations` and return the per-iteration samples.
    ///
    /// Fails if the body measured with a different protocol than the one it
    /// was registered with, or recorded the wrong number of samples.
    pub fn measure(
        &self,
        ctx: &CaseContext<'_, P>,
        clock: &dyn Clock,
        iterations: u64,
    ) -> Result<Vec<Duration>> {
        let mut bencher = Bencher::new(clock, iterations);
        (self.body)(&mut bencher, ctx)?;
        let (mode, samples) = bencher.finish();

        if mode != Some(self.isolation) {
            return Err(LheError::ProtocolMismatch {
                case: self.name.clone(),
                expected: self.isolation.as_str(),
                found: mode.map_or("nothing", |m| m.as_str()),
            });
        }
        if samples.len() as u64 != iterations {
            return Err(LheError::IterationMismatch {
                case: self.name.clone(),
                expected: iterations,
                found: samples.len() as u64,
            });
        }
        Ok(samples)
    }

    /// Measure the registered iteration count and summarize it.
    pub fn run(&self, ctx: &CaseContext<'_, P>, clock: &dyn Clock) -> Result<CaseReport> {
        info!(
            case = %self.name,
            iterations = self.iterations,
            isolation = %self.isolation,
            "running case"
        );
        let samples = self.measure(ctx, clock, self.iterations)?;
        let report = CaseReport::from_samples(&self.name, self.isolation, &samples);
        debug!(case = %self.name, mean = ?report.mean, total = ?report.total, "case finished");
        Ok(report)
    }
}

/// Ordered set of cases, built at startup and read-only while running.
pub struct CaseRegistry<P> {
    cases: Vec<CaseDescriptor<P>>,
}

impl<P> Default for CaseRegistry<P> {
    fn default() -> Self {
        Self { cases: Vec::new() }
    }
}

impl<P> CaseRegistry<P> {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a case. A case with the same name is replaced in place.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        iterations: u64,
        isolation: Isolation,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&mut Bencher<'_>, &CaseContext<'_, P>) -> Result<()> + 'static,
    {
        let case = CaseDescriptor {
            name: name.into(),
            iterations,
            isolation,
            body: Box::new(body),
        };
        match self.cases.iter_mut().find(|c| c.name == case.name) {
            Some(slot) => *slot = case,
            None => self.cases.push(case),
        }
        self
    }

    /// Unregister a case by name.
    pub fn remove(&mut self, name: &str) -> Option<CaseDescriptor<P>> {
        let pos = self.cases.iter().position(|c| c.name == name)?;
        Some(self.cases.remove(pos))
    }

    /// Look up a case by name.
    pub fn get(&self, name: &str) -> Option<&CaseDescriptor<P>> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Cases in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CaseDescriptor<P>> {
        self.cases.iter()
    }

    /// Case names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.name()).collect()
    }

    /// Number of registered cases.
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether no case is registered.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Run every case in registration order. The first failure aborts the run.
    pub fn run_all(&self, ctx: &CaseContext<'_, P>, clock: &dyn Clock) -> Result<Vec<CaseReport>> {
        self.cases.iter().map(|case| case.run(ctx, clock)).collect()
    }
}
