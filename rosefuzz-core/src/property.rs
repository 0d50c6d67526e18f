//! Properties and the runner that searches for minimal counterexamples.
//!
//! A run draws `count` samples with a growing size. The first sample the
//! predicate rejects is shrunk by greedy descent: at each level the first
//! failing child is taken and the search continues from it, until no
//! child fails. Every failure along the way is recorded; the last one is
//! the smallest.

use crate::data::{Config, Seed};
use crate::error::Result;
use crate::fuzz::Fuzz;
use crate::tree::Tree;
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use thiserror::Error;

/// Why a predicate rejected its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The predicate returned `false`.
    #[error("property returned false")]
    Falsified,

    /// The predicate returned an error.
    #[error("{0}")]
    Error(String),

    /// The predicate panicked.
    #[error("panicked: {0}")]
    Panic(String),
}

/// The outcome of running a predicate once.
pub type Outcome = std::result::Result<(), Failure>;

/// Values a predicate may return.
pub trait Testable {
    fn into_outcome(self) -> Outcome;
}

impl Testable for bool {
    fn into_outcome(self) -> Outcome {
        if self {
            Ok(())
        } else {
            Err(Failure::Falsified)
        }
    }
}

impl Testable for () {
    fn into_outcome(self) -> Outcome {
        Ok(())
    }
}

impl<E: fmt::Display> Testable for std::result::Result<(), E> {
    fn into_outcome(self) -> Outcome {
        self.map_err(|error| Failure::Error(error.to_string()))
    }
}

/// One failing input found during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureCase<T> {
    pub args: T,
    pub error: Failure,
    /// Shrink depth; the first failure found is at depth 0.
    pub depth: u32,
}

/// The result of running a property.
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    /// The seed the run started from. Pass it back through
    /// [`Config::with_seed`] to replay the run.
    pub seed: u32,
    pub tests_run: usize,
    /// Failures in the order they were found, shallowest first.
    pub failures: Vec<FailureCase<T>>,
    pub property_name: Option<String>,
}

impl<T> Report<T> {
    pub fn new(seed: u32) -> Self {
        Report {
            seed,
            tests_run: 0,
            failures: Vec::new(),
            property_name: None,
        }
    }

    pub fn record(&mut self, failure: FailureCase<T>) {
        self.failures.push(failure);
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The last failure recorded, which is the deepest shrink reached.
    pub fn smallest_failure(&self) -> Option<&FailureCase<T>> {
        self.failures.last()
    }
}

impl<T: fmt::Debug> fmt::Display for Report<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prop_name = self.property_name.as_deref().unwrap_or("property");

        let Some(smallest) = self.smallest_failure() else {
            return write!(f, "  ✓ {} passed {} tests.", prop_name, self.tests_run);
        };

        writeln!(
            f,
            "  ✗ {} failed after {} tests and {} shrinks.",
            prop_name, self.tests_run, smallest.depth
        )?;

        writeln!(f)?;
        writeln!(f, "    Shrinking progression:")?;
        for case in &self.failures {
            if case.depth == 0 {
                writeln!(f, "      │ Original: {:?}", case.args)?;
            } else {
                writeln!(f, "      │ Step {}: {:?}", case.depth, case.args)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "    === {} ===", smallest.error)?;
        writeln!(f, "    Minimal counterexample: {:?}", smallest.args)?;
        write!(f, "    Seed: {}", self.seed)
    }
}

type Check<U> = Rc<dyn Fn(U) -> LocalBoxFuture<'static, Outcome>>;

/// A generator paired with a predicate over its values.
pub struct Property<T, U = T> {
    fuzz: Fuzz<T, U>,
    check: Check<U>,
    name: Option<String>,
}

impl<T, U> Clone for Property<T, U> {
    fn clone(&self) -> Self {
        Property {
            fuzz: self.fuzz.clone(),
            check: Rc::clone(&self.check),
            name: self.name.clone(),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl<T, U> Property<T, U>
where
    T: Clone + 'static,
    U: Clone + fmt::Debug + 'static,
{
    /// Create a property from a synchronous predicate.
    ///
    /// Panics inside the predicate are caught and recorded as failures.
    pub fn new<F, R>(fuzz: Fuzz<T, U>, predicate: F) -> Self
    where
        F: Fn(U) -> R + 'static,
        R: Testable,
    {
        let check: Check<U> = Rc::new(move |value: U| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| predicate(value).into_outcome()))
                .unwrap_or_else(|payload| Err(Failure::Panic(panic_message(payload))));
            future::ready(outcome).boxed_local()
        });

        Property {
            fuzz,
            check,
            name: None,
        }
    }

    /// Create a property from an asynchronous predicate.
    ///
    /// Each call is awaited to completion before the next one starts.
    pub fn new_async<F, Fut>(fuzz: Fuzz<T, U>, predicate: F) -> Self
    where
        F: Fn(U) -> Fut + 'static,
        Fut: Future + 'static,
        Fut::Output: Testable,
    {
        let check: Check<U> = Rc::new(move |value: U| {
            match panic::catch_unwind(AssertUnwindSafe(|| predicate(value))) {
                Ok(pending) => AssertUnwindSafe(pending)
                    .catch_unwind()
                    .map(|result| match result {
                        Ok(testable) => testable.into_outcome(),
                        Err(payload) => Err(Failure::Panic(panic_message(payload))),
                    })
                    .boxed_local(),
                Err(payload) => future::ready(Err(Failure::Panic(panic_message(payload)))).boxed_local(),
            }
        });

        Property {
            fuzz,
            check,
            name: None,
        }
    }

    /// Name the property in its report.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Run the property to completion on the current thread.
    ///
    /// Synchronous predicates never suspend, so the run finishes on its
    /// first poll and no executor is entered. This lets `run` be called
    /// from inside another property's predicate. Only async predicates
    /// that actually suspend fall back to `block_on`.
    pub fn run(&self, config: &Config) -> Result<Report<U>> {
        let mut pending = Box::pin(self.run_async(config));
        match (&mut pending).now_or_never() {
            Some(report) => report,
            None => futures::executor::block_on(pending),
        }
    }

    /// Run the property, awaiting each predicate call in turn.
    ///
    /// Fails only when generation fails, for example when a filter
    /// exhausts its retry budget. Predicate failures end up in the report.
    pub async fn run_async(&self, config: &Config) -> Result<Report<U>> {
        config.validate()?;

        let initial = config.initial_seed();
        let mut seed = Seed::from_u32(initial);
        let mut report = Report::new(initial);
        report.property_name = self.name.clone();

        let trees = self.fuzz.to_random_rose_tree();

        for index in 0..config.count {
            let size = config.size_for(index);
            let (next, sample_seed) = seed.split();
            seed = next;

            let (tree, _) = trees.sample(size, sample_seed)?;
            report.tests_run += 1;
            tracing::trace!(index, size = size.get(), value = ?tree.value(), "sampled");

            if let Err(error) = (self.check)(tree.value().clone()).await {
                tracing::debug!(
                    tests_run = report.tests_run,
                    value = ?tree.value(),
                    %error,
                    "property failed, shrinking"
                );
                report.record(FailureCase {
                    args: tree.value().clone(),
                    error,
                    depth: 0,
                });
                self.shrink(tree, &mut report).await;
                break;
            }
        }

        Ok(report)
    }

    async fn shrink(&self, tree: Tree<T, U>, report: &mut Report<U>) {
        let mut current = tree;
        let mut depth = 0;

        'descent: loop {
            for child in current.children() {
                if let Err(error) = (self.check)(child.value().clone()).await {
                    depth += 1;
                    tracing::debug!(depth, value = ?child.value(), "shrink step");
                    report.record(FailureCase {
                        args: child.value().clone(),
                        error,
                        depth,
                    });
                    current = child;
                    continue 'descent;
                }
            }
            break;
        }
    }
}

/// Create a property for a generator and predicate.
pub fn property<T, U, F, R>(fuzz: Fuzz<T, U>, predicate: F) -> Property<T, U>
where
    T: Clone + 'static,
    U: Clone + fmt::Debug + 'static,
    F: Fn(U) -> R + 'static,
    R: Testable,
{
    Property::new(fuzz, predicate)
}

/// Create a property for a generator and asynchronous predicate.
pub fn property_async<T, U, F, Fut>(fuzz: Fuzz<T, U>, predicate: F) -> Property<T, U>
where
    T: Clone + 'static,
    U: Clone + fmt::Debug + 'static,
    F: Fn(U) -> Fut + 'static,
    Fut: Future + 'static,
    Fut::Output: Testable,
{
    Property::new_async(fuzz, predicate)
}
