//! Sequential pipeline runner.
//!
//! A [`Pipeline`] stamps row identifiers onto its input, initializes the
//! run's ledger, then threads the dataset through every step in order.
//!
//! # Run states
//!
//! `NotStarted -> Running -> Completed`, or `Running -> Failed` as soon as a
//! step returns an error. There is no retry and no skip-and-continue at the
//! step level; fault isolation happens only inside row functions.
//!
//! # Example
//!
//! ```ignore
//! use rowtrace_core::{MetadataLedger, Pipeline, transforms::GrowthRate};
//!
//! let ledger = MetadataLedger::new();
//! let mut pipeline = Pipeline::builder(ledger.clone())
//!     .tracked(GrowthRate::new("growth_rate"))
//!     .build();
//! let result = pipeline.run(&df)?;
//! ```

use polars::prelude::DataFrame;
use tracing::{error, info, info_span};

use crate::error::Result;
use crate::identity::{IdentityOptions, assign_row_ids_with};
use crate::instrument::Tracked;
use crate::ledger::MetadataLedger;
use crate::transformation::{DatasetTransformation, StepContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
    Completed,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// An ordered list of dataset transformations bound to one ledger.
pub struct Pipeline {
    steps: Vec<Box<dyn DatasetTransformation>>,
    ledger: MetadataLedger,
    identity: IdentityOptions,
    state: RunState,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("ledger", &self.ledger)
            .field("identity", &self.identity)
            .field("state", &self.state)
            .finish()
    }
}

impl Pipeline {
    /// Compose `steps` into a runnable pipeline writing into `ledger`.
    pub fn build(steps: Vec<Box<dyn DatasetTransformation>>, ledger: MetadataLedger) -> Self {
        Self {
            steps,
            ledger,
            identity: IdentityOptions::default(),
            state: RunState::NotStarted,
        }
    }

    pub fn builder(ledger: MetadataLedger) -> PipelineBuilder {
        PipelineBuilder::new(ledger)
    }

    #[must_use]
    pub fn with_identity(mut self, identity: IdentityOptions) -> Self {
        self.identity = identity;
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn ledger(&self) -> &MetadataLedger {
        &self.ledger
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step over `df`.
    ///
    /// # Errors
    ///
    /// Returns the first step error unchanged; the pipeline is then in the
    /// [`RunState::Failed`] state and the ledger holds whatever the steps
    /// before the failure recorded.
    pub fn run(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let span = info_span!("pipeline", steps = self.steps.len(), input_rows = df.height());
        let _guard = span.enter();

        self.state = RunState::Running;
        match self.execute(df) {
            Ok(result) => {
                self.state = RunState::Completed;
                info!(
                    output_rows = result.height(),
                    errors = self.ledger.get_errors().len(),
                    "pipeline completed"
                );
                Ok(result)
            }
            Err(err) => {
                self.state = RunState::Failed;
                error!(error = %err, "pipeline failed");
                Err(err)
            }
        }
    }

    fn execute(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = assign_row_ids_with(df, &self.identity)?;
        self.ledger.initialize(&current)?;
        for step in &self.steps {
            let ctx = StepContext::new(&self.ledger, step.name());
            current = step.apply(current, &ctx)?;
        }
        Ok(current)
    }
}

/// Incremental construction of a [`Pipeline`].
pub struct PipelineBuilder {
    steps: Vec<Box<dyn DatasetTransformation>>,
    ledger: MetadataLedger,
    identity: IdentityOptions,
}

impl PipelineBuilder {
    pub fn new(ledger: MetadataLedger) -> Self {
        Self {
            steps: Vec::new(),
            ledger,
            identity: IdentityOptions::default(),
        }
    }

    /// Add a step as-is.
    #[must_use]
    pub fn step(mut self, step: impl DatasetTransformation + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step wrapped in [`Tracked`] with the pipeline's ledger.
    #[must_use]
    pub fn tracked(mut self, step: impl DatasetTransformation + 'static) -> Self {
        self.steps
            .push(Box::new(Tracked::new(step, self.ledger.clone())));
        self
    }

    #[must_use]
    pub fn identity(mut self, identity: IdentityOptions) -> Self {
        self.identity = identity;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline::build(self.steps, self.ledger).with_identity(self.identity)
    }
}
