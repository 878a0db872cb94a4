// src/context.rs
use crate::bloodline::ReferenceSet;
use crate::config::AppOptions;
use crate::error::Result;
use crate::labels::{PositionLabel, labels};

/// Read-only inputs shared by every race in a run. Built once at start-up.
pub struct Context {
    pub options: AppOptions,
    pub reference: ReferenceSet,
    pub labels: &'static [PositionLabel],
}

impl Context {
    pub fn new(options: AppOptions, reference: ReferenceSet) -> Self {
        Self { options, reference, labels: labels() }
    }

    /// Load the reference list named in `options`.
    pub fn load(options: AppOptions) -> Result<Self> {
        let reference = ReferenceSet::load(&options.data.bloodlines)?;
        if reference.is_empty() {
            tracing::warn!("reference bloodline list is empty; nothing will match");
        }
        Ok(Self::new(options, reference))
    }
}
