//! Progress signals: the pluggable source of category completion percentages.
//!
//! The coordinator consults its signal after every accepted send and applies whatever
//! percentages it reports through `CategoryModel::set_progress`. The default signal reports
//! nothing, so progress only moves when a caller sets it explicitly.

use crate::intake::category::Category;
use crate::intake::conversation::Message;

/// A single progress reading for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub category: String,
    pub progress: i64,
}

pub trait ProgressSignal: Send + Sync {
    fn assess(&self, categories: &[Category], transcript: &[Message]) -> Vec<ProgressUpdate>;
}

/// Reports no progress. Completion is driven only by explicit `set_progress` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualProgress;

impl ProgressSignal for ManualProgress {
    fn assess(&self, _categories: &[Category], _transcript: &[Message]) -> Vec<ProgressUpdate> {
        Vec::new()
    }
}
