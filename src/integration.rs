//! Integration module for connecting detection-and-tracking backends with the
//! augmentation stages.
//!
//! This module provides the [`TrackSource`] trait any detector plus tracker can
//! implement, a builder for per-frame tracker output, and the end-to-end
//! [`MatchAnalyzer`].

mod builder;
mod pipeline;
mod source;

pub use builder::{BoxFormat, FrameDetectionsBuilder};
pub use pipeline::{MatchAnalysis, MatchAnalyzer};
pub use source::{RecordedSource, TrackSource};
