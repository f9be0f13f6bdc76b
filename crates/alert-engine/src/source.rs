// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Data source boundary.
//!
//! The [`StateSource`] trait abstracts over upstream aircraft tracking
//! providers. An implementation issues a bounding-box query and returns the
//! state reports found inside it. An area with no traffic is a successful,
//! empty result rather than an error.

use std::future::Future;

use thiserror::Error;

use crate::geo::BoundingBox;
use crate::report::AircraftStateReport;

/// Errors a data source can report for a single query.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The provider refused the request because the caller exceeded its quota.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Transport or HTTP-level failure.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// The response could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Trait for fetching aircraft state reports inside a bounding box.
pub trait StateSource {
    /// Fetch all state reports currently inside `bbox`.
    fn fetch(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = Result<Vec<AircraftStateReport>, SourceError>>;
}
