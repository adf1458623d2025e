// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod http;
mod memory;

use errata_model::{Analysis, Container, ContainerType};
use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "errata-platform";

pub use http::HttpPlatform;
pub use memory::{MemoryPlatform, Mutation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlatformErrorCode {
    NotFound,
    Conflict,
    Network,
    Decode,
    Internal,
}

impl PlatformErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Network => "network_error",
            Self::Decode => "decode_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError {
    pub code: PlatformErrorCode,
    pub message: String,
}

impl PlatformError {
    #[must_use]
    pub fn new(code: PlatformErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(PlatformErrorCode::NotFound, message)
    }

    /// True for the outcomes a best-effort delete is allowed to swallow.
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(
            self.code,
            PlatformErrorCode::NotFound | PlatformErrorCode::Conflict
        )
    }
}

impl Display for PlatformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for PlatformError {}

/// Minimal platform contract the audit core requires. The platform is the
/// system of record; every call is a blocking request with no internal
/// retries, and failures propagate to the caller.
pub trait Platform {
    /// Root of the frontend the report links into.
    fn site_url(&self) -> String;

    fn get_container(&self, id: &str) -> Result<Container, PlatformError>;

    fn get_analysis(&self, id: &str) -> Result<Analysis, PlatformError>;

    /// Children of one type under a parent, optionally narrowed to those
    /// carrying a tag.
    fn list_children(
        &self,
        parent_type: ContainerType,
        parent_id: &str,
        child_type: ContainerType,
        tag: Option<&str>,
    ) -> Result<Vec<Container>, PlatformError>;

    fn read_file(&self, container_id: &str, name: &str) -> Result<Vec<u8>, PlatformError>;

    fn delete_file(&self, container_id: &str, name: &str) -> Result<(), PlatformError>;

    fn add_tag(&self, container_id: &str, tag: &str) -> Result<(), PlatformError>;

    fn delete_tag(&self, container_id: &str, tag: &str) -> Result<(), PlatformError>;

    fn update_analysis_label(
        &self,
        parent: &Container,
        analysis_id: &str,
        label: &str,
    ) -> Result<(), PlatformError>;
}
