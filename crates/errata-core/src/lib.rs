// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod aggregate;
mod enrich;
mod evaluate;
mod events;
mod lookup;
mod reconcile;
mod schema_check;
mod traverse;

use errata_platform::PlatformError;
use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "errata-core";

pub use aggregate::{collect_errors, resolve_container_errors, CollectOptions};
pub use enrich::{add_container_info, frontend_url, resolver_path};
pub use evaluate::evaluate_entry;
pub use events::{fields, AuditEvent, AuditEventKind, AuditLog};
pub use lookup::resolve;
pub use reconcile::{
    missing_session_record, reconcile, session_key, unexpected_session_record, Reconciliation,
    DEFAULT_MODALITY,
};
pub use schema_check::schema_errors;
pub use traverse::{collect_plan, find_flagged, CollectPlan, Scope};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExitCode {
    Success = 0,
    Usage = 2,
    Validation = 3,
    DependencyFailure = 4,
    Internal = 10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuditErrorCode {
    InvalidScope,
    InvalidParent,
    Validation,
    DecodeLog,
    Platform,
    Internal,
}

impl AuditErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidScope => "invalid_scope",
            Self::InvalidParent => "invalid_parent",
            Self::Validation => "validation_error",
            Self::DecodeLog => "decode_error",
            Self::Platform => "platform_error",
            Self::Internal => "internal_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditError {
    pub code: AuditErrorCode,
    pub message: String,
}

impl AuditError {
    #[must_use]
    pub fn new(code: AuditErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.code {
            AuditErrorCode::InvalidScope | AuditErrorCode::InvalidParent => ExitCode::Usage,
            AuditErrorCode::Validation | AuditErrorCode::DecodeLog => ExitCode::Validation,
            AuditErrorCode::Platform => ExitCode::DependencyFailure,
            AuditErrorCode::Internal => ExitCode::Internal,
        }
    }
}

impl Display for AuditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AuditError {}

impl From<PlatformError> for AuditError {
    fn from(value: PlatformError) -> Self {
        Self::new(AuditErrorCode::Platform, value.to_string())
    }
}
