// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod container;
mod error_log;
mod record;
mod transfer;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "errata-model";

pub use container::{
    origin_file_name, Analysis, AnalysisParent, Container, ContainerRef, ContainerType, FileEntry,
    SubjectRef, ERROR_LOG_SUFFIX, ERROR_TAG,
};
pub use error_log::{EntryKind, ErrorLogEntry, MISSING_SCHEMA_MESSAGE, SKIP_MESSAGE};
pub use record::{ErrorRecord, CSV_COLUMNS};
pub use transfer::{SessionKey, TransferRow, COL_MODALITY_DATE, COL_SESSION, COL_SUBJECT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelError(pub String);

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ModelError {}
