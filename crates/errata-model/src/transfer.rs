// SPDX-License-Identifier: Apache-2.0

use crate::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Transfer-log column holding the subject code.
pub const COL_SUBJECT: &str = "Subject";
/// Transfer-log column holding the session label.
pub const COL_SESSION: &str = "Timepoint";
/// Transfer-log column holding the canonical modality + exam date string.
pub const COL_MODALITY_DATE: &str = "Modality - Exam Date";

/// One manifest row: column name to cell value, as extracted from the file.
pub type TransferRow = BTreeMap<String, String>;

/// Composite identity used to match platform sessions against manifest rows.
/// Equality over the full tuple is the sole matching criterion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub subject: String,
    pub session: String,
    /// `"<MODALITY> - <Mon DD, YYYY>"`, e.g. `"MR - Jan 05, 2020"`.
    pub modality_date: String,
}

impl SessionKey {
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        session: impl Into<String>,
        modality_date: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            session: session.into(),
            modality_date: modality_date.into(),
        }
    }

    /// Builds the key verbatim from the manifest's named columns.
    pub fn from_row(row: &TransferRow) -> Result<Self, ModelError> {
        let cell = |name: &str| {
            row.get(name)
                .cloned()
                .ok_or_else(|| ModelError(format!("transfer log row is missing column `{name}`")))
        };
        Ok(Self {
            subject: cell(COL_SUBJECT)?,
            session: cell(COL_SESSION)?,
            modality_date: cell(COL_MODALITY_DATE)?,
        })
    }
}

impl Display for SessionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.subject, self.session)
    }
}
