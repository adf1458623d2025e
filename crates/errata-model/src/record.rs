// SPDX-License-Identifier: Apache-2.0

use crate::container::{ContainerRef, ContainerType};
use serde::{Deserialize, Serialize};

/// Fixed report column order, shared by the CSV writer and its tests.
pub const CSV_COLUMNS: [&str; 6] = ["path", "url", "error", "resolved", "_id", "type"];

/// One row of the resolution report. A resolved record carries no error
/// message; a missing-session record carries no id or path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub resolved: bool,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub container_type: ContainerType,
}

impl ErrorRecord {
    #[must_use]
    pub fn resolved(template: &ContainerRef) -> Self {
        Self {
            path: template.path.clone(),
            url: template.url.clone(),
            error: None,
            resolved: true,
            id: Some(template.id.clone()),
            container_type: template.container_type,
        }
    }

    #[must_use]
    pub fn unresolved(template: &ContainerRef, message: impl Into<String>) -> Self {
        Self {
            path: template.path.clone(),
            url: template.url.clone(),
            error: Some(message.into()),
            resolved: false,
            id: Some(template.id.clone()),
            container_type: template.container_type,
        }
    }
}
