// SPDX-License-Identifier: Apache-2.0

use crate::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Tag that marks a container for auditing.
pub const ERROR_TAG: &str = "error";

/// Suffix shared by every attached error-log file.
pub const ERROR_LOG_SUFFIX: &str = "error.log.json";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    Project,
    Subject,
    Session,
    Acquisition,
}

impl ContainerType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Subject => "subject",
            Self::Session => "session",
            Self::Acquisition => "acquisition",
        }
    }

    /// Route segment used by the platform API (`/projects/{id}`, ...).
    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::Subject => "subjects",
            Self::Session => "sessions",
            Self::Acquisition => "acquisitions",
        }
    }
}

impl Display for ContainerType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContainerType {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "project" => Ok(Self::Project),
            "subject" => Ok(Self::Subject),
            "session" => Ok(Self::Session),
            "acquisition" => Ok(Self::Acquisition),
            other => Err(ModelError(format!("unknown container type `{other}`"))),
        }
    }
}

/// One file attached to a container. Everything beyond the name is kept as
/// raw JSON so dotted-path lookups can reach arbitrary metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl FileEntry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Full metadata snapshot of the file, name included.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubjectRef {
    #[serde(default)]
    pub code: Option<String>,
}

/// A node of the platform's container tree as the API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub container_type: ContainerType,
    pub label: String,
    /// Ancestor ids keyed by container-type name (`group`, `project`, ...).
    #[serde(default)]
    pub parents: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Session acquisition timestamp, RFC 3339.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub subject: Option<SubjectRef>,
}

impl Container {
    #[must_use]
    pub fn new(id: impl Into<String>, container_type: ContainerType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            container_type,
            label: label.into(),
            parents: BTreeMap::new(),
            tags: Vec::new(),
            files: Vec::new(),
            timestamp: None,
            subject: None,
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    #[must_use]
    pub fn file(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.name == name)
    }

    /// Names of every attached error log, in file-list order.
    #[must_use]
    pub fn error_log_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.name.ends_with(ERROR_LOG_SUFFIX))
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Reference to a container collected by traversal, later enriched with a
/// resolver path and frontend URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub container_type: ContainerType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ContainerRef {
    #[must_use]
    pub fn new(id: impl Into<String>, container_type: ContainerType) -> Self {
        Self {
            id: id.into(),
            container_type,
            label: None,
            path: None,
            url: None,
        }
    }
}

impl From<&Container> for ContainerRef {
    fn from(container: &Container) -> Self {
        Self {
            id: container.id.clone(),
            container_type: container.container_type,
            label: Some(container.label.clone()),
            path: None,
            url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisParent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub container_type: ContainerType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(rename = "_id")]
    pub id: String,
    pub label: String,
    pub parent: AnalysisParent,
}

/// Name of the data file an error log describes: the log name minus the
/// `error.log.json` suffix and its separator. A log named exactly like the
/// suffix describes no origin file.
#[must_use]
pub fn origin_file_name(log_name: &str) -> Option<String> {
    let stem = log_name.strip_suffix(ERROR_LOG_SUFFIX)?;
    let stem = stem.strip_suffix('.').unwrap_or(stem);
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn origin_name_strips_suffix_and_separator() {
        assert_eq!(
            origin_file_name("scan_1.dicom.zip.error.log.json"),
            Some("scan_1.dicom.zip".to_string())
        );
        assert_eq!(origin_file_name("error.log.json"), None);
        assert_eq!(origin_file_name("report.csv"), None);
    }

    #[test]
    fn error_log_names_filter_by_suffix() {
        let mut container = Container::new("c1", ContainerType::Acquisition, "acq");
        container.files = vec![
            FileEntry::new("scan.dicom.zip"),
            FileEntry::new("scan.dicom.zip.error.log.json"),
            FileEntry::new("notes.txt"),
        ];
        assert_eq!(
            container.error_log_names(),
            vec!["scan.dicom.zip.error.log.json".to_string()]
        );
    }

    #[test]
    fn file_entry_snapshot_includes_name_and_metadata() {
        let entry = FileEntry::new("scan.dicom.zip")
            .with_field("modality", json!("MR"))
            .with_field("info", json!({"SeriesDescription": "t1"}));
        let value = entry.to_value();
        assert_eq!(value["name"], json!("scan.dicom.zip"));
        assert_eq!(value["info"]["SeriesDescription"], json!("t1"));
    }

    #[test]
    fn container_decodes_with_unknown_free_fields_absent() {
        let container: Container = serde_json::from_value(json!({
            "_id": "5e8f",
            "type": "session",
            "label": "visit-01",
            "parents": {"project": "p1", "subject": "s1"},
            "tags": ["error"],
            "subject": {"code": "SUB-01"}
        }))
        .expect("decode container");
        assert!(container.has_tag("error"));
        assert_eq!(container.subject.and_then(|s| s.code).as_deref(), Some("SUB-01"));
    }
}
