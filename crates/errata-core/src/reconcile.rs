// SPDX-License-Identifier: Apache-2.0

use crate::events::{fields, AuditEventKind, AuditLog};
use crate::{AuditError, AuditErrorCode};
use errata_model::{Container, ContainerRef, ContainerType, ErrorRecord, SessionKey, TransferRow};
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

pub const DEFAULT_MODALITY: &str = "MR";

/// Builds the composite matching key for a platform session:
/// `(subject code, session label, "<MODALITY> - <Mon DD, YYYY>")`.
pub fn session_key(session: &Container, modality: &str) -> Result<SessionKey, AuditError> {
    let subject = session
        .subject
        .as_ref()
        .and_then(|s| s.code.clone())
        .ok_or_else(|| {
            AuditError::new(
                AuditErrorCode::Validation,
                format!("session {} has no subject code", session.id),
            )
        })?;
    let timestamp = session.timestamp.as_deref().ok_or_else(|| {
        AuditError::new(
            AuditErrorCode::Validation,
            format!("session {} has no timestamp", session.id),
        )
    })?;
    let parsed = OffsetDateTime::parse(timestamp, &Rfc3339).map_err(|e| {
        AuditError::new(
            AuditErrorCode::Validation,
            format!("session {}: timestamp `{timestamp}`: {e}", session.id),
        )
    })?;
    let date = parsed
        .format(format_description!("[month repr:short] [day], [year]"))
        .map_err(|e| AuditError::new(AuditErrorCode::Internal, e.to_string()))?;
    Ok(SessionKey::new(
        subject,
        session.label.clone(),
        format!("{modality} - {date}"),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Manifest keys with no platform session, in manifest row order.
    pub missing: Vec<SessionKey>,
    /// Platform sessions no manifest row accounted for, in key order.
    pub unexpected: Vec<(SessionKey, ContainerRef)>,
}

/// Single-pass symmetric difference between the platform's sessions and the
/// manifest rows. Colliding platform keys collapse last-wins, with a
/// diagnostic recording the session that was shadowed.
pub fn reconcile(
    sessions: &[Container],
    rows: &[TransferRow],
    modality: &str,
    log: &mut AuditLog,
) -> Result<Reconciliation, AuditError> {
    let mut by_key: BTreeMap<SessionKey, ContainerRef> = BTreeMap::new();
    for session in sessions {
        let key = session_key(session, modality)?;
        if let Some(shadowed) = by_key.insert(key.clone(), ContainerRef::from(session)) {
            log.emit(
                AuditEventKind::DuplicateSessionKey,
                fields(&[("key", key.to_string()), ("shadowed", shadowed.id)]),
            );
        }
    }

    let mut missing = Vec::new();
    for row in rows {
        let key =
            SessionKey::from_row(row).map_err(|e| AuditError::new(AuditErrorCode::Validation, e.0))?;
        if by_key.remove(&key).is_none() {
            missing.push(key);
        }
    }

    Ok(Reconciliation {
        missing,
        unexpected: by_key.into_iter().collect(),
    })
}

/// Report row for a manifest session the platform does not have.
#[must_use]
pub fn missing_session_record(key: &SessionKey) -> ErrorRecord {
    ErrorRecord {
        path: None,
        url: None,
        error: Some(format!("session {key} missing from platform")),
        resolved: false,
        id: None,
        container_type: ContainerType::Session,
    }
}

/// Report row for a platform session the manifest does not mention.
#[must_use]
pub fn unexpected_session_record(reference: &ContainerRef) -> ErrorRecord {
    ErrorRecord::unresolved(reference, "session not present in transfer log")
}
