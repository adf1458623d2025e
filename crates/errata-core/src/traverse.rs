// SPDX-License-Identifier: Apache-2.0

use crate::{AuditError, AuditErrorCode};
use errata_model::{Container, ContainerRef, ContainerType, ERROR_TAG};
use errata_platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Requested breadth of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    All,
    Subject,
    Session,
    Acquisition,
}

impl Scope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Subject => "subject",
            Self::Session => "session",
            Self::Acquisition => "acquisition",
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Scope {
    type Err = AuditError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "all" => Ok(Self::All),
            "subject" => Ok(Self::Subject),
            "session" => Ok(Self::Session),
            "acquisition" => Ok(Self::Acquisition),
            other => Err(AuditError::new(
                AuditErrorCode::InvalidScope,
                format!("scope `{other}` is not one of all, subject, session, acquisition"),
            )),
        }
    }
}

/// Which descendants a `(scope, parent type)` pair brings into the audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectPlan {
    /// Tagged subjects directly under the parent.
    pub tagged_subjects: bool,
    /// Tagged sessions under the parent.
    pub tagged_sessions: bool,
    /// Descend into every session (tagged or not) and take its tagged
    /// acquisitions.
    pub session_acquisitions: bool,
    /// Tagged acquisitions directly under the parent.
    pub direct_acquisitions: bool,
}

/// The full legality matrix, enumerated pairwise. Combinations no rule
/// covers collect nothing, which is intentional rather than an error.
pub fn collect_plan(scope: Scope, parent: ContainerType) -> Result<CollectPlan, AuditError> {
    use ContainerType as Ct;
    let plan = match (scope, parent) {
        (Scope::Subject, Ct::Project) => CollectPlan {
            tagged_subjects: true,
            ..CollectPlan::default()
        },
        (Scope::Subject, other) => return Err(invalid_parent(Scope::Subject, other)),
        (Scope::All, Ct::Project) => CollectPlan {
            tagged_subjects: true,
            tagged_sessions: true,
            session_acquisitions: true,
            ..CollectPlan::default()
        },
        (Scope::All, Ct::Subject) => CollectPlan {
            tagged_sessions: true,
            session_acquisitions: true,
            ..CollectPlan::default()
        },
        (Scope::All | Scope::Acquisition, Ct::Session) => CollectPlan {
            direct_acquisitions: true,
            ..CollectPlan::default()
        },
        (Scope::All | Scope::Acquisition, Ct::Acquisition) => CollectPlan::default(),
        (Scope::Session, Ct::Project | Ct::Subject) => CollectPlan {
            tagged_sessions: true,
            ..CollectPlan::default()
        },
        (Scope::Session, other) => return Err(invalid_parent(Scope::Session, other)),
        (Scope::Acquisition, Ct::Project | Ct::Subject) => CollectPlan {
            session_acquisitions: true,
            ..CollectPlan::default()
        },
    };
    Ok(plan)
}

fn invalid_parent(scope: Scope, parent: ContainerType) -> AuditError {
    AuditError::new(
        AuditErrorCode::InvalidParent,
        format!("cannot find {}s under a parent of type {parent}", scope),
    )
}

/// Collects every flagged container in scope under the parent. Each matched
/// container contributes exactly one reference; acquisitions reached through
/// session expansion are never double-counted.
pub fn find_flagged(
    platform: &dyn Platform,
    scope: Scope,
    parent: &Container,
) -> Result<Vec<ContainerRef>, AuditError> {
    let plan = collect_plan(scope, parent.container_type)?;
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out: Vec<ContainerRef> = Vec::new();
    let mut push = |container: &Container, out: &mut Vec<ContainerRef>| {
        if seen.insert(container.id.clone()) {
            out.push(ContainerRef::from(container));
        }
    };

    if plan.tagged_subjects {
        for subject in platform.list_children(
            parent.container_type,
            &parent.id,
            ContainerType::Subject,
            Some(ERROR_TAG),
        )? {
            push(&subject, &mut out);
        }
    }
    if plan.tagged_sessions {
        for session in platform.list_children(
            parent.container_type,
            &parent.id,
            ContainerType::Session,
            Some(ERROR_TAG),
        )? {
            push(&session, &mut out);
        }
    }
    if plan.session_acquisitions {
        for session in platform.list_children(
            parent.container_type,
            &parent.id,
            ContainerType::Session,
            None,
        )? {
            for acquisition in platform.list_children(
                ContainerType::Session,
                &session.id,
                ContainerType::Acquisition,
                Some(ERROR_TAG),
            )? {
                push(&acquisition, &mut out);
            }
        }
    }
    if plan.direct_acquisitions {
        for acquisition in platform.list_children(
            parent.container_type,
            &parent.id,
            ContainerType::Acquisition,
            Some(ERROR_TAG),
        )? {
            push(&acquisition, &mut out);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_scope_requires_a_project_parent() {
        assert!(collect_plan(Scope::Subject, ContainerType::Project).is_ok());
        for parent in [
            ContainerType::Subject,
            ContainerType::Session,
            ContainerType::Acquisition,
        ] {
            let err = collect_plan(Scope::Subject, parent).expect_err("must reject");
            assert_eq!(err.code, AuditErrorCode::InvalidParent);
        }
    }

    #[test]
    fn session_scope_requires_a_project_or_subject_parent() {
        for parent in [ContainerType::Project, ContainerType::Subject] {
            let plan = collect_plan(Scope::Session, parent).expect("plan");
            assert!(plan.tagged_sessions);
            assert!(!plan.session_acquisitions);
        }
        for parent in [ContainerType::Session, ContainerType::Acquisition] {
            let err = collect_plan(Scope::Session, parent).expect_err("must reject");
            assert_eq!(err.code, AuditErrorCode::InvalidParent);
        }
    }

    #[test]
    fn all_scope_under_a_project_collects_every_level() {
        let plan = collect_plan(Scope::All, ContainerType::Project).expect("plan");
        assert!(plan.tagged_subjects);
        assert!(plan.tagged_sessions);
        assert!(plan.session_acquisitions);
        assert!(!plan.direct_acquisitions);
    }

    #[test]
    fn all_scope_under_a_subject_skips_subject_collection() {
        let plan = collect_plan(Scope::All, ContainerType::Subject).expect("plan");
        assert!(!plan.tagged_subjects);
        assert!(plan.tagged_sessions);
        assert!(plan.session_acquisitions);
    }

    #[test]
    fn acquisition_scope_skips_session_collection() {
        let plan = collect_plan(Scope::Acquisition, ContainerType::Project).expect("plan");
        assert!(!plan.tagged_sessions);
        assert!(plan.session_acquisitions);
    }

    #[test]
    fn session_parent_only_collects_its_own_acquisitions() {
        for scope in [Scope::All, Scope::Acquisition] {
            let plan = collect_plan(scope, ContainerType::Session).expect("plan");
            assert_eq!(
                plan,
                CollectPlan {
                    direct_acquisitions: true,
                    ..CollectPlan::default()
                }
            );
        }
    }

    #[test]
    fn uncovered_combinations_collect_nothing() {
        for scope in [Scope::All, Scope::Acquisition] {
            let plan = collect_plan(scope, ContainerType::Acquisition).expect("plan");
            assert_eq!(plan, CollectPlan::default());
        }
    }

    #[test]
    fn unknown_scope_keyword_is_invalid_scope() {
        let err = "everything".parse::<Scope>().expect_err("must reject");
        assert_eq!(err.code, AuditErrorCode::InvalidScope);
    }
}
