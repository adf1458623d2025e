// SPDX-License-Identifier: Apache-2.0

use crate::AuditError;
use errata_model::{Container, ContainerRef, ContainerType};
use errata_platform::Platform;

/// Human-readable resolver path for a container: the group id, ancestor
/// labels top-down, then the container's own label.
pub fn resolver_path(platform: &dyn Platform, container: &Container) -> Result<String, AuditError> {
    let mut parts = Vec::new();
    for parent_type in ["group", "project", "subject", "session"] {
        let Some(parent_id) = container.parents.get(parent_type) else {
            break;
        };
        if parent_type == "group" {
            parts.push(parent_id.clone());
        } else {
            parts.push(platform.get_container(parent_id)?.label);
        }
    }
    parts.push(container.label.clone());
    Ok(parts.join("/"))
}

/// Frontend link for a container. Sessions and acquisitions point at the
/// session data tab; everything else points at the project page.
#[must_use]
pub fn frontend_url(site: &str, container: &Container) -> String {
    let parent = |name: &str| container.parents.get(name).cloned().unwrap_or_default();
    match container.container_type {
        ContainerType::Project => format!("{site}/#/projects/{}", container.id),
        ContainerType::Session => format!(
            "{site}/#/projects/{}/sessions/{}?tab=data",
            parent("project"),
            container.id
        ),
        ContainerType::Acquisition => format!(
            "{site}/#/projects/{}/sessions/{}?tab=data",
            parent("project"),
            parent("session")
        ),
        ContainerType::Subject => format!("{site}/#/projects/{}", parent("project")),
    }
}

/// Enriches traversal output with labels, resolver paths, and URLs so the
/// report rows can locate each container.
pub fn add_container_info(
    platform: &dyn Platform,
    references: &mut [ContainerRef],
) -> Result<(), AuditError> {
    let site = platform.site_url();
    for reference in references {
        let container = platform.get_container(&reference.id)?;
        reference.label = Some(container.label.clone());
        reference.path = Some(resolver_path(platform, &container)?);
        reference.url = Some(frontend_url(&site, &container));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use errata_platform::MemoryPlatform;

    fn tree() -> MemoryPlatform {
        let mut project = Container::new("p1", ContainerType::Project, "Neuro Study");
        project.parents.insert("group".to_string(), "lab".to_string());
        let mut session = Container::new("s1", ContainerType::Session, "visit-01");
        session.parents.insert("group".to_string(), "lab".to_string());
        session.parents.insert("project".to_string(), "p1".to_string());
        let mut acquisition = Container::new("a1", ContainerType::Acquisition, "t1-mprage");
        acquisition.parents.insert("group".to_string(), "lab".to_string());
        acquisition
            .parents
            .insert("project".to_string(), "p1".to_string());
        acquisition
            .parents
            .insert("session".to_string(), "s1".to_string());
        MemoryPlatform::new()
            .with_container(project)
            .with_container(session)
            .with_container(acquisition)
    }

    #[test]
    fn resolver_path_joins_group_id_and_ancestor_labels() {
        let platform = tree();
        let acquisition = platform.get_container("a1").expect("container");
        // The acquisition has no subject parent, so the walk stops there.
        assert_eq!(
            resolver_path(&platform, &acquisition).expect("path"),
            "lab/Neuro Study/t1-mprage"
        );
    }

    #[test]
    fn urls_depend_on_container_type() {
        let platform = tree();
        let site = platform.site_url();
        let session = platform.get_container("s1").expect("container");
        assert_eq!(
            frontend_url(&site, &session),
            "https://imaging.test/#/projects/p1/sessions/s1?tab=data"
        );
        let acquisition = platform.get_container("a1").expect("container");
        assert_eq!(
            frontend_url(&site, &acquisition),
            "https://imaging.test/#/projects/p1/sessions/s1?tab=data"
        );
        let project = platform.get_container("p1").expect("container");
        assert_eq!(frontend_url(&site, &project), "https://imaging.test/#/projects/p1");
    }

    #[test]
    fn enrichment_fills_every_reference() {
        let platform = tree();
        let mut references = vec![ContainerRef::new("s1", ContainerType::Session)];
        add_container_info(&platform, &mut references).expect("enrich");
        assert_eq!(references[0].label.as_deref(), Some("visit-01"));
        assert_eq!(references[0].path.as_deref(), Some("lab/Neuro Study/visit-01"));
        assert!(references[0].url.as_deref().is_some_and(|u| u.contains("/sessions/s1")));
    }
}
