// SPDX-License-Identifier: Apache-2.0

use crate::{Platform, PlatformError, PlatformErrorCode};
use errata_model::{Analysis, Container, ContainerType};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::json;

/// Blocking HTTP adapter for the platform API. No retries and no internal
/// timeouts: a failed call surfaces to the caller (the run aborts).
pub struct HttpPlatform {
    api_url: String,
    api_key: String,
    client: Client,
}

impl HttpPlatform {
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, PlatformError> {
        let response = request
            .header("Authorization", format!("scitran-user {}", self.api_key))
            .send()
            .map_err(|e| PlatformError::new(PlatformErrorCode::Network, e.to_string()))?;
        match response.status().as_u16() {
            200..=299 => Ok(response),
            404 => Err(PlatformError::not_found(format!(
                "{} not found",
                response.url()
            ))),
            409 => Err(PlatformError::new(
                PlatformErrorCode::Conflict,
                format!("{} conflict", response.url()),
            )),
            status => Err(PlatformError::new(
                PlatformErrorCode::Internal,
                format!("{} returned status {status}", response.url()),
            )),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, PlatformError> {
        self.send(self.client.get(self.url(path)))?
            .json()
            .map_err(|e| PlatformError::new(PlatformErrorCode::Decode, e.to_string()))
    }
}

/// `/{parents}/{id}/{children}`, optionally narrowed by a tag-equality filter.
#[must_use]
pub(crate) fn children_route(
    parent_type: ContainerType,
    parent_id: &str,
    child_type: ContainerType,
    tag: Option<&str>,
) -> String {
    let mut route = format!(
        "{}/{parent_id}/{}",
        parent_type.plural(),
        child_type.plural()
    );
    if let Some(tag) = tag {
        route.push_str("?filter=tags=");
        route.push_str(tag);
    }
    route
}

/// Frontend root: the API url minus the `/api` suffix and the port.
#[must_use]
pub(crate) fn derive_site_url(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    if let Some((head, tail)) = trimmed.rsplit_once(':') {
        if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
            return head.to_string();
        }
    }
    trimmed.to_string()
}

impl Platform for HttpPlatform {
    fn site_url(&self) -> String {
        derive_site_url(&self.api_url)
    }

    fn get_container(&self, id: &str) -> Result<Container, PlatformError> {
        self.get_json(&format!("containers/{id}"))
    }

    fn get_analysis(&self, id: &str) -> Result<Analysis, PlatformError> {
        self.get_json(&format!("analyses/{id}"))
    }

    fn list_children(
        &self,
        parent_type: ContainerType,
        parent_id: &str,
        child_type: ContainerType,
        tag: Option<&str>,
    ) -> Result<Vec<Container>, PlatformError> {
        self.get_json(&children_route(parent_type, parent_id, child_type, tag))
    }

    fn read_file(&self, container_id: &str, name: &str) -> Result<Vec<u8>, PlatformError> {
        let response = self.send(
            self.client
                .get(self.url(&format!("containers/{container_id}/files/{name}"))),
        )?;
        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| PlatformError::new(PlatformErrorCode::Network, e.to_string()))
    }

    fn delete_file(&self, container_id: &str, name: &str) -> Result<(), PlatformError> {
        self.send(
            self.client
                .delete(self.url(&format!("containers/{container_id}/files/{name}"))),
        )?;
        Ok(())
    }

    fn add_tag(&self, container_id: &str, tag: &str) -> Result<(), PlatformError> {
        self.send(
            self.client
                .post(self.url(&format!("containers/{container_id}/tags")))
                .json(&json!({ "value": tag })),
        )?;
        Ok(())
    }

    fn delete_tag(&self, container_id: &str, tag: &str) -> Result<(), PlatformError> {
        self.send(
            self.client
                .delete(self.url(&format!("containers/{container_id}/tags/{tag}"))),
        )?;
        Ok(())
    }

    fn update_analysis_label(
        &self,
        parent: &Container,
        analysis_id: &str,
        label: &str,
    ) -> Result<(), PlatformError> {
        self.send(
            self.client
                .put(self.url(&format!(
                    "{}/{}/analyses/{analysis_id}",
                    parent.container_type.plural(),
                    parent.id
                )))
                .json(&json!({ "label": label })),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_route_includes_tag_filter() {
        assert_eq!(
            children_route(
                ContainerType::Session,
                "s1",
                ContainerType::Acquisition,
                Some("error")
            ),
            "sessions/s1/acquisitions?filter=tags=error"
        );
        assert_eq!(
            children_route(ContainerType::Project, "p1", ContainerType::Session, None),
            "projects/p1/sessions"
        );
    }

    #[test]
    fn site_url_drops_api_suffix_and_port() {
        assert_eq!(
            derive_site_url("https://imaging.test:443/api"),
            "https://imaging.test"
        );
        assert_eq!(
            derive_site_url("https://imaging.test/api"),
            "https://imaging.test"
        );
        assert_eq!(derive_site_url("https://imaging.test"), "https://imaging.test");
    }
}
