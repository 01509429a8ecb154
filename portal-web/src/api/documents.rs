use super::{
    RestIdentityProvider,
    codec::{decode_document, decode_query_response, encode_fields, encode_query},
    status_failure, transport_failure,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use shared::{
    RemoteFailure,
    config::PortalConfig,
    services::{Document, DocumentStore, Fields, Query},
};
use std::fmt;
use tracing::debug;
use url::Url;

/// Usable as exactly one path segment: no separators, no dot segments.
fn is_segment(part: &str) -> bool {
    !part.is_empty() && !part.contains('/') && part != "." && part != ".."
}

/// `root/collection[/id]` with every part escaped as a single segment, so an
/// id can never reach another collection or carry a query.
fn resource_url(root: &str, collection: &str, id: Option<&str>) -> Result<Url, RemoteFailure> {
    if !is_segment(collection) || id.is_some_and(|id| !is_segment(id)) {
        return Err(RemoteFailure::unavailable(format!(
            "invalid document path {collection}/{}",
            id.unwrap_or_default()
        )));
    }
    let mut url = Url::parse(root)
        .map_err(|err| RemoteFailure::unavailable(format!("documents root {root}: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| RemoteFailure::unavailable(format!("documents root {root} has no path")))?
        .pop_if_empty()
        .push(collection)
        .extend(id);
    Ok(url)
}

/// Document database client for the project's `(default)` database.
///
/// Requests carry the signed-in session's id token. A request rejected as
/// unauthorized is retried once after refreshing that token.
#[derive(Clone)]
pub struct RestDocumentStore {
    client: Client,
    root: String,
    identity: RestIdentityProvider,
}

impl RestDocumentStore {
    pub fn new(config: &PortalConfig, identity: RestIdentityProvider) -> Self {
        Self {
            client: Client::new(),
            root: config.documents_root(),
            identity,
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, RemoteFailure> {
        resource_url(&self.root, collection, Some(id))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.identity.id_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_with_refresh<F>(&self, build: F) -> Result<Response, RemoteFailure>
    where
        F: Fn() -> RequestBuilder,
    {
        let response = self
            .authorize(build())
            .send()
            .await
            .map_err(|err| transport_failure(&err))?;
        if response.status() != StatusCode::UNAUTHORIZED || self.identity.id_token().is_none() {
            return Ok(response);
        }

        drop(response);
        self.identity.refresh().await?;
        self.authorize(build())
            .send()
            .await
            .map_err(|err| transport_failure(&err))
    }

    async fn expect_json(response: Response) -> Result<Value, RemoteFailure> {
        if !response.status().is_success() {
            return Err(status_failure(response).await);
        }
        response
            .json()
            .await
            .map_err(|err| RemoteFailure::decode(err.to_string()))
    }

    async fn expect_success(response: Response) -> Result<(), RemoteFailure> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(status_failure(response).await)
        }
    }
}

#[async_trait(?Send)]
impl DocumentStore for RestDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, RemoteFailure> {
        if !is_segment(id) {
            debug!(collection, id, "not a document id");
            return Ok(None);
        }
        let url = self.document_url(collection, id)?;
        let response = self
            .send_with_refresh(|| self.client.get(url.clone()))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(collection, id, "document not found");
            return Ok(None);
        }
        let body = Self::expect_json(response).await?;
        decode_document(&body).map(Some)
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteFailure> {
        let url = self.document_url(collection, id)?;
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .send_with_refresh(|| self.client.patch(url.clone()).json(&body))
            .await?;
        Self::expect_success(response).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteFailure> {
        let url = self.document_url(collection, id)?;
        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", name.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));
        let body = json!({ "fields": encode_fields(&fields) });

        let response = self
            .send_with_refresh(|| self.client.patch(url.clone()).query(&params).json(&body))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteFailure::unavailable(format!("{collection}/{id} not found")));
        }
        Self::expect_success(response).await
    }

    async fn add_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<String, RemoteFailure> {
        let url = resource_url(&self.root, collection, None)?;
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .send_with_refresh(|| self.client.post(url.clone()).json(&body))
            .await?;
        let created = Self::expect_json(response).await?;
        decode_document(&created).map(|document| document.id)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), RemoteFailure> {
        let url = self.document_url(collection, id)?;
        let response = self
            .send_with_refresh(|| self.client.delete(url.clone()))
            .await?;
        Self::expect_success(response).await
    }

    async fn query_collection(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, RemoteFailure> {
        let url = format!("{}:runQuery", self.root);
        let body = encode_query(collection, query);
        let response = self
            .send_with_refresh(|| self.client.post(url.as_str()).json(&body))
            .await?;
        let rows = Self::expect_json(response).await?;
        let documents = decode_query_response(&rows)?;
        debug!(collection, count = documents.len(), "query answered");
        Ok(documents)
    }
}

impl fmt::Debug for RestDocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestDocumentStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://docs.example.test/v1/projects/p/databases/(default)/documents";
    const PREFIX: &str = "/v1/projects/p/databases/(default)/documents";

    fn path_of(collection: &str, id: &str) -> String {
        resource_url(ROOT, collection, Some(id))
            .unwrap()
            .path()
            .to_string()
    }

    #[test]
    fn plain_ids_append_to_the_collection() {
        assert_eq!(path_of("users", "u1"), format!("{PREFIX}/users/u1"));
        assert_eq!(
            path_of("email_index", "a.b+c@x.co"),
            format!("{PREFIX}/email_index/a.b+c@x.co")
        );
        let collection = resource_url(ROOT, "calendarEvents", None).unwrap();
        assert_eq!(collection.path(), format!("{PREFIX}/calendarEvents"));
    }

    #[test]
    fn query_and_fragment_characters_stay_in_the_id() {
        let url = resource_url(ROOT, "users", Some("a?b=c")).unwrap();
        assert_eq!(url.path(), format!("{PREFIX}/users/a%3Fb=c"));
        assert_eq!(url.query(), None);

        let url = resource_url(ROOT, "users", Some("x#frag")).unwrap();
        assert_eq!(url.path(), format!("{PREFIX}/users/x%23frag"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn escaped_separators_are_not_decoded() {
        assert_eq!(path_of("users", "a%2Fb"), format!("{PREFIX}/users/a%252Fb"));
    }

    #[test]
    fn ids_cannot_leave_their_collection() {
        for id in ["../email_index/x", "..", ".", "", "a/b"] {
            assert!(resource_url(ROOT, "users", Some(id)).is_err(), "{id:?}");
            assert!(!is_segment(id), "{id:?}");
        }
        assert!(resource_url(ROOT, "users/x", None).is_err());
    }

    #[test]
    fn trailing_slash_on_the_root_is_ignored() {
        let url = resource_url(&format!("{ROOT}/"), "users", Some("u1")).unwrap();
        assert_eq!(url.path(), format!("{PREFIX}/users/u1"));
    }
}
