use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::core::todo::TodoItem;
use crate::{Error, Result};

/// Per-user document holding the mirrored to-do collection.
pub trait DocumentStore: Send + Sync {
    /// `None` when the user has no document yet.
    fn load_todos<'a>(&'a self, uid: &'a str) -> BoxFuture<'a, Result<Option<Vec<TodoItem>>>>;

    /// Overwrite the `todos` field, preserving anything else on the document.
    fn save_todos<'a>(&'a self, uid: &'a str, todos: &'a [TodoItem]) -> BoxFuture<'a, Result<()>>;
}

#[derive(Debug, Deserialize)]
struct TodoDocument {
    #[serde(default)]
    todos: Vec<TodoItem>,
}

#[derive(Debug, Serialize)]
struct TodoPatch<'a> {
    todos: &'a [TodoItem],
}

pub fn parse_document(body: &str) -> Result<Vec<TodoItem>> {
    let doc: TodoDocument = serde_json::from_str(body)?;
    Ok(doc.todos)
}

/// REST document store: `GET`/`PATCH {store_url}/{collection}/{uid}`.
pub struct HttpDocumentStore {
    base_url: String,
    collection: String,
    api_key: Option<String>,
    http: Client,
}

impl HttpDocumentStore {
    pub fn new(store_url: &str, collection: &str) -> Result<Self> {
        let base_url = store_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::NotConfigured("document store URL"));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            collection: collection.trim_matches('/').to_string(),
            api_key: None,
            http: Client::builder().build()?,
        })
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    pub fn document_url(&self, uid: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.collection, uid)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn get(&self, uid: &str) -> Result<Option<Vec<TodoItem>>> {
        let url = self.document_url(uid);
        let resp = self.authorize(self.http.get(&url)).send().await?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(parse_document(&resp.text().await?)?)),
            _ => Err(Error::from_response(&url, resp).await),
        }
    }

    async fn patch(&self, uid: &str, todos: &[TodoItem]) -> Result<()> {
        let url = self.document_url(uid);
        let resp = self
            .authorize(self.http.patch(&url))
            .json(&TodoPatch { todos })
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::from_response(&url, resp).await);
        }
        Ok(())
    }
}

impl DocumentStore for HttpDocumentStore {
    fn load_todos<'a>(&'a self, uid: &'a str) -> BoxFuture<'a, Result<Option<Vec<TodoItem>>>> {
        Box::pin(self.get(uid))
    }

    fn save_todos<'a>(&'a self, uid: &'a str, todos: &'a [TodoItem]) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.patch(uid, todos))
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryDocumentStore;
