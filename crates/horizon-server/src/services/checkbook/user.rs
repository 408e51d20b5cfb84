use serde::{Deserialize, Serialize};

use super::CheckbookClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDetails {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub key: String,
    /// Only present in the response that created the key.
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiKeyList {
    keys: Vec<ApiKey>,
}

pub struct Users<'a> {
    client: &'a CheckbookClient,
}

impl<'a> Users<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> AppResult<UserDetails> {
        self.client.get("/user", None).await
    }

    pub async fn update(&self, update: &UpdateUser) -> AppResult<UserDetails> {
        self.client.put("/user", update).await
    }

    pub async fn list_api_keys(&self) -> AppResult<Vec<ApiKey>> {
        let list: ApiKeyList = self.client.get("/user/api_key", None).await?;
        Ok(list.keys)
    }

    pub async fn create_api_key(&self) -> AppResult<ApiKey> {
        self.client.post("/user/api_key", &serde_json::json!({})).await
    }

    pub async fn delete_api_key(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/user/api_key/{id}")).await
    }
}
