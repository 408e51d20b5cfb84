use serde::{Deserialize, Serialize};

use super::{CheckbookClient, MailingAddress};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<MailingAddress>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<MailingAddress>,
}

#[derive(Debug, Deserialize)]
struct ContactList {
    contacts: Vec<Contact>,
}

pub struct Directory<'a> {
    client: &'a CheckbookClient,
}

impl<'a> Directory<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> AppResult<Vec<Contact>> {
        let list: ContactList = self.client.get("/directory", None).await?;
        Ok(list.contacts)
    }

    pub async fn get(&self, id: &str) -> AppResult<Contact> {
        self.client.get(&format!("/directory/{id}"), None).await
    }

    pub async fn create(&self, contact: &NewContact) -> AppResult<Contact> {
        self.client.post("/directory", contact).await
    }

    pub async fn update(&self, id: &str, contact: &NewContact) -> AppResult<Contact> {
        self.client.put(&format!("/directory/{id}"), contact).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/directory/{id}")).await
    }
}
