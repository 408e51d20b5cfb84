use serde::{Deserialize, Serialize};

use super::CheckbookClient;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    /// Last four digits only.
    pub card_number: String,
    pub expiration_date: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub card_number: String,
    pub expiration_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CardList {
    cards: Vec<Card>,
}

pub struct Cards<'a> {
    client: &'a CheckbookClient,
}

impl<'a> Cards<'a> {
    pub(super) fn new(client: &'a CheckbookClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> AppResult<Vec<Card>> {
        let list: CardList = self.client.get("/account/card", None).await?;
        Ok(list.cards)
    }

    pub async fn add(&self, card: &NewCard) -> AppResult<Card> {
        self.client.post("/account/card", card).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.client.delete(&format!("/account/card/{id}")).await
    }
}
