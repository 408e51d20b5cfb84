//! Identity provider client: accounts, email/password sessions and the
//! document database that holds user profiles, linked banks and transfers.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AppwriteConfig;
use crate::error::{check_status, AppError, AppResult};
use crate::models::{
    Account, Bank, NewBank, NewTransferRecord, NewUser, Session, TransferRecord, User,
};

const SERVICE: &str = "identity";
const UNIQUE_ID: &str = "unique()";

#[derive(Debug, Deserialize)]
struct DocumentList<T> {
    #[allow(dead_code)]
    total: i64,
    documents: Vec<T>,
}

/// `equal` filter in the provider's JSON query syntax.
pub fn query_equal(attribute: &str, value: &str) -> String {
    json!({ "method": "equal", "attribute": attribute, "values": [value] }).to_string()
}

#[derive(Clone)]
pub struct IdentityClient {
    http: Client,
    config: AppwriteConfig,
}

impl IdentityClient {
    pub fn new(http: Client, config: AppwriteConfig) -> Self {
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.endpoint.trim_end_matches('/'))
    }

    /// Request authenticated with the server API key.
    fn admin(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Internal("APPWRITE_KEY is not set".into()))?;
        Ok(self
            .http
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Key", key))
    }

    /// Request acting as the user who owns `secret`.
    fn as_session(&self, method: Method, path: &str, secret: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Session", secret)
    }

    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> AppResult<Account> {
        let resp = self
            .admin(Method::POST, "/account")?
            .json(&json!({
                "userId": UNIQUE_ID,
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await?;

        if resp.status() == StatusCode::CONFLICT {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let account = check_status(SERVICE, resp).await?.json().await?;
        Ok(account)
    }

    pub async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<Session> {
        let resp = self
            .admin(Method::POST, "/account/sessions/email")?
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized);
        }

        let session: Session = check_status(SERVICE, resp).await?.json().await?;
        if session.secret.is_empty() {
            return Err(AppError::Internal(
                "identity provider returned a session without a secret".into(),
            ));
        }
        tracing::debug!("Created session {} for user {}", session.id, session.user_id);
        Ok(session)
    }

    pub async fn get_current_account(&self, secret: &str) -> AppResult<Account> {
        let resp = self
            .as_session(Method::GET, "/account", secret)
            .send()
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized);
        }

        let account = check_status(SERVICE, resp).await?.json().await?;
        Ok(account)
    }

    pub async fn delete_current_session(&self, secret: &str) -> AppResult<()> {
        let resp = self
            .as_session(Method::DELETE, "/account/sessions/current", secret)
            .send()
            .await?;
        check_status(SERVICE, resp).await?;
        Ok(())
    }

    fn documents_path(&self, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{collection_id}/documents",
            self.config.database_id
        )
    }

    pub async fn create_document<T, R>(&self, collection_id: &str, data: &T) -> AppResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let resp = self
            .admin(Method::POST, &self.documents_path(collection_id))?
            .json(&json!({ "documentId": UNIQUE_ID, "data": data }))
            .send()
            .await?;
        let doc = check_status(SERVICE, resp).await?.json().await?;
        Ok(doc)
    }

    pub async fn get_document<R: DeserializeOwned>(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> AppResult<R> {
        let path = format!("{}/{document_id}", self.documents_path(collection_id));
        let resp = self.admin(Method::GET, &path)?.send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("Document not found".into()));
        }

        let doc = check_status(SERVICE, resp).await?.json().await?;
        Ok(doc)
    }

    pub async fn list_documents<R: DeserializeOwned>(
        &self,
        collection_id: &str,
        queries: &[String],
    ) -> AppResult<Vec<R>> {
        let params: Vec<(&str, &str)> = queries.iter().map(|q| ("queries[]", q.as_str())).collect();
        let resp = self
            .admin(Method::GET, &self.documents_path(collection_id))?
            .query(&params)
            .send()
            .await?;
        let list: DocumentList<R> = check_status(SERVICE, resp).await?.json().await?;
        Ok(list.documents)
    }

    pub async fn create_user_info(&self, user: &NewUser) -> AppResult<User> {
        self.create_document(&self.config.user_collection_id, user).await
    }

    pub async fn get_user_info(&self, user_id: &str) -> AppResult<User> {
        self.list_documents(
            &self.config.user_collection_id,
            &[query_equal("userId", user_id)],
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("User profile not found".into()))
    }

    pub async fn create_bank(&self, bank: &NewBank) -> AppResult<Bank> {
        self.create_document(&self.config.bank_collection_id, bank).await
    }

    pub async fn get_banks(&self, user_id: &str) -> AppResult<Vec<Bank>> {
        self.list_documents(
            &self.config.bank_collection_id,
            &[query_equal("userId", user_id)],
        )
        .await
    }

    pub async fn get_bank(&self, document_id: &str) -> AppResult<Bank> {
        self.get_document(&self.config.bank_collection_id, document_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Bank not found".into()),
                e => e,
            })
    }

    pub async fn get_bank_by_account_id(&self, account_id: &str) -> AppResult<Bank> {
        self.list_documents(
            &self.config.bank_collection_id,
            &[query_equal("accountId", account_id)],
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound("Bank not found".into()))
    }

    pub async fn create_transfer_record(
        &self,
        record: &NewTransferRecord,
    ) -> AppResult<TransferRecord> {
        self.create_document(&self.config.transaction_collection_id, record)
            .await
    }

    /// Transfers where the bank is either the sender or the receiver.
    pub async fn get_transfers_by_bank_id(&self, bank_id: &str) -> AppResult<Vec<TransferRecord>> {
        let collection = &self.config.transaction_collection_id;
        let mut sent: Vec<TransferRecord> = self
            .list_documents(collection, &[query_equal("senderBankId", bank_id)])
            .await?;
        let received: Vec<TransferRecord> = self
            .list_documents(collection, &[query_equal("receiverBankId", bank_id)])
            .await?;

        // A self-transfer shows up in both lists
        for record in received {
            if !sent.iter().any(|r| r.id == record.id) {
                sent.push(record);
            }
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_query_uses_json_syntax() {
        let q: serde_json::Value = serde_json::from_str(&query_equal("userId", "u-1")).unwrap();
        assert_eq!(q["method"], "equal");
        assert_eq!(q["attribute"], "userId");
        assert_eq!(q["values"][0], "u-1");
    }
}
