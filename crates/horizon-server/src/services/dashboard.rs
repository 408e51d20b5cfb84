//! Balances and transaction history for the dashboard.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::{Bank, TransferRecord, User};
use crate::services::identity::IdentityClient;
use crate::services::plaid::{PlaidAccount, PlaidClient, PlaidTransaction};

pub const TRANSACTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub bank_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub mask: Option<String>,
    pub account_type: String,
    pub subtype: Option<String>,
    pub available_balance: f64,
    pub current_balance: f64,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub shareable_id: String,
}

impl AccountView {
    fn new(bank: &Bank, account: PlaidAccount, institution_id: Option<String>) -> Self {
        Self {
            id: account.account_id,
            bank_id: bank.id.clone(),
            name: account.name,
            official_name: account.official_name,
            mask: account.mask,
            account_type: account.account_type,
            subtype: account.subtype,
            available_balance: account.balances.available.unwrap_or(0.0),
            current_balance: account.balances.current.unwrap_or(0.0),
            institution_id,
            institution_name: None,
            shareable_id: bank.shareable_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsOverview {
    pub accounts: Vec<AccountView>,
    pub total_banks: usize,
    pub total_current_balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub category: String,
    pub channel: String,
    pub direction: Direction,
    pub pending: bool,
    pub image: Option<String>,
}

impl From<PlaidTransaction> for TransactionView {
    fn from(tx: PlaidTransaction) -> Self {
        let category = tx.category_name();
        // Positive amounts leave the account
        let direction = if tx.amount > 0.0 {
            Direction::Debit
        } else {
            Direction::Credit
        };
        Self {
            id: tx.transaction_id,
            name: tx.name,
            amount: tx.amount.abs(),
            date: tx.date,
            category,
            channel: tx.payment_channel.unwrap_or_else(|| "other".to_string()),
            direction,
            pending: tx.pending,
            image: tx.logo_url,
        }
    }
}

/// Amount of a stored transfer document; malformed values show as zero.
fn stored_amount(record_id: &str, raw: &str) -> f64 {
    match Decimal::from_str(raw.trim()).ok().and_then(|d| d.to_f64()) {
        Some(amount) => amount,
        None => {
            tracing::warn!("Transfer record {record_id} has a malformed amount: {raw:?}");
            0.0
        }
    }
}

impl TransactionView {
    fn from_transfer(record: TransferRecord, bank_id: &str) -> Self {
        let direction = if record.sender_bank_id == bank_id {
            Direction::Debit
        } else {
            Direction::Credit
        };
        let amount = stored_amount(&record.id, &record.amount);
        Self {
            id: record.id,
            name: record.name,
            amount,
            date: record.created_at,
            category: record.category,
            channel: record.channel,
            direction,
            pending: false,
            image: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetail {
    pub account: AccountView,
    pub transactions: Vec<TransactionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user: User,
    pub overview: AccountsOverview,
    pub selected: Option<AccountView>,
    pub recent_transactions: Page<TransactionView>,
    pub top_categories: Vec<CategoryCount>,
}

pub fn summarize(accounts: Vec<AccountView>) -> AccountsOverview {
    let total_current_balance = accounts.iter().map(|a| a.current_balance).sum();
    AccountsOverview {
        total_banks: accounts.len(),
        total_current_balance,
        accounts,
    }
}

/// Aggregator transactions of the bank's account plus its recorded
/// transfers, newest first. The aggregator syncs every account of an item,
/// so rows of sibling accounts are dropped.
pub fn merge_transactions(
    plaid: Vec<PlaidTransaction>,
    transfers: Vec<TransferRecord>,
    bank: &Bank,
) -> Vec<TransactionView> {
    let bank_id = bank.id.as_str();
    let mut all: Vec<TransactionView> = plaid
        .into_iter()
        .filter(|tx| tx.account_id == bank.account_id)
        .map(TransactionView::from)
        .collect();
    all.extend(
        transfers
            .into_iter()
            .map(|t| TransactionView::from_transfer(t, bank_id)),
    );
    all.sort_by(|a, b| b.date.cmp(&a.date));
    all
}

/// Transaction counts per category, most frequent first.
pub fn count_categories(transactions: &[TransactionView]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tx in transactions {
        *counts.entry(tx.category.as_str()).or_default() += 1;
    }

    let total_count = transactions.len();
    let mut result: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(name, count)| CategoryCount {
            name: name.to_string(),
            count,
            total_count,
        })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    result
}

/// One-based page of `items`. Pages past the end are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let total_pages = items.len().div_ceil(per_page.max(1));
    let start = (page - 1).saturating_mul(per_page);
    let items = items.iter().skip(start).take(per_page).cloned().collect();
    Page {
        items,
        page,
        total_pages,
    }
}

async fn account_view(plaid: &PlaidClient, bank: &Bank) -> AppResult<AccountView> {
    let resp = plaid.get_accounts(&bank.access_token).await?;
    let institution_id = resp.item.institution_id.clone();
    let account = resp
        .accounts
        .into_iter()
        .find(|a| a.account_id == bank.account_id)
        .ok_or_else(|| AppError::NotFound(format!("Account {} not found", bank.account_id)))?;

    let mut view = AccountView::new(bank, account, institution_id.clone());
    if let Some(id) = institution_id {
        view.institution_name = Some(plaid.get_institution(&id).await?.name);
    }
    Ok(view)
}

pub async fn get_accounts(
    identity: &IdentityClient,
    plaid: &PlaidClient,
    user: &User,
) -> AppResult<AccountsOverview> {
    let banks = identity.get_banks(&user.id).await?;
    let mut accounts = Vec::with_capacity(banks.len());
    for bank in &banks {
        accounts.push(account_view(plaid, bank).await?);
    }
    Ok(summarize(accounts))
}

pub async fn get_account(
    identity: &IdentityClient,
    plaid: &PlaidClient,
    bank: &Bank,
) -> AppResult<AccountDetail> {
    let account = account_view(plaid, bank).await?;
    let transfers = identity.get_transfers_by_bank_id(&bank.id).await?;
    let plaid_transactions = plaid.get_transactions(&bank.access_token).await?;

    let transactions = merge_transactions(plaid_transactions, transfers, bank);
    Ok(AccountDetail {
        account,
        transactions,
    })
}

pub async fn build_dashboard(
    identity: &IdentityClient,
    plaid: &PlaidClient,
    user: User,
    bank_id: Option<&str>,
    page: usize,
) -> AppResult<Dashboard> {
    let banks = identity.get_banks(&user.id).await?;
    let mut accounts = Vec::with_capacity(banks.len());
    for bank in &banks {
        accounts.push(account_view(plaid, bank).await?);
    }
    let overview = summarize(accounts);

    let selected_bank = match bank_id {
        Some(id) => Some(
            banks
                .iter()
                .find(|b| b.id == id)
                .ok_or_else(|| AppError::NotFound("Bank not found".into()))?,
        ),
        None => banks.first(),
    };

    let (selected, transactions) = match selected_bank {
        Some(bank) => {
            let transfers = identity.get_transfers_by_bank_id(&bank.id).await?;
            let plaid_transactions = plaid.get_transactions(&bank.access_token).await?;
            let selected = overview.accounts.iter().find(|a| a.bank_id == bank.id).cloned();
            (
                selected,
                merge_transactions(plaid_transactions, transfers, bank),
            )
        }
        None => (None, Vec::new()),
    };

    Ok(Dashboard {
        user,
        overview,
        selected,
        top_categories: count_categories(&transactions),
        recent_transactions: paginate(&transactions, page, TRANSACTIONS_PER_PAGE),
    })
}
