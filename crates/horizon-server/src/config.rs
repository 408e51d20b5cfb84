use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub cors_origin: String,
    pub sqlite_path: String,
    pub appwrite: AppwriteConfig,
    pub plaid: PlaidConfig,
    pub dwolla: DwollaConfig,
    pub checkbook: CheckbookConfig,
}

#[derive(Debug, Clone)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub database_id: String,
    pub user_collection_id: String,
    pub bank_collection_id: String,
    pub transaction_collection_id: String,
}

#[derive(Debug, Clone)]
pub struct PlaidConfig {
    pub base_url: String,
    pub client_id: Option<String>,
    pub secret: Option<String>,
    pub client_name: String,
}

#[derive(Debug, Clone)]
pub struct DwollaConfig {
    pub base_url: String,
    pub key: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CheckbookConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .expect("SERVER_PORT must be a valid port number"),
            cors_origin: var_or("CORS_ORIGIN", "http://localhost:3000"),
            sqlite_path: var_or("SQLITE_PATH", "./data/horizon.db"),
            appwrite: AppwriteConfig {
                endpoint: var_or("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
                project_id: var_or("APPWRITE_PROJECT", "horizon"),
                api_key: env::var("APPWRITE_KEY").ok(),
                database_id: var_or("APPWRITE_DATABASE_ID", "bank"),
                user_collection_id: var_or("APPWRITE_USER_COLLECTION_ID", "users"),
                bank_collection_id: var_or("APPWRITE_BANK_COLLECTION_ID", "banks"),
                transaction_collection_id: var_or(
                    "APPWRITE_TRANSACTION_COLLECTION_ID",
                    "transactions",
                ),
            },
            plaid: PlaidConfig {
                base_url: var_or("PLAID_BASE_URL", "https://sandbox.plaid.com"),
                client_id: env::var("PLAID_CLIENT_ID").ok(),
                secret: env::var("PLAID_SECRET").ok(),
                client_name: var_or("PLAID_CLIENT_NAME", "Horizon"),
            },
            dwolla: DwollaConfig {
                base_url: var_or("DWOLLA_BASE_URL", "https://api-sandbox.dwolla.com"),
                key: env::var("DWOLLA_KEY").ok(),
                secret: env::var("DWOLLA_SECRET").ok(),
            },
            checkbook: CheckbookConfig {
                base_url: var_or("CHECKBOOK_BASE_URL", "https://sandbox.checkbook.io/v3"),
                api_key: env::var("CHECKBOOK_API_KEY").ok(),
                api_secret: env::var("CHECKBOOK_API_SECRET").ok(),
            },
        }
    }
}
