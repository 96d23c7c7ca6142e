use crate::core::config::Config;
use crate::core::services::expense_parser::ParsedExpense;
use crate::core::services::google_auth::{GoogleAuth, SPREADSHEETS_SCOPE};
use crate::errors::MyError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serde_json::json;
use std::time::Duration;
use url::Url;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// One ledger line, captured when the message was understood.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    pub value: f64,
    pub description: String,
    pub account: String,
    pub raw_text: String,
    pub timestamp: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(expense: ParsedExpense, raw_text: &str) -> Self {
        Self::at(expense, raw_text, Utc::now())
    }

    pub fn at(expense: ParsedExpense, raw_text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            value: expense.value,
            description: expense.description,
            account: expense.account,
            raw_text: raw_text.to_owned(),
            timestamp,
        }
    }

    /// `[datetime, value, description, account, original text]`
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.2}", self.value),
            self.description.clone(),
            self.account.clone(),
            self.raw_text.clone(),
        ]
    }
}

#[async_trait]
pub trait Ledger: Send + Sync {
    async fn append(&self, record: &ExpenseRecord) -> Result<(), MyError>;
}

/// Appends rows to a worksheet through the Sheets `values:append` API.
pub struct SheetsLedger {
    client: reqwest::Client,
    auth: GoogleAuth,
    sheet_id: String,
    worksheet: String,
}

impl SheetsLedger {
    pub fn new(config: &Config) -> Result<Self, MyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let auth = GoogleAuth::new(
            config.get_service_account().clone(),
            SPREADSHEETS_SCOPE,
            client.clone(),
        );

        Ok(Self {
            client,
            auth,
            sheet_id: config.get_sheet_id().to_owned(),
            worksheet: config.get_worksheet_name().to_owned(),
        })
    }

    fn append_url(&self) -> Result<Url, MyError> {
        let mut url = Url::parse(SHEETS_API_URL)?;
        url.path_segments_mut()
            .map_err(|_| MyError::Ledger("sheets API url cannot hold a path".to_owned()))?
            .push(&self.sheet_id)
            .push("values")
            .push(&format!("{}:append", worksheet_range(&self.worksheet)));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }
}

fn worksheet_range(worksheet: &str) -> String {
    format!("'{}'!A:E", worksheet.replace('\'', "''"))
}

#[async_trait]
impl Ledger for SheetsLedger {
    async fn append(&self, record: &ExpenseRecord) -> Result<(), MyError> {
        let token = self.auth.access_token().await?;
        let response = self
            .client
            .post(self.append_url()?)
            .bearer_auth(token)
            .json(&json!({ "values": [record.to_row()] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MyError::Ledger(format!(
                "append to {} failed with {}: {}",
                self.worksheet, status, body
            )));
        }

        debug!("Appended row to worksheet {}", self.worksheet);
        Ok(())
    }
}
