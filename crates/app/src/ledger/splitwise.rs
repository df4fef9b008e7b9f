//! Splitwise expense ledger.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{CreatedExpense, ExpenseLedger, ExpenseRequest, LedgerError};

/// Configuration for connecting to Splitwise.
#[derive(Debug, Clone)]
pub struct SplitwiseConfig {
    /// API base URL, e.g. `"https://secure.splitwise.com/api/v3.0"`.
    pub base_url: String,

    /// API key used as a bearer token.
    pub api_key: String,
}

/// HTTP client for the Splitwise `create_expense` endpoint.
#[derive(Debug, Clone)]
pub struct SplitwiseLedger {
    config: SplitwiseConfig,
    http: Client,
}

impl SplitwiseLedger {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: SplitwiseConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ExpenseLedger for SplitwiseLedger {
    async fn create_expense(
        &self,
        request: &ExpenseRequest,
    ) -> Result<CreatedExpense, LedgerError> {
        request.check_balanced()?;

        let url = format!(
            "{}/create_expense",
            self.config.base_url.trim_end_matches('/')
        );

        debug!(cost = %request.cost, users = request.shares.len(), "posting expense");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .form(&form_fields(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(LedgerError::Rejected(format!(
                "create_expense failed with status {status}: {text}"
            )));
        }

        let created = response.json::<CreateExpenseResponse>().await?.into_created()?;

        info!(expense_id = created.id, "expense recorded");

        Ok(created)
    }
}

fn form_fields(request: &ExpenseRequest) -> Vec<(String, String)> {
    let mut fields = vec![
        ("cost".to_string(), request.cost.to_string()),
        ("description".to_string(), request.description.clone()),
        ("currency_code".to_string(), request.currency_code.clone()),
        (
            "group_id".to_string(),
            request.group_id.unwrap_or_default().to_string(),
        ),
    ];

    for (index, share) in request.shares.iter().enumerate() {
        fields.push((format!("users__{index}__user_id"), share.user_id.to_string()));
        fields.push((
            format!("users__{index}__paid_share"),
            share.paid_share.to_string(),
        ));
        fields.push((
            format!("users__{index}__owed_share"),
            share.owed_share.to_string(),
        ));
    }

    fields
}

#[derive(Debug, Deserialize)]
struct CreateExpenseResponse {
    #[serde(default)]
    expenses: Vec<ExpenseRecord>,

    #[serde(default)]
    errors: Value,
}

#[derive(Debug, Deserialize)]
struct ExpenseRecord {
    id: u64,
}

impl CreateExpenseResponse {
    fn into_created(self) -> Result<CreatedExpense, LedgerError> {
        let has_errors = match &self.errors {
            Value::Null => false,
            Value::Object(map) => !map.is_empty(),
            Value::Array(list) => !list.is_empty(),
            _ => true,
        };

        if has_errors {
            return Err(LedgerError::Rejected(self.errors.to_string()));
        }

        self.expenses
            .first()
            .map(|expense| CreatedExpense { id: expense.id })
            .ok_or_else(|| LedgerError::Rejected("no expense was created".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Matcher, Server};
    use rust_decimal::Decimal;
    use serde_json::json;
    use testresult::TestResult;

    use super::*;
    use crate::ledger::ExpenseShare;

    fn request() -> ExpenseRequest {
        ExpenseRequest {
            description: "Weekly shop".to_string(),
            currency_code: "GBP".to_string(),
            cost: Decimal::new(425, 2),
            group_id: Some(9),
            shares: vec![
                ExpenseShare {
                    user_id: 1,
                    paid_share: Decimal::new(425, 2),
                    owed_share: Decimal::new(255, 2),
                },
                ExpenseShare {
                    user_id: 2,
                    paid_share: Decimal::ZERO,
                    owed_share: Decimal::new(170, 2),
                },
            ],
        }
    }

    #[test]
    fn form_lists_every_user_row() {
        let fields = form_fields(&request());
        let get = |key: &str| {
            fields
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(get("cost"), Some("4.25"));
        assert_eq!(get("currency_code"), Some("GBP"));
        assert_eq!(get("group_id"), Some("9"));
        assert_eq!(get("users__0__user_id"), Some("1"));
        assert_eq!(get("users__0__paid_share"), Some("4.25"));
        assert_eq!(get("users__1__paid_share"), Some("0"));
        assert_eq!(get("users__1__owed_share"), Some("1.70"));
        assert_eq!(get("users__2__user_id"), None);
    }

    #[test]
    fn created_expenses_are_read_from_the_response() -> TestResult {
        let response: CreateExpenseResponse =
            serde_json::from_value(json!({ "expenses": [{ "id": 51 }], "errors": {} }))?;

        assert_eq!(response.into_created()?, CreatedExpense { id: 51 });

        Ok(())
    }

    #[test]
    fn error_payloads_are_rejections() -> TestResult {
        let response: CreateExpenseResponse = serde_json::from_value(json!({
            "expenses": [],
            "errors": { "base": ["The total of everyone's paid shares is not equal to the cost"] }
        }))?;

        assert!(matches!(
            response.into_created(),
            Err(LedgerError::Rejected(message)) if message.contains("paid shares")
        ));

        Ok(())
    }

    fn ledger(server: &Server) -> SplitwiseLedger {
        SplitwiseLedger::new(SplitwiseConfig {
            base_url: server.url(),
            api_key: "key".to_string(),
        })
    }

    #[tokio::test]
    async fn posts_the_form_and_returns_the_created_expense() -> TestResult {
        let mut server = Server::new_async().await;

        let create = server
            .mock("POST", "/create_expense")
            .match_header("authorization", "Bearer key")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("cost".to_string(), "4.25".to_string()),
                Matcher::UrlEncoded("users__1__owed_share".to_string(), "1.70".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"expenses":[{"id":51}],"errors":{}}"#)
            .create_async()
            .await;

        let created = ledger(&server).create_expense(&request()).await?;

        assert_eq!(created, CreatedExpense { id: 51 });
        create.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn server_errors_are_rejections() {
        let mut server = Server::new_async().await;

        let _create = server
            .mock("POST", "/create_expense")
            .with_status(500)
            .with_body("upstream down")
            .create_async()
            .await;

        assert!(matches!(
            ledger(&server).create_expense(&request()).await,
            Err(LedgerError::Rejected(message)) if message.contains("500")
        ));
    }

    #[tokio::test]
    async fn error_payloads_with_success_status_are_rejections() {
        let mut server = Server::new_async().await;

        let _create = server
            .mock("POST", "/create_expense")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"expenses":[],"errors":{"base":["Invalid group"]}}"#)
            .create_async()
            .await;

        assert!(matches!(
            ledger(&server).create_expense(&request()).await,
            Err(LedgerError::Rejected(message)) if message.contains("Invalid group")
        ));
    }

    #[tokio::test]
    async fn unbalanced_requests_are_not_sent() {
        let ledger = SplitwiseLedger::new(SplitwiseConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "key".to_string(),
        });
        let mut request = request();
        request.cost = Decimal::new(500, 2);

        assert!(matches!(
            ledger.create_expense(&request).await,
            Err(LedgerError::Unbalanced { .. })
        ));
    }
}
