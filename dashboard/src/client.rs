//! HTTP client for the ledger REST endpoints.
//!
//! One [`LedgerClient`] talks to every ledger; the [`LedgerSchema`] passed to
//! each call picks the endpoint and the expected list envelope. The bearer
//! token is read from the injected [`SessionProvider`] right before each
//! request, and a missing token fails with [`ClientError::SessionExpired`]
//! without touching the network.

use crate::config::DashboardConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionProvider;
use crate::storage::CookieJar;
use log::{debug, info, warn};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use shared::{unwrap_collection, FinancialRecord, LedgerSchema, SignInRequest, SignInResponse};
use std::fmt;
use std::sync::Arc;

const SIGNIN_PATH: [&str; 4] = ["api", "sample", "auth", "signin"];

/// How a record is addressed in the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    Id(String),
    /// Natural key (worker or merchant name)
    Name(String),
}

impl RecordKey {
    pub fn as_str(&self) -> &str {
        match self {
            RecordKey::Id(id) => id,
            RecordKey::Name(name) => name,
        }
    }

    /// The id when the record has one, otherwise the schema's natural key.
    pub fn for_record(schema: &LedgerSchema, record: &FinancialRecord) -> Option<RecordKey> {
        record
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| RecordKey::Id(id.to_string()))
            .or_else(|| schema.natural_key_of(record).map(|name| RecordKey::Name(name.to_string())))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct LedgerClient {
    http: Client,
    base_url: Url,
    session: Arc<dyn SessionProvider>,
}

impl LedgerClient {
    pub fn new(config: &DashboardConfig, session: Arc<dyn SessionProvider>) -> ClientResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn ledger_url(&self, schema: &LedgerSchema, key: Option<&RecordKey>) -> ClientResult<Url> {
        match key {
            Some(key) => self.url(&["api", schema.slug, key.as_str()]),
            None => self.url(&["api", schema.slug]),
        }
    }

    /// Build an authorized request. Fails before any I/O when there is no token.
    fn authorized(&self, method: Method, url: Url) -> ClientResult<RequestBuilder> {
        let session = self.session.session();
        let token = session.require_token()?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(error_for_status(status, text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Sign in and store the returned token and role as cookies.
    pub async fn sign_in(
        &self,
        jar: &CookieJar,
        user_name: &str,
        password: &str,
    ) -> ClientResult<SignInResponse> {
        let request = SignInRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url(&SIGNIN_PATH)?).json(&request).send().await?;
        let body = self.handle_response(response).await?;
        let signed_in: SignInResponse = serde_json::from_value(body)?;

        jar.save_session(&signed_in.access_token, &signed_in.role)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to store session: {}", e)))?;
        info!("Signed in as {} ({})", user_name, signed_in.role);
        Ok(signed_in)
    }

    pub async fn list(&self, schema: &LedgerSchema) -> ClientResult<Vec<FinancialRecord>> {
        let request = self.authorized(Method::GET, self.ledger_url(schema, None)?)?;
        let body = self.handle_response(request.send().await?).await?;
        let records = unwrap_collection(&body, schema.envelope)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        debug!("Fetched {} records from {}", records.len(), schema.slug);
        Ok(records)
    }

    /// Create a record. The server's echo is returned when it can be read,
    /// otherwise the record as sent.
    pub async fn create(
        &self,
        schema: &LedgerSchema,
        record: &FinancialRecord,
    ) -> ClientResult<FinancialRecord> {
        let request = self
            .authorized(Method::POST, self.ledger_url(schema, None)?)?
            .json(record);
        let body = self.handle_response(request.send().await?).await?;
        info!("Created record in {}", schema.slug);
        Ok(echoed_record(body).unwrap_or_else(|| record.clone()))
    }

    pub async fn update(
        &self,
        schema: &LedgerSchema,
        key: &RecordKey,
        record: &FinancialRecord,
    ) -> ClientResult<()> {
        let request = self
            .authorized(Method::PUT, self.ledger_url(schema, Some(key))?)?
            .json(record);
        self.handle_response(request.send().await?).await?;
        info!("Updated record {} in {}", key, schema.slug);
        Ok(())
    }

    pub async fn delete(&self, schema: &LedgerSchema, key: &RecordKey) -> ClientResult<()> {
        let request = self.authorized(Method::DELETE, self.ledger_url(schema, Some(key))?)?;
        self.handle_response(request.send().await?).await?;
        info!("Deleted record {} from {}", key, schema.slug);
        Ok(())
    }
}

/// Map a failed response to an error. Only a `{message}` body from the
/// server is shown verbatim on validation failures.
fn error_for_status(status: StatusCode, text: String) -> ClientError {
    let parsed = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .map(|body| body.message);
    warn!(
        "Request failed with {}: {}",
        status,
        parsed.as_deref().unwrap_or(&text)
    );
    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(parsed.unwrap_or(text)),
        StatusCode::NOT_FOUND => ClientError::NotFound(parsed.unwrap_or(text)),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ClientError::Validation(parsed.unwrap_or_default())
        }
        _ => ClientError::Server(parsed.unwrap_or(text)),
    }
}

/// A record from a create/update response: bare, or under `data`/`account`.
fn echoed_record(body: Value) -> Option<FinancialRecord> {
    let inner = match body {
        Value::Object(mut map) => match map.remove("data").or_else(|| map.remove("account")) {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        _ => return None,
    };
    serde_json::from_value(inner).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionContext;
    use serde_json::json;
    use shared::{find_schema, messages};

    fn client(base: &str, session: SessionContext) -> LedgerClient {
        let config = DashboardConfig::new(base, "/tmp/unused");
        LedgerClient::new(&config, Arc::new(session)).unwrap()
    }

    #[test]
    fn test_ledger_url_escapes_key() {
        let client = client("http://localhost:3000", SessionContext::anonymous());
        let schema = find_schema("merchant-account").unwrap();
        let url = client
            .ledger_url(schema, Some(&RecordKey::Name("أحمد علي/2".into())))
            .unwrap();
        assert!(url.as_str().starts_with("http://localhost:3000/api/merchant-account/"));
        assert!(!url.path().ends_with("/2"));
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn test_ledger_url_with_base_path() {
        let client = client("http://host/prefix/", SessionContext::anonymous());
        let schema = find_schema("basem-account").unwrap();
        let url = client.ledger_url(schema, None).unwrap();
        assert_eq!(url.as_str(), "http://host/prefix/api/basem-account");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = DashboardConfig::new("not a url", "/tmp/unused");
        let result = LedgerClient::new(&config, Arc::new(SessionContext::anonymous()));
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_authorized_requires_token() {
        let client = client("http://localhost:3000", SessionContext::anonymous());
        let url = client.url(&["api"]).unwrap();
        assert!(matches!(
            client.authorized(Method::GET, url),
            Err(ClientError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn test_list_without_token_makes_no_request() {
        // nothing listens on port 9; a network attempt would fail with Http
        let client = client("http://127.0.0.1:9", SessionContext::anonymous());
        let schema = find_schema("daily-sales").unwrap();
        assert!(matches!(client.list(schema).await, Err(ClientError::SessionExpired)));
    }

    #[test]
    fn test_record_key_for_record() {
        let merchants = find_schema("merchant-account").unwrap();
        let mut record = FinancialRecord::new("2024-01-01").with("merchantName", "Ali");
        assert_eq!(
            RecordKey::for_record(merchants, &record),
            Some(RecordKey::Name("Ali".into()))
        );
        record.id = Some("42".into());
        assert_eq!(RecordKey::for_record(merchants, &record), Some(RecordKey::Id("42".into())));

        let basem = find_schema("basem-account").unwrap();
        assert_eq!(RecordKey::for_record(basem, &FinancialRecord::new("2024-01-01")), None);
    }

    #[test]
    fn test_error_for_status() {
        let plain = "Failed to deserialize the JSON body".to_string();
        let error = error_for_status(StatusCode::UNPROCESSABLE_ENTITY, plain.clone());
        assert!(matches!(&error, ClientError::Validation(msg) if msg.is_empty()));
        assert_eq!(error.toast_message(), messages::INVALID_INPUT);

        let body = json!({ "message": "خطأ في الإدخال" }).to_string();
        let error = error_for_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(error.toast_message(), "خطأ في الإدخال");

        let error = error_for_status(StatusCode::NOT_FOUND, plain.clone());
        assert!(matches!(&error, ClientError::NotFound(msg) if msg == &plain));
        assert!(matches!(
            error_for_status(StatusCode::BAD_GATEWAY, plain),
            ClientError::Server(_)
        ));
    }

    #[test]
    fn test_echoed_record_shapes() {
        let bare = json!({ "id": "1", "date": "2024-01-01" });
        assert_eq!(echoed_record(bare).unwrap().id.as_deref(), Some("1"));

        let wrapped = json!({ "message": "ok", "data": { "id": "2", "date": "2024-01-01" } });
        assert_eq!(echoed_record(wrapped).unwrap().id.as_deref(), Some("2"));

        let account = json!({ "account": { "id": "3", "date": "2024-01-01" } });
        assert_eq!(echoed_record(account).unwrap().id.as_deref(), Some("3"));

        assert!(echoed_record(json!([1, 2])).is_none());
    }
}
