//! Custom view record listing
//!
//! Walks the pages of a saved server-side filter (a "custom view") and
//! collects its records.

pub mod result;

pub use result::record_ids;
use result::ViewPage;

use super::client::{ZohoClient, read_json};
use super::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use super::error::ApiError;
use super::models::AuthSession;
use super::resilience::ApiLogger;

/// Options for `ZohoClient::fetch_by_view`
#[derive(Debug, Clone)]
pub struct ViewFetchOptions {
    /// Walk every page instead of stopping after the first one
    pub fetch_all: bool,
    /// Records per page, clamped to 1..=200
    pub page_size: u32,
    /// Field API names to return; omitted from the request when empty
    pub fields: Vec<String>,
}

impl Default for ViewFetchOptions {
    fn default() -> Self {
        Self {
            fetch_all: false,
            page_size: DEFAULT_PAGE_SIZE,
            fields: Vec::new(),
        }
    }
}

impl ViewFetchOptions {
    pub fn all() -> Self {
        Self {
            fetch_all: true,
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

impl ZohoClient {
    /// Fetch the records of a custom view.
    ///
    /// With `fetch_all` unset only the first page is requested, and a failure
    /// is logged and yields whatever was collected. With `fetch_all` set,
    /// pages are walked until `more_records` is false or a page is empty, and
    /// any page failure is returned to the caller.
    pub async fn fetch_by_view(
        &self,
        session: &AuthSession,
        module: &str,
        view_id: &str,
        options: &ViewFetchOptions,
    ) -> Result<Vec<serde_json::Value>, ApiError> {
        let logger = ApiLogger::new(session.secrets().clone());
        let page_delay = self.resilience().pacing.page_delay;
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let view_page = match self
                .fetch_view_page(session, &logger, module, view_id, page, options)
                .await
            {
                Ok(view_page) => view_page,
                Err(e) if options.fetch_all => return Err(e),
                Err(e) => {
                    logger.warn(&format!(
                        "Fetching page {} of view {} failed, returning {} record(s): {}",
                        page,
                        view_id,
                        records.len(),
                        e
                    ));
                    break;
                }
            };

            let count = view_page.records.len();
            let last_page = view_page.is_empty() || !view_page.more_records;
            records.extend(view_page.records);
            logger.debug(&format!(
                "View {} page {}: {} record(s), more_records={}",
                view_id, page, count, view_page.more_records
            ));

            if !options.fetch_all || last_page {
                break;
            }

            page += 1;
            if !page_delay.is_zero() {
                tokio::time::sleep(page_delay).await;
            }
        }

        logger.info(&format!(
            "Fetched {} record(s) from view {} in {} page(s)",
            records.len(),
            view_id,
            page
        ));
        Ok(records)
    }

    async fn fetch_view_page(
        &self,
        session: &AuthSession,
        logger: &ApiLogger,
        module: &str,
        view_id: &str,
        page: u32,
        options: &ViewFetchOptions,
    ) -> Result<ViewPage, ApiError> {
        let mut query = vec![
            ("cvid", view_id.to_string()),
            ("per_page", options.effective_page_size().to_string()),
            ("page", page.to_string()),
        ];
        if !options.fields.is_empty() {
            query.push(("fields", options.fields.join(",")));
        }

        let label = format!("view {} page {}", view_id, page);
        let response = self.get(session, logger, &label, module, &query).await?;

        match read_json(response, logger).await {
            Ok(body) => Ok(ViewPage::from_value(&body)),
            Err(e) => {
                logger.warn(&format!("{}: unreadable payload treated as empty: {}", label, e));
                Ok(ViewPage::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::resilience::{ResilienceConfig, SecretSet};
    use serde_json::{Value, json};
    use std::time::{Duration, Instant};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ZohoClient {
        ZohoClient::new(ResilienceConfig::disabled()).unwrap()
    }

    fn session(server: &MockServer) -> AuthSession {
        AuthSession::new("tok".to_string(), server.uri(), SecretSet::new())
    }

    fn page_body(start: usize, count: usize, more: bool) -> Value {
        let data: Vec<Value> = (start..start + count)
            .map(|i| json!({"id": i.to_string()}))
            .collect();
        json!({"data": data, "info": {"more_records": more, "count": count}})
    }

    async fn mount_page(server: &MockServer, page: u32, body: Value) {
        Mock::given(method("GET"))
            .and(path("/crm/v8/Leads"))
            .and(query_param("cvid", "555"))
            .and(query_param("page", page.to_string()))
            .and(header("Authorization", "Zoho-oauthtoken tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_all_walks_pages() {
        let server = MockServer::start().await;
        mount_page(&server, 1, page_body(0, 200, true)).await;
        mount_page(&server, 2, page_body(200, 200, true)).await;
        mount_page(&server, 3, page_body(400, 37, false)).await;

        let records = client()
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::all())
            .await
            .unwrap();

        assert_eq!(records.len(), 437);
        assert_eq!(record_ids(&records)[436], "436");
    }

    #[tokio::test]
    async fn test_single_page_ignores_more_records() {
        let server = MockServer::start().await;
        mount_page(&server, 1, page_body(0, 200, true)).await;

        let records = client()
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::default())
            .await
            .unwrap();

        assert_eq!(records.len(), 200);
    }

    #[tokio::test]
    async fn test_empty_page_stops_walk() {
        let server = MockServer::start().await;
        mount_page(&server, 1, page_body(0, 5, true)).await;
        mount_page(&server, 2, json!({"data": "unexpected", "info": {"more_records": true}})).await;

        let records = client()
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::all())
            .await
            .unwrap();

        assert_eq!(records.len(), 5);
    }

    #[tokio::test]
    async fn test_no_content_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let records = client()
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::all())
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_page_size_and_fields_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("per_page", "200"))
            .and(query_param("fields", "id,Lead_Status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, 1, false)))
            .expect(1)
            .mount(&server)
            .await;

        let options = ViewFetchOptions::default()
            .with_page_size(1000)
            .with_fields(vec!["id".to_string(), "Lead_Status".to_string()]);
        let records = client()
            .fetch_by_view(&session(&server), "Leads", "555", &options)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_fatal_only_when_fetching_all() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "INVALID_DATA", "message": "invalid cvid"
            })))
            .mount(&server)
            .await;

        let partial = client()
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::default())
            .await
            .unwrap();
        assert!(partial.is_empty());

        let err = client()
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::all())
            .await
            .unwrap_err();
        assert_eq!(err.record_code(), "INVALID_DATA");
    }

    #[tokio::test]
    async fn test_failure_after_first_page_aborts_full_walk() {
        let server = MockServer::start().await;
        mount_page(&server, 1, page_body(0, 200, true)).await;
        Mock::given(method("GET"))
            .and(path("/crm/v8/Leads"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": "INVALID_DATA", "message": "page out of range"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client()
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::all())
            .await
            .unwrap_err();
        assert_eq!(err.record_code(), "INVALID_DATA");
    }

    #[tokio::test]
    async fn test_page_delay_between_pages() {
        let server = MockServer::start().await;
        mount_page(&server, 1, page_body(0, 2, true)).await;
        mount_page(&server, 2, page_body(2, 2, true)).await;
        mount_page(&server, 3, page_body(4, 1, false)).await;

        let mut config = ResilienceConfig::disabled();
        config.pacing.page_delay = Duration::from_millis(150);
        let client = ZohoClient::new(config).unwrap();

        let start = Instant::now();
        let records = client
            .fetch_by_view(&session(&server), "Leads", "555", &ViewFetchOptions::all())
            .await
            .unwrap();

        assert_eq!(records.len(), 5);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
