//! Yahoo Finance HTTP 클라이언트.
//!
//! 세마포어로 동시 요청 수를 제한하는 배치 다운로드를 제공합니다.
//! 요청 하나의 실패(전송 오류, 타임아웃, JSON 파싱 실패)는 그 자리의
//! `None`으로 격리되고 배치는 끝까지 진행됩니다.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::Result;
use crate::provider::params::Params;

/// 요청 타임아웃. 응답 없는 연결이 배치를 붙잡는 것을 방지.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// 대량 가격 다운로드 기본 동시 요청 상한.
pub const DEFAULT_MAX_CONCURRENT: usize = 1000;

/// chart / quoteSummary API 클라이언트.
pub struct YahooClient {
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// GET 요청 한 번. 비 2xx 응답도 JSON 본문을 그대로 파싱합니다.
    /// Yahoo는 데이터 없음을 오류 상태 + JSON 본문으로 알려주고,
    /// "데이터 없음" 판정은 파서의 몫입니다.
    pub async fn fetch(&self, url: &str, params: &Params) -> Result<Value> {
        let response = self.client.get(url).query(params).send().await?;
        debug!(url = url, status = %response.status(), "응답 수신");
        let body = response.json::<Value>().await?;
        Ok(body)
    }

    /// 배치 다운로드. 결과는 요청 제출 순서 그대로이며, 실패한 요청
    /// 자리는 `None`입니다.
    pub async fn fetch_all(
        &self,
        requests: &[(String, Params)],
        max_concurrent: usize,
    ) -> Vec<Option<Value>> {
        let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

        let futures = requests.iter().map(|(url, params)| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // permit은 요청 전체 수명 동안 유지
                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(_) => return None,
                };
                match self.fetch(url, params).await {
                    Ok(body) => Some(body),
                    Err(err) => {
                        warn!(url = url.as_str(), error = %err, "요청 실패, 빈 결과로 대체");
                        None
                    }
                }
            }
        });

        join_all(futures).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn request(url: String) -> (String, Params) {
        (url, vec![("interval".to_string(), "1d".to_string())])
    }

    #[tokio::test]
    async fn test_fetch_parses_json_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/chart/ABC")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"chart": {"result": [1]}}"#)
            .create_async()
            .await;

        let client = YahooClient::new().unwrap();
        let url = format!("{}/chart/ABC", server.url());
        let body = client.fetch(&url, &Params::new()).await.unwrap();
        assert_eq!(body, json!({"chart": {"result": [1]}}));
    }

    #[tokio::test]
    async fn test_fetch_parses_error_status_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/chart/NOPE")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#)
            .create_async()
            .await;

        let client = YahooClient::new().unwrap();
        let url = format!("{}/chart/NOPE", server.url());
        let body = client.fetch(&url, &Params::new()).await.unwrap();
        assert_eq!(body["chart"]["error"]["code"], json!("Not Found"));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_in_order() {
        let mut server = mockito::Server::new_async().await;
        let _ok1 = server
            .mock("GET", "/a")
            .match_query(Matcher::Any)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;
        let _bad = server
            .mock("GET", "/b")
            .match_query(Matcher::Any)
            .with_body("not json at all")
            .create_async()
            .await;
        let _ok2 = server
            .mock("GET", "/c")
            .match_query(Matcher::Any)
            .with_body(r#"{"id": 3}"#)
            .create_async()
            .await;

        let client = YahooClient::new().unwrap();
        let requests = vec![
            request(format!("{}/a", server.url())),
            request(format!("{}/b", server.url())),
            request(format!("{}/c", server.url())),
        ];
        let results = client.fetch_all(&requests, 2).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Some(json!({"id": 1})));
        assert_eq!(results[1], None);
        assert_eq!(results[2], Some(json!({"id": 3})));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let client = YahooClient::new().unwrap();
        let results = client.fetch_all(&[], 10).await;
        assert!(results.is_empty());
    }
}
