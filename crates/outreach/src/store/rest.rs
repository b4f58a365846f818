use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{AssetStorage, StoreError, SubmissionRepository};
use crate::config::StoreConfig;
use crate::workflows::domain::{
    ImageUpload, NewSubmission, PollingStation, Region, SortOrder, Submission,
};

const USER_AGENT: &str = concat!("outreach/", env!("CARGO_PKG_VERSION"));

/// REST adapter for a hosted PostgREST table API plus object storage bucket.
#[derive(Clone)]
pub struct RestStoreClient {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    stations_table: String,
    submissions_table: String,
}

impl RestStoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Unavailable("STORE_URL is not configured".to_string()))?;
        let api_key = config.api_key.as_deref().unwrap_or_default();

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(auth_headers(api_key)?)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(transport)?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            stations_table: config.stations_table.clone(),
            submissions_table: config.submissions_table.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    fn stations_request(&self, region: Option<Region>) -> Result<Request, StoreError> {
        let mut query = vec![("select", "*".to_string())];
        match region {
            Some(region) => {
                query.push(("lac", format!("eq.{}", region.label())));
                query.push(("order", "station_name.asc".to_string()));
            }
            None => query.push(("order", "lac.asc,station_name.asc".to_string())),
        }

        self.http
            .get(self.table_url(&self.stations_table))
            .query(&query)
            .build()
            .map_err(transport)
    }

    fn submissions_request(&self, order: SortOrder) -> Result<Request, StoreError> {
        let order = format!("created_at.{}", order.as_query());
        self.http
            .get(self.table_url(&self.submissions_table))
            .query(&[("select", "*"), ("order", order.as_str())])
            .build()
            .map_err(transport)
    }

    fn insert_request(&self, record: &NewSubmission) -> Result<Request, StoreError> {
        self.http
            .post(self.table_url(&self.submissions_table))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .build()
            .map_err(transport)
    }

    fn upload_request(&self, path: &str, image: &ImageUpload) -> Result<Request, StoreError> {
        self.http
            .post(self.object_url(path))
            .header(CONTENT_TYPE, image.content_type.as_str())
            .body(image.bytes.clone())
            .build()
            .map_err(transport)
    }

    async fn execute(&self, request: Request) -> Result<Response, StoreError> {
        self.http.execute(request).await.map_err(transport)
    }
}

/// `apikey` plus bearer headers sent with every request.
fn auth_headers(api_key: &str) -> Result<HeaderMap, StoreError> {
    let mut headers = HeaderMap::new();
    headers.insert("apikey", header_value(api_key)?);
    headers.insert(AUTHORIZATION, header_value(&format!("Bearer {api_key}"))?);
    Ok(headers)
}

fn header_value(raw: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(raw).map_err(|err| StoreError::Unavailable(err.to_string()))
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|err| StoreError::Decode(err.to_string()))
}

#[async_trait]
impl SubmissionRepository for RestStoreClient {
    async fn list_stations(
        &self,
        region: Option<Region>,
    ) -> Result<Vec<PollingStation>, StoreError> {
        let response = self.execute(self.stations_request(region)?).await?;
        let stations: Vec<PollingStation> = decode(response).await?;
        tracing::debug!(count = stations.len(), ?region, "fetched polling stations");
        Ok(stations)
    }

    async fn list_submissions(&self, order: SortOrder) -> Result<Vec<Submission>, StoreError> {
        let response = self.execute(self.submissions_request(order)?).await?;
        let submissions: Vec<Submission> = decode(response).await?;
        tracing::debug!(count = submissions.len(), "fetched submissions");
        Ok(submissions)
    }

    async fn insert_submission(&self, record: NewSubmission) -> Result<(), StoreError> {
        let response = self.execute(self.insert_request(&record)?).await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AssetStorage for RestStoreClient {
    async fn upload_asset(&self, path: &str, image: &ImageUpload) -> Result<String, StoreError> {
        let response = self.execute(self.upload_request(path, image)?).await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::Status {
                status: StatusCode::CONFLICT.as_u16(),
                body: format!("asset already exists at {path}"),
            });
        }
        ensure_success(response).await?;
        Ok(self.public_url(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap as ServerHeaders;
    use axum::routing::{get, post};
    use axum::Router;
    use serde_json::{json, Value};

    fn config(url: Option<&str>) -> StoreConfig {
        StoreConfig {
            url: url.map(str::to_string),
            api_key: Some("anon-key".to_string()),
            ..StoreConfig::default()
        }
    }

    fn client() -> RestStoreClient {
        RestStoreClient::new(&config(Some("https://store.example.org/"))).expect("client builds")
    }

    fn query_pairs(request: &Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    fn json_body(request: &Request) -> Value {
        let bytes = request
            .body()
            .and_then(|body| body.as_bytes())
            .expect("buffered body");
        serde_json::from_slice(bytes).expect("json body")
    }

    #[test]
    fn requires_a_configured_url() {
        assert!(matches!(
            RestStoreClient::new(&config(None)),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn builds_bucket_urls_without_duplicate_slashes() {
        let client = client();
        assert_eq!(
            client.public_url("Jonai/1700000000000-front-a.jpg"),
            "https://store.example.org/storage/v1/object/public/man-ki-bat-images/Jonai/1700000000000-front-a.jpg"
        );
        assert_eq!(
            client.table_url("polling_stations"),
            "https://store.example.org/rest/v1/polling_stations"
        );
    }

    #[test]
    fn auth_headers_carry_key_and_bearer_token() {
        let headers = auth_headers("anon-key").expect("headers build");
        assert_eq!(headers["apikey"], "anon-key");
        assert_eq!(headers[AUTHORIZATION], "Bearer anon-key");
        assert!(auth_headers("bad\nkey").is_err());
    }

    #[test]
    fn region_station_request_filters_and_orders_by_name() {
        let request = client()
            .stations_request(Some(Region::Sisiborgaon))
            .expect("request builds");
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/polling_stations");
        assert_eq!(
            query_pairs(&request),
            vec![
                pair("select", "*"),
                pair("lac", "eq.Sisiborgaon"),
                pair("order", "station_name.asc"),
            ]
        );
    }

    #[test]
    fn unfiltered_station_request_orders_by_region_then_name() {
        let request = client().stations_request(None).expect("request builds");
        assert_eq!(
            query_pairs(&request),
            vec![pair("select", "*"), pair("order", "lac.asc,station_name.asc")]
        );
    }

    #[test]
    fn submission_request_orders_by_creation_time() {
        let client = client();
        let ascending = client
            .submissions_request(SortOrder::Ascending)
            .expect("request builds");
        assert_eq!(ascending.url().path(), "/rest/v1/man_ki_bat_submissions");
        assert!(query_pairs(&ascending).contains(&pair("order", "created_at.asc")));

        let descending = client
            .submissions_request(SortOrder::Descending)
            .expect("request builds");
        assert!(query_pairs(&descending).contains(&pair("order", "created_at.desc")));
    }

    #[test]
    fn insert_request_posts_a_single_row_array_with_minimal_return() {
        let record = NewSubmission {
            lac: Region::Jonai,
            polling_station: "4 - Murkong Selek HS".to_string(),
            total_attendances: 75,
            venue: "School field".to_string(),
            eminent_guests: vec!["Gaon Burha".to_string()],
            front_image_url: "https://cdn/front.jpg".to_string(),
            back_image_url: "https://cdn/back.jpg".to_string(),
        };
        let request = client().insert_request(&record).expect("request builds");

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()["Prefer"], "return=minimal");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            json_body(&request),
            json!([{
                "lac": "Jonai",
                "polling_station": "4 - Murkong Selek HS",
                "total_attendances": 75,
                "venue": "School field",
                "eminent_guests": ["Gaon Burha"],
                "front_image_url": "https://cdn/front.jpg",
                "back_image_url": "https://cdn/back.jpg"
            }])
        );
    }

    #[test]
    fn upload_request_targets_bucket_path_with_image_content_type() {
        let image = ImageUpload::new("a.png", "image/png", vec![0x89, 0x50, 0x4E, 0x47]);
        let request = client()
            .upload_request("Dhemaji/1-abc-front-a.png", &image)
            .expect("request builds");

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.url().path(),
            "/storage/v1/object/man-ki-bat-images/Dhemaji/1-abc-front-a.png"
        );
        assert_eq!(request.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(
            request.body().and_then(|body| body.as_bytes()),
            Some(&[0x89, 0x50, 0x4E, 0x47][..])
        );
    }

    async fn serve(router: Router) -> RestStoreClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        RestStoreClient::new(&config(Some(&format!("http://{addr}")))).expect("client builds")
    }

    #[tokio::test]
    async fn error_statuses_surface_with_their_body() {
        let router = Router::new()
            .route(
                "/rest/v1/polling_stations",
                get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route(
                "/storage/v1/object/man-ki-bat-images/*path",
                post(|| async { (axum::http::StatusCode::CONFLICT, "duplicate") }),
            );
        let client = serve(router).await;

        match client.list_stations(None).await {
            Err(StoreError::Status { status: 503, body }) => assert_eq!(body, "maintenance"),
            other => panic!("expected 503 status error, got {other:?}"),
        }

        let image = ImageUpload::new("a.jpg", "image/jpeg", vec![0xFF]);
        assert!(matches!(
            client.upload_asset("Jonai/a.jpg", &image).await,
            Err(StoreError::Status { status: 409, .. })
        ));
    }

    #[tokio::test]
    async fn successful_reads_decode_rows_and_send_credentials() {
        let router = Router::new().route(
            "/rest/v1/man_ki_bat_submissions",
            get(|headers: ServerHeaders| async move {
                let authorized = headers
                    .get("apikey")
                    .is_some_and(|value| value == "anon-key");
                if !authorized {
                    return (axum::http::StatusCode::UNAUTHORIZED, axum::Json(json!([])));
                }
                (
                    axum::http::StatusCode::OK,
                    axum::Json(json!([{
                        "id": "7",
                        "lac": "Dhemaji",
                        "polling_station": "A",
                        "total_attendances": null,
                        "created_at": "2025-03-30T05:00:00Z"
                    }])),
                )
            }),
        );
        let client = serve(router).await;

        let submissions = client
            .list_submissions(SortOrder::Descending)
            .await
            .expect("rows decode");
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].attendance(), 0);
    }
}
