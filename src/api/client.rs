use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;

use super::{
    APPROVED_TALKS_PATH, CfpApi, NOTIFICATION_REQUEST_PATH, PUBLICATION_REQUEST_PATH,
    SCHEDULES_PATH, TOKEN_SIGNIN_PATH, TokenExchange,
};
use crate::config::Config;
use crate::errors::ClientError;
use crate::models::{
    ApprovedTalksResponse, Schedule, SlotAllocation, Track, TrackListing, TrackStatus,
    WorkflowRequest,
};

/// HTTP implementation of [`CfpApi`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct CfpClient {
    http: reqwest::Client,
    base_url: String,
    cookie_name: String,
    session_cookie: Option<String>,
}

impl CfpClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::build(base_url, reqwest::Client::builder())
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let mut client = Self::build(&config.base_url, builder)?;
        client.cookie_name = config.cookie_name.clone();
        client.session_cookie = config.session_cookie.clone();
        Ok(client)
    }

    fn build(base_url: &str, builder: reqwest::ClientBuilder) -> Result<Self, ClientError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = builder.build().map_err(|source| ClientError::Transport {
            url: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie_name: "PLAY_SESSION".to_string(),
            session_cookie: None,
        })
    }

    /// Attach a session cookie value sent with every request.
    pub fn with_session_cookie(mut self, value: impl Into<String>) -> Self {
        self.session_cookie = Some(value.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of one track's schedule. The id is pushed as a single path
    /// segment so `/`, `?` and `#` are percent-encoded.
    fn schedule_url(&self, track_id: &str) -> Result<String, ClientError> {
        let invalid = || ClientError::InvalidBaseUrl(self.base_url.clone());
        let mut url = reqwest::Url::parse(&self.url(SCHEDULES_PATH)).map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|_| invalid())?.push(track_id);
        Ok(url.into())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.session_cookie {
            Some(value) => builder.header(header::COOKIE, format!("{}={}", self.cookie_name, value)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<Response, ClientError> {
        let resp = builder.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        check_status(resp, url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        url: &str,
    ) -> Result<T, ClientError> {
        let resp = self.send(builder, url).await?;
        resp.json::<T>().await.map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Pull the configured session cookie out of `Set-Cookie` headers.
    fn session_cookie_from(&self, resp: &Response) -> Option<String> {
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.to_string())
    }
}

fn check_status(resp: Response, url: &str) -> Result<Response, ClientError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Unauthorized {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    if !status.is_success() {
        return Err(ClientError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp)
}

#[async_trait]
impl CfpApi for CfpClient {
    async fn exchange_id_token(&self, id_token: &str) -> Result<TokenExchange, ClientError> {
        let url = self.url(TOKEN_SIGNIN_PATH);
        let resp = self
            .request(Method::POST, &url)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(id_token.to_string())
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(TokenExchange {
            status: resp.status().as_u16(),
            session_cookie: self.session_cookie_from(&resp),
        })
    }

    async fn approved_talks(&self, track_id: &str) -> Result<ApprovedTalksResponse, ClientError> {
        let url = self.url(APPROVED_TALKS_PATH);
        let builder = self
            .request(Method::GET, &url)
            .query(&[("trackId", track_id)]);
        self.get_json(builder, &url).await
    }

    async fn list_schedules(&self) -> Result<Vec<Track>, ClientError> {
        let url = self.url(SCHEDULES_PATH);
        let listing: TrackListing = self.get_json(self.request(Method::GET, &url), &url).await?;
        Ok(listing.into())
    }

    async fn get_schedule(&self, track_id: &str) -> Result<Schedule, ClientError> {
        let url = self.schedule_url(track_id)?;
        self.get_json(self.request(Method::GET, &url), &url).await
    }

    async fn save_schedule(
        &self,
        track_id: &str,
        slots: &[SlotAllocation],
    ) -> Result<(), ClientError> {
        let url = self.schedule_url(track_id)?;
        self.send(self.request(Method::POST, &url).json(slots), &url)
            .await?;
        Ok(())
    }

    async fn delete_schedule(&self, track_id: &str) -> Result<(), ClientError> {
        let url = self.schedule_url(track_id)?;
        self.send(self.request(Method::DELETE, &url), &url).await?;
        Ok(())
    }

    async fn update_status(&self, track: &Track) -> Result<(), ClientError> {
        let url = self.schedule_url(&track.id)?;
        let body = TrackStatus::from(track);
        self.send(self.request(Method::PUT, &url).json(&body), &url)
            .await?;
        Ok(())
    }

    async fn request_publication(&self, track_id: &str) -> Result<(), ClientError> {
        let url = self.url(PUBLICATION_REQUEST_PATH);
        let body = WorkflowRequest { track_id };
        self.send(self.request(Method::POST, &url).json(&body), &url)
            .await?;
        Ok(())
    }

    async fn request_notification(&self, track_id: &str) -> Result<(), ClientError> {
        let url = self.url(NOTIFICATION_REQUEST_PATH);
        let body = WorkflowRequest { track_id };
        self.send(self.request(Method::POST, &url).json(&body), &url)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode as AxumStatus, Uri},
        response::IntoResponse,
        routing::{get, post},
    };
    use serde_json::{Value, json};

    use super::*;

    /// Requests seen by the mock backend: (method, path, body).
    type Seen = Arc<Mutex<Vec<(String, String, String)>>>;

    #[derive(Clone)]
    struct Backend {
        seen: Seen,
    }

    fn record(state: &Backend, method: &str, path: String, body: String) {
        state.seen.lock().unwrap().push((method.to_string(), path, body));
    }

    async fn signin(State(state): State<Backend>, headers: HeaderMap, body: String) -> impl IntoResponse {
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        record(&state, "POST", "/gtokensignin".into(), format!("{}|{}", content_type, body));
        if body == "good-token" {
            (
                AxumStatus::OK,
                [("set-cookie", "PLAY_SESSION=s3cr3t; Path=/; HttpOnly")],
                "",
            )
                .into_response()
        } else {
            AxumStatus::BAD_REQUEST.into_response()
        }
    }

    async fn approved(
        State(state): State<Backend>,
        headers: HeaderMap,
        Query(params): Query<std::collections::HashMap<String, String>>,
    ) -> impl IntoResponse {
        let cookie = headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        record(&state, "GET", "/approvedTalks".into(), cookie.clone());
        if cookie != "PLAY_SESSION=s3cr3t" {
            return AxumStatus::UNAUTHORIZED.into_response();
        }
        let track = params.get("trackId").cloned().unwrap_or_default();
        Json(json!({
            "approvedTalks": {"talks": [{"id": 1, "title": format!("{} talk", track)}]},
            "fullSchedule": null
        }))
        .into_response()
    }

    async fn list(State(state): State<Backend>) -> Json<Value> {
        record(&state, "GET", "/schedules".into(), String::new());
        Json(json!([{"id": "java", "label": "Java", "blocked": false}]))
    }

    async fn schedule_get(State(state): State<Backend>, Path(id): Path<String>) -> impl IntoResponse {
        record(&state, "GET", format!("/schedules/{}", id), String::new());
        if id == "missing" {
            return AxumStatus::NOT_FOUND.into_response();
        }
        Json(json!({"slots": [{"id": "1", "proposals": [], "stadium": true}], "blocked": true}))
            .into_response()
    }

    async fn schedule_post(State(state): State<Backend>, Path(id): Path<String>, body: String) -> AxumStatus {
        record(&state, "POST", format!("/schedules/{}", id), body);
        AxumStatus::OK
    }

    async fn schedule_put(State(state): State<Backend>, Path(id): Path<String>, body: String) -> AxumStatus {
        record(&state, "PUT", format!("/schedules/{}", id), body);
        AxumStatus::OK
    }

    async fn schedule_delete(State(state): State<Backend>, Path(id): Path<String>) -> AxumStatus {
        record(&state, "DELETE", format!("/schedules/{}", id), String::new());
        AxumStatus::NO_CONTENT
    }

    async fn publication(State(state): State<Backend>, body: String) -> AxumStatus {
        record(&state, "POST", "/publicationRequest/".into(), body);
        AxumStatus::OK
    }

    async fn notification(State(state): State<Backend>, body: String) -> AxumStatus {
        record(&state, "POST", "/notificationRequest/".into(), body);
        AxumStatus::INTERNAL_SERVER_ERROR
    }

    /// Spawn the mock backend on an ephemeral port; returns its base URL.
    async fn spawn_backend() -> (String, Seen) {
        let seen: Seen = Arc::default();
        let app = Router::new()
            .route("/gtokensignin", post(signin))
            .route("/cfpadmin/scheduling/approvedTalks", get(approved))
            .route("/cfpadmin/scheduling/schedules", get(list))
            .route(
                "/cfpadmin/scheduling/schedules/publicationRequest/",
                post(publication),
            )
            .route(
                "/cfpadmin/scheduling/schedules/notificationRequest/",
                post(notification),
            )
            .route(
                "/cfpadmin/scheduling/schedules/{id}",
                get(schedule_get)
                    .post(schedule_post)
                    .put(schedule_put)
                    .delete(schedule_delete),
            )
            .with_state(Backend { seen: seen.clone() });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), seen)
    }

    #[test]
    fn test_invalid_base_url() {
        let err = CfpClient::new("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = CfpClient::new("http://localhost:9000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[tokio::test]
    async fn test_exchange_id_token_posts_plain_text_and_captures_cookie() {
        let (base, seen) = spawn_backend().await;
        let client = CfpClient::new(&base).unwrap();

        let exchange = client.exchange_id_token("good-token").await.unwrap();
        assert!(exchange.accepted());
        assert_eq!(exchange.session_cookie.as_deref(), Some("s3cr3t"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].2, "text/plain|good-token");
    }

    #[tokio::test]
    async fn test_exchange_id_token_rejection_is_not_an_error() {
        let (base, _) = spawn_backend().await;
        let client = CfpClient::new(&base).unwrap();

        let exchange = client.exchange_id_token("bad-token").await.unwrap();
        assert_eq!(exchange.status, 400);
        assert!(!exchange.accepted());
        assert!(exchange.session_cookie.is_none());
    }

    #[tokio::test]
    async fn test_approved_talks_requires_session() {
        let (base, _) = spawn_backend().await;

        let anonymous = CfpClient::new(&base).unwrap();
        let err = anonymous.approved_talks("java").await.unwrap_err();
        assert!(err.is_unauthorized());

        let signed_in = CfpClient::new(&base).unwrap().with_session_cookie("s3cr3t");
        let resp = signed_in.approved_talks("java").await.unwrap();
        assert_eq!(resp.approved_talks.talks.len(), 1);
        assert_eq!(resp.approved_talks.talks[0].title(), Some("java talk"));
        assert!(resp.full_schedule.is_none());
    }

    #[tokio::test]
    async fn test_list_and_get_schedules() {
        let (base, _) = spawn_backend().await;
        let client = CfpClient::new(&base).unwrap();

        let tracks = client.list_schedules().await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].label, "Java");

        let schedule = client.get_schedule("java").await.unwrap();
        assert!(schedule.blocked);
        assert!(schedule.slots[0].stadium);

        let err = client.get_schedule("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_mutations_use_expected_verbs_and_bodies() {
        let (base, seen) = spawn_backend().await;
        let client = CfpClient::new(&base).unwrap();

        let slots = vec![SlotAllocation {
            id: "1".into(),
            proposals: vec!["42".into()],
            stadium: false,
        }];
        client.save_schedule("java", &slots).await.unwrap();
        client.delete_schedule("java").await.unwrap();
        client
            .update_status(&Track {
                id: "java".into(),
                label: "Java".into(),
                blocked: true,
            })
            .await
            .unwrap();
        client.request_publication("java").await.unwrap();

        let seen = seen.lock().unwrap().clone();
        let bodies: Vec<(String, String, Value)> = seen
            .into_iter()
            .map(|(m, p, b)| (m, p, serde_json::from_str(&b).unwrap_or(Value::Null)))
            .collect();
        assert_eq!(
            bodies,
            vec![
                (
                    "POST".to_string(),
                    "/schedules/java".to_string(),
                    json!([{"id": "1", "proposals": ["42"], "stadium": false}])
                ),
                ("DELETE".to_string(), "/schedules/java".to_string(), Value::Null),
                (
                    "PUT".to_string(),
                    "/schedules/java".to_string(),
                    json!({"id": "java", "blocked": true})
                ),
                (
                    "POST".to_string(),
                    "/publicationRequest/".to_string(),
                    json!({"trackId": "java"})
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_track_id_is_a_single_encoded_segment() {
        let paths: Arc<Mutex<Vec<String>>> = Arc::default();
        let recorder = paths.clone();
        let app = Router::new().fallback(move |uri: Uri| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(uri.path().to_string());
                AxumStatus::NO_CONTENT
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = CfpClient::new(&format!("http://{}", addr)).unwrap();

        for id in ["c#", "a/b", "x?y"] {
            client.delete_schedule(id).await.unwrap();
        }
        client.save_schedule("a/b", &[]).await.unwrap();
        client
            .update_status(&Track {
                id: "x?y".into(),
                label: "X".into(),
                blocked: false,
            })
            .await
            .unwrap();

        assert_eq!(
            *paths.lock().unwrap(),
            vec![
                "/cfpadmin/scheduling/schedules/c%23",
                "/cfpadmin/scheduling/schedules/a%2Fb",
                "/cfpadmin/scheduling/schedules/x%3Fy",
                "/cfpadmin/scheduling/schedules/a%2Fb",
                "/cfpadmin/scheduling/schedules/x%3Fy",
            ]
        );
    }

    #[tokio::test]
    async fn test_server_error_passes_through() {
        let (base, _) = spawn_backend().await;
        let client = CfpClient::new(&base).unwrap();

        let err = client.request_notification("java").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = CfpClient::new(&format!("http://{}", addr)).unwrap();
        let err = client.list_schedules().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
