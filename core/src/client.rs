//! Stateless request builder and response parser for the recycling API.
//!
//! # Design
//! Each backend operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Parsing runs the dispatcher's classifier and then deserializes the JSON
//! into the operation's typed payload. The caller executes the round-trip,
//! either through `ApiService` or on the host side of the FFI.

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Approval, Credentials, ImageUpload, LoginResponse, NewRecycling, PendingRequests, Ranking,
    Rejection, ReviewedRequest, UploadedImage, UserProfile, UserUpdate,
};

/// Synchronous, stateless client for the recycling API.
#[derive(Debug, Clone)]
pub struct RecycleClient {
    dispatcher: Dispatcher,
}

impl RecycleClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            dispatcher: Dispatcher::new(base_url),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.build_json("/auth/login", HttpMethod::Post, credentials)
    }

    pub fn build_student_ranking(&self) -> HttpRequest {
        self.dispatcher.build("/ranking/students", RequestOptions::get())
    }

    pub fn build_pending_requests(&self) -> HttpRequest {
        self.dispatcher.build("/requests/pending", RequestOptions::get())
    }

    pub fn build_approve_request(
        &self,
        id: u64,
        approval: &Approval,
    ) -> Result<HttpRequest, ApiError> {
        self.build_json(&format!("/requests/{id}/approve"), HttpMethod::Post, approval)
    }

    pub fn build_reject_request(
        &self,
        id: u64,
        rejection: &Rejection,
    ) -> Result<HttpRequest, ApiError> {
        self.build_json(&format!("/requests/{id}/reject"), HttpMethod::Post, rejection)
    }

    pub fn build_upload_image(&self, upload: &ImageUpload) -> Result<HttpRequest, ApiError> {
        self.build_json("/upload/image", HttpMethod::Post, upload)
    }

    pub fn build_user(&self, id: u64) -> HttpRequest {
        self.dispatcher.build(&format!("/users/{id}"), RequestOptions::get())
    }

    pub fn build_update_user(&self, id: u64, update: &UserUpdate) -> Result<HttpRequest, ApiError> {
        self.build_json(&format!("/users/{id}"), HttpMethod::Put, update)
    }

    pub fn build_submit_recycling(&self, input: &NewRecycling) -> Result<HttpRequest, ApiError> {
        self.build_json("/recycling", HttpMethod::Post, input)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        self.parse(response)
    }

    pub fn parse_student_ranking(&self, response: HttpResponse) -> Result<Ranking, ApiError> {
        self.parse(response)
    }

    pub fn parse_pending_requests(
        &self,
        response: HttpResponse,
    ) -> Result<PendingRequests, ApiError> {
        self.parse(response)
    }

    pub fn parse_approve_request(
        &self,
        response: HttpResponse,
    ) -> Result<ReviewedRequest, ApiError> {
        self.parse(response)
    }

    pub fn parse_reject_request(
        &self,
        response: HttpResponse,
    ) -> Result<ReviewedRequest, ApiError> {
        self.parse(response)
    }

    pub fn parse_upload_image(&self, response: HttpResponse) -> Result<UploadedImage, ApiError> {
        self.parse(response)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        self.parse(response)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        self.parse(response)
    }

    pub fn parse_submit_recycling(
        &self,
        response: HttpResponse,
    ) -> Result<ReviewedRequest, ApiError> {
        self.parse(response)
    }

    fn build_json<T: serde::Serialize>(
        &self,
        path: &str,
        method: HttpMethod,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let options = RequestOptions::json(method, payload)?;
        Ok(self.dispatcher.build(path, options))
    }

    fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        let body = self.dispatcher.classify(&response)?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::RequestStatus;

    fn client() -> RecycleClient {
        RecycleClient::new("http://localhost:3000")
    }

    fn body(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn build_login_posts_credentials() {
        let req = client()
            .build_login(&Credentials {
                email: "ana@school.org".to_string(),
                password: "secret".to_string(),
            })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/auth/login");
        assert_eq!(body(&req)["email"], "ana@school.org");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn from_config_uses_configured_base_url() {
        let config = ClientConfig {
            base_url: "https://recycle.example.org/api/".to_string(),
            ..ClientConfig::default()
        };
        let req = RecycleClient::from_config(&config).build_student_ranking();
        assert_eq!(req.url, "https://recycle.example.org/api/ranking/students");
    }

    #[test]
    fn build_read_only_requests() {
        let c = client();
        let req = c.build_student_ranking();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/ranking/students");
        assert!(req.body.is_none());

        assert_eq!(
            c.build_pending_requests().url,
            "http://localhost:3000/requests/pending"
        );
        assert_eq!(c.build_user(42).url, "http://localhost:3000/users/42");
    }

    #[test]
    fn build_review_requests_embed_id() {
        let c = client();
        let req = c
            .build_approve_request(
                9,
                &Approval {
                    points: 30,
                    comment: None,
                },
            )
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/requests/9/approve");
        assert_eq!(body(&req), serde_json::json!({"points": 30}));

        let req = c
            .build_reject_request(
                9,
                &Rejection {
                    reason: Some("blurry photo".to_string()),
                },
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:3000/requests/9/reject");
        assert_eq!(body(&req)["reason"], "blurry photo");
    }

    #[test]
    fn build_update_user_puts_only_changed_fields() {
        let update = UserUpdate {
            name: Some("Ana Maria".to_string()),
            ..UserUpdate::default()
        };
        let req = client().build_update_user(3, &update).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(body(&req), serde_json::json!({"name": "Ana Maria"}));
    }

    #[test]
    fn build_submit_recycling_posts_camel_case() {
        let req = client()
            .build_submit_recycling(&NewRecycling {
                student_id: 1,
                material: "plastic".to_string(),
                quantity: 4,
                image_url: Some("/uploads/a.jpg".to_string()),
                description: None,
            })
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/recycling");
        let json = body(&req);
        assert_eq!(json["studentId"], 1);
        assert_eq!(json["imageUrl"], "/uploads/a.jpg");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn parse_pending_requests_success() {
        let response = HttpResponse::json(
            200,
            r#"{"requests":[{"id":3,"studentId":1,"material":"glass","quantity":2,"status":"pending"}]}"#,
        );
        let pending = client().parse_pending_requests(response).unwrap();
        assert_eq!(pending.requests.len(), 1);
        assert_eq!(pending.requests[0].status, RequestStatus::Pending);
    }

    #[test]
    fn parse_login_failure_surfaces_message() {
        let response = HttpResponse::json(401, r#"{"message":"Invalid email or password"}"#);
        let err = client().parse_login(response).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestFailed);
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn parse_wrong_shape_is_deserialization_error() {
        let response = HttpResponse::json(200, r#"{"rankings":"none"}"#);
        let err = client().parse_student_ranking(response).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn parse_upload_image_success() {
        let response = HttpResponse::json(201, r#"{"url":"/uploads/1-can.jpg"}"#);
        let uploaded = client().parse_upload_image(response).unwrap();
        assert_eq!(uploaded.url, "/uploads/1-can.jpg");
    }
}
