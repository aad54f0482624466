//! In-memory stand-in for the recycling backend.
//!
//! Seeded with three students, a teacher and a parent (see `Store::seeded`)
//! and one pending submission. Business rules here are deliberately simple:
//! approving awards the teacher-chosen points and the level is
//! `points / 100 + 1`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub points: u64,
    pub level: u32,
    pub recycling_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecyclingRequest {
    pub id: u64,
    pub student_id: u64,
    pub student_name: String,
    pub material: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub id: u64,
    pub name: String,
    pub points: u64,
    pub level: u32,
    pub recycling_count: u32,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ApproveInput {
    pub points: u64,
    pub comment: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct RejectInput {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadInput {
    pub filename: String,
    pub content_type: String,
    pub data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub class_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecycling {
    pub student_id: u64,
    pub material: String,
    pub quantity: u32,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

struct Account {
    user: User,
    password: String,
}

/// Backend state: accounts, submissions and uploaded image sizes.
pub struct Store {
    accounts: BTreeMap<u64, Account>,
    requests: BTreeMap<u64, RecyclingRequest>,
    uploads: HashMap<String, usize>,
    next_request_id: u64,
}

impl Store {
    pub fn empty() -> Self {
        Self {
            accounts: BTreeMap::new(),
            requests: BTreeMap::new(),
            uploads: HashMap::new(),
            next_request_id: 1,
        }
    }

    /// | id | name         | role    | email              | password  | points |
    /// |----|--------------|---------|--------------------|-----------|--------|
    /// | 1  | Alice Park   | student | alice@school.test  | alice123  | 120    |
    /// | 2  | Ben Ortiz    | student | ben@school.test    | ben123    | 80     |
    /// | 3  | Chloe Nguyen | student | chloe@school.test  | chloe123  | 200    |
    /// | 4  | Carmen Diaz  | teacher | carmen@school.test | carmen123 | 0      |
    /// | 5  | Dana Park    | parent  | dana@home.test     | dana123   | 0      |
    ///
    /// Request 1 is Ben's pending plastic submission.
    pub fn seeded() -> Self {
        let mut store = Self::empty();
        let people = [
            (1, "Alice Park", "alice@school.test", "alice123", Role::Student, 120, 6),
            (2, "Ben Ortiz", "ben@school.test", "ben123", Role::Student, 80, 4),
            (3, "Chloe Nguyen", "chloe@school.test", "chloe123", Role::Student, 200, 9),
            (4, "Carmen Diaz", "carmen@school.test", "carmen123", Role::Teacher, 0, 0),
            (5, "Dana Park", "dana@home.test", "dana123", Role::Parent, 0, 0),
        ];
        for (id, name, email, password, role, points, count) in people {
            store.add_account(
                User {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                    role,
                    points,
                    level: level_for(points),
                    recycling_count: count,
                    avatar: None,
                    class_name: (role == Role::Student).then(|| "5A".to_string()),
                },
                password,
            );
        }
        store.insert_request(2, "plastic", 5, Some("/uploads/seed-bottles.jpg".to_string()), None);
        store
    }

    pub fn add_account(&mut self, user: User, password: &str) {
        self.accounts.insert(
            user.id,
            Account {
                user,
                password: password.to_string(),
            },
        );
    }

    fn insert_request(
        &mut self,
        student_id: u64,
        material: &str,
        quantity: u32,
        image_url: Option<String>,
        description: Option<String>,
    ) -> Option<RecyclingRequest> {
        let student = &self.accounts.get(&student_id)?.user;
        if student.role != Role::Student {
            return None;
        }
        let request = RecyclingRequest {
            id: self.next_request_id,
            student_id,
            student_name: student.name.clone(),
            material: material.to_string(),
            quantity,
            image_url,
            description,
            status: RequestStatus::Pending,
            points: None,
            feedback: None,
        };
        self.next_request_id += 1;
        self.requests.insert(request.id, request.clone());
        Some(request)
    }
}

pub fn level_for(points: u64) -> u32 {
    u32::try_from(points / 100).unwrap_or(u32::MAX - 1) + 1
}

pub type Db = Arc<RwLock<Store>>;

/// JSON error body: `{"<field>": "<message>"}`.
pub struct Failure {
    status: StatusCode,
    field: &'static str,
    message: String,
}

impl Failure {
    fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            field: "error",
            message: message.to_string(),
        }
    }

    fn unauthorized(message: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            field: "message",
            message: message.to_string(),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert(self.field.to_string(), Value::String(self.message));
        (self.status, Json(Value::Object(body))).into_response()
    }
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/ranking/students", get(student_ranking))
        .route("/requests/pending", get(pending_requests))
        .route("/requests/{id}/approve", post(approve_request))
        .route("/requests/{id}/reject", post(reject_request))
        .route("/upload/image", post(upload_image))
        .route("/users/{id}", get(get_user).put(update_user))
        .route("/recycling", post(submit_recycling))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> &'static str {
    "ok"
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let account = store
        .accounts
        .values()
        .find(|a| a.user.email.eq_ignore_ascii_case(input.email.trim()) && a.password == input.password)
        .ok_or_else(|| Failure::unauthorized("Invalid email or password"))?;
    info!(user_id = account.user.id, "login");
    Ok(Json(serde_json::json!({
        "user": account.user,
        "token": Uuid::new_v4(),
    })))
}

async fn student_ranking(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let mut rankings: Vec<RankingEntry> = store
        .accounts
        .values()
        .filter(|a| a.user.role == Role::Student)
        .map(|a| RankingEntry {
            id: a.user.id,
            name: a.user.name.clone(),
            points: a.user.points,
            level: a.user.level,
            recycling_count: a.user.recycling_count,
        })
        .collect();
    rankings.sort_by(|a, b| b.points.cmp(&a.points).then(a.id.cmp(&b.id)));
    Json(serde_json::json!({ "rankings": rankings }))
}

async fn pending_requests(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let requests: Vec<&RecyclingRequest> = store
        .requests
        .values()
        .filter(|r| r.status == RequestStatus::Pending)
        .collect();
    Json(serde_json::json!({ "requests": requests }))
}

async fn approve_request(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ApproveInput>,
) -> Result<Json<Value>, Failure> {
    if input.points == 0 {
        return Err(Failure::error(StatusCode::BAD_REQUEST, "Points must be greater than zero"));
    }
    let mut store = db.write().await;
    let request = review(&mut store, id)?;
    request.status = RequestStatus::Approved;
    request.points = Some(input.points);
    request.feedback = input.comment;
    let request = request.clone();

    if let Some(account) = store.accounts.get_mut(&request.student_id) {
        let student = &mut account.user;
        student.points = student.points.saturating_add(input.points);
        student.recycling_count += 1;
        student.level = level_for(student.points);
    }
    info!(request_id = id, points = input.points, "request approved");
    Ok(Json(serde_json::json!({ "request": request })))
}

async fn reject_request(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<RejectInput>,
) -> Result<Json<Value>, Failure> {
    let mut store = db.write().await;
    let request = review(&mut store, id)?;
    request.status = RequestStatus::Rejected;
    request.feedback = input.reason;
    info!(request_id = id, "request rejected");
    Ok(Json(serde_json::json!({ "request": request })))
}

/// Look up a request that is still awaiting review.
fn review(store: &mut Store, id: u64) -> Result<&mut RecyclingRequest, Failure> {
    let request = store
        .requests
        .get_mut(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Request not found"))?;
    if request.status != RequestStatus::Pending {
        return Err(Failure::error(StatusCode::CONFLICT, "Request already reviewed"));
    }
    Ok(request)
}

async fn upload_image(
    State(db): State<Db>,
    Json(input): Json<UploadInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    if !input.content_type.starts_with("image/") {
        return Err(Failure::error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Only image uploads are accepted",
        ));
    }
    let bytes = STANDARD
        .decode(input.data.as_bytes())
        .ok()
        .filter(|b| !b.is_empty())
        .ok_or_else(|| Failure::error(StatusCode::BAD_REQUEST, "Invalid image data"))?;
    let url = format!("/uploads/{}-{}", Uuid::new_v4(), input.filename);
    db.write().await.uploads.insert(url.clone(), bytes.len());
    info!(%url, size = bytes.len(), "image uploaded");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "url": url }))))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Value>, Failure> {
    let store = db.read().await;
    let account = store
        .accounts
        .get(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(serde_json::json!({ "user": account.user })))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateUser>,
) -> Result<Json<Value>, Failure> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(Failure::error(StatusCode::BAD_REQUEST, "Name cannot be empty"));
    }
    let mut store = db.write().await;
    let user = &mut store
        .accounts
        .get_mut(&id)
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "User not found"))?
        .user;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(avatar) = input.avatar {
        user.avatar = Some(avatar);
    }
    if let Some(class_name) = input.class_name {
        user.class_name = Some(class_name);
    }
    Ok(Json(serde_json::json!({ "user": user })))
}

async fn submit_recycling(
    State(db): State<Db>,
    Json(input): Json<NewRecycling>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    if input.quantity == 0 {
        return Err(Failure::error(StatusCode::BAD_REQUEST, "Quantity must be at least 1"));
    }
    if input.material.trim().is_empty() {
        return Err(Failure::error(StatusCode::BAD_REQUEST, "Material is required"));
    }
    let mut store = db.write().await;
    let request = store
        .insert_request(
            input.student_id,
            input.material.trim(),
            input.quantity,
            input.image_url,
            input.description,
        )
        .ok_or_else(|| Failure::error(StatusCode::NOT_FOUND, "Student not found"))?;
    info!(request_id = request.id, student_id = request.student_id, "recycling submitted");
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "request": request }))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_grows_every_hundred_points() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(250), 3);
    }

    #[test]
    fn seeded_store_has_one_pending_request() {
        let store = Store::seeded();
        assert_eq!(store.accounts.len(), 5);
        assert_eq!(store.requests.len(), 1);
        let request = &store.requests[&1];
        assert_eq!(request.student_id, 2);
        assert_eq!(request.student_name, "Ben Ortiz");
        assert_eq!(request.status, RequestStatus::Pending);
    }

    #[test]
    fn only_students_can_submit() {
        let mut store = Store::seeded();
        assert!(store.insert_request(4, "paper", 1, None, None).is_none());
        assert!(store.insert_request(99, "paper", 1, None, None).is_none());
        let created = store.insert_request(1, "paper", 1, None, None).unwrap();
        assert_eq!(created.id, 2);
    }

    #[test]
    fn user_serializes_camel_case() {
        let store = Store::seeded();
        let json = serde_json::to_value(&store.accounts[&1].user).unwrap();
        assert_eq!(json["recyclingCount"], 6);
        assert_eq!(json["role"], "student");
        assert_eq!(json["className"], "5A");
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn failure_uses_requested_field() {
        let body = Failure::unauthorized("nope");
        assert_eq!(body.field, "message");
        let body = Failure::error(StatusCode::NOT_FOUND, "missing");
        assert_eq!(body.field, "error");
    }

    #[test]
    fn reject_input_reason_is_optional() {
        let input: RejectInput = serde_json::from_str("{}").unwrap();
        assert!(input.reason.is_none());
    }
}
