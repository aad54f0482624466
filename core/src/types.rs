//! Domain DTOs for the recycling backend.
//!
//! # Design
//! These types mirror the backend's JSON schema (camelCase on the wire) but
//! are defined independently of the mock-server crate; the integration tests
//! catch schema drift. Optional fields are omitted when absent so that
//! re-serialized payloads match what the server sent.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Parent,
}

/// The authenticated user as cached on the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub points: u64,
    #[serde(default = "first_level")]
    pub level: u32,
    #[serde(default)]
    pub recycling_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

fn first_level() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub points: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycling_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Student leaderboard, highest score first as ordered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub rankings: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// A student's recycling submission awaiting or past teacher review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecyclingRequest {
    pub id: u64,
    pub student_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    pub material: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequests {
    pub requests: Vec<RecyclingRequest>,
}

/// A single request as returned after a submission or review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedRequest {
    pub request: RecyclingRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub points: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecycling {
    pub student_id: u64,
    pub material: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Photographic evidence, base64-encoded for the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: String,
}

impl ImageUpload {
    pub fn from_bytes(filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        Self {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data: STANDARD.encode(bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

/// Profile fields a user may change. Omitted fields stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_fills_counter_defaults() {
        let user: User = serde_json::from_str(
            r#"{"id":7,"name":"Ana","email":"ana@school.org","role":"student"}"#,
        )
        .unwrap();
        assert_eq!(user.points, 0);
        assert_eq!(user.level, 1);
        assert_eq!(user.recycling_count, 0);
        assert!(user.avatar.is_none());
    }

    #[test]
    fn user_uses_camel_case() {
        let user = User {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@school.org".to_string(),
            role: Role::Teacher,
            points: 10,
            level: 2,
            recycling_count: 3,
            avatar: None,
            class_name: Some("5B".to_string()),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["recyclingCount"], 3);
        assert_eq!(json["className"], "5B");
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result: Result<User, _> = serde_json::from_str(
            r#"{"id":7,"name":"Ana","email":"a@b.c","role":"admin"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn ranking_entry_requires_points() {
        let result: Result<RankingEntry, _> = serde_json::from_str(r#"{"id":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn image_upload_encodes_base64() {
        let upload = ImageUpload::from_bytes("bottle.jpg", "image/jpeg", b"\xff\xd8\xff");
        assert_eq!(upload.data, "/9j/");
        let json = serde_json::to_value(&upload).unwrap();
        assert_eq!(json["contentType"], "image/jpeg");
    }

    #[test]
    fn empty_user_update_serializes_to_empty_object() {
        let json = serde_json::to_string(&UserUpdate::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
