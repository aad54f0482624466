//! The `{success, data|error}` shape handed to the UI layer.
//!
//! A success serializes as `{"success": true, ...payload fields}` and a
//! failure as `{"success": false, "error": "..."}`. Being an enum, an
//! envelope cannot carry both a payload and an error.

use serde::{Serialize, Serializer};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Success(T),
    Failure { error: String },
}

impl<T> Envelope<T> {
    pub fn failure(error: impl Into<String>) -> Self {
        Envelope::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success(data) => Some(data),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure { error } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::Success(data) => Envelope::Success(f(data)),
            Envelope::Failure { error } => Envelope::Failure { error },
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure { error } => Err(error),
        }
    }
}

impl<T> From<Result<T, ApiError>> for Envelope<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Envelope::Success(data),
            Err(err) => Envelope::failure(err.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a, T> {
            success: bool,
            #[serde(flatten)]
            data: Option<&'a T>,
            #[serde(skip_serializing_if = "Option::is_none")]
            error: Option<&'a str>,
        }

        Repr {
            success: self.is_success(),
            data: self.data(),
            error: self.error(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ranking, RankingEntry};
    use serde_json::json;

    fn ranking() -> Ranking {
        Ranking {
            rankings: vec![RankingEntry {
                id: 1,
                name: None,
                points: 50,
                level: None,
                recycling_count: None,
                avatar: None,
            }],
        }
    }

    #[test]
    fn success_flattens_payload() {
        let value = serde_json::to_value(Envelope::Success(ranking())).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "rankings": [{"id": 1, "points": 50}]})
        );
    }

    #[test]
    fn failure_carries_only_error() {
        let value = serde_json::to_value(Envelope::<Ranking>::failure("db down")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "db down"}));
    }

    #[test]
    fn from_result_uses_error_display() {
        let env: Envelope<Ranking> = Err(ApiError::RequestFailed {
            status: 401,
            message: "Invalid email or password".to_string(),
        })
        .into();
        assert!(!env.is_success());
        assert_eq!(env.error(), Some("Invalid email or password"));
        assert!(env.data().is_none());
    }

    #[test]
    fn map_preserves_failure() {
        let env = Envelope::<Ranking>::failure("offline").map(|r| r.rankings.len());
        assert_eq!(env.into_result(), Err("offline".to_string()));

        let env = Envelope::Success(ranking()).map(|r| r.rankings.len());
        assert_eq!(env.into_result(), Ok(1));
    }
}
