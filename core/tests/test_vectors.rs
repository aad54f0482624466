//! Verify classification and the ranking wrapper against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector describes a simulated response and the expected outcome.
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use recycle_core::{
    ApiService, ErrorKind, HttpMethod, HttpRequest, HttpResponse, RecycleClient, Transport,
    TransportError,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "NetworkUnavailable" => ErrorKind::NetworkUnavailable,
        "ServerResponseNotJson" => ErrorKind::ServerResponseNotJson,
        "ServerResponseInvalid" => ErrorKind::ServerResponseInvalid,
        "RequestFailed" => ErrorKind::RequestFailed,
        other => panic!("unknown error kind: {other}"),
    }
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(sim: &Value) -> HttpResponse {
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        status_text: sim["status_text"].as_str().unwrap_or_default().to_string(),
        headers: sim["content_type"]
            .as_str()
            .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
            .unwrap_or_default(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let client = RecycleClient::new(BASE_URL);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = client.dispatcher().classify(&simulated(&case["response"]));

        if let Some(expected) = case.get("expected_value") {
            assert_eq!(&result.unwrap(), expected, "{name}: parsed body");
            continue;
        }

        let err = result.unwrap_err();
        let expected_kind = parse_kind(case["expected_error"].as_str().unwrap());
        assert_eq!(err.kind(), expected_kind, "{name}: kind");

        let message = err.to_string();
        if let Some(exact) = case.get("expected_message") {
            assert_eq!(message, exact.as_str().unwrap(), "{name}: message");
        }
        for fragment in case["message_contains"].as_array().into_iter().flatten() {
            let fragment = fragment.as_str().unwrap();
            assert!(message.contains(fragment), "{name}: {message:?} lacks {fragment:?}");
        }
    }
}

// ---------------------------------------------------------------------------
// Ranking wrapper
// ---------------------------------------------------------------------------

/// Answers every request with one simulated response.
struct Simulated(HttpResponse);

impl Transport for Simulated {
    fn execute(&self, _request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        Ok(self.0.clone())
    }
}

#[test]
fn ranking_test_vectors() {
    let raw = include_str!("../../test-vectors/ranking.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let expected_req = &vectors["expected_request"];

    // Verify build
    let client = RecycleClient::new(BASE_URL);
    let req = client.build_student_ranking();
    assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()));
    assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()));
    assert!(req.body.is_none());

    // Verify envelopes
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let api = ApiService::new(
            RecycleClient::new(BASE_URL),
            Simulated(simulated(&case["simulated_response"])),
        );
        let envelope = serde_json::to_value(api.student_ranking()).unwrap();
        assert_eq!(envelope, case["expected_envelope"], "{name}: envelope");
    }
}
