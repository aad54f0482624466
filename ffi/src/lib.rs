//! C-ABI wrapper around `recycle-core`.
//!
//! # Overview
//! Exposes the recycling backend operations, the session record and the
//! sound preference flags through `extern "C"` functions, so the mobile host
//! can build requests, execute them with its own networking stack, and get
//! back the same `{success, data|error}` envelopes the Rust services return.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core client 1:1.
//! - Results are a single `FfiResult`: a category code for branching plus
//!   the serialized envelope.
//! - The C caller owns all returned pointers and must call the matching
//!   `recycle_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use recycle_core::error::ApiError;
use recycle_core::http::HttpResponse;
use recycle_core::preferences::SoundPreferences;
use recycle_core::storage::{FileStore, StorageError};
use recycle_core::types::{
    Approval, Credentials, ImageUpload, NewRecycling, Rejection, User, UserUpdate,
};
use recycle_core::{RecycleClient, SessionStore, TransportError};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use types::*;

/// Read a nullable C string. Invalid UTF-8 is replaced, not rejected.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a `tracing` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`). Returns false if a subscriber was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_init_logging() -> bool {
    catch_unwind(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `RecycleClient` bound to `base_url`.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `recycle_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| match read_str(base_url) {
        Some(url) => Box::into_raw(Box::new(FfiClient {
            inner: RecycleClient::new(&url),
        })),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `recycle_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run a builder against `client`, returning null on a null client, a
/// failed build, or a panic.
fn build_with<F>(client: *const FfiClient, build: F) -> *mut FfiHttpRequest
where
    F: FnOnce(&RecycleClient) -> Result<recycle_core::HttpRequest, ApiError>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(e) => {
                warn!(error = %e, "could not build request");
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Build a sign-in request.
///
/// Returns null if any argument is null.
/// The caller must free the returned pointer with `recycle_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_login(
    client: *const FfiClient,
    email: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    let (Some(email), Some(password)) = (read_str(email), read_str(password)) else {
        return std::ptr::null_mut();
    };
    build_with(client, |c| c.build_login(&Credentials { email, password }))
}

/// Build a request for the student leaderboard.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_student_ranking(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Ok(c.build_student_ranking()))
}

/// Build a request for submissions awaiting review.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_pending_requests(client: *const FfiClient) -> *mut FfiHttpRequest {
    build_with(client, |c| Ok(c.build_pending_requests()))
}

/// Build a request approving submission `id` with `points`.
///
/// `comment` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_approve_request(
    client: *const FfiClient,
    id: u64,
    points: u64,
    comment: *const c_char,
) -> *mut FfiHttpRequest {
    let approval = Approval {
        points,
        comment: read_str(comment),
    };
    build_with(client, |c| c.build_approve_request(id, &approval))
}

/// Build a request rejecting submission `id`. `reason` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_reject_request(
    client: *const FfiClient,
    id: u64,
    reason: *const c_char,
) -> *mut FfiHttpRequest {
    let rejection = Rejection {
        reason: read_str(reason),
    };
    build_with(client, |c| c.build_reject_request(id, &rejection))
}

/// Build an image upload request from `data_len` raw bytes at `data`.
///
/// Returns null if `filename`, `content_type` or `data` is null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_upload_image(
    client: *const FfiClient,
    filename: *const c_char,
    content_type: *const c_char,
    data: *const u8,
    data_len: usize,
) -> *mut FfiHttpRequest {
    let (Some(filename), Some(content_type)) = (read_str(filename), read_str(content_type)) else {
        return std::ptr::null_mut();
    };
    if data.is_null() {
        return std::ptr::null_mut();
    }
    build_with(client, |c| {
        let bytes = unsafe { std::slice::from_raw_parts(data, data_len) };
        c.build_upload_image(&ImageUpload::from_bytes(&filename, &content_type, bytes))
    })
}

/// Build a request fetching user `id`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_user(client: *const FfiClient, id: u64) -> *mut FfiHttpRequest {
    build_with(client, |c| Ok(c.build_user(id)))
}

/// Build a profile edit for user `id`. Null fields are left unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_update_user(
    client: *const FfiClient,
    id: u64,
    name: *const c_char,
    avatar: *const c_char,
    class_name: *const c_char,
) -> *mut FfiHttpRequest {
    let update = UserUpdate {
        name: read_str(name),
        avatar: read_str(avatar),
        class_name: read_str(class_name),
    };
    build_with(client, |c| c.build_update_user(id, &update))
}

/// Build a recycling submission. `image_url` and `description` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_build_submit_recycling(
    client: *const FfiClient,
    student_id: u64,
    material: *const c_char,
    quantity: u32,
    image_url: *const c_char,
    description: *const c_char,
) -> *mut FfiHttpRequest {
    let Some(material) = read_str(material) else {
        return std::ptr::null_mut();
    };
    let input = NewRecycling {
        student_id,
        material,
        quantity,
        image_url: read_str(image_url),
        description: read_str(description),
    };
    build_with(client, |c| c.build_submit_recycling(&input))
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. Null strings
/// become empty; a null content type means no header at all.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    HttpResponse {
        status: resp.status,
        status_text: read_str(resp.status_text).unwrap_or_default(),
        headers: read_str(resp.content_type)
            .map(|ct| vec![("Content-Type".to_string(), ct)])
            .unwrap_or_default(),
        body: read_str(resp.body).unwrap_or_default(),
    }
}

fn parse_with<T, F>(
    operation: &str,
    client: *const FfiClient,
    response: *const FfiHttpResponse,
    parse: F,
) -> *mut FfiResult
where
    T: Serialize,
    F: FnOnce(&RecycleClient, HttpResponse) -> Result<T, ApiError>,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = ffi_response_to_core(unsafe { &*response });
        let status = resp.status;
        FfiResult::from_result(parse(&client.inner, resp), status)
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in recycle_parse_{operation}")))
}

/// Parse a sign-in response. The envelope carries `user` and `token`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_login(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("login", client, response, RecycleClient::parse_login)
}

/// Parse a leaderboard response. The envelope carries `rankings`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_student_ranking(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("student_ranking", client, response, RecycleClient::parse_student_ranking)
}

/// Parse a pending-review response. The envelope carries `requests`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_pending_requests(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("pending_requests", client, response, RecycleClient::parse_pending_requests)
}

#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_approve_request(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("approve_request", client, response, RecycleClient::parse_approve_request)
}

#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_reject_request(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("reject_request", client, response, RecycleClient::parse_reject_request)
}

/// Parse an upload response. The envelope carries the stored `url`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_upload_image(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("upload_image", client, response, RecycleClient::parse_upload_image)
}

#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("user", client, response, RecycleClient::parse_user)
}

#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_update_user(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("update_user", client, response, RecycleClient::parse_update_user)
}

#[unsafe(no_mangle)]
pub extern "C" fn recycle_parse_submit_recycling(
    client: *const FfiClient,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    parse_with("submit_recycling", client, response, RecycleClient::parse_submit_recycling)
}

/// Classify a failure the host hit before any response arrived.
///
/// Pass `unreachable = true` when the host could not reach the server at
/// all (offline, DNS failure, refused connection); the result is then
/// `NetworkUnavailable`. `message` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_transport_failure(
    url: *const c_char,
    unreachable: bool,
    message: *const c_char,
) -> *mut FfiResult {
    catch_unwind(|| {
        let url = read_str(url).unwrap_or_default();
        let message = read_str(message).unwrap_or_default();
        let err = if unreachable {
            TransportError::Unreachable(message)
        } else {
            TransportError::Other(message)
        };
        FfiResult::from_result::<()>(Err(ApiError::from_transport(&url, err)), 0)
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in recycle_transport_failure"))
}

// ---------------------------------------------------------------------------
// Local state
// ---------------------------------------------------------------------------

/// Payload of the session envelopes.
#[derive(Serialize)]
struct SessionState<'a> {
    authenticated: bool,
    user: Option<&'a User>,
}

impl<'a> SessionState<'a> {
    fn of(user: Option<&'a User>) -> Self {
        Self {
            authenticated: user.is_some(),
            user,
        }
    }
}

fn storage_result<T: Serialize>(result: Result<T, StorageError>) -> *mut FfiResult {
    match result {
        Ok(data) => FfiResult::from_result(Ok(data), 0),
        Err(e) => FfiResult::storage(e),
    }
}

/// Run `f` against the store, reporting a null handle or a panic.
fn with_store<F>(operation: &str, store: *mut FfiStore, f: F) -> *mut FfiResult
where
    F: FnOnce(&mut FfiStore) -> *mut FfiResult,
{
    catch_unwind(AssertUnwindSafe(|| {
        if store.is_null() {
            return FfiResult::null_arg("store");
        }
        f(unsafe { &mut *store })
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in recycle_{operation}")))
}

/// Open (or create) the JSON file at `path` holding on-device state.
///
/// Returns null if `path` is null or the file exists but cannot be read.
/// Free with `recycle_store_free`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_store_open(path: *const c_char) -> *mut FfiStore {
    catch_unwind(|| {
        let Some(path) = read_str(path) else {
            return std::ptr::null_mut();
        };
        match FileStore::open(&path) {
            Ok(file) => Box::into_raw(Box::new(FfiStore {
                session: SessionStore::new(file),
            })),
            Err(e) => {
                warn!(error = %e, "could not open store");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a store created by `recycle_store_open`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_store_free(store: *mut FfiStore) {
    if !store.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(store) });
        }));
    }
}

/// Load the persisted user. The envelope carries `authenticated` and
/// `user` (null when signed out).
#[unsafe(no_mangle)]
pub extern "C" fn recycle_session_load(store: *mut FfiStore) -> *mut FfiResult {
    with_store("session_load", store, |s| {
        storage_result(s.session.load().map(SessionState::of))
    })
}

/// Persist `user_json` (a user object, as found under `user` in a login
/// envelope) as the signed-in user.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_session_save(
    store: *mut FfiStore,
    user_json: *const c_char,
) -> *mut FfiResult {
    with_store("session_save", store, |s| {
        let Some(raw) = read_str(user_json) else {
            return FfiResult::null_arg("user_json");
        };
        let user: User = match serde_json::from_str(&raw) {
            Ok(user) => user,
            Err(e) => {
                let err = ApiError::Deserialization(e.to_string());
                return FfiResult::from_result::<()>(Err(err), 0);
            }
        };
        match s.session.save(user) {
            Ok(()) => storage_result(Ok(SessionState::of(s.session.current()))),
            Err(e) => FfiResult::storage(e),
        }
    })
}

/// Sign out locally by deleting the persisted user.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_session_clear(store: *mut FfiStore) -> *mut FfiResult {
    with_store("session_clear", store, |s| {
        storage_result(s.session.clear().map(|()| SessionState::of(None)))
    })
}

/// Read the sound flags. The envelope carries `effectsEnabled` and
/// `musicEnabled`.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_prefs_load(store: *mut FfiStore) -> *mut FfiResult {
    with_store("prefs_load", store, |s| {
        storage_result(SoundPreferences::load(s.session.store()))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn recycle_prefs_set_effects(store: *mut FfiStore, enabled: bool) -> *mut FfiResult {
    with_store("prefs_set_effects", store, |s| {
        storage_result(SoundPreferences::load(s.session.store()).and_then(|mut prefs| {
            prefs.set_effects_enabled(s.session.store_mut(), enabled)?;
            Ok(prefs)
        }))
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn recycle_prefs_set_music(store: *mut FfiStore, enabled: bool) -> *mut FfiResult {
    with_store("prefs_set_music", store, |s| {
        storage_result(SoundPreferences::load(s.session.store()).and_then(|mut prefs| {
            prefs.set_music_enabled(s.session.store_mut(), enabled)?;
            Ok(prefs)
        }))
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `recycle_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiResult` returned by any `recycle_parse_*`, `recycle_session_*`,
/// `recycle_prefs_*` or `recycle_transport_failure` call. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.envelope.is_null() {
            drop(unsafe { CString::from_raw(result.envelope) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn recycle_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
