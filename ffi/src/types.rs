//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests are handed out as C structs the host can execute directly.
//! Results carry a category code for branching plus the serialized
//! `{success, data|error}` envelope, so the host's UI layer receives the
//! same shape the service wrappers produce. Conversion helpers live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use recycle_core::error::{ApiError, ErrorKind};
use recycle_core::http::HttpMethod;
use recycle_core::storage::{FileStore, StorageError};
use recycle_core::{Envelope, RecycleClient, SessionStore};
use serde::Serialize;

/// Opaque handle to a `RecycleClient`.
pub struct FfiClient {
    pub(crate) inner: RecycleClient,
}

/// Opaque handle to on-device state: the session record and sound flags,
/// both kept in one file.
pub struct FfiStore {
    pub(crate) session: SessionStore<FileStore>,
}

/// Move `s` into a heap C string. Interior NULs are dropped.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Patch = 3,
    Delete = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `recycle_build_*` functions. The host executes the request and
/// passes the response back through the matching `recycle_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: recycle_core::HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = req.body.map_or(std::ptr::null_mut(), to_c_string);

        let headers_len = u32::try_from(req.headers.len()).unwrap_or(u32::MAX);
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .take(headers_len as usize)
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The host fills this in after executing a request and passes a pointer to
/// a `recycle_parse_*` function. The FFI layer reads but does not free these
/// fields; any string pointer may be null.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub status_text: *const c_char,
    pub content_type: *const c_char,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NetworkUnavailable = 1,
    Transport = 2,
    ServerResponseNotJson = 3,
    ServerResponseInvalid = 4,
    RequestFailed = 5,
    Serialization = 6,
    Deserialization = 7,
    Storage = 8,
    Panic = 9,
    NullArg = 10,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NetworkUnavailable => FfiErrorCode::NetworkUnavailable,
            ErrorKind::Transport => FfiErrorCode::Transport,
            ErrorKind::ServerResponseNotJson => FfiErrorCode::ServerResponseNotJson,
            ErrorKind::ServerResponseInvalid => FfiErrorCode::ServerResponseInvalid,
            ErrorKind::RequestFailed => FfiErrorCode::RequestFailed,
            ErrorKind::Serialization => FfiErrorCode::Serialization,
            ErrorKind::Deserialization => FfiErrorCode::Deserialization,
        }
    }
}

/// Result of every parse operation.
///
/// `envelope` is always a JSON object: `{"success": true, ...}` when
/// `error_code` is `Ok`, otherwise `{"success": false, "error": "..."}`
/// with the same text in `error_message`.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub envelope: *mut c_char,
}

impl FfiResult {
    pub(crate) fn from_result<T: Serialize>(result: Result<T, ApiError>, status: u16) -> *mut Self {
        match result {
            Ok(data) => Self::success(&Envelope::Success(data), status),
            Err(err) => Self::failure(err.kind().into(), err.status().unwrap_or(status), err.to_string()),
        }
    }

    fn success<T: Serialize>(envelope: &Envelope<T>, status: u16) -> *mut Self {
        match serde_json::to_string(envelope) {
            Ok(json) => Box::into_raw(Box::new(FfiResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                http_status: status,
                envelope: to_c_string(json),
            })),
            Err(e) => Self::failure(FfiErrorCode::Serialization, status, e.to_string()),
        }
    }

    pub(crate) fn failure(code: FfiErrorCode, status: u16, message: String) -> *mut Self {
        let envelope = serde_json::to_string(&Envelope::<()>::failure(message.clone()))
            .unwrap_or_else(|_| r#"{"success":false}"#.to_string());
        Box::into_raw(Box::new(FfiResult {
            error_code: code,
            error_message: to_c_string(message),
            http_status: status,
            envelope: to_c_string(envelope),
        }))
    }

    pub(crate) fn storage(err: StorageError) -> *mut Self {
        Self::failure(FfiErrorCode::Storage, 0, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
