//! One wrapper per backend operation, each resolving to an `Envelope`.
//!
//! Wrappers never fail: any dispatcher or parse error is flattened into
//! `Envelope::Failure` with the error's message. There is no retrying,
//! caching or batching here.

use tracing::warn;

use crate::client::RecycleClient;
#[cfg(feature = "blocking")]
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
#[cfg(feature = "blocking")]
use crate::transport::UreqTransport;
use crate::types::{
    Approval, Credentials, ImageUpload, LoginResponse, NewRecycling, PendingRequests, Ranking,
    Rejection, ReviewedRequest, UploadedImage, UserProfile, UserUpdate,
};

pub struct ApiService<T> {
    client: RecycleClient,
    transport: T,
}

impl<T: Transport> ApiService<T> {
    pub fn new(client: RecycleClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &RecycleClient {
        &self.client
    }

    pub fn login(&self, credentials: &Credentials) -> Envelope<LoginResponse> {
        self.call(
            "login",
            self.client.build_login(credentials),
            RecycleClient::parse_login,
        )
    }

    pub fn student_ranking(&self) -> Envelope<Ranking> {
        self.call(
            "student_ranking",
            Ok(self.client.build_student_ranking()),
            RecycleClient::parse_student_ranking,
        )
    }

    pub fn pending_requests(&self) -> Envelope<PendingRequests> {
        self.call(
            "pending_requests",
            Ok(self.client.build_pending_requests()),
            RecycleClient::parse_pending_requests,
        )
    }

    pub fn approve_request(&self, id: u64, approval: &Approval) -> Envelope<ReviewedRequest> {
        self.call(
            "approve_request",
            self.client.build_approve_request(id, approval),
            RecycleClient::parse_approve_request,
        )
    }

    pub fn reject_request(&self, id: u64, rejection: &Rejection) -> Envelope<ReviewedRequest> {
        self.call(
            "reject_request",
            self.client.build_reject_request(id, rejection),
            RecycleClient::parse_reject_request,
        )
    }

    pub fn upload_image(&self, upload: &ImageUpload) -> Envelope<UploadedImage> {
        self.call(
            "upload_image",
            self.client.build_upload_image(upload),
            RecycleClient::parse_upload_image,
        )
    }

    pub fn user(&self, id: u64) -> Envelope<UserProfile> {
        self.call("user", Ok(self.client.build_user(id)), RecycleClient::parse_user)
    }

    pub fn update_user(&self, id: u64, update: &UserUpdate) -> Envelope<UserProfile> {
        self.call(
            "update_user",
            self.client.build_update_user(id, update),
            RecycleClient::parse_update_user,
        )
    }

    pub fn submit_recycling(&self, input: &NewRecycling) -> Envelope<ReviewedRequest> {
        self.call(
            "submit_recycling",
            self.client.build_submit_recycling(input),
            RecycleClient::parse_submit_recycling,
        )
    }

    fn call<R>(
        &self,
        operation: &'static str,
        request: Result<HttpRequest, ApiError>,
        parse: fn(&RecycleClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Envelope<R> {
        let result = request
            .and_then(|req| self.client.dispatcher().execute(&self.transport, &req))
            .and_then(|resp| parse(&self.client, resp));
        if let Err(err) = &result {
            warn!(operation, kind = ?err.kind(), error = %err, "api call failed");
        }
        result.into()
    }
}

#[cfg(feature = "blocking")]
impl ApiService<UreqTransport> {
    /// Blocking service pointed at `config.base_url`, bounded by `config.timeout`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            RecycleClient::from_config(config),
            UreqTransport::from_config(config),
        )
    }
}
