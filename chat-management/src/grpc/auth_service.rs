//! gRPC implementation of `chat.v1.AuthService`, delegating every RPC to
//! [`crate::services::auth_service::AuthService`] the way the teacher's
//! `grpc::AuthServiceImpl` delegates to `handlers::auth`.

use tonic::{Request, Response, Status};

use crate::grpc::proto::auth_service_server::AuthService as AuthServiceTrait;
use crate::grpc::proto::{
    LogoutRequest, LogoutResponse, RefreshTokensRequest, RefreshTokensResponse, RequestOtpRequest,
    RequestOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use crate::wire::rpc::map_error;
use crate::AppState;

pub struct AuthServiceImpl {
    state: AppState,
}

impl AuthServiceImpl {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[tonic::async_trait]
impl AuthServiceTrait for AuthServiceImpl {
    async fn request_otp(
        &self,
        request: Request<RequestOtpRequest>,
    ) -> Result<Response<RequestOtpResponse>, Status> {
        let req = request.into_inner();
        let out = self
            .state
            .auth
            .request_otp(&req.phone, &req.client_ip)
            .await
            .map_err(|e| map_error(&e))?;

        Ok(Response::new(RequestOtpResponse {
            expires_at: out.expires_at.timestamp_millis(),
            retry_after_seconds: out.retry_after_seconds,
        }))
    }

    async fn verify_otp(
        &self,
        request: Request<VerifyOtpRequest>,
    ) -> Result<Response<VerifyOtpResponse>, Status> {
        let req = request.into_inner();
        let out = self
            .state
            .auth
            .verify_otp(&req.phone, &req.otp_code, &req.device_id)
            .await
            .map_err(|e| map_error(&e))?;

        Ok(Response::new(VerifyOtpResponse {
            user_id: out.user_id.as_str().to_string(),
            session_id: out.session_id.as_str().to_string(),
            access_token: out.access_token,
            refresh_token: out.refresh_token,
            is_new_user: out.is_new_user,
            access_token_expiry: out.access_token_expiry.timestamp_millis(),
        }))
    }

    async fn refresh_tokens(
        &self,
        request: Request<RefreshTokensRequest>,
    ) -> Result<Response<RefreshTokensResponse>, Status> {
        let req = request.into_inner();
        let out = self
            .state
            .auth
            .refresh_tokens(&req.access_token, &req.refresh_token, &req.device_id)
            .await
            .map_err(|e| map_error(&e))?;

        Ok(Response::new(RefreshTokensResponse {
            access_token: out.access_token,
            refresh_token: out.refresh_token,
            access_token_expiry: out.access_token_expiry.timestamp_millis(),
        }))
    }

    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let req = request.into_inner();
        self.state
            .auth
            .logout(&req.access_token)
            .await
            .map_err(|e| map_error(&e))?;

        Ok(Response::new(LogoutResponse {}))
    }
}
