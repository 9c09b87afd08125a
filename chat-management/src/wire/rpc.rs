//! `DomainError` -> `tonic::Status`, mirroring the shape of
//! `service_core::grpc::error::IntoStatus` but against this crate's closed
//! sentinel set rather than the open-ended ambient `AppError`.

use crate::error::DomainError;
use tonic::{Code, Status};

pub trait IntoStatus {
    fn into_status(self) -> Status;
}

fn code_for(kind: DomainError) -> Code {
    use DomainError::*;
    match kind {
        NotFound => Code::NotFound,
        AlreadyExists | DuplicateMessage => Code::AlreadyExists,
        Unauthorized
        | InvalidOTP
        | OTPExpired
        | DeviceMismatch
        | InvalidRefreshToken
        | RefreshTokenReuse
        | SessionExpired
        | SessionRevoked => Code::Unauthenticated,
        Forbidden | NotMember => Code::PermissionDenied,
        InvalidInput | EmptyId | InvalidId | InvalidPhoneNumber | MessageTooLarge
        | InvalidContentType => Code::InvalidArgument,
        RateLimited | PhoneRateLimited | IPRateLimited | SlowConsumer | MaxSessionsExceeded => {
            Code::ResourceExhausted
        }
        Unavailable => Code::Unavailable,
        ConfigRequired => Code::Internal,
    }
}

impl IntoStatus for DomainError {
    fn into_status(self) -> Status {
        Status::new(code_for(self), self.to_string())
    }
}

/// Maps any error - a bare `DomainError`, a wrapped `anyhow::Error`, or an
/// unrecognized infrastructure failure - to a `tonic::Status`. Total: every
/// input produces a status, unmapped errors surface as `INTERNAL` with a
/// non-informative message.
pub fn map_error(err: &anyhow::Error) -> Status {
    match DomainError::from_anyhow(err) {
        Some(kind) => kind.into_status(),
        None => {
            tracing::error!(error = %err, "unmapped error reached rpc boundary");
            Status::internal("internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness_every_sentinel_maps() {
        for kind in DomainError::ALL {
            let status = (*kind).into_status();
            assert_ne!(status.code(), Code::Ok, "{:?} fell through mapping", kind);
        }
    }

    #[test]
    fn stable_under_wrapping() {
        use anyhow::Context;
        for kind in DomainError::ALL {
            let bare = (*kind).into_status();
            let wrapped: anyhow::Error = anyhow::Error::from(*kind).context("wrapped context");
            let mapped = map_error(&wrapped);
            assert_eq!(bare.code(), mapped.code(), "{:?} mapping changed under wrap", kind);
        }
    }

    #[test]
    fn unmapped_is_internal() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(map_error(&err).code(), Code::Internal);
    }

    #[test]
    fn specific_mappings() {
        assert_eq!(DomainError::NotFound.into_status().code(), Code::NotFound);
        assert_eq!(
            DomainError::RefreshTokenReuse.into_status().code(),
            Code::Unauthenticated
        );
        assert_eq!(
            DomainError::PhoneRateLimited.into_status().code(),
            Code::ResourceExhausted
        );
    }
}
