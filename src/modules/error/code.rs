// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::http::StatusCode;
use poem_openapi::Enum;

#[derive(Copy, Clone, Debug, Enum, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,
    MissingConfiguration = 10010,
    MethodNotAllowed = 10020,

    // Authentication and authorization errors (20000–20999)
    PermissionDenied = 20000,

    // Resource errors (30000–30999)
    ResourceNotFound = 30000,
    AlreadyExists = 30010,

    // Network connection errors (40000–40999)
    NetworkError = 40000,
    ConnectionTimeout = 40010,
    HttpResponseError = 40020,

    // Messaging provider errors (50000–50999)
    TransportNotConnected = 50000,
    ProviderRejected = 50010,
    BlobMissing = 50020,
    CampaignStateConflict = 50030,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    UnhandledPoemError = 70010,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter | ErrorCode::MissingConfiguration => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::PermissionDenied => StatusCode::UNAUTHORIZED,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists | ErrorCode::CampaignStateConflict => StatusCode::CONFLICT,
            ErrorCode::NetworkError
            | ErrorCode::ConnectionTimeout
            | ErrorCode::HttpResponseError
            | ErrorCode::TransportNotConnected
            | ErrorCode::ProviderRejected => StatusCode::BAD_GATEWAY,
            ErrorCode::BlobMissing => StatusCode::NOT_FOUND,
            ErrorCode::InternalError | ErrorCode::UnhandledPoemError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
