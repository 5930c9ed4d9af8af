//! Body extractors whose rejections use the API error format.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` that rejects with [`AppError::Validation`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::Form` that rejects with [`AppError::Validation`].
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct ApiForm<T>(pub T);
