// src/common/extract.rs

use axum::extract::{FromRequest, FromRequestParts};

use crate::common::error::ApiError;

/// `Json` com rejeição no nosso formato de erro (400 genérico).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// `Query` com rejeição no nosso formato de erro (400 genérico).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// `Path` com rejeição no nosso formato de erro (id inválido vira 400).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);
