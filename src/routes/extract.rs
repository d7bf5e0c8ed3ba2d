//! Body and query extractors whose rejections answer with the `EngineError` JSON body
//! instead of axum's plain-text defaults.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::EngineError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(EngineError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(EngineError))]
pub struct ApiQuery<T>(pub T);
