// src/fetch/mod.rs
// =============================================================================
// This module contains the page acquisition layer.
//
// Submodules:
// - http: GET with manual redirect following and transport retries
// - classify: decides ok / 404 / soft404 / soft404-content / empty
// - disclaimer: one-step consent gate detection and token bypass
// =============================================================================

pub mod classify;
pub mod disclaimer;
pub mod http;

pub use classify::{classify, Classification, PageClass, Reason};
pub use http::{build_client, fetch_page, FetchResult, RedirectHop};
