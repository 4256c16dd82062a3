//! RIDA core: client-side orchestration for agent-driven document intelligence.
//!
//! Users upload operational documents (invoices, receipts, contracts), remote
//! AI agents analyze them, and chat/analytics queries run over a user-selected
//! subset of the results. This crate holds the orchestration core:
//!
//! - `pipeline` drives a single upload through ingest → extract → persist,
//!   with a fallback policy that keeps documents flowing even when the remote
//!   agents are down.
//! - `selection` maintains the selected-document set and its two derived
//!   views: the chat context (built lazily at send time) and the analytics
//!   summary (recomputed with a last-request-wins discipline).
//! - `agents` is the typed client for the remote agent endpoints; `db` is the
//!   SQLite repository behind documents and chat history; `export` turns a
//!   selection into a downloadable artifact.
//!
//! Rendering, navigation, and the auth flow itself are out of scope; the
//! crate only carries the `auth::Session` precondition they hand it.

pub mod agents;
pub mod auth;
pub mod config;
pub mod db;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod selection;
