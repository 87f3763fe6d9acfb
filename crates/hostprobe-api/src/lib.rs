//! hostprobe-api: Wire types of the asset-management REST API
//!
//! Contains the session and search payloads exchanged with the GLPI
//! inventory API, shared by the HTTP client and its tests.

pub mod responses;
pub mod search;
