//! Family+ services backend.
//!
//! Resolves the family services (pharmacies, clinics, parks, ...) around
//! World Cup stadiums from static address lists, and relays user reports
//! about stadium facilities to the organizers' form endpoint.

pub mod catalog;
pub mod config;
pub mod error;
pub mod report;
pub mod server;
pub mod services;
