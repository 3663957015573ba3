//! Careers and partners website: Greenhouse vacancies, application relay,
//! partner directory and the HTML pages that present them.

pub mod careers;
pub mod config;
pub mod error;
pub mod http;
pub mod partners;
pub mod router;
pub mod telemetry;
pub mod templates;
pub mod views;

pub use router::{site_router, SiteState};
