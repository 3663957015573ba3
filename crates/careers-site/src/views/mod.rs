//! View models, template helpers and HTML pages.

pub mod context;
pub mod filters;
pub mod pages;

pub use context::{
    current_year, DepartmentContext, IndexContext, JobContext, Navigation, PartnerListContext,
    ResultsContext, ThankYouContext, NO_MATCHING_ROLES,
};
pub use filters::{
    convert_to_kebab, escape_html, get_nav_path, get_secondary_nav_path, markup, slug,
    unescape_html,
};
