//! Data-directory resolution and sample dataset provisioning for
//! digital-pathology tutorial notebooks.

pub mod app_config;
pub mod capability;
pub mod check;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod hosted;
pub mod resolve;
pub mod samples;
pub mod util;
