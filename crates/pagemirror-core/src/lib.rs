pub mod config;
pub mod logging;

pub mod asset_store;
pub mod cloner;
pub mod fetch;
pub mod rewriter;
pub mod storage;
pub mod url_model;
