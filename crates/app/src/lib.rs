//! Receipt splitting application: configuration, persistence, output and the
//! external extraction and ledger services.

pub mod config;
pub mod extraction;
pub mod ledger;
pub mod logging;
pub mod render;
pub mod session;
