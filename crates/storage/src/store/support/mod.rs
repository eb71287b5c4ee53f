#![forbid(unsafe_code)]

mod branch_tx;
mod checkpoint_tx;
mod json;
mod project_tx;
mod schema;

pub(super) use branch_tx::*;
pub(super) use checkpoint_tx::*;
pub(super) use json::*;
pub(super) use project_tx::*;
pub(super) use schema::install_schema;
