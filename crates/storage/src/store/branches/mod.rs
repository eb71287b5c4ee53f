#![forbid(unsafe_code)]

mod create;
mod current;
mod delete;
mod list;
mod turns;
