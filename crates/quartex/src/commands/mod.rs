//! Command implementations

pub mod brand;
pub mod check;
pub mod common;
pub mod info;
pub mod install;
pub mod list;
pub mod update;
pub mod use_template;
