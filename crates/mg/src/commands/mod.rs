//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod list;
pub(crate) mod process;

pub(crate) use check::CheckArgs;
pub(crate) use process::ProcessArgs;
