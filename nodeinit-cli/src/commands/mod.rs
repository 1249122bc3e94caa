pub mod check;
pub mod config;
pub mod new;
pub mod plan;

mod output;
mod selection;
