pub mod aggregate;
pub mod config;
pub mod fetch;
pub mod html;
pub mod pipeline;
pub mod process;
pub mod sections;
