pub mod app;
pub mod bridge;
pub mod config;
pub mod fetch;
pub mod machine;
pub mod menu;
pub mod resolver;
pub mod state;
pub mod tweet;
pub mod ui;
