pub mod asset;
pub mod github_client;
mod handler;
pub mod release;
pub mod tag;
