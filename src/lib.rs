//! Media-sharing gallery server: list, serve, upload and vote on images and videos in one directory.

pub mod cli;
pub mod config;
pub mod http;
pub mod media;
pub mod votes;
