pub mod anilist;
pub mod animeunity;
pub mod app;
pub mod config;
pub mod embedded;
pub mod enrichment;
pub mod episodes;
pub mod error;
pub mod feed;
mod http;
pub mod id;
pub mod jikan;
pub mod kitsu;
pub mod models;
pub mod search;
pub mod show;
pub mod video;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
