//! Core state for podshelf: the show catalog seam, locally persisted
//! favorites, the single-slot audio session, and the show-detail view state
//! machine that ties them together.

pub mod audio;
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod genres;
pub mod model;
pub mod platform;
pub mod storage;
pub mod view;
