//! Retro Forum library.
//!
//! A server-rendered community forum (categories, threads, replies, likes,
//! bookmarks, tags, a Marketplace category) with a CMS-backed blog, serving
//! HTML over axum with SQLite storage.

pub mod auth;
pub mod cms;
pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod web;
