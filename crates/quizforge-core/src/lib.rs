//! quizforge-core — Quiz content normalization, attempt sessions, and scoring.
//!
//! This crate turns the free-form text of a generative content service into
//! validated quiz questions and drives the attempt state machine that
//! requests, presents, and scores them.

pub mod builder;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod resolver;
pub mod runner;
pub mod scoring;
pub mod session;
pub mod traits;
