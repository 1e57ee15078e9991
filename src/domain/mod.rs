pub mod activity;
pub mod cue;
pub mod geometry;
pub mod mood;
pub mod particle;
pub mod path;
pub mod pattern;
pub mod quote;
pub mod scoring;
