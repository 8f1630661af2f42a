pub mod analysis;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod id;
pub mod info;
pub mod log;
pub mod mood;
pub mod music;
pub mod normalization;
pub mod playlist;
pub mod recommendation;
pub mod routes;
pub mod validation;
