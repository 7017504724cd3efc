//! Weather gateway server.
//!
//! A small HTTP gateway that proxies a mesh sensor network's station list to
//! browsers and answers: "which station best reflects the weather where I
//! am?", using an independent Open-Meteo reading to reject faulty sensors.

pub mod cache;
pub mod config;
pub mod domain;
pub mod selector;
pub mod upstream;
pub mod web;
