//! Bus network routing server.
//!
//! A web application that answers: "how do I get from stop A to stop B,
//! and how long will it take?" over a network of named stops and bus
//! lines, plus summary queries about the stops and lines themselves.

pub mod dataset;
pub mod domain;
pub mod graph;
pub mod register;
pub mod transit;
pub mod web;
