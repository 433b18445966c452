//! Fare explorer server.
//!
//! A web application that answers: "what does it cost to travel between
//! these stations, and which offers are left once I filter by carrier,
//! class and discount card?"

pub mod config;
pub mod domain;
pub mod fares;
pub mod filter;
pub mod geometry;
pub mod journey;
pub mod predicate;
pub mod web;
