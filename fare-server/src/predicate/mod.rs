//! Fare store predicate construction.
//!
//! Turns the user's filter parameters into a single declarative condition
//! that the fare store can evaluate. The builder is a pure function; the
//! resulting expression can be rendered as a store document or evaluated
//! in memory against any [`FieldSource`].

mod build;
mod expr;
mod filters;

pub use build::{PredicateError, build_match};
pub use expr::{Clause, DayWindow, Field, FieldSource, MatchExpression};
pub use filters::{FareFilters, present_if};
