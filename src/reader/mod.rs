//! Input front-ends
//!
//! Thin, line-oriented readers that hand one raw record at a time to the
//! merge engine, each paired with a [`GraphMapper`](crate::GraphMapper)
//! implementation for its domain. The core engine only requires "a
//! sequence of raw records"; these are the stock front-ends the CLI
//! ships with.

pub mod edgelist;
pub mod nel;
