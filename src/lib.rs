//! Aggregates recorded daily usage time into charts. A day keyed dataset of usage seconds goes in,
//! labelled weekly, monthly and yearly series come out. The date math lives in [aggregate] and
//! doesn't touch the clock, the filesystem or the terminal.

pub mod aggregate;
pub mod cli;
pub mod labels;
pub mod storage;
pub mod utils;
