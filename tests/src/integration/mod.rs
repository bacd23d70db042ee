//! Cross-crate flows: NT-01 hops, NT-02 agreement and NT-03 evaluation
//! driven by NT-04 agents.

mod faults;
mod ring;
