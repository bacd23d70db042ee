//! # Nym-Trust Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # multi-agent rings over the in-memory transport
//! │   ├── ring.rs        # full maintenance cycles across three agents
//! │   └── faults.rs      # forged shuffle hops and rogue peers
//! └── benches/           # shuffle, mining and obfuscation throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nt-tests
//! cargo test -p nt-tests integration::ring
//! cargo bench -p nt-tests
//! ```

pub mod integration;
