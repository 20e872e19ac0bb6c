//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Listener bound → ready hook → ensure staging dir → start accepting
//!
//! Shutdown (shutdown.rs, coordinator.rs):
//!     Trigger received → stop accepting → drain → close hook
//!         → tear down staging dir (bounded) → publish report → binary exits
//!
//! Signals (signals.rs):
//!     first SIGTERM/SIGINT → trigger graceful shutdown
//!     further SIGTERM/SIGINT → tear down directly
//! ```
//!
//! # Design Decisions
//! - Cleanup never exits the process; the binary decides once a report exists
//! - Tear-down has a deadline so a stuck removal cannot hang exit
//! - Concurrent tear-downs are allowed; the first report published wins

pub mod coordinator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use coordinator::{ShutdownCoordinator, TeardownReport};
pub use shutdown::{Shutdown, ShutdownReason};
