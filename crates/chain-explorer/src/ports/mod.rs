//! # Ports Layer
//!
//! Port traits for the explorer.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (queries exposed to front ends)
//! - `outbound.rs` - Driven ports (the chain database the service reads)

pub mod inbound;
pub mod outbound;
