//! Trait seams for the price-signal engine.
//!
//! Transports fetch documents; suggesters and analyzers are the external
//! services the engine consults but does not implement.

pub mod suggester;
pub mod transport;
