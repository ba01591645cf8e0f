//! # Agents
//!
//! The colony's members and the rules they follow.
//!
//! ## Architecture
//!
//! * **Agent**: Per-member state, the decision engine and terrain interaction
//! * **Colony**: The arena of agents, spawning, snapshots and turn dispatch
//!
//! ## Turn Flow
//!
//! 1. The colony snapshots every live member
//! 2. The acting agent settles onto the terrain and reads the block underfoot
//! 3. [`agent::Agent::decide`] picks one action from the snapshot
//! 4. The colony applies it, mutating the world or a partner's health
//! 5. End-of-turn damage is taken; death is permanent

pub mod agent;
pub mod colony;
