//! # Voxel World
//!
//! This module contains the terrain the colony lives on: a finite voxel grid,
//! its procedural generation and the chunk bookkeeping a renderer needs.
//!
//! ## Architecture
//!
//! * **Block**: Defines individual voxel types and the compact storage cell
//! * **Chunk**: Partitions the grid into cubes that carry a "needs redraw" flag
//! * **World**: Owns the dense grid, bounds-checked access and mutation
//! * **Generation**: One-shot terrain, acid and obstacle generation
//!
//! ## Data Flow
//!
//! 1. Generation fills a fresh world from the seed and configuration
//! 2. Agents read blocks and mutate them through `World::set_block_at`
//! 3. Every mutation flags the owning chunk and its face neighbors
//! 4. A renderer polls the flags, rebuilds those chunks and clears them

pub mod block;
pub mod chunk;
pub mod generation;
pub mod world;
