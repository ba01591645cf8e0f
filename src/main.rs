//! # Voxel Colony Entry Point
//!
//! Calls into the library's `run()` function and reports any error on stderr.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- --config colony.json --generations 3
//! ```

fn main() {
    if let Err(error) = voxel_colony::run() {
        eprintln!("voxel-colony: {error}");
        std::process::exit(1);
    }
}
