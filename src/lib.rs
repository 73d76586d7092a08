//! Force-directed layout and rendering engine for contact/company networks.
//!
//! [`network`] holds the snapshot types handed over by the network-construction
//! side; [`engine`] owns layout, camera, culling, minimap and selection state.

pub mod engine;
pub mod network;
mod util;
