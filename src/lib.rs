//! braille-player library crate.
//!
//! Converts video frames into 24-bit colored Unicode braille art, previews and
//! plays it back in the terminal, and exports whole videos as standalone C
//! animation programs.
//!
//! The pure pipeline is [`braille`] (tone, scaling, glyph encoding) and
//! [`render`] (text serialization). [`session`] drives it interactively
//! against the [`decoder`] and [`terminal`] collaborators, and [`export`]
//! turns an encoded sequence into program source.

pub mod braille;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod export;
pub mod frame;
pub mod render;
pub mod session;
pub mod terminal;
