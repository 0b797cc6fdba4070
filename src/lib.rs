pub mod analysis;
pub mod audio;
pub mod catalog;
pub mod colors;
pub mod config;
pub mod lyrics;
pub mod lyrics_client;
pub mod playback;
pub mod proxy;
pub mod visualizer;
