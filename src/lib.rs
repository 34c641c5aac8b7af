pub mod audio;
pub mod beat;
pub mod config;
pub mod consts;
pub mod controller;
pub mod error;
