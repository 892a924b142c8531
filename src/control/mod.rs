//! # Control Module
//!
//! Maps decoded controller updates onto host pointer behaviour.
//!
//! This module handles:
//! - Button edges to press/release actions
//! - Joystick centering and deadzone filtering
//! - The shared cursor delta handed from the ingest worker to the cursor mover

pub mod cursor;
pub mod mapper;
