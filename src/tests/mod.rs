//! Unit tests for SBC codec modules
//!
//! This module contains unit tests for individual components of the codec.
//! Tests are organized by module and functionality.

pub mod frame_tests;
