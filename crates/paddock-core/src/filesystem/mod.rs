//! Filesystem primitives for the container bring-up pipeline: mount
//! shapes, device-node population, root pivoting, and proc hardening.

#[cfg(target_os = "linux")]
pub mod devices;
#[cfg(target_os = "linux")]
pub mod harden;
#[cfg(target_os = "linux")]
pub mod mount;
#[cfg(target_os = "linux")]
pub mod pivot_root;
