//! # paddock-core
//!
//! The container bring-up pipeline: namespace creation via `clone(2)`,
//! and the init sequence that turns a freshly cloned process into an
//! isolated runtime (pseudo-filesystems, device nodes, pivot_root,
//! attack-surface reduction) before `exec`ing the payload.

pub mod filesystem;
pub mod init;
pub mod namespace;
