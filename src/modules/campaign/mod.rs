// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod dispatch;
pub mod entity;
pub mod matcher;
pub mod pacing;
pub mod payload;
pub mod progress;
pub mod render;
pub mod status;
#[cfg(test)]
mod tests;
