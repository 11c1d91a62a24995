// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod campaign;
pub mod common;
pub mod contact;
pub mod context;
pub mod database;
pub mod error;
pub mod filestore;
pub mod logger;
pub mod rest;
pub mod scheduler;
pub mod settings;
pub mod transport;
pub mod utils;
