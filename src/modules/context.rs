// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::RustBlastResult;

pub trait Initialize {
    async fn initialize() -> RustBlastResult<()>;
}

pub trait RustBlastTask {
    fn start();
}
