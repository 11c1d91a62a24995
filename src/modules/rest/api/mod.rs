// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use campaign::CampaignApi;
use contact::ContactApi;
use file::FileApi;
use poem_openapi::{OpenApiService, Tags};
use settings::SettingsApi;

use crate::rustblast_version;

pub mod campaign;
pub mod contact;
pub mod file;
pub mod settings;

#[derive(Tags)]
pub enum ApiTags {
    Campaign,
    Contact,
    File,
    Settings,
}

type RustBlastOpenApi = (CampaignApi, ContactApi, FileApi, SettingsApi);

pub fn create_openapi_service() -> OpenApiService<RustBlastOpenApi, ()> {
    OpenApiService::new(
        (CampaignApi, ContactApi, FileApi, SettingsApi),
        "RustBlastApi",
        rustblast_version!(),
    )
}
