// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::id;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{
    delete_impl, insert_impl, list_all_impl, paginate_query_primary_scan_all_impl,
    secondary_find_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::filestore::blob::FILE_BLOB_STORE;
use crate::modules::rest::response::DataPage;
use crate::{modules::error::RustBlastResult, raise_error, utc_now};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Metadata for an uploaded file. The bytes live in the content-addressed
/// blob store, keyed by the file id.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 3, version = 1)]
#[native_db(primary_key(pk -> String))]
pub struct ManagedFile {
    /// The unique identifier of the file
    #[secondary_key(unique)]
    pub id: u64,
    /// Original file name, used for attachment matching against contact names.
    pub name: String,
    /// MIME type guessed from the file name at upload time.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Timestamp (in milliseconds) when the file was uploaded.
    pub created_at: i64,
}

impl ManagedFile {
    fn pk(&self) -> String {
        format!("{}_{}", self.created_at, self.id)
    }

    pub async fn upload(name: String, data: Vec<u8>) -> RustBlastResult<ManagedFile> {
        if name.trim().is_empty() {
            return Err(raise_error!(
                "File name must not be empty".into(),
                ErrorCode::InvalidParameter
            ));
        }
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        let file = ManagedFile {
            id: id!(64),
            name,
            mime_type,
            size: data.len() as u64,
            created_at: utc_now!(),
        };
        FILE_BLOB_STORE.put(file.id, &data).await?;
        insert_impl(DB_MANAGER.meta_db(), file.clone()).await?;
        Ok(file)
    }

    pub async fn get(id: u64) -> RustBlastResult<Option<ManagedFile>> {
        secondary_find_impl(DB_MANAGER.meta_db(), ManagedFileKey::id, id).await
    }

    pub async fn list_all() -> RustBlastResult<Vec<ManagedFile>> {
        list_all_impl(DB_MANAGER.meta_db()).await
    }

    pub async fn paginate_list(
        page: Option<u64>,
        page_size: Option<u64>,
        desc: Option<bool>,
    ) -> RustBlastResult<DataPage<ManagedFile>> {
        paginate_query_primary_scan_all_impl(DB_MANAGER.meta_db(), page, page_size, desc)
            .await
            .map(DataPage::from)
    }

    /// Read the file content from the blob store.
    pub async fn content(&self) -> RustBlastResult<Vec<u8>> {
        FILE_BLOB_STORE.get(self.id, &self.name).await
    }

    pub async fn delete(id: u64) -> RustBlastResult<()> {
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .secondary::<ManagedFile>(ManagedFileKey::id, id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!("File with id '{}' not found", id),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await?;
        FILE_BLOB_STORE.remove(id).await
    }
}
