// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::filestore::entity::ManagedFile;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::DataPage;
use crate::modules::rest::ApiResult;
use crate::raise_error;
use poem::web::Path;
use poem_openapi::param::Query;
use poem_openapi::payload::{Attachment, AttachmentType, Json};
use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, OpenApi};

pub struct FileApi;

#[derive(Debug, Multipart)]
pub struct FileUploadPayload {
    /// Optional name override; defaults to the uploaded file's own name.
    pub name: Option<String>,
    pub file: Upload,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::File")]
impl FileApi {
    /// Upload a file
    ///
    /// Metadata is recorded in the store and the bytes go to the blob store;
    /// the file name is what attachment matching runs against.
    #[oai(path = "/file", method = "post", operation_id = "upload_file")]
    async fn upload_file(&self, payload: FileUploadPayload) -> ApiResult<Json<ManagedFile>> {
        let name = payload
            .name
            .or_else(|| payload.file.file_name().map(str::to_string))
            .ok_or_else(|| {
                raise_error!(
                    "The upload carries no file name; supply 'name' explicitly".into(),
                    ErrorCode::InvalidParameter
                )
            })?;
        let data = payload.file.into_vec().await.map_err(|e| {
            raise_error!(
                format!("Failed to read uploaded file: {}", e),
                ErrorCode::InvalidParameter
            )
        })?;
        Ok(Json(ManagedFile::upload(name, data).await?))
    }

    /// Retrieve file metadata
    #[oai(path = "/file/:id", method = "get", operation_id = "get_file")]
    async fn get_file(&self, id: Path<u64>) -> ApiResult<Json<ManagedFile>> {
        let file = ManagedFile::get(id.0).await?.ok_or_else(|| {
            raise_error!(
                format!("File with id '{}' not found", id.0),
                ErrorCode::ResourceNotFound
            )
        })?;
        Ok(Json(file))
    }

    /// Download file content
    #[oai(
        path = "/file/:id/content",
        method = "get",
        operation_id = "download_file"
    )]
    async fn download_file(&self, id: Path<u64>) -> ApiResult<Attachment<Vec<u8>>> {
        let file = ManagedFile::get(id.0).await?.ok_or_else(|| {
            raise_error!(
                format!("File with id '{}' not found", id.0),
                ErrorCode::ResourceNotFound
            )
        })?;
        let content = file.content().await?;
        Ok(Attachment::new(content)
            .attachment_type(AttachmentType::Attachment)
            .filename(file.name))
    }

    /// List files
    #[oai(path = "/file-list", method = "get", operation_id = "list_files")]
    async fn list_files(
        &self,
        /// Optional. The page number to retrieve (starting from 1).
        page: Query<Option<u64>>,
        /// Optional. The number of items per page.
        page_size: Query<Option<u64>>,
        /// Optional. Whether to sort the list in descending order.
        desc: Query<Option<bool>>,
    ) -> ApiResult<Json<DataPage<ManagedFile>>> {
        Ok(Json(
            ManagedFile::paginate_list(page.0, page_size.0, desc.0).await?,
        ))
    }

    /// Delete a file and its stored content
    #[oai(path = "/file/:id", method = "delete", operation_id = "remove_file")]
    async fn remove_file(&self, id: Path<u64>) -> ApiResult<()> {
        Ok(ManagedFile::delete(id.0).await?)
    }
}
