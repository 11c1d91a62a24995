use crate::modules::error::code::ErrorCode;
use crate::modules::error::RustBlastResult;
use crate::modules::settings::dir::DATA_DIR_MANAGER;
use crate::raise_error;
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::io::AsyncWriteExt;

pub static FILE_BLOB_STORE: LazyLock<FileBlobStore> = LazyLock::new(FileBlobStore::init);

/// Content-addressed storage for uploaded file bytes, keyed by the owning
/// `ManagedFile` id.
pub struct FileBlobStore {
    blob_dir: PathBuf,
}

impl FileBlobStore {
    pub fn init() -> Self {
        Self {
            blob_dir: DATA_DIR_MANAGER.blob_dir.clone(),
        }
    }

    fn blob_dir_str(&self) -> RustBlastResult<&str> {
        self.blob_dir.to_str().ok_or_else(|| {
            raise_error!(
                "Failed to convert blob_dir to str".into(),
                ErrorCode::InternalError
            )
        })
    }

    pub async fn put(&self, file_id: u64, data: &[u8]) -> RustBlastResult<()> {
        let blob_dir = self.blob_dir_str()?;
        let mut writer = cacache::Writer::create(blob_dir, &file_id.to_string())
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        writer
            .write_all(data)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        writer
            .commit()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(())
    }

    pub async fn get(&self, file_id: u64, name: &str) -> RustBlastResult<Vec<u8>> {
        let blob_dir = self.blob_dir_str()?;
        cacache::read(blob_dir, file_id.to_string()).await.map_err(|_| {
            raise_error!(
                format!("File content for '{}' is missing from the file store", name),
                ErrorCode::BlobMissing
            )
        })
    }

    pub async fn remove(&self, file_id: u64) -> RustBlastResult<()> {
        let blob_dir = self.blob_dir_str()?;
        cacache::RemoveOpts::new()
            .remove_fully(true)
            .remove(blob_dir, &file_id.to_string())
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
    }
}
