//! Google Drive implementation of the document store seam.

use crate::workflows::recruit::corpus::{
    DocumentHandle, DocumentStore, DocumentStoreError, FetchedDocument,
};
use crate::workflows::recruit::gateways::GatewaySetupError;
use google_drive3::{api::File, api::Scope, DriveHub};
use tokio::runtime::Runtime;

const DRIVE_MEDIA_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Thin wrapper around the generated google-drive3 client allowing the
/// synchronous workflow to interact with Drive without exposing async
/// details. Media content is pulled as a chunked byte stream rather than a
/// single buffered read, since resumes and postings arrive over the network.
pub struct GoogleDriveClient<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    media: reqwest::Client,
    runtime: Runtime,
}

impl<C> GoogleDriveClient<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, media: reqwest::Client, runtime: Runtime) -> Self {
        Self {
            hub,
            media,
            runtime,
        }
    }

    pub fn with_runtime(hub: DriveHub<C>) -> Result<Self, GatewaySetupError> {
        let runtime = Runtime::new().map_err(|err| GatewaySetupError::Runtime(err.to_string()))?;
        Ok(Self::new(hub, reqwest::Client::new(), runtime))
    }

    fn map_error<E: std::fmt::Display>(err: E) -> DocumentStoreError {
        DocumentStoreError::Backend(err.to_string())
    }

    async fn bearer_token(&self) -> Result<Option<String>, DocumentStoreError> {
        self.hub
            .auth
            .get_token(&[Scope::Readonly.as_ref()])
            .await
            .map_err(Self::map_error)
    }

    async fn download_media(&self, document_id: &str) -> Result<Vec<u8>, DocumentStoreError> {
        let url = format!("{DRIVE_MEDIA_URL}/{document_id}?alt=media&supportsAllDrives=true");
        let mut request = self.media.get(&url);
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let mut response = request
            .send()
            .await
            .map_err(Self::map_error)?
            .error_for_status()
            .map_err(Self::map_error)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(Self::map_error)? {
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

impl<C> std::fmt::Debug for GoogleDriveClient<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDriveClient").finish_non_exhaustive()
    }
}

impl<C> DocumentStore for GoogleDriveClient<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn list_documents(&self, folder_id: &str) -> Result<Vec<DocumentHandle>, DocumentStoreError> {
        let folder = folder_id.to_string();
        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .list()
                .q(&format!("'{folder}' in parents and trashed=false"))
                .param("fields", "files(id,name,mimeType)")
                .page_size(100)
                .include_items_from_all_drives(true)
                .supports_all_drives(true)
                .add_scope(Scope::Readonly)
                .doit()
                .await
        });

        let (_, file_list) = result.map_err(Self::map_error)?;
        let files = file_list.files.unwrap_or_default();
        Ok(files
            .into_iter()
            .map(|file| DocumentHandle {
                id: file.id.unwrap_or_default(),
                name: file.name.unwrap_or_else(|| "untitled".to_string()),
                media_type: file
                    .mime_type
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            })
            .collect())
    }

    fn fetch_document(&self, document_id: &str) -> Result<FetchedDocument, DocumentStoreError> {
        let id = document_id.to_string();
        self.runtime.block_on(async {
            let (_, file) = self
                .hub
                .files()
                .get(&id)
                .param("fields", "id,name,mimeType")
                .supports_all_drives(true)
                .add_scope(Scope::Readonly)
                .doit()
                .await
                .map_err(Self::map_error)?;

            let media_type = file
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = self.download_media(&id).await?;
            Ok(FetchedDocument { bytes, media_type })
        })
    }

    fn archive_document(
        &self,
        document_id: &str,
        target_folder_id: &str,
    ) -> Result<(), DocumentStoreError> {
        let id = document_id.to_string();
        let target = target_folder_id.to_string();
        self.runtime.block_on(async {
            let (_, file) = self
                .hub
                .files()
                .get(&id)
                .param("fields", "parents")
                .supports_all_drives(true)
                .doit()
                .await
                .map_err(Self::map_error)?;
            let previous_parents = file.parents.unwrap_or_default().join(",");

            let mut update = self
                .hub
                .files()
                .update(File::default(), &id)
                .add_parents(&target)
                .supports_all_drives(true);
            if !previous_parents.is_empty() {
                update = update.remove_parents(&previous_parents);
            }
            update
                .doit_without_upload()
                .await
                .map_err(Self::map_error)?;
            Ok(())
        })
    }
}
