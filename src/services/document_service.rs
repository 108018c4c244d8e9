// src/services/document_service.rs

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    models::lease::{DocumentKind, TenantDocument},
};

/// Referência enviada pelo inquilino ao assinar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub kind: DocumentKind,
    #[schema(example = "tenants/3f2a/id_front.jpg")]
    pub file_ref: String,
}

/// Colaborador de armazenamento de arquivos. Valida tipo/tamanho de um upload e
/// devolve o documento com a URL pública resolvida.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn validate_and_resolve(
        &self,
        upload: &DocumentUpload,
        allowed_kinds: &[DocumentKind],
    ) -> Result<TenantDocument, AppError>;
}

const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "png", "jpg", "jpeg", "webp"];

/// Arquivos já enviados para um diretório local (ou volume montado).
#[derive(Debug, Clone)]
pub struct UploadDirDocumentStore {
    root: PathBuf,
    public_base_url: String,
    max_bytes: u64,
}

impl UploadDirDocumentStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    // Só caminhos relativos e sem `..`: nada escapa do diretório de uploads
    fn resolve_path(&self, file_ref: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(file_ref);
        let is_safe = !file_ref.is_empty()
            && relative.components().all(|c| matches!(c, Component::Normal(_)));

        if !is_safe {
            return Err(AppError::Validation(format!("referência de arquivo inválida: {file_ref}")));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for UploadDirDocumentStore {
    async fn validate_and_resolve(
        &self,
        upload: &DocumentUpload,
        allowed_kinds: &[DocumentKind],
    ) -> Result<TenantDocument, AppError> {
        if !allowed_kinds.contains(&upload.kind) {
            return Err(AppError::Validation(format!(
                "tipo de documento não aceito: {}",
                upload.kind
            )));
        }

        let extension = Path::new(&upload.file_ref)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "formato de arquivo não aceito para {}: {}",
                upload.kind, upload.file_ref
            )));
        }

        let path = self.resolve_path(&upload.file_ref)?;
        let metadata = tokio::fs::metadata(&path).await.map_err(|_| {
            AppError::Validation(format!("arquivo não encontrado: {}", upload.file_ref))
        })?;

        if !metadata.is_file() {
            return Err(AppError::Validation(format!("arquivo não encontrado: {}", upload.file_ref)));
        }

        if metadata.len() > self.max_bytes {
            return Err(AppError::Validation(format!(
                "o arquivo {} excede o tamanho máximo de {} bytes",
                upload.file_ref, self.max_bytes
            )));
        }

        Ok(TenantDocument {
            kind: upload.kind,
            file_ref: upload.file_ref.clone(),
            url: format!("{}/{}", self.public_base_url, upload.file_ref),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [DocumentKind; 4] = [
        DocumentKind::IdFront,
        DocumentKind::IdBack,
        DocumentKind::ProofOfIncome,
        DocumentKind::BankStatement,
    ];

    fn upload(kind: DocumentKind, file_ref: &str) -> DocumentUpload {
        DocumentUpload { kind, file_ref: file_ref.to_string() }
    }

    #[tokio::test]
    async fn resolves_existing_file_to_public_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("tenant")).unwrap();
        std::fs::write(dir.path().join("tenant/front.jpg"), b"jpeg").unwrap();

        let store = UploadDirDocumentStore::new(dir.path(), "https://files.test/", 1024);
        let doc = store
            .validate_and_resolve(&upload(DocumentKind::IdFront, "tenant/front.jpg"), &ALL_KINDS)
            .await
            .unwrap();

        assert_eq!(doc.url, "https://files.test/tenant/front.jpg");
        assert_eq!(doc.kind, DocumentKind::IdFront);
    }

    #[tokio::test]
    async fn rejects_traversal_oversized_and_unknown_formats() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.pdf"), vec![0u8; 64]).unwrap();
        std::fs::write(dir.path().join("script.sh"), b"echo").unwrap();

        let store = UploadDirDocumentStore::new(dir.path(), "https://files.test", 16);

        for file_ref in ["../etc/passwd.pdf", "big.pdf", "script.sh", "missing.png"] {
            let result = store
                .validate_and_resolve(&upload(DocumentKind::IdBack, file_ref), &ALL_KINDS)
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{file_ref} should be rejected");
        }
    }

    #[tokio::test]
    async fn rejects_kinds_outside_the_allowed_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stmt.pdf"), b"pdf").unwrap();

        let store = UploadDirDocumentStore::new(dir.path(), "https://files.test", 1024);
        let result = store
            .validate_and_resolve(
                &upload(DocumentKind::BankStatement, "stmt.pdf"),
                &[DocumentKind::IdFront, DocumentKind::IdBack],
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
