use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::storage::ProofFormat;

const STAGING_DIR: &str = ".staging";

/// 已落盘的支付凭证
#[derive(Debug, Clone)]
pub struct StoredProof {
    pub path: PathBuf,
    pub file_name: String,
    pub url: String,
}

/// 支付凭证文件存储
///
/// 先写入 `<dir>/.staging/<uuid>.part`，写完后 rename 到最终文件名，
/// 目录中不会出现写了一半的凭证文件。
#[derive(Debug, Clone)]
pub struct ProofStore {
    dir: PathBuf,
    public_prefix: String,
}

impl ProofStore {
    pub fn new(dir: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.dir, &config.public_prefix)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn store(
        &self,
        order_id: i64,
        bytes: &[u8],
        format: ProofFormat,
    ) -> AppResult<StoredProof> {
        let staging_dir = self.dir.join(STAGING_DIR);
        tokio::fs::create_dir_all(&staging_dir)
            .await
            .map_err(|e| storage_error("create upload directory", &staging_dir, e))?;

        let staging_path = staging_dir.join(format!("{}.part", Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&staging_path, bytes).await {
            let _ = tokio::fs::remove_file(&staging_path).await;
            return Err(storage_error("write staging file", &staging_path, e));
        }

        // 同一毫秒内重复上传时顺延时间戳，保证文件名不冲突
        let mut ts = Utc::now().timestamp_millis();
        let (file_name, path) = loop {
            let name = format!("payment_{order_id}_{ts}.{}", format.extension());
            let path = self.dir.join(&name);
            match tokio::fs::try_exists(&path).await {
                Ok(false) => break (name, path),
                Ok(true) => ts += 1,
                Err(e) => {
                    let _ = tokio::fs::remove_file(&staging_path).await;
                    return Err(storage_error("check upload path", &path, e));
                }
            }
        };

        if let Err(e) = tokio::fs::rename(&staging_path, &path).await {
            let _ = tokio::fs::remove_file(&staging_path).await;
            return Err(storage_error("move proof into place", &path, e));
        }

        log::info!("Stored payment proof {} for order {order_id}", path.display());
        Ok(StoredProof {
            url: format!("{}/{file_name}", self.public_prefix),
            file_name,
            path,
        })
    }

    /// 删除文件，失败只记录日志
    pub async fn remove(&self, proof: &StoredProof) {
        if let Err(e) = tokio::fs::remove_file(&proof.path).await {
            log::warn!("Failed to remove payment proof {}: {e}", proof.path.display());
        }
    }

    /// 按公开 URL 删除旧凭证；不属于本存储目录的 URL 忽略
    pub async fn remove_by_url(&self, url: &str) {
        let Some(file_name) = self.file_name_for_url(url) else {
            log::warn!("Ignoring removal of foreign proof url {url}");
            return;
        };
        let path = self.dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => log::info!("Removed previous payment proof {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove payment proof {}: {e}", path.display()),
        }
    }

    fn file_name_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let name = url
            .strip_prefix(self.public_prefix.as_str())?
            .strip_prefix('/')?;
        let valid = !name.is_empty()
            && !name.contains(['/', '\\'])
            && !name.starts_with('.');
        valid.then_some(name)
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> AppError {
    AppError::StorageError(format!("Failed to {action} {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_writes_final_file_and_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProofStore::new(dir.path(), "/assets/uploads/payments/");

        let stored = store.store(7, b"fake-bytes", ProofFormat::Png).await.unwrap();

        assert!(stored.file_name.starts_with("payment_7_"));
        assert!(stored.file_name.ends_with(".png"));
        assert_eq!(
            stored.url,
            format!("/assets/uploads/payments/{}", stored.file_name)
        );
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"fake-bytes");

        // staging 目录里不留残片
        let leftovers = std::fs::read_dir(dir.path().join(STAGING_DIR))
            .unwrap()
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_two_uploads_in_same_millisecond_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProofStore::new(dir.path(), "/p");
        let a = store.store(1, b"a", ProofFormat::Jpeg).await.unwrap();
        let b = store.store(1, b"b", ProofFormat::Jpeg).await.unwrap();
        assert_ne!(a.path, b.path);
        assert_eq!(std::fs::read(&a.path).unwrap(), b"a");
    }

    #[tokio::test]
    async fn test_remove_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProofStore::new(dir.path(), "/assets/uploads/payments");
        let stored = store.store(3, b"x", ProofFormat::Jpeg).await.unwrap();

        store.remove_by_url("/elsewhere/secret.txt").await;
        store.remove_by_url("/assets/uploads/payments/../x").await;
        assert!(stored.path.exists());

        store.remove_by_url(&stored.url).await;
        assert!(!stored.path.exists());
    }
}
