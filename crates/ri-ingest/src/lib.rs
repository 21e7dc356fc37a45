//! rusty-illust/crates/ri-ingest/src/lib.rs
//!
//! The illustration ingestion pipeline: per-image decode → hash → store,
//! joined at a barrier, followed by record persistence and best-effort
//! dispatch of one scaling task per unique image.

pub mod addressing;
pub mod decode;
pub mod geometry;

#[cfg(test)]
pub mod test_util;

use chrono::Utc;
use futures_util::future::join_all;
use ri_core::error::{AppError, Result};
use ri_core::models::{Extent, Illustration, NewIllustration, ProcessingTask};
use ri_core::traits::{BlobStore, IllustRepo, TaskQueue};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// One image that made it through decode → hash → store. The raw bytes are
/// already uploaded; only what dispatch needs is kept.
#[derive(Debug, Clone)]
struct StoredImage {
    hash: String,
    width: u32,
    height: u32,
}

/// Coordinates the ingestion of one submission batch.
///
/// All external collaborators are injected at construction; the pipeline
/// holds no process-wide state.
pub struct IngestPipeline {
    repo: Arc<dyn IllustRepo>,
    store: Arc<dyn BlobStore>,
    queue: Arc<dyn TaskQueue>,
}

impl IngestPipeline {
    pub fn new(
        repo: Arc<dyn IllustRepo>,
        store: Arc<dyn BlobStore>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self { repo, store, queue }
    }

    /// Ingests a submission batch.
    ///
    /// Decode/hash/store run concurrently per image and are all-or-nothing:
    /// the first failure rejects the whole batch before any record exists.
    /// Orphan blob writes from sibling items may land anyway; content
    /// addressing makes them harmless.
    ///
    /// Dispatch runs only after the record is committed and is best-effort:
    /// a broker failure is logged, never bubbled up, and never rolls the
    /// record back.
    pub async fn ingest(&self, mut submission: NewIllustration) -> Result<Illustration> {
        let images = std::mem::take(&mut submission.images);
        let outcomes =
            join_all(images.into_iter().map(|raw| self.decode_and_store(raw))).await;

        let mut stored = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            stored.push(outcome?);
        }

        let illust = Illustration {
            id: Uuid::now_v7(),
            author_id: submission.author_id,
            title: submission.title,
            caption: submission.caption,
            is_public: submission.is_public,
            allow_comments: submission.allow_comments,
            hashes: stored.iter().map(|img| img.hash.clone()).collect(),
            created_at: Utc::now(),
        };
        self.repo
            .create_illust(&illust)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        self.dispatch_tasks(&stored).await;

        Ok(illust)
    }

    /// One per-image pipeline: decode the payload, derive its content
    /// address, upload under `<hash>/original`. Re-uploading identical
    /// bytes is an idempotent overwrite, so duplicates need no special
    /// handling here.
    async fn decode_and_store(&self, raw: String) -> Result<StoredImage> {
        // Decode and hash are CPU-bound; run them on the blocking pool so
        // sibling items and unrelated requests keep making progress.
        let (decoded, hash) = tokio::task::spawn_blocking(move || {
            let decoded = decode::decode_data_uri(&raw)?;
            let hash = addressing::content_hash(&decoded.bytes);
            Ok::<_, AppError>((decoded, hash))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

        let (width, height) = (decoded.width, decoded.height);

        self.store
            .put(
                &addressing::original_key(&hash),
                decoded.bytes,
                &decoded.mime_type,
            )
            .await
            .map_err(|e| AppError::StorageFailure(e.to_string()))?;

        Ok(StoredImage { hash, width, height })
    }

    /// Publishes one scaling task per unique content hash. Images with
    /// identical bytes share a stored blob and therefore need one task.
    async fn dispatch_tasks(&self, stored: &[StoredImage]) {
        let mut seen = HashSet::new();
        for img in stored {
            if !seen.insert(img.hash.as_str()) {
                continue;
            }
            let crop = geometry::plan_crop(img.width, img.height);
            let task = ProcessingTask {
                hash: img.hash.clone(),
                crop_position: crop.origin,
                crop_size: Extent::square(crop.size),
                scales: geometry::plan_scales(crop.size),
            };
            if let Err(e) = self.queue.publish(&task).await {
                log::error!(
                    "failed to dispatch scaling task for {}: {e:#}; record is committed, \
                     thumbnails for this image will not be generated",
                    img.hash
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::png_data_uri;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemRepo {
        created: Mutex<Vec<Illustration>>,
    }

    #[async_trait]
    impl IllustRepo for MemRepo {
        async fn create_illust(&self, illust: &Illustration) -> anyhow::Result<()> {
            self.created.lock().unwrap().push(illust.clone());
            Ok(())
        }
        async fn get_illust(&self, _id: Uuid) -> anyhow::Result<Option<Illustration>> {
            Ok(None)
        }
        async fn list_recent(&self, _limit: i64) -> anyhow::Result<Vec<Illustration>> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct MemStore {
        puts: Mutex<Vec<(String, String, usize)>>,
        fail: bool,
    }

    #[async_trait]
    impl BlobStore for MemStore {
        async fn put(
            &self,
            key: &str,
            bytes: Vec<u8>,
            content_type: &str,
        ) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("bucket unavailable");
            }
            self.puts
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string(), bytes.len()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemQueue {
        tasks: Mutex<Vec<ProcessingTask>>,
        fail: bool,
    }

    #[async_trait]
    impl TaskQueue for MemQueue {
        async fn publish(&self, task: &ProcessingTask) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("broker unavailable");
            }
            self.tasks.lock().unwrap().push(task.clone());
            Ok(())
        }
    }

    fn submission(images: Vec<String>) -> NewIllustration {
        NewIllustration {
            author_id: Uuid::now_v7(),
            title: "Plein air studies".into(),
            caption: "Quick sketches".into(),
            is_public: true,
            allow_comments: true,
            images,
        }
    }

    fn pipeline(
        repo: Arc<MemRepo>,
        store: Arc<MemStore>,
        queue: Arc<MemQueue>,
    ) -> IngestPipeline {
        IngestPipeline::new(repo, store, queue)
    }

    #[tokio::test]
    async fn ingests_a_batch_and_dispatches_one_task_per_image() {
        let (repo, store, queue) = (
            Arc::new(MemRepo::default()),
            Arc::new(MemStore::default()),
            Arc::new(MemQueue::default()),
        );
        let p = pipeline(repo.clone(), store.clone(), queue.clone());

        let illust = p
            .ingest(submission(vec![png_data_uri(800, 600, 1), png_data_uri(100, 100, 2)]))
            .await
            .unwrap();

        assert_eq!(illust.hashes.len(), 2);
        assert_eq!(repo.created.lock().unwrap().len(), 1);

        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 2);
        assert!(puts.iter().all(|(key, ct, len)| {
            key.ends_with("/original") && ct == "image/png" && *len > 0
        }));

        let tasks = queue.tasks.lock().unwrap();
        assert_eq!(tasks.len(), 2);

        let wide = tasks.iter().find(|t| t.crop_size.x == 600).unwrap();
        assert_eq!(wide.crop_position, Extent::new(100, 0));
        assert_eq!(wide.scales.len(), 3);

        let small = tasks.iter().find(|t| t.crop_size.x == 100).unwrap();
        assert_eq!(small.crop_position, Extent::new(0, 0));
        assert!(small.scales.is_empty());
    }

    #[tokio::test]
    async fn identical_images_collapse_to_one_hash_and_one_task() {
        let (repo, store, queue) = (
            Arc::new(MemRepo::default()),
            Arc::new(MemStore::default()),
            Arc::new(MemQueue::default()),
        );
        let p = pipeline(repo.clone(), store.clone(), queue.clone());

        let same = png_data_uri(64, 64, 9);
        let illust = p
            .ingest(submission(vec![same.clone(), same]))
            .await
            .unwrap();

        assert_eq!(illust.hashes.len(), 1);
        // Both uploads land (idempotent overwrite), but only one task goes out.
        assert_eq!(store.puts.lock().unwrap().len(), 2);
        assert_eq!(queue.tasks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn one_malformed_image_rejects_the_whole_batch() {
        let (repo, store, queue) = (
            Arc::new(MemRepo::default()),
            Arc::new(MemStore::default()),
            Arc::new(MemQueue::default()),
        );
        let p = pipeline(repo.clone(), store.clone(), queue.clone());

        let err = p
            .ingest(submission(vec![
                png_data_uri(32, 32, 3),
                "not-a-data-uri".into(),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::MalformedContentType(_)));
        assert!(repo.created.lock().unwrap().is_empty());
        assert!(queue.tasks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_rejects_the_batch_before_any_record() {
        let repo = Arc::new(MemRepo::default());
        let store = Arc::new(MemStore {
            fail: true,
            ..Default::default()
        });
        let queue = Arc::new(MemQueue::default());
        let p = pipeline(repo.clone(), store, queue.clone());

        let err = p
            .ingest(submission(vec![png_data_uri(32, 32, 4)]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StorageFailure(_)));
        assert!(repo.created.lock().unwrap().is_empty());
        assert!(queue.tasks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_roll_back_the_record() {
        let repo = Arc::new(MemRepo::default());
        let store = Arc::new(MemStore::default());
        let queue = Arc::new(MemQueue {
            fail: true,
            ..Default::default()
        });
        let p = pipeline(repo.clone(), store, queue);

        let illust = p
            .ingest(submission(vec![png_data_uri(32, 32, 5)]))
            .await
            .unwrap();

        assert_eq!(illust.hashes.len(), 1);
        assert_eq!(repo.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn a_larger_batch_fans_out_and_joins_cleanly() {
        let (repo, store, queue) = (
            Arc::new(MemRepo::default()),
            Arc::new(MemStore::default()),
            Arc::new(MemQueue::default()),
        );
        let p = pipeline(repo.clone(), store.clone(), queue.clone());

        let images = (0..5u32).map(|i| png_data_uri(40 + i, 40, i as u8 + 1)).collect();
        let illust = p.ingest(submission(images)).await.unwrap();

        assert_eq!(illust.hashes.len(), 5);
        assert_eq!(store.puts.lock().unwrap().len(), 5);
        assert_eq!(queue.tasks.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn hashes_are_collected_as_a_set() {
        let (repo, store, queue) = (
            Arc::new(MemRepo::default()),
            Arc::new(MemStore::default()),
            Arc::new(MemQueue::default()),
        );
        let p = pipeline(repo, store, queue);

        let illust = p
            .ingest(submission(vec![
                png_data_uri(16, 16, 1),
                png_data_uri(16, 16, 1),
                png_data_uri(16, 16, 2),
            ]))
            .await
            .unwrap();

        let distinct: BTreeSet<_> = illust.hashes.iter().collect();
        assert_eq!(distinct.len(), 2);
    }
}
