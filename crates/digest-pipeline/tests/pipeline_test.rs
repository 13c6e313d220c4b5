use async_trait::async_trait;
use digest_core::{
    DatabaseConfig, DigestError, DigestNotifier, FilterRule, Namespace, NewsId, NewsRecord,
    NewsSource, SeenStore, SourceItem,
};
use digest_db::SqlStore;
use digest_notify::Dispatcher;
use digest_pipeline::{run_vacuum, DigestPipeline, PipelineError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const DAY: i64 = 86_400;

fn id(n: i64) -> NewsId {
    NewsId::new(n).expect("valid id")
}

/// In-memory stand-in for the Hacker News API.
#[derive(Default)]
struct FakeSource {
    ranking: Vec<NewsId>,
    items: HashMap<NewsId, SourceItem>,
    failing: HashSet<NewsId>,
    prefetch_fails: bool,
    fetched: Mutex<Vec<NewsId>>,
    prefetches: Mutex<usize>,
}

impl FakeSource {
    fn with_item(mut self, n: i64, title: &str, url: &str) -> Self {
        self.ranking.push(id(n));
        self.items.insert(
            id(n),
            SourceItem {
                id: id(n),
                time: Some(chrono::Utc::now().timestamp()),
                title: Some(title.to_string()),
                url: Some(url.to_string()),
            },
        );
        self
    }

    fn failing_on(mut self, n: i64) -> Self {
        self.failing.insert(id(n));
        self
    }

    fn fetched(&self) -> Vec<NewsId> {
        self.fetched.lock().expect("lock").clone()
    }

    fn prefetches(&self) -> usize {
        *self.prefetches.lock().expect("lock")
    }
}

#[async_trait]
impl NewsSource for FakeSource {
    async fn top_story_ids(&self) -> digest_core::Result<Vec<NewsId>> {
        *self.prefetches.lock().expect("lock") += 1;
        if self.prefetch_fails {
            return Err(DigestError::Source("connection refused".to_string()));
        }
        Ok(self.ranking.clone())
    }

    async fn fetch_item(&self, id: NewsId) -> digest_core::Result<SourceItem> {
        self.fetched.lock().expect("lock").push(id);
        if self.failing.contains(&id) {
            return Err(DigestError::Source(format!("item {id}: status 500")));
        }
        self.items
            .get(&id)
            .cloned()
            .ok_or_else(|| DigestError::Source(format!("item {id} not found")))
    }
}

/// Notifier that remembers every digest it was handed.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Vec<NewsRecord>>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Vec<NewsRecord>> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DigestNotifier for RecordingNotifier {
    fn channel(&self) -> &'static str {
        "recording"
    }

    async fn send_digest(&self, digest: &[NewsRecord]) -> digest_core::Result<()> {
        self.sent.lock().expect("lock").push(digest.to_vec());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl DigestNotifier for FailingNotifier {
    fn channel(&self) -> &'static str {
        "failing"
    }

    async fn send_digest(&self, _digest: &[NewsRecord]) -> digest_core::Result<()> {
        Err(DigestError::Notification("relay refused".to_string()))
    }
}

fn sample_source() -> FakeSource {
    FakeSource::default()
        .with_item(1, "Intro to SQL", "http://a/1")
        .with_item(2, "Cooking", "http://a/2")
        .with_item(3, "News", "")
}

fn sql_filters() -> Vec<FilterRule> {
    vec![FilterRule::new("Databases", "sql")]
}

fn db_config(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig {
        database: dir
            .path()
            .join("digest.sqlite")
            .to_str()
            .expect("utf-8 path")
            .to_string(),
        ..DatabaseConfig::default()
    }
}

fn open_store(dir: &TempDir) -> Arc<SqlStore> {
    Arc::new(SqlStore::connect(&db_config(dir), 30).expect("open store"))
}

fn pipeline(
    dir: &TempDir,
    source: &Arc<FakeSource>,
    notifier: Arc<dyn DigestNotifier>,
    filters: Vec<FilterRule>,
) -> DigestPipeline {
    DigestPipeline::new(
        Arc::clone(source) as Arc<dyn NewsSource>,
        open_store(dir),
        Dispatcher::new().with(notifier),
        filters,
    )
}

async fn unseen(dir: &TempDir, namespace: Namespace, ids: &[i64]) -> Vec<NewsId> {
    let store = open_store(dir);
    store.initialize(namespace).await.expect("init store");
    let ids: Vec<NewsId> = ids.iter().copied().map(id).collect();
    let unseen = store
        .unseen_among(namespace, &ids)
        .await
        .expect("lookup");
    store.close().await;
    unseen
}

#[tokio::test]
async fn test_normal_run_digests_matching_items() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source());
    let notifier = Arc::new(RecordingNotifier::default());

    let outcome = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await
        .expect("run pipeline");

    assert_eq!(outcome.filter_count, 1);
    assert_eq!(outcome.matched_count, 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].len(), 1);
    assert_eq!(sent[0][0].id, id(1));
    assert_eq!(sent[0][0].title, "Intro to SQL");

    // every fetched item is recorded, link-less ones included
    assert!(unseen(&dir, Namespace::Normal, &[1, 2, 3]).await.is_empty());
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source());
    let notifier = Arc::new(RecordingNotifier::default());

    pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await
        .expect("first run");
    let fetched_after_first = source.fetched().len();

    let outcome = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await
        .expect("second run");

    assert_eq!(outcome.matched_count, 0);
    assert_eq!(source.fetched().len(), fetched_after_first);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_reverse_run_digests_non_matching_items() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source());
    let notifier = Arc::new(RecordingNotifier::default());

    let outcome = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .with_reverse(true)
        .run()
        .await
        .expect("reverse run");

    assert_eq!(outcome.matched_count, 1);
    let sent = notifier.sent();
    assert_eq!(sent[0].iter().map(|r| r.id).collect::<Vec<_>>(), vec![id(2)]);

    assert!(unseen(&dir, Namespace::Reverse, &[1, 2, 3]).await.is_empty());
    assert_eq!(
        unseen(&dir, Namespace::Normal, &[1, 2, 3]).await,
        vec![id(1), id(2), id(3)]
    );
}

#[tokio::test]
async fn test_namespaces_do_not_suppress_each_other() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source());
    let normal = Arc::new(RecordingNotifier::default());
    let reverse = Arc::new(RecordingNotifier::default());

    pipeline(&dir, &source, normal.clone(), sql_filters())
        .run()
        .await
        .expect("normal run");
    let outcome = pipeline(&dir, &source, reverse.clone(), sql_filters())
        .with_reverse(true)
        .run()
        .await
        .expect("reverse run");

    assert_eq!(outcome.matched_count, 1);
    assert_eq!(reverse.sent()[0][0].id, id(2));
    // every item was fetched once per namespace
    assert_eq!(source.fetched().len(), 6);
}

#[tokio::test]
async fn test_blacklist_excludes_but_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source());
    let notifier = Arc::new(RecordingNotifier::default());

    let outcome = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .with_blacklist(vec!["a".to_string()])
        .run()
        .await
        .expect("run pipeline");

    assert_eq!(outcome.matched_count, 0);
    assert!(notifier.sent().is_empty());
    assert!(unseen(&dir, Namespace::Normal, &[1, 2, 3]).await.is_empty());
}

#[tokio::test]
async fn test_notification_failure_after_persist() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source());

    let result = pipeline(&dir, &source, Arc::new(FailingNotifier), sql_filters())
        .run()
        .await;

    match result {
        Err(PipelineError::Notification {
            channel,
            matched_count,
            ..
        }) => {
            assert_eq!(channel, "failing");
            assert_eq!(matched_count, 1);
        }
        other => panic!("expected notification error, got {other:?}"),
    }

    // a retry must not notify again
    let notifier = Arc::new(RecordingNotifier::default());
    let outcome = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await
        .expect("retry run");
    assert_eq!(outcome.matched_count, 0);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_failed_item_stays_unseen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source().failing_on(1));
    let notifier = Arc::new(RecordingNotifier::default());

    let outcome = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await
        .expect("run despite item failure");

    assert_eq!(outcome.matched_count, 0);
    assert_eq!(unseen(&dir, Namespace::Normal, &[1, 2, 3]).await, vec![id(1)]);
}

#[tokio::test]
async fn test_empty_filters_fail_fast() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(sample_source());
    let notifier = Arc::new(RecordingNotifier::default());

    let result = pipeline(&dir, &source, notifier, Vec::new()).run().await;

    assert!(matches!(result, Err(PipelineError::NoFilters)));
    assert_eq!(source.prefetches(), 0);
    assert!(!dir.path().join("digest.sqlite").exists());
}

#[tokio::test]
async fn test_prefetch_failure_persists_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = Arc::new(FakeSource {
        prefetch_fails: true,
        ..sample_source()
    });
    let notifier = Arc::new(RecordingNotifier::default());

    let result = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await;

    assert!(matches!(result, Err(PipelineError::Prefetch(_))));
    assert!(source.fetched().is_empty());
    assert!(notifier.sent().is_empty());
    assert_eq!(
        unseen(&dir, Namespace::Normal, &[1, 2, 3]).await,
        vec![id(1), id(2), id(3)]
    );
}

#[tokio::test]
async fn test_unreachable_store_stops_before_prefetch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = DatabaseConfig {
        database: dir
            .path()
            .join("missing")
            .join("digest.sqlite")
            .to_str()
            .expect("utf-8 path")
            .to_string(),
        ..DatabaseConfig::default()
    };
    let store = Arc::new(SqlStore::connect(&config, 30).expect("lazy pool"));
    let source = Arc::new(sample_source());
    let notifier = Arc::new(RecordingNotifier::default());

    let result = DigestPipeline::new(
        Arc::clone(&source) as Arc<dyn NewsSource>,
        store,
        Dispatcher::new().with(notifier.clone()),
        sql_filters(),
    )
    .run()
    .await;

    assert!(matches!(result, Err(PipelineError::StoreUnavailable(_))));
    assert_eq!(source.prefetches(), 0);
    assert!(source.fetched().is_empty());
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_persist_failure_skips_notification() {
    let dir = tempfile::tempdir().expect("temp dir");

    // table without the title and url columns: lookups work, inserts do not
    let store = open_store(&dir);
    sqlx::query("CREATE TABLE news_items (id INTEGER PRIMARY KEY, created_at INTEGER NOT NULL)")
        .execute(store.pool().pool())
        .await
        .expect("create incompatible table");
    store.close().await;

    let source = Arc::new(sample_source());
    let notifier = Arc::new(RecordingNotifier::default());

    let result = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await;

    assert!(matches!(result, Err(PipelineError::Persist(_))));
    assert_eq!(source.fetched(), vec![id(1), id(2), id(3)]);
    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_duplicate_candidates_fetched_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut source = sample_source();
    source.ranking.push(id(1));
    let source = Arc::new(source);
    let notifier = Arc::new(RecordingNotifier::default());

    let outcome = pipeline(&dir, &source, notifier.clone(), sql_filters())
        .run()
        .await
        .expect("run pipeline");

    assert_eq!(outcome.matched_count, 1);
    assert_eq!(source.fetched(), vec![id(1), id(2), id(3)]);
}

#[tokio::test]
async fn test_vacuum_removes_only_old_records() {
    let dir = tempfile::tempdir().expect("temp dir");
    let now = chrono::Utc::now().timestamp();

    let store = open_store(&dir);
    store.initialize(Namespace::Normal).await.expect("init");
    store
        .record_all(
            Namespace::Normal,
            &[
                NewsRecord::new(id(1), now - 40 * DAY, "Old", "http://a/1"),
                NewsRecord::new(id(2), now - DAY, "New", "http://a/2"),
            ],
        )
        .await
        .expect("seed records");
    store.close().await;

    let store = open_store(&dir);
    run_vacuum(store.as_ref(), Namespace::Normal)
        .await
        .expect("vacuum");

    let check = open_store(&dir);
    assert_eq!(check.count(Namespace::Normal).await.expect("count"), 1);
    let unseen = check
        .unseen_among(Namespace::Normal, &[id(1), id(2)])
        .await
        .expect("lookup");
    assert_eq!(unseen, vec![id(1)]);
    check.close().await;
}
