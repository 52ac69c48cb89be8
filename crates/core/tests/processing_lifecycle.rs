//! Processing lifecycle integration tests.
//!
//! These tests drive a real work directory through the queue driver and the
//! category processor: add -> next -> process -> remove.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use shelver_core::{
    load_config, testing::fixtures, validate_config, Category, CategoryProcessor, Config,
    DriverConfig, DriverError, DriverOutcome, Entry, JobQueue, ProcessError, QueueDriver,
    QueueError, StopReason, WorkQueue,
};

/// A work directory, a download area and an empty library on disk.
struct TestHarness {
    temp_dir: TempDir,
    config: Config,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        let config_path = root.join("config.toml");
        std::fs::write(
            &config_path,
            format!(
                "work_path = {:?}\nmovie_output_path = {:?}\ntv_output_path = {:?}\ndormant_period_secs = 1\n",
                root.join("work"),
                root.join("movies"),
                root.join("tv"),
            ),
        )
        .expect("Failed to write config");

        for dir in ["work", "downloads", "movies", "tv"] {
            std::fs::create_dir(root.join(dir)).expect("Failed to create dir");
        }

        let config = load_config(&config_path).expect("Failed to load config");
        validate_config(&config).expect("Config should be valid");

        Self { temp_dir, config }
    }

    fn queue(&self) -> WorkQueue {
        WorkQueue::new(&self.config.work_path).expect("Failed to open queue")
    }

    fn download(&self, relative: &str) -> PathBuf {
        let path = self.temp_dir.path().join("downloads").join(relative);
        std::fs::create_dir_all(path.parent().expect("has parent")).expect("Failed to create dir");
        std::fs::write(&path, relative).expect("Failed to write download");
        path
    }

    fn downloads(&self) -> PathBuf {
        self.temp_dir.path().join("downloads")
    }

    async fn enqueue(&self, entry: &Entry, age_secs: u64) {
        let path = assert_ok!(self.queue().add(entry).await);
        let file = std::fs::File::options()
            .write(true)
            .open(path)
            .expect("Failed to open job file");
        file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
            .expect("Failed to set mtime");
    }

    async fn run(&self, limit: i64, dry_run: bool) -> Result<DriverOutcome, DriverError> {
        let processor = CategoryProcessor::new(self.config.library(), dry_run);
        let config: DriverConfig = self
            .config
            .driver_config()
            .with_dormant_period(Duration::from_millis(10))
            .with_limit(limit)
            .with_dry_run(dry_run);
        QueueDriver::new(self.queue(), processor, config)
            .run(CancellationToken::new())
            .await
    }

    fn job_exists(&self, hash: &str) -> bool {
        self.config.work_path.join(format!("{}.json", hash)).exists()
    }
}

fn list(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_movie_lifecycle() {
    let harness = TestHarness::new();
    harness.download("Foo/foo.mkv");
    harness.download("Foo/foo.srt");
    harness.download("Foo/Subs/foo.forced.srt");
    harness.download("Foo/foo.vtt");

    let mut entry = fixtures::entry("movie1", "Foo 2020", Category::MovieSingle);
    entry.content_path = harness.downloads().join("Foo");
    entry.number_of_files = 4;
    harness.enqueue(&entry, 10).await;

    let outcome = harness.run(1, false).await.expect("run should succeed");
    assert_eq!(outcome.stop, StopReason::LimitReached);
    assert_eq!(outcome.processed, 1);

    assert_eq!(
        list(&harness.config.movie_output_path),
        vec!["Foo 2020.en.srt", "Foo 2020.en.vtt", "Foo 2020.mkv"]
    );
    let copied = std::fs::read_to_string(harness.config.movie_output_path.join("Foo 2020.en.srt"))
        .expect("subtitle copied");
    assert_eq!(copied, "Foo/Subs/foo.forced.srt");
    assert!(!harness.job_exists("movie1"));
}

#[tokio::test]
async fn test_tv_single_lifecycle() {
    let harness = TestHarness::new();
    let content = harness.download("Show.S01E02.Title.mkv");

    let mut entry = fixtures::entry("ep1", "Show.S01E02.Title", Category::TvSingle);
    entry.content_path = content;
    harness.enqueue(&entry, 10).await;

    harness.run(1, false).await.expect("run should succeed");

    let show_dir = harness.config.tv_output_path.join("Show");
    assert_eq!(list(&show_dir), vec!["Show S01E02.mkv"]);
    assert!(!harness.job_exists("ep1"));
}

#[tokio::test]
async fn test_tv_single_reuses_existing_show_dir() {
    let harness = TestHarness::new();
    std::fs::create_dir(harness.config.tv_output_path.join("the office")).unwrap();
    let content = harness.download("The.Office.s03e04.720p.mkv");

    let mut entry = fixtures::entry("ep2", "The.Office.s03e04.720p", Category::TvSingle);
    entry.content_path = content;
    harness.enqueue(&entry, 10).await;

    harness.run(1, false).await.expect("run should succeed");

    assert_eq!(list(&harness.config.tv_output_path), vec!["the office"]);
    assert_eq!(
        list(&harness.config.tv_output_path.join("the office")),
        vec!["The Office S03E04.mkv"]
    );
}

#[tokio::test]
async fn test_tv_season_lifecycle() {
    let harness = TestHarness::new();
    harness.download("Show.S01/Show.S01E01.mkv");
    harness.download("Show.S01/Show.S01E02.mkv");
    harness.download("Show.S01/notes.txt");

    let mut entry = fixtures::season_entry("season1", "Show.S01", 3);
    entry.content_path = harness.downloads().join("Show.S01");
    harness.enqueue(&entry, 10).await;

    harness.run(1, false).await.expect("run should succeed");

    assert_eq!(
        list(&harness.config.tv_output_path.join("Show")),
        vec!["Show S01E01.mkv", "Show S01E02.mkv"]
    );
    assert!(!harness.job_exists("season1"));
}

#[tokio::test]
async fn test_dry_run_leaves_everything_in_place() {
    let harness = TestHarness::new();
    harness.download("Foo/foo.mkv");
    let content = harness.download("Show.S02E01.mkv");

    let mut movie = fixtures::entry("movie1", "Foo 2020", Category::MovieSingle);
    movie.content_path = harness.downloads().join("Foo");
    harness.enqueue(&movie, 20).await;

    let mut episode = fixtures::entry("ep1", "Show.S02E01", Category::TvSingle);
    episode.content_path = content;
    harness.enqueue(&episode, 10).await;

    let outcome = harness.run(2, true).await.expect("dry run should succeed");
    assert_eq!(outcome.processed, 2);

    assert!(list(&harness.config.movie_output_path).is_empty());
    assert!(list(&harness.config.tv_output_path).is_empty());
    assert!(harness.job_exists("movie1"));
    assert!(harness.job_exists("ep1"));
}

#[tokio::test]
async fn test_jobs_processed_oldest_first() {
    let harness = TestHarness::new();
    for (hash, age) in [("newest", 10), ("oldest", 300), ("middle", 100)] {
        harness
            .enqueue(&fixtures::entry(hash, hash, Category::Ignore), age)
            .await;
    }

    let mut queue = harness.queue();
    let mut order = Vec::new();
    while let Some(entry) = assert_ok!(queue.next().await) {
        queue.ignore(&entry).await;
        order.push(entry.hash);
    }
    assert_eq!(order, vec!["oldest", "middle", "newest"]);
}

#[tokio::test]
async fn test_failed_job_stays_queued_and_halts() {
    let harness = TestHarness::new();
    harness.download("Good/good.mkv");

    let mut good = fixtures::entry("good", "Good 2001", Category::MovieSingle);
    good.content_path = harness.downloads().join("Good");
    harness.enqueue(&good, 300).await;

    let mut bad = fixtures::entry("bad", "Bad 2002", Category::MovieSingle);
    bad.content_path = harness.downloads().join("Missing");
    harness.enqueue(&bad, 100).await;

    let err = harness.run(-1, false).await.unwrap_err();
    match err {
        DriverError::Processing { hash, source } => {
            assert_eq!(hash, "bad");
            assert!(matches!(source, ProcessError::ContentMissing { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(!harness.job_exists("good"));
    assert!(harness.job_exists("bad"));
    assert_eq!(list(&harness.config.movie_output_path), vec!["Good 2001.mkv"]);
}

#[tokio::test]
async fn test_collision_fails_without_copying_subtitles() {
    let harness = TestHarness::new();
    harness.download("Foo/foo.mkv");
    harness.download("Foo/foo.srt");
    std::fs::write(harness.config.movie_output_path.join("Foo 2020.mkv"), "old").unwrap();

    let mut entry = fixtures::entry("movie1", "Foo 2020", Category::MovieSingle);
    entry.content_path = harness.downloads().join("Foo");
    harness.enqueue(&entry, 10).await;

    let err = harness.run(1, false).await.unwrap_err();
    assert!(matches!(
        err,
        DriverError::Processing { source: ProcessError::DestinationExists { .. }, .. }
    ));
    assert_eq!(list(&harness.config.movie_output_path), vec!["Foo 2020.mkv"]);
    assert!(harness.job_exists("movie1"));
}

#[tokio::test]
async fn test_poisoned_job_halts_run() {
    let harness = TestHarness::new();
    let entry = fixtures::entry("inside", "Foo", Category::Ignore);
    std::fs::write(
        harness.config.work_path.join("outside.json"),
        serde_json::to_vec_pretty(&entry).unwrap(),
    )
    .unwrap();

    let err = harness.run(-1, false).await.unwrap_err();
    assert!(matches!(err, DriverError::Queue(QueueError::Poisoned { .. })));
    assert!(harness.config.work_path.join("outside.json").exists());
}

#[tokio::test]
async fn test_legacy_integer_category_is_processed() {
    let harness = TestHarness::new();
    let content = harness.download("Legacy/legacy.mkv");
    let json = format!(
        r#"{{
  "OutputPath": "/library",
  "Name": "Legacy 1999",
  "Category": 0,
  "ContentPath": {:?},
  "NumberOfFiles": 1,
  "Size": 10,
  "Tracker": "t",
  "Hash": "legacy",
  "SavePath": "/downloads"
}}"#,
        content.parent().unwrap()
    );
    std::fs::write(harness.config.work_path.join("legacy.json"), json).unwrap();

    harness.run(1, false).await.expect("run should succeed");
    assert_eq!(list(&harness.config.movie_output_path), vec!["Legacy 1999.mkv"]);
    assert!(!harness.job_exists("legacy"));
}
