//! Prefetch cache for per-word audio clips.
//!
//! Clips are downloaded explicitly ahead of use so a tap can start playback
//! without touching the network. A failed or missing download leaves the
//! entry absent for the life of the cache; callers fall back to synthesized
//! speech.

mod fetch;

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock};
use std::thread;
use std::time::{Duration, Instant};

pub use fetch::{
    asset_path, AudioFetcher, DirAudioFetcher, FetchError, HttpAudioFetcher,
    DEFAULT_AUDIO_EXTENSION,
};

use crate::playback::AudioClip;
use crate::vocabulary::{Language, Word};

type Entries = HashMap<Language, HashMap<String, Arc<[u8]>>>;

/// Worker count used when settings do not pin one.
pub fn default_prefetch_workers() -> usize {
    (num_cpus::get() * 4).clamp(4, 32)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ============================================================================
// Batches
// ============================================================================

#[derive(Debug)]
struct BatchState {
    queued: usize,
    remaining: Mutex<usize>,
    done: Condvar,
}

impl BatchState {
    fn new(queued: usize) -> Arc<Self> {
        Arc::new(Self {
            queued,
            remaining: Mutex::new(queued),
            done: Condvar::new(),
        })
    }

    fn complete_one(&self) {
        let mut remaining = lock(&self.remaining);
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.done.notify_all();
        }
    }
}

/// Completion handle for one `preload_all` call. Dropping it does not cancel
/// anything. Pairs that were already cached or in flight are not counted.
#[derive(Debug, Clone)]
pub struct PreloadBatch {
    state: Arc<BatchState>,
}

impl PreloadBatch {
    /// Number of downloads this call started.
    pub fn queued(&self) -> usize {
        self.state.queued
    }

    pub fn is_done(&self) -> bool {
        *lock(&self.state.remaining) == 0
    }

    /// Blocks until every download of this batch has succeeded or failed.
    pub fn wait(&self) {
        let mut remaining = lock(&self.state.remaining);
        while *remaining > 0 {
            remaining = match self.state.done.wait(remaining) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }

    /// Like [`wait`](Self::wait) with an upper bound. Returns `true` if the
    /// batch finished in time.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = lock(&self.state.remaining);
        while *remaining > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            remaining = match self.state.done.wait_timeout(remaining, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }
}

// ============================================================================
// Cache
// ============================================================================

struct PrefetchJob {
    language: Language,
    word_id: String,
    batch: Arc<BatchState>,
}

struct CacheInner {
    fetcher: Arc<dyn AudioFetcher>,
    extension: String,
    entries: RwLock<Entries>,
    in_flight: Mutex<HashSet<(Language, String)>>,
}

impl CacheInner {
    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn load(&self, language: Language, word_id: &str) {
        let result = self.fetcher.fetch(language, word_id);

        // Entries before in-flight, matching `preload_all`, so a finished
        // download is never in neither set.
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match result {
            Ok(bytes) => {
                log::debug!("Cached audio {language}/{word_id} ({} bytes)", bytes.len());
                entries
                    .entry(language)
                    .or_default()
                    .insert(word_id.to_string(), Arc::from(bytes));
            }
            Err(err) if err.is_not_found() => {
                log::debug!("No audio for {language}/{word_id}: {err}");
            }
            Err(err) => {
                log::warn!("Audio prefetch failed for {language}/{word_id}: {err}");
            }
        }
        lock(&self.in_flight).remove(&(language, word_id.to_string()));
    }

    fn abandon(&self, language: Language, word_id: &str) {
        lock(&self.in_flight).remove(&(language, word_id.to_string()));
    }
}

struct PrefetchPool {
    jobs: Sender<PrefetchJob>,
}

/// Audio clips keyed by (language, word id).
///
/// Entries are created lazily by [`preload_all`](Self::preload_all) and never
/// evicted. Presence checks only see downloads that have finished
/// successfully.
pub struct AudioCache {
    inner: Arc<CacheInner>,
    pool: Mutex<Option<PrefetchPool>>,
    workers: usize,
}

impl AudioCache {
    pub fn new(fetcher: Arc<dyn AudioFetcher>) -> Self {
        Self::with_workers(fetcher, default_prefetch_workers())
    }

    pub fn with_workers(fetcher: Arc<dyn AudioFetcher>, workers: usize) -> Self {
        let extension = fetcher.extension().to_string();
        Self {
            inner: Arc::new(CacheInner {
                fetcher,
                extension,
                entries: RwLock::new(HashMap::new()),
                in_flight: Mutex::new(HashSet::new()),
            }),
            pool: Mutex::new(None),
            workers: workers.max(1),
        }
    }

    pub fn source(&self) -> String {
        self.inner.fetcher.describe()
    }

    /// Starts downloads for every (word, language) pair that is neither cached
    /// nor already in flight, and returns immediately.
    pub fn preload_all(&self, words: &[Word], languages: &[Language]) -> PreloadBatch {
        let mut queued = Vec::new();
        {
            let entries = self.inner.read_entries();
            let mut in_flight = lock(&self.inner.in_flight);
            for word in words {
                for &language in languages {
                    let cached = entries
                        .get(&language)
                        .is_some_and(|clips| clips.contains_key(word.id()));
                    if cached || !in_flight.insert((language, word.id().to_string())) {
                        continue;
                    }
                    queued.push((language, word.id().to_string()));
                }
            }
        }

        let batch = BatchState::new(queued.len());
        if queued.is_empty() {
            return PreloadBatch { state: batch };
        }

        log::info!(
            "Prefetching {} audio clips from {}",
            queued.len(),
            self.inner.fetcher.describe()
        );

        let sender = self.job_sender();
        for (language, word_id) in queued {
            let job = PrefetchJob {
                language,
                word_id,
                batch: Arc::clone(&batch),
            };
            let sent = match &sender {
                Some(sender) => sender.send(job).map_err(|err| err.0),
                None => Err(job),
            };
            if let Err(job) = sent {
                log::error!("Prefetch pool unavailable; dropping {}/{}", job.language, job.word_id);
                self.inner.abandon(job.language, &job.word_id);
                job.batch.complete_one();
            }
        }

        PreloadBatch { state: batch }
    }

    /// `true` once audio for the pair has finished downloading successfully.
    pub fn has(&self, word_id: &str, language: Language) -> bool {
        self.inner
            .read_entries()
            .get(&language)
            .is_some_and(|clips| clips.contains_key(word_id))
    }

    /// A fresh clip over the cached bytes, or `None` if not cached.
    pub fn get(&self, word_id: &str, language: Language) -> Option<AudioClip> {
        let entries = self.inner.read_entries();
        let data = entries.get(&language)?.get(word_id)?;
        Some(AudioClip::new(
            language,
            word_id,
            self.inner.extension.as_str(),
            Arc::clone(data),
        ))
    }

    /// Number of cached clips across languages.
    pub fn len(&self) -> usize {
        self.inner.read_entries().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of downloads currently outstanding.
    pub fn in_flight(&self) -> usize {
        lock(&self.inner.in_flight).len()
    }

    fn job_sender(&self) -> Option<Sender<PrefetchJob>> {
        let mut pool = lock(&self.pool);
        if pool.is_none() {
            *pool = self.spawn_pool();
        }
        pool.as_ref().map(|pool| pool.jobs.clone())
    }

    fn spawn_pool(&self) -> Option<PrefetchPool> {
        let (jobs, receiver) = mpsc::channel::<PrefetchJob>();
        let receiver = Arc::new(Mutex::new(receiver));

        let mut spawned = 0;
        for index in 0..self.workers {
            let inner = Arc::clone(&self.inner);
            let receiver = Arc::clone(&receiver);
            let result = thread::Builder::new()
                .name(format!("audio-prefetch-{index}"))
                .spawn(move || run_prefetch_worker(inner, receiver));
            match result {
                Ok(_) => spawned += 1,
                Err(e) => log::error!("Failed to spawn prefetch worker {index}: {e}"),
            }
        }

        if spawned == 0 {
            return None;
        }
        log::debug!("Started {spawned} audio prefetch workers");
        Some(PrefetchPool { jobs })
    }
}

fn run_prefetch_worker(inner: Arc<CacheInner>, receiver: Arc<Mutex<Receiver<PrefetchJob>>>) {
    loop {
        let job = {
            let receiver = lock(&receiver);
            match receiver.recv() {
                Ok(job) => job,
                // Cache dropped.
                Err(_) => break,
            }
        };
        inner.load(job.language, &job.word_id);
        job.batch.complete_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{BilingualLabel, CategoryId};

    struct StaticFetcher;

    impl AudioFetcher for StaticFetcher {
        fn fetch(&self, language: Language, word_id: &str) -> Result<Vec<u8>, FetchError> {
            match (language, word_id) {
                (Language::En, "hi") => Ok(vec![1, 2, 3]),
                _ => Err(FetchError::NotFound(word_id.to_string())),
            }
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    fn word(id: &str) -> Word {
        Word::new(id, BilingualLabel::new(id, id), CategoryId::Social).unwrap()
    }

    #[test]
    fn empty_preload_is_done_immediately() {
        let cache = AudioCache::with_workers(Arc::new(StaticFetcher), 2);
        let batch = cache.preload_all(&[], &Language::ALL);
        assert_eq!(batch.queued(), 0);
        assert!(batch.is_done());
        assert!(batch.wait_timeout(Duration::ZERO));
    }

    #[test]
    fn cached_pairs_are_not_requeued() {
        let cache = AudioCache::with_workers(Arc::new(StaticFetcher), 2);
        let words = [word("hi")];
        let first = cache.preload_all(&words, &[Language::En]);
        assert_eq!(first.queued(), 1);
        assert!(first.wait_timeout(Duration::from_secs(5)));
        assert!(cache.has("hi", Language::En));

        let second = cache.preload_all(&words, &[Language::En]);
        assert_eq!(second.queued(), 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.in_flight(), 0);
    }

    #[test]
    fn clip_carries_fetcher_extension() {
        let cache = AudioCache::with_workers(Arc::new(StaticFetcher), 1);
        cache.preload_all(&[word("hi")], &[Language::En]).wait();
        let clip = cache.get("hi", Language::En).unwrap();
        assert_eq!(clip.extension(), DEFAULT_AUDIO_EXTENSION);
        assert_eq!(clip.bytes(), &[1, 2, 3]);
        assert!(cache.get("hi", Language::Fr).is_none());
    }
}
