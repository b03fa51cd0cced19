//! TTL-bounded transcription result cache.

use super::Transcriber;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

struct CacheEntry {
    transcript: String,
    inserted_at: Instant,
}

/// Transcriber wrapper that memoizes results per file path.
///
/// A repeated call with the same path within the TTL returns the cached
/// transcript without touching the upstream API. There is no single-flight
/// guarantee: concurrent misses for the same path may both call upstream.
pub struct CachedTranscriber {
    inner: Arc<dyn Transcriber>,
    ttl: Duration,
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl CachedTranscriber {
    /// Wrap a transcriber with a cache of the given time-to-live.
    pub fn new(inner: Arc<dyn Transcriber>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Drop all cached entries.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of cached entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl Transcriber for CachedTranscriber {
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        {
            let mut entries = self.entries.lock().await;
            match entries.get(audio_path) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    debug!("Transcription cache hit");
                    return Ok(entry.transcript.clone());
                }
                Some(_) => {
                    debug!("Transcription cache entry expired");
                    entries.remove(audio_path);
                }
                None => {}
            }
        }

        // The lock is not held across the upstream call.
        let transcript = self.inner.transcribe(audio_path).await?;

        let mut entries = self.entries.lock().await;
        // Sweep expired entries on insert so the map stays bounded even when
        // no path is ever requested twice.
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        entries.insert(
            audio_path.to_path_buf(),
            CacheEntry {
                transcript: transcript.clone(),
                inserted_at: Instant::now(),
            },
        );

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingTranscriber {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transcriber for CountingTranscriber {
        async fn transcribe(&self, audio_path: &Path) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("transcript of {}", audio_path.display()))
        }
    }

    #[tokio::test]
    async fn test_repeated_path_hits_cache() {
        let inner = Arc::new(CountingTranscriber {
            calls: AtomicU32::new(0),
        });
        let cached = CachedTranscriber::new(inner.clone(), Duration::from_secs(3600));
        let path = Path::new("meeting.mp3");

        let first = cached.transcribe(path).await.unwrap();
        let second = cached.transcribe(path).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_paths_miss_independently() {
        let inner = Arc::new(CountingTranscriber {
            calls: AtomicU32::new(0),
        });
        let cached = CachedTranscriber::new(inner.clone(), Duration::from_secs(3600));

        cached.transcribe(Path::new("a.mp3")).await.unwrap();
        cached.transcribe(Path::new("b.mp3")).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_reinvokes_upstream() {
        let inner = Arc::new(CountingTranscriber {
            calls: AtomicU32::new(0),
        });
        let cached = CachedTranscriber::new(inner.clone(), Duration::from_secs(10));
        let path = Path::new("meeting.mp3");

        cached.transcribe(path).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;
        cached.transcribe(path).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_sweeps_expired_entries_for_other_paths() {
        let inner = Arc::new(CountingTranscriber {
            calls: AtomicU32::new(0),
        });
        let cached = CachedTranscriber::new(inner.clone(), Duration::from_secs(10));

        cached.transcribe(Path::new("a.mp3")).await.unwrap();
        cached.transcribe(Path::new("b.mp3")).await.unwrap();
        assert_eq!(cached.len().await, 2);

        tokio::time::advance(Duration::from_secs(11)).await;
        cached.transcribe(Path::new("c.mp3")).await.unwrap();

        // a.mp3 and b.mp3 expired and were swept on the insert of c.mp3.
        assert_eq!(cached.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_drops_entries() {
        let inner = Arc::new(CountingTranscriber {
            calls: AtomicU32::new(0),
        });
        let cached = CachedTranscriber::new(inner.clone(), Duration::from_secs(3600));
        let path = Path::new("meeting.mp3");

        cached.transcribe(path).await.unwrap();
        cached.clear().await;
        cached.transcribe(path).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
