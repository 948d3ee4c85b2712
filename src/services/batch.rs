//! Lock-guarded stream buffer with threshold flushes
//!
//! Producers push mapped streams; whenever the buffer reaches its capacity
//! it is written to the sink and cleared while the lock is held. The size is
//! re-checked after re-acquiring the lock so two producers crossing the same
//! threshold flush only once.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::debug;

use crate::db::repository::streams;
use crate::models::playlist::Stream;
use crate::services::metrics;

/// Destination of flushed batches
#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn insert_or_replace_all(&self, streams: &[Stream]) -> Result<u64, sqlx::Error>;
}

#[async_trait]
impl StreamSink for SqlitePool {
    async fn insert_or_replace_all(&self, batch: &[Stream]) -> Result<u64, sqlx::Error> {
        let mut conn = self.acquire().await?;
        streams::insert_or_replace_all(&mut conn, batch).await
    }
}

#[async_trait]
impl<T: StreamSink + ?Sized> StreamSink for std::sync::Arc<T> {
    async fn insert_or_replace_all(&self, batch: &[Stream]) -> Result<u64, sqlx::Error> {
        (**self).insert_or_replace_all(batch).await
    }
}

/// Totals reported when the buffer is finished
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub flushes: usize,
    pub written: u64,
}

struct Inner {
    items: Vec<Stream>,
    stats: BatchStats,
}

pub struct BatchBuffer<S> {
    sink: S,
    capacity: usize,
    inner: Mutex<Inner>,
}

impl<S: StreamSink> BatchBuffer<S> {
    pub fn new(sink: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            sink,
            capacity,
            inner: Mutex::new(Inner {
                items: Vec::with_capacity(capacity),
                stats: BatchStats::default(),
            }),
        }
    }

    pub async fn push(&self, stream: Stream) -> Result<(), sqlx::Error> {
        let reached = {
            let mut inner = self.inner.lock().await;
            inner.items.push(stream);
            inner.items.len() >= self.capacity
        };

        if reached {
            let mut inner = self.inner.lock().await;
            if inner.items.len() >= self.capacity {
                self.flush_locked(&mut inner).await?;
            }
        }

        Ok(())
    }

    /// Flush whatever is left and return the totals
    pub async fn finish(&self) -> Result<BatchStats, sqlx::Error> {
        let mut inner = self.inner.lock().await;
        if !inner.items.is_empty() {
            self.flush_locked(&mut inner).await?;
        }
        Ok(inner.stats)
    }

    async fn flush_locked(&self, inner: &mut Inner) -> Result<(), sqlx::Error> {
        let batch = std::mem::take(&mut inner.items);
        let written = self.sink.insert_or_replace_all(&batch).await?;

        inner.stats.flushes += 1;
        inner.stats.written += written;
        metrics::STREAMS_TOTAL
            .with_label_values(&["flushed"])
            .inc_by(batch.len() as u64);

        debug!(items = batch.len(), flushes = inner.stats.flushes, "Flushed stream batch");

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;
    use crate::db::pool::test_pool;
    use std::sync::Arc;

    fn stream(i: usize) -> Stream {
        Stream::new(format!("S{}", i), format!("http://example.com/{}.ts", i), "", "playlist")
    }

    #[tokio::test]
    async fn test_flushes_at_threshold_and_remainder() {
        let sink = Arc::new(RecordingSink::default());
        let buffer = BatchBuffer::new(sink.clone(), 100);

        for i in 0..250 {
            buffer.push(stream(i)).await.unwrap();
        }
        assert_eq!(sink.sizes(), vec![100, 100]);

        let stats = buffer.finish().await.unwrap();

        assert_eq!(sink.sizes(), vec![100, 100, 50]);
        assert_eq!(stats, BatchStats { flushes: 3, written: 250 });
    }

    #[tokio::test]
    async fn test_finish_on_empty_buffer_does_not_flush() {
        let sink = Arc::new(RecordingSink::default());
        let buffer = BatchBuffer::new(sink.clone(), 10);

        for i in 0..10 {
            buffer.push(stream(i)).await.unwrap();
        }
        let stats = buffer.finish().await.unwrap();

        assert_eq!(sink.sizes(), vec![10]);
        assert_eq!(stats.flushes, 1);
    }

    #[tokio::test]
    async fn test_concurrent_producers_write_everything_once() {
        let sink = Arc::new(RecordingSink::default());
        let buffer = Arc::new(BatchBuffer::new(sink.clone(), 10));

        let producers: Vec<_> = (0..4)
            .map(|p| {
                let buffer = buffer.clone();
                tokio::spawn(async move {
                    for i in 0..25 {
                        buffer.push(stream(p * 100 + i)).await.unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        let stats = buffer.finish().await.unwrap();

        let sizes = sink.sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 100);
        assert!(sizes.iter().all(|n| *n > 0));
        assert_eq!(stats.written, 100);
    }

    #[tokio::test]
    async fn test_sqlite_sink() {
        let pool = test_pool().await;
        let buffer = BatchBuffer::new(pool.clone(), 4);

        for i in 0..9 {
            buffer.push(stream(i)).await.unwrap();
        }
        let stats = buffer.finish().await.unwrap();

        assert_eq!(stats.flushes, 3);
        assert_eq!(streams::count_by_playlist(&pool, "playlist").await.unwrap(), 9);
    }
}
