//! Fan the same search out to a fixed number of concurrent workers.
//!
//! Every worker shares one backend handle. The workers are joined with a
//! barrier; the first failure ends the run and the remaining workers
//! are aborted instead of awaited.
use log::{error, info};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::errors::Error;
use crate::format_duration;
use crate::server::SearchBackend;

/// What a successful run looked like.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub workers: usize,
    pub elapsed: chrono::Duration,
}

impl Summary {
    pub fn show(&self) {
        info!(
            "All {} searches completed in {}",
            self.workers,
            format_duration(&self.elapsed)
        );
    }
}

/// Launch `workers` concurrent searches and wait for all of them.
pub async fn run<B>(backend: Arc<B>, query: &str, workers: usize) -> Result<Summary, Error>
where
    B: SearchBackend + 'static,
{
    let started = chrono::Utc::now();
    let query: Arc<str> = Arc::from(query);
    let mut set = JoinSet::new();

    for worker_id in 0..workers {
        let backend = backend.clone();
        let query = query.clone();

        set.spawn(async move { (worker_id, backend.search(&query).await) });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((worker_id, Ok(item))) => {
                info!("[{}] Result: {}", worker_id, item);
            }

            Ok((worker_id, Err(err))) => {
                error!("[{}] Error: {}", worker_id, err);
                set.abort_all();
                return Err(err);
            }

            Err(err) => {
                error!("Worker did not finish: {}", err);
                set.abort_all();
                return Err(Error::WorkerPanicked(err.to_string()));
            }
        }
    }

    Ok(Summary {
        workers,
        elapsed: chrono::Utc::now() - started,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const RESULT: &str = r#"{"type":"FeatureCollection","features":[]}"#;

    enum Behavior {
        Succeed,
        // The first call fails, every other call never returns.
        FailFirstStallRest,
        Panic,
    }

    struct FakeBackend {
        behavior: Behavior,
        calls: AtomicUsize,
        queries: std::sync::Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn new(behavior: Behavior) -> Arc<FakeBackend> {
            Arc::new(FakeBackend {
                behavior,
                calls: AtomicUsize::new(0),
                queries: std::sync::Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn search(&self, query: &str) -> Result<String, Error> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());

            match self.behavior {
                Behavior::Succeed => {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok(RESULT.to_string())
                }

                Behavior::FailFirstStallRest => {
                    if call == 0 {
                        Err(Error::QueryError("canceling statement".into()))
                    } else {
                        std::future::pending::<()>().await;
                        unreachable!()
                    }
                }

                Behavior::Panic => panic!("worker blew up"),
            }
        }
    }

    #[tokio::test]
    async fn test_all_workers_complete() {
        let backend = FakeBackend::new(Behavior::Succeed);
        let query = r#"SELECT search('{"limit": 1}'::jsonb);"#;

        let summary = run(backend.clone(), query, 12).await.unwrap();

        assert_eq!(summary.workers, 12);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 12);
        assert!(backend
            .queries
            .lock()
            .unwrap()
            .iter()
            .all(|q| q == query));
    }

    #[tokio::test]
    async fn test_first_error_does_not_wait() {
        let backend = FakeBackend::new(Behavior::FailFirstStallRest);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run(backend.clone(), "SELECT 1", 12),
        )
        .await
        .expect("run waited for stalled workers");

        assert_eq!(
            result,
            Err(Error::QueryError("canceling statement".into()))
        );
    }

    #[tokio::test]
    async fn test_worker_panic() {
        let backend = FakeBackend::new(Behavior::Panic);

        match run(backend, "SELECT 1", 3).await {
            Err(Error::WorkerPanicked(_)) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
