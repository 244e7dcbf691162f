//! Engine facade: job dispatch, completion handling, periodic sync.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

use crate::config::Settings;
use crate::error::{IndexError, IndexResult};
use crate::indexing::job::IndexJob;
use crate::indexing::registry::JobRegistry;
use crate::parsing::UnitCache;
use crate::resource::ResourceProvider;
use crate::storage::{AccumulatorSet, Synchronizer};
use crate::types::{IndexMode, JobId};

/// State shared between the dispatcher, the workers and the completion
/// thread.
struct EngineState {
    registry: Mutex<JobRegistry>,
    accumulators: AccumulatorSet,
    synchronizer: Synchronizer,
    sync_interval: u32,
}

impl EngineState {
    /// Completion handler; serialized by the single completion thread.
    ///
    /// The flush decision is taken under the registry mutex, but the sync
    /// itself runs after release so `index` callers are not blocked behind
    /// store writes.
    fn on_job_done(&self, id: JobId, input: &[u8]) {
        let flush = {
            let mut registry = self.registry.lock().unwrap();
            registry.finish(id, input, self.sync_interval)
        };
        if flush {
            self.synchronizer.sync_all(&self.accumulators);
        }
    }
}

/// The indexing engine.
///
/// Owns the job registry, the four shared accumulators, the worker pool
/// and the completion thread. Jobs are dispatched with [`Indexer::index`]
/// or [`Indexer::reindex`]; every completed job produces exactly one id on
/// the [`Indexer::notifications`] channel, delivered after any store sync
/// that completion triggered.
///
/// Dropping the engine closes the job channel and joins all threads;
/// outstanding jobs run to completion first (there is no cancellation).
pub struct Indexer<C: UnitCache> {
    state: Arc<EngineState>,
    cache: Arc<C>,
    resources: Arc<dyn ResourceProvider>,
    job_tx: Option<Sender<IndexJob>>,
    notify_rx: Receiver<JobId>,
    workers: Vec<JoinHandle<()>>,
    completion: Option<JoinHandle<()>>,
}

impl<C: UnitCache> Indexer<C> {
    /// Build an engine rooted at `settings.index_path` with no resource
    /// store; `reindex` rejects every request.
    pub fn new(settings: &Settings, cache: Arc<C>) -> IndexResult<Self> {
        Self::with_resources(settings, cache, Arc::new(crate::resource::NoResources))
    }

    /// Build an engine rooted at `settings.index_path`.
    ///
    /// The root must be absolute; it is created if missing.
    pub fn with_resources(
        settings: &Settings,
        cache: Arc<C>,
        resources: Arc<dyn ResourceProvider>,
    ) -> IndexResult<Self> {
        let root = settings.index_path.clone();
        if !root.is_absolute() {
            return Err(IndexError::RootNotAbsolute { path: root });
        }
        std::fs::create_dir_all(&root).map_err(|source| IndexError::RootCreate {
            path: root.clone(),
            source,
        })?;

        let state = Arc::new(EngineState {
            registry: Mutex::new(JobRegistry::default()),
            accumulators: AccumulatorSet::default(),
            synchronizer: Synchronizer::new(root),
            sync_interval: settings.indexing.sync_interval,
        });

        let (job_tx, job_rx) = unbounded::<IndexJob>();
        let (done_tx, done_rx) = unbounded::<(JobId, Vec<u8>)>();
        let (notify_tx, notify_rx) = unbounded::<JobId>();

        // At least two workers so concurrent merges are exercised. Threads
        // are named so log output attributes events to the thread that ran
        // the job.
        let threads = settings.indexing.worker_threads.max(2);
        let mut workers = Vec::with_capacity(threads);
        for n in 0..threads {
            let job_rx = job_rx.clone();
            let done_tx = done_tx.clone();
            let cache = Arc::clone(&cache);
            let state = Arc::clone(&state);
            let name = format!("cxref-worker-{n}");
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || {
                    for job in job_rx {
                        job.run(cache.as_ref(), &state.accumulators);
                        if done_tx.send((job.id, job.input)).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|source| IndexError::ThreadSpawn { name, source })?;
            workers.push(handle);
        }
        drop(done_tx);

        // Completion events are consumed by a single thread, serializing
        // registry updates and store syncs
        let completion = {
            let state = Arc::clone(&state);
            thread::Builder::new()
                .name("cxref-completion".to_string())
                .spawn(move || {
                    for (id, input) in done_rx {
                        state.on_job_done(id, &input);
                        let _ = notify_tx.send(id);
                    }
                })
                .map_err(|source| IndexError::ThreadSpawn {
                    name: "cxref-completion".to_string(),
                    source,
                })?
        };

        Ok(Self {
            state,
            cache,
            resources,
            job_tx: Some(job_tx),
            notify_rx,
            workers,
            completion: Some(completion),
        })
    }

    /// Submit `input` for indexing.
    ///
    /// Returns `None` when a job for the same input is already in flight.
    pub fn index(
        &self,
        input: impl AsRef<[u8]>,
        args: &[Vec<u8>],
        mode: IndexMode,
    ) -> Option<JobId> {
        let input = input.as_ref();
        let id = self.state.registry.lock().unwrap().register(input)?;

        let job = IndexJob {
            id,
            input: input.to_vec(),
            args: args.to_vec(),
            mode,
        };
        if let Some(tx) = &self.job_tx {
            if tx.send(job).is_ok() {
                return Some(id);
            }
        }
        self.state.registry.lock().unwrap().unregister(id, input);
        None
    }

    /// Re-submit a previously indexed file using its stored compile
    /// arguments.
    ///
    /// Returns `None` when no resource record exists for `filename`.
    pub fn reindex(&self, filename: impl AsRef<[u8]>, mode: IndexMode) -> Option<JobId> {
        let filename = filename.as_ref();
        let Some(mut record) = self.resources.information(filename) else {
            debug!(
                "no resource record for {}",
                String::from_utf8_lossy(filename)
            );
            return None;
        };
        if record.is_empty() || record[0].is_empty() {
            debug!(
                "empty resource record for {}",
                String::from_utf8_lossy(filename)
            );
            return None;
        }

        let input = record.remove(0);
        self.index(input, &record, mode)
    }

    /// Channel delivering one notification per completed job.
    pub fn notifications(&self) -> Receiver<JobId> {
        self.notify_rx.clone()
    }

    /// Number of jobs currently registered.
    pub fn in_flight(&self) -> usize {
        self.state.registry.lock().unwrap().in_flight()
    }

    /// The unit cache this engine parses through.
    pub fn unit_cache(&self) -> &C {
        &self.cache
    }
}

impl<C: UnitCache> Drop for Indexer<C> {
    fn drop(&mut self) {
        // Closing the job channel stops the workers once the queue drains;
        // the completion thread follows when the last done sender drops
        self.job_tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        if let Some(completion) = self.completion.take() {
            let _ = completion.join();
        }
    }
}
