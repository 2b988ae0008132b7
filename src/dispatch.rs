use crate::{Algorithm, Error, Params, SecretBuf};
use std::{num::NonZeroUsize, sync::Arc, time::Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Runs derivations on tokio's blocking pool.
///
/// Each submitted job resolves exactly once, with either the derived bytes
/// or an error. At most `max_jobs` jobs run at the same time; the rest wait
/// for a permit without occupying a blocking thread. Inputs are taken by
/// value, so callers cannot touch them while a job runs, and password bytes
/// are erased as soon as the job finishes.
///
/// Dropping the returned future abandons the result but does not interrupt
/// a job that has already started.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    permits: Arc<Semaphore>,
    max_jobs: NonZeroUsize,
    parallel_lanes: bool,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(max_jobs: NonZeroUsize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_jobs.get())),
            max_jobs,
            parallel_lanes: false,
        }
    }

    /// Mix scrypt lanes on the rayon pool instead of one after another.
    #[must_use]
    pub fn with_parallel_lanes(mut self, parallel_lanes: bool) -> Self {
        self.parallel_lanes = parallel_lanes;
        self
    }

    #[must_use]
    pub const fn max_jobs(&self) -> NonZeroUsize {
        self.max_jobs
    }

    /// Stop accepting jobs. Queued and future submissions fail with
    /// [`Error::Closed`]; jobs that already hold a permit run to completion.
    /// Affects every clone of this dispatcher.
    pub fn close(&self) {
        if !self.permits.is_closed() {
            debug!("closing dispatcher");
        }
        self.permits.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Asynchronous [`crate::scrypt`].
    ///
    /// Parameters are validated on the calling task, so a bad request never
    /// waits for a permit.
    pub async fn scrypt(
        &self,
        password: Vec<u8>,
        salt: Vec<u8>,
        n: u64,
        r: u64,
        p: u64,
        keylen: usize,
    ) -> Result<Vec<u8>, Error> {
        let params = Params::new(n, r, p)?;
        pbkdf2::check_output_len(Algorithm::Sha256, keylen)?;
        let password = SecretBuf::from(password);
        let parallel_lanes = self.parallel_lanes;
        debug!(n, r, p, keylen, parallel_lanes, "queueing scrypt");
        self.run("scrypt", move || {
            let mut key = crate::alloc_zeroed(keylen)?;
            if parallel_lanes {
                scrypt::scrypt_parallel(&password, &salt, &params, &mut key)?;
            } else {
                scrypt::scrypt(&password, &salt, &params, &mut key)?;
            }
            Ok(key)
        })
        .await
    }

    /// Asynchronous [`crate::pbkdf2`].
    pub async fn pbkdf2(
        &self,
        algorithm: Algorithm,
        password: Vec<u8>,
        salt: Vec<u8>,
        rounds: u32,
        keylen: usize,
    ) -> Result<Vec<u8>, Error> {
        if rounds == 0 {
            return Err(pbkdf2::Error::ZeroRounds.into());
        }
        pbkdf2::check_output_len(algorithm, keylen)?;
        let password = SecretBuf::from(password);
        debug!(%algorithm, rounds, keylen, "queueing pbkdf2");
        self.run("pbkdf2", move || {
            crate::pbkdf2(algorithm, &password, &salt, rounds, keylen)
        })
        .await
    }

    /// Asynchronous [`crate::verify_scrypt`].
    pub async fn verify_scrypt(
        &self,
        password: Vec<u8>,
        salt: Vec<u8>,
        params: Params,
        expected: Vec<u8>,
    ) -> Result<bool, Error> {
        if expected.is_empty() {
            return Err(Error::EmptyExpectedKey);
        }
        let password = SecretBuf::from(password);
        debug!(n = params.n(), r = params.r(), p = params.p(), "queueing scrypt verification");
        self.run("verify", move || {
            crate::verify_scrypt(&password, &salt, &params, &expected)
        })
        .await
    }

    async fn run<T, F>(&self, job: &'static str, f: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, Error> + Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::Closed)?;
        let start = Instant::now();
        let result = tokio::task::spawn_blocking(move || {
            // released only once the job itself is done, even if the caller
            // stopped waiting
            let _permit = permit;
            f()
        })
        .await?;
        let elapsed = start.elapsed();
        match &result {
            Ok(_) => debug!(job, ?elapsed, "job finished"),
            Err(e) => warn!(job, ?elapsed, error = %e, "job failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_is_bounded() {
        let dispatcher = Dispatcher::new(NonZeroUsize::new(2).unwrap());
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for i in 0..8_usize {
            let dispatcher = dispatcher.clone();
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                dispatcher
                    .run("counting", move || {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(20));
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(i)
                    })
                    .await
            }));
        }
        let mut done = Vec::new();
        for handle in handles {
            done.push(handle.await.unwrap().unwrap());
        }
        done.sort_unstable();
        assert_eq!(done, (0..8).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn job_errors_resolve_once() {
        let dispatcher = Dispatcher::default();
        let result = dispatcher
            .run::<(), _>("failing", || Err(Error::OutOfMemory { bytes: 1 }))
            .await;
        assert!(matches!(result, Err(Error::OutOfMemory { bytes: 1 })));
    }

    #[tokio::test]
    async fn panicking_job_is_a_worker_error() {
        let dispatcher = Dispatcher::new(NonZeroUsize::MIN);
        let result = dispatcher
            .run::<(), _>("panicking", || panic!("boom"))
            .await;
        assert!(matches!(result, Err(Error::Worker(_))));
        // the permit came back
        assert!(dispatcher.run("after", || Ok(1)).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_requests_fail_before_dispatch() {
        let dispatcher = Dispatcher::new(NonZeroUsize::MIN);
        let permit = Arc::clone(&dispatcher.permits).acquire_owned().await.unwrap();
        // the only permit is held, so these would hang if they waited for it
        assert!(matches!(
            dispatcher.scrypt(vec![], vec![], 3, 1, 1, 32).await,
            Err(Error::Scrypt(scrypt::Error::Params(
                scrypt::ParamsError::InvalidCost { n: 3 }
            )))
        ));
        assert!(matches!(
            dispatcher
                .pbkdf2(Algorithm::Sha256, vec![], vec![], 0, 32)
                .await,
            Err(Error::Pbkdf2(pbkdf2::Error::ZeroRounds))
        ));
        assert!(matches!(
            dispatcher
                .verify_scrypt(vec![], vec![], Params::new(16, 1, 1).unwrap(), vec![])
                .await,
            Err(Error::EmptyExpectedKey)
        ));
        drop(permit);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn close_rejects_waiting_and_new_jobs() {
        let dispatcher = Dispatcher::new(NonZeroUsize::MIN);
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let running = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .run("holding", move || {
                        started_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                        Ok(7)
                    })
                    .await
            })
        };
        tokio::task::spawn_blocking(move || started_rx.recv().unwrap())
            .await
            .unwrap();
        let waiting = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move { dispatcher.run("waiting", || Ok(0)).await })
        };
        tokio::task::yield_now().await;
        dispatcher.close();
        assert!(dispatcher.is_closed());
        assert!(matches!(waiting.await.unwrap(), Err(Error::Closed)));
        assert!(matches!(
            dispatcher
                .scrypt(b"pw".to_vec(), b"salt".to_vec(), 16, 1, 1, 16)
                .await,
            Err(Error::Closed)
        ));
        release_tx.send(()).unwrap();
        assert_eq!(running.await.unwrap().unwrap(), 7);
    }

    #[tokio::test]
    async fn lane_modes_agree() {
        let sequential = Dispatcher::new(NonZeroUsize::MIN);
        let parallel = sequential.clone().with_parallel_lanes(true);
        let a = sequential
            .scrypt(b"password".to_vec(), b"salt".to_vec(), 16, 2, 3, 32)
            .await
            .unwrap();
        let b = parallel
            .scrypt(b"password".to_vec(), b"salt".to_vec(), 16, 2, 3, 32)
            .await
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(
            hex::encode(a),
            "b11d1ed8b6cef4ed6778f4181c9a52c0bf8687f113adf1ba01be353219fad33e"
        );
    }
}
