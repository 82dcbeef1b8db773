use pipe_trait::Pipe;
use reqwest::Client;
use std::future::IntoFuture;
use tokio::sync::Semaphore;

/// Value of the `user-agent` header sent with every registry request.
pub const USER_AGENT: &str = concat!("modup/", env!("CARGO_PKG_VERSION"));

/// Wrapper around [`Client`] with concurrent request limit enforced by the [`Semaphore`] mechanism.
#[derive(Debug)]
pub struct ThrottledClient {
    semaphore: Semaphore,
    client: Client,
}

impl ThrottledClient {
    /// Acquire a permit and run `proc` with the underlying [`Client`].
    pub async fn run_with_permit<Proc, ProcFuture>(&self, proc: Proc) -> ProcFuture::Output
    where
        Proc: FnOnce(&Client) -> ProcFuture,
        ProcFuture: IntoFuture,
    {
        // The semaphore is owned by `self` and never closed.
        let permit =
            self.semaphore.acquire().await.expect("semaphore shouldn't have been closed this soon");
        let result = proc(&self.client).await;
        drop(permit);
        result
    }

    /// Construct a throttled client allowing at most `permits` requests in flight.
    pub fn new_with_permits(permits: usize) -> Self {
        let semaphore = permits.max(1).pipe(Semaphore::new);
        let client = Client::builder().user_agent(USER_AGENT).build().unwrap_or_default();
        ThrottledClient { semaphore, client }
    }

    /// Construct a new throttled client based on the number of CPUs.
    /// If the number of CPUs is greater than 16, the number of permits will be equal to the number of CPUs.
    /// Otherwise, the number of permits will be 16.
    pub fn new_from_cpu_count() -> Self {
        const MIN_PERMITS: usize = 16;
        num_cpus::get().max(MIN_PERMITS).pipe(ThrottledClient::new_with_permits)
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}
