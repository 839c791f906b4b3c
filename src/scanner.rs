use crate::netdetect;
use crate::probe::{Prober, UdpProber};
use crate::types::{ScanConfig, ScanReport};
use anyhow::{bail, Context, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Coordinator lifecycle. `Failed` is terminal and only entered before any probe is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Initializing,
    GeneratingCandidates,
    Probing,
    Collecting,
    Done,
    Failed,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanPhase::Initializing => "initializing",
            ScanPhase::GeneratingCandidates => "generating_candidates",
            ScanPhase::Probing => "probing",
            ScanPhase::Collecting => "collecting",
            ScanPhase::Done => "done",
            ScanPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

fn enter(phase: ScanPhase) {
    info!(%phase, "scan phase");
}

/// Resolve `interface`, sweep the /24 around each of its IPv4 addresses and report who answered.
///
/// Interface errors abort before any packet is sent.
pub async fn scan_interface(interface: &str, config: &ScanConfig) -> Result<ScanReport> {
    enter(ScanPhase::Initializing);
    let seeds = match netdetect::resolve_interface_ipv4(interface) {
        Ok(seeds) => seeds,
        Err(e) => {
            enter(ScanPhase::Failed);
            return Err(e).context("cannot determine the local address to scan from");
        }
    };
    info!(interface, seeds = ?seeds, "resolved seed addresses");
    scan_seeds(&seeds, config).await
}

/// Scan the /24 of every seed with the real UDP prober.
pub async fn scan_seeds(seeds: &[Ipv4Addr], config: &ScanConfig) -> Result<ScanReport> {
    let prober = Arc::new(UdpProber::new(config.port, config.timeout));
    scan_seeds_with(seeds, config, prober).await
}

/// Scan the /24 of every seed using `prober` for the liveness check.
///
/// Candidates from all seeds share one queue; nothing is deduplicated across seeds.
pub async fn scan_seeds_with<P: Prober>(
    seeds: &[Ipv4Addr],
    config: &ScanConfig,
    prober: Arc<P>,
) -> Result<ScanReport> {
    if seeds.is_empty() {
        enter(ScanPhase::Failed);
        bail!("no IPv4 seed address to scan from");
    }

    enter(ScanPhase::GeneratingCandidates);
    let capacity = config.queue_capacity.max(1);
    let (queue_tx, queue_rx) = mpsc::channel::<Ipv4Addr>(capacity);

    // The producer runs alongside the pool: several seeds overflow the queue capacity.
    let producer_seeds = seeds.to_vec();
    let producer: JoinHandle<Result<usize>> = tokio::spawn(async move {
        let mut queued = 0;
        for seed in producer_seeds {
            queued += netdetect::enqueue_candidates(seed, &queue_tx).await?;
        }
        Ok(queued)
    });

    enter(ScanPhase::Probing);
    let pool = ProbePool::spawn(queue_rx, prober, config.workers, capacity);

    enter(ScanPhase::Collecting);
    let (found, probed) = pool.collect().await?;
    let queued = producer.await.context("candidate producer panicked")??;
    if probed != queued {
        warn!(queued, probed, "some candidates were not probed");
    }

    enter(ScanPhase::Done);
    info!(probed, found = found.len(), "scan complete");
    Ok(ScanReport::found(
        found.into_iter().map(|ip| ip.to_string()).collect(),
    ))
}

/// Fixed set of workers draining a shared candidate queue into a results channel.
///
/// The results channel closes only once every worker has exited.
#[derive(Debug)]
pub struct ProbePool {
    results: mpsc::Receiver<Ipv4Addr>,
    supervisor: JoinHandle<usize>,
}

impl ProbePool {
    pub fn spawn<P: Prober>(
        queue: mpsc::Receiver<Ipv4Addr>,
        prober: Arc<P>,
        workers: usize,
        results_capacity: usize,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::channel(results_capacity.max(1));
        let queue = Arc::new(Mutex::new(queue));

        let mut set = JoinSet::new();
        for worker_id in 0..workers.max(1) {
            set.spawn(probe_worker(
                worker_id,
                queue.clone(),
                prober.clone(),
                results_tx.clone(),
            ));
        }

        // Wait-group: hold one sender until all workers joined, then drop it to close the channel.
        let supervisor = tokio::spawn(async move {
            let mut probed = 0;
            while let Some(res) = set.join_next().await {
                match res {
                    Ok(n) => probed += n,
                    Err(e) => warn!(error = %e, "probe worker aborted"),
                }
            }
            drop(results_tx);
            probed
        });

        Self {
            results: results_rx,
            supervisor,
        }
    }

    /// Next responding address, or `None` once every worker has finished.
    pub async fn next(&mut self) -> Option<Ipv4Addr> {
        self.results.recv().await
    }

    /// Drain all results, then return them with the number of candidates probed.
    pub async fn collect(mut self) -> Result<(Vec<Ipv4Addr>, usize)> {
        let mut found = Vec::new();
        while let Some(addr) = self.next().await {
            found.push(addr);
        }
        let probed = self.supervisor.await.context("probe pool supervisor panicked")?;
        Ok((found, probed))
    }
}

async fn probe_worker<P: Prober>(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<Ipv4Addr>>>,
    prober: Arc<P>,
    results: mpsc::Sender<Ipv4Addr>,
) -> usize {
    let mut probed = 0;
    loop {
        let next = {
            let mut rx = queue.lock().await;
            rx.recv().await
        };
        let Some(addr) = next else {
            break;
        };

        probed += 1;
        if prober.probe(addr).await {
            info!(%addr, worker_id, "device responded");
            if results.send(addr).await.is_err() {
                warn!(worker_id, "results channel closed, stopping worker");
                break;
            }
        }
    }
    debug!(worker_id, probed, "probe worker finished");
    probed
}
