use std::thread;
use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use crate::domain::{Candidate, FullItem};
use crate::errors::{ReporterError, ReporterResult};
use crate::sources::Enricher;
use crate::storage::HistoryLookup;

/// The candidate picked for publication together with its enriched content.
#[derive(Debug, Clone)]
pub struct Selection {
    pub candidate: Candidate,
    pub item: FullItem,
}

pub struct SelectionService {
    enricher: Box<dyn Enricher>,
    max_tries: usize,
    backoff: Duration,
}

impl SelectionService {
    pub fn new(enricher: Box<dyn Enricher>, max_tries: usize, backoff: Duration) -> Self {
        Self {
            enricher,
            max_tries,
            backoff,
        }
    }

    pub fn max_tries(&self) -> usize {
        self.max_tries
    }

    /// Pick a random candidate whose key is not in `history` and that enriches
    /// successfully.
    ///
    /// Makes at most `min(max_tries, candidates.len())` draws. Draws are
    /// independent, so the same candidate may come up twice; every draw costs
    /// one try whether it hits a known key or fails to enrich.
    pub fn select<H, R>(
        &self,
        candidates: &[Candidate],
        history: &H,
        rng: &mut R,
    ) -> ReporterResult<Selection>
    where
        H: HistoryLookup + ?Sized,
        R: Rng + ?Sized,
    {
        let budget = self.max_tries.min(candidates.len());

        for attempt in 1..=budget {
            let candidate = &candidates[rng.gen_range(0..candidates.len())];
            debug!("Trying to pick random article {}/{}", attempt, budget);

            if history.has(&candidate.key) {
                info!("Article already seen, trying again: {}", candidate.key);
                continue;
            }

            match self.enricher.enrich(candidate) {
                Ok(item) => {
                    return Ok(Selection {
                        candidate: candidate.clone(),
                        item,
                    });
                }
                Err(e) => {
                    info!("Failed to get article {}: {}", candidate.key, e);
                    if attempt < budget && !self.backoff.is_zero() {
                        thread::sleep(self.backoff);
                    }
                }
            }
        }

        Err(ReporterError::SelectionExhausted { tries: budget })
    }
}
