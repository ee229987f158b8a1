//! Progressive query broadening.
//!
//! A generator describes its search as a list of rungs, narrowest first.
//! Rungs run strictly in order and the ladder stops climbing as soon as
//! enough eligible papers have been collected, so a well-covered domain
//! costs a single upstream query.

use std::collections::HashSet;
use std::time::Instant;

use paperwise_core::{logging, CandidateQuery, CandidateSource, SourcePaper};
use tokio::time::{timeout_at, Instant as TokioInstant};
use tracing::{debug, trace, warn};

use crate::exclusion::ExclusionSet;

/// One query width of a ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct Rung {
    /// Short label used in logs, e.g. "recent"
    pub label: &'static str,
    pub query: CandidateQuery,
}

impl Rung {
    pub fn new(label: &'static str, query: CandidateQuery) -> Self {
        Self { label, query }
    }

    /// Whether the query itself requires terms from more than one group.
    pub fn requires_all_groups(&self) -> bool {
        self.query.groups.iter().filter(|g| !g.is_empty()).count() > 1
    }
}

/// Result of running a ladder.
#[derive(Debug)]
pub struct LadderOutcome<T> {
    /// Eligible papers with their evaluation, in discovery order
    pub hits: Vec<(SourcePaper, T)>,
    /// Eligible papers passed over only because they were already excluded
    pub surplus: Vec<(SourcePaper, T)>,
    /// Rungs whose query was issued
    pub rungs_tried: usize,
    /// True when the deadline cut the climb short
    pub deadline_reached: bool,
}

/// Climb the ladder until `target` eligible papers are found.
///
/// `evaluate` returns `Some` for papers the caller can use. Papers returned
/// by an earlier rung are skipped. Eligible papers already in `exclusion` do
/// not count towards `target`; up to `target` of them are kept aside as
/// surplus. A failing rung is logged and the climb continues; when the
/// deadline passes, whatever has been collected so far is returned.
pub async fn climb<T, F>(
    source: &dyn CandidateSource,
    rungs: &[Rung],
    exclusion: &ExclusionSet,
    target: usize,
    deadline: TokioInstant,
    evaluate: F,
) -> LadderOutcome<T>
where
    F: Fn(&SourcePaper, &Rung) -> Option<T> + Sync,
    T: Send,
{
    let mut outcome = LadderOutcome {
        hits: Vec::new(),
        surplus: Vec::new(),
        rungs_tried: 0,
        deadline_reached: false,
    };
    let mut seen: HashSet<String> = HashSet::new();

    for (index, rung) in rungs.iter().enumerate() {
        if outcome.hits.len() >= target {
            break;
        }
        if rung.query.is_empty() {
            trace!({ logging::RUNG } = index, label = rung.label, "Skipping empty rung");
            continue;
        }
        if TokioInstant::now() >= deadline {
            outcome.deadline_reached = true;
            break;
        }

        let start = Instant::now();
        outcome.rungs_tried += 1;
        let papers = match timeout_at(deadline, source.search(&rung.query)).await {
            Ok(Ok(papers)) => papers,
            Ok(Err(e)) => {
                warn!(
                    { logging::RUNG } = index,
                    label = rung.label,
                    source = source.name(),
                    { logging::ERROR_MSG } = %e,
                    "Ladder rung failed, continuing"
                );
                continue;
            }
            Err(_) => {
                warn!(
                    { logging::RUNG } = index,
                    label = rung.label,
                    source = source.name(),
                    "Deadline reached during ladder rung"
                );
                outcome.deadline_reached = true;
                break;
            }
        };

        let returned = papers.len();
        let before = outcome.hits.len();
        for paper in papers {
            if outcome.hits.len() >= target {
                break;
            }
            if !seen.insert(paper.id.clone()) {
                continue;
            }
            if exclusion.contains(&paper.id) {
                if outcome.surplus.len() < target {
                    if let Some(value) = evaluate(&paper, rung) {
                        outcome.surplus.push((paper, value));
                    }
                }
                continue;
            }
            if let Some(value) = evaluate(&paper, rung) {
                outcome.hits.push((paper, value));
            }
        }

        debug!(
            { logging::RUNG } = index,
            label = rung.label,
            { logging::QUERY } = %rung.query.to_query_string(),
            { logging::RESULT_COUNT } = returned,
            accepted = outcome.hits.len() - before,
            { logging::DURATION_MS } = start.elapsed().as_millis() as u64,
            "Ladder rung complete"
        );
    }

    outcome
}
