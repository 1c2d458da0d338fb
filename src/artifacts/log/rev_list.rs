//! History walk from a starting commit
//!
//! Walks the parent graph from a tip, deduplicating shared ancestry (merge
//! commits have two parents) and guarding against cycles via the seen set.
//! A corrupt or dangling commit ends that branch of the walk with a warning
//! instead of failing the whole listing; callers that need a specific commit
//! load it directly and get the hard error there.

use crate::areas::database::Database;
use crate::artifacts::core::UserId;
use crate::artifacts::objects::object_id::ObjectId;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// One row of a history listing, shaped for the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub hash: ObjectId,
    pub message: String,
    pub author: UserId,
    pub timestamp: DateTime<Utc>,
    pub parents: Vec<ObjectId>,
}

/// Commit graph as nodes plus parent→child edges.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: ObjectId,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub from: ObjectId,
    pub to: ObjectId,
}

#[derive(new)]
pub struct RevList<'d> {
    database: &'d Database,
    start: Option<ObjectId>,
}

impl RevList<'_> {
    /// Collect every commit reachable from the start, oldest first.
    ///
    /// Timestamp ties break by hash so the order is deterministic.
    pub fn collect(self) -> Result<Vec<CommitSummary>> {
        let mut pending = Vec::from_iter(self.start.clone());
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut summaries = Vec::new();

        while let Some(oid) = pending.pop() {
            if !seen.insert(oid.clone()) {
                continue;
            }

            let commit = match self.database.load_commit(&oid) {
                Ok(commit) => commit,
                Err(err @ (Error::Corrupt(_) | Error::ObjectNotFound(_))) => {
                    warn!(commit = %oid, %err, "skipping unreadable commit in history walk");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let parents: Vec<ObjectId> = commit.parents().into_iter().cloned().collect();
            pending.extend(parents.iter().cloned());

            summaries.push(CommitSummary {
                hash: oid,
                message: commit.message().to_string(),
                author: commit.author(),
                timestamp: commit.timestamp(),
                parents,
            });
        }

        summaries.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.hash.cmp(&b.hash))
        });

        Ok(summaries)
    }

    /// Build the commit graph for rendering: one node per reachable commit,
    /// one edge per parent link, pointing parent→child.
    pub fn graph(self) -> Result<CommitGraph> {
        let summaries = self.collect()?;

        let mut graph = CommitGraph::default();
        for summary in &summaries {
            graph.nodes.push(GraphNode {
                id: summary.hash.clone(),
                label: summary.message.clone(),
            });
            for parent in &summary.parents {
                graph.edges.push(GraphEdge {
                    from: parent.clone(),
                    to: summary.hash.clone(),
                });
            }
        }

        Ok(graph)
    }
}
