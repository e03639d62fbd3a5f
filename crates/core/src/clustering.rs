//! Greedy proximity clustering of decay-weighted votes.
//!
//! A single pass over the votes in input order. Each vote joins the first
//! existing cluster (in creation order) whose centroid lies within the
//! grouping radius, or starts a new cluster. This is first-fit, not
//! nearest-fit: the same input order always produces the same clusters,
//! and a different order may produce different ones.

use serde::Serialize;

use crate::decay::{self, weight_for_age};
use crate::error::CoreError;
use crate::floorplan::{GROUPING_FACTOR, MAX_RADIUS};
use crate::types::{minutes_between, Timestamp};
use crate::vote::{classify_average, Sentiment, VoteSample};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Validated inputs to [`cluster_votes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    half_life_minutes: f64,
    cutoff_minutes: f64,
    display_radius: f64,
}

impl ClusterParams {
    /// Build parameters, rejecting a non-positive half-life, a negative
    /// cutoff, or a display radius outside `(0, 200]`.
    pub fn new(
        half_life_minutes: f64,
        cutoff_minutes: f64,
        display_radius: f64,
    ) -> Result<Self, CoreError> {
        decay::validate_half_life(half_life_minutes)?;
        decay::validate_cutoff(cutoff_minutes)?;
        if !display_radius.is_finite()
            || display_radius <= 0.0
            || display_radius > f64::from(MAX_RADIUS)
        {
            return Err(CoreError::Validation(format!(
                "radius must be in (0, {MAX_RADIUS}], got {display_radius}"
            )));
        }
        Ok(Self {
            half_life_minutes,
            cutoff_minutes,
            display_radius,
        })
    }

    pub fn half_life_minutes(&self) -> f64 {
        self.half_life_minutes
    }

    pub fn cutoff_minutes(&self) -> f64 {
        self.cutoff_minutes
    }

    pub fn display_radius(&self) -> f64 {
        self.display_radius
    }

    /// Distance within which a vote joins an existing cluster.
    pub fn grouping_radius(&self) -> f64 {
        self.display_radius * GROUPING_FACTOR
    }
}

// ---------------------------------------------------------------------------
// VoteCluster
// ---------------------------------------------------------------------------

/// An in-progress aggregation of nearby votes. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteCluster {
    /// Running mean of the raw member x coordinates.
    pub x: f64,
    /// Running mean of the raw member y coordinates.
    pub y: f64,
    /// Sum of `sentiment * weight` over members.
    pub total_value: f64,
    /// Sum of decay weights over members.
    pub total_intensity: f64,
    pub vote_count: u32,
}

impl VoteCluster {
    fn start(vote: &VoteSample, weight: f64) -> Self {
        Self {
            x: f64::from(vote.x),
            y: f64::from(vote.y),
            total_value: vote.sentiment.signed() * weight,
            total_intensity: weight,
            vote_count: 1,
        }
    }

    fn merge(&mut self, vote: &VoteSample, weight: f64) {
        self.vote_count += 1;
        self.total_value += vote.sentiment.signed() * weight;
        self.total_intensity += weight;
        let n = f64::from(self.vote_count);
        self.x = (self.x * (n - 1.0) + f64::from(vote.x)) / n;
        self.y = (self.y * (n - 1.0) + f64::from(vote.y)) / n;
    }

    fn distance_to(&self, vote: &VoteSample) -> f64 {
        (self.x - f64::from(vote.x)).hypot(self.y - f64::from(vote.y))
    }

    /// Decay-weighted mean sentiment in `[-1, 1]`.
    pub fn average_sentiment(&self) -> f64 {
        if self.total_intensity > 0.0 {
            self.total_value / self.total_intensity
        } else {
            0.0
        }
    }

    /// Visual intensity, capped at 1.0.
    pub fn intensity(&self) -> f64 {
        self.total_intensity.min(1.0)
    }

    /// Rendering radius; grows without bound as members are added.
    pub fn render_radius(&self, display_radius: f64) -> f64 {
        display_radius * (0.5 + 0.1 * f64::from(self.vote_count))
    }

    pub fn category(&self) -> Sentiment {
        classify_average(self.average_sentiment())
    }
}

// ---------------------------------------------------------------------------
// ClusterSummary
// ---------------------------------------------------------------------------

/// Output record for one cluster, ready to be painted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub x: f64,
    pub y: f64,
    pub average_sentiment: f64,
    pub category: Sentiment,
    pub intensity: f64,
    pub radius: f64,
    pub vote_count: u32,
}

impl ClusterSummary {
    pub fn from_cluster(cluster: &VoteCluster, display_radius: f64) -> Self {
        Self {
            x: cluster.x,
            y: cluster.y,
            average_sentiment: cluster.average_sentiment(),
            category: cluster.category(),
            intensity: cluster.intensity(),
            radius: cluster.render_radius(display_radius),
            vote_count: cluster.vote_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Clustering
// ---------------------------------------------------------------------------

/// Cluster `votes` as seen from `reference_time`.
///
/// Votes older than the cutoff or created after `reference_time` contribute
/// nothing. Clusters whose accumulated weight is zero are dropped.
pub fn cluster_votes<'a, I>(
    votes: I,
    reference_time: Timestamp,
    params: &ClusterParams,
) -> Vec<VoteCluster>
where
    I: IntoIterator<Item = &'a VoteSample>,
{
    let grouping_radius = params.grouping_radius();
    let mut clusters: Vec<VoteCluster> = Vec::new();

    for vote in votes {
        let age = minutes_between(vote.created_at, reference_time);
        if age < 0.0 || age > params.cutoff_minutes {
            continue;
        }
        let weight = weight_for_age(age, params.half_life_minutes);

        match clusters
            .iter_mut()
            .find(|c| c.distance_to(vote) <= grouping_radius)
        {
            Some(cluster) => cluster.merge(vote, weight),
            None => clusters.push(VoteCluster::start(vote, weight)),
        }
    }

    clusters.retain(|c| c.total_intensity > 0.0);
    clusters
}

/// Cluster and summarise in one step.
pub fn summarize_votes<'a, I>(
    votes: I,
    reference_time: Timestamp,
    params: &ClusterParams,
) -> Vec<ClusterSummary>
where
    I: IntoIterator<Item = &'a VoteSample>,
{
    cluster_votes(votes, reference_time, params)
        .iter()
        .map(|c| ClusterSummary::from_cluster(c, params.display_radius))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
