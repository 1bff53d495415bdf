//! Minimum-distance rejection sampling shared by biome seeds and districts.

use glam::DVec2;
use rand::Rng;

use crate::error::{GenerationError, PlacementStage};

/// Points placed by [`place_spaced`] plus the number of rejected candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacedPoints {
    /// Accepted points, in placement order.
    pub points: Vec<DVec2>,
    /// Candidates rejected for being too close to an accepted point.
    pub rejected: u32,
}

/// Place up to `count` points in `[region_min, region_max)` so that every
/// pair is at least `min_distance` apart.
///
/// Each point gets `max_attempts` candidate draws. Placement stops at the
/// first point that exhausts its budget, so fewer than `count` points may
/// come back. Point `k` only depends on points `0..k`, so placement is
/// inherently sequential.
pub fn scatter_spaced<R: Rng + ?Sized>(
    rng: &mut R,
    count: u32,
    region_min: DVec2,
    region_max: DVec2,
    min_distance: f64,
    max_attempts: u32,
) -> SpacedPoints {
    let mut points: Vec<DVec2> = Vec::with_capacity(count as usize);
    let mut rejected = 0u32;
    let min_distance_sq = min_distance * min_distance;

    for _ in 0..count {
        let mut accepted = None;

        for _ in 0..max_attempts {
            let candidate = DVec2::new(
                rng.random_range(region_min.x..region_max.x),
                rng.random_range(region_min.y..region_max.y),
            );

            if points
                .iter()
                .all(|p| p.distance_squared(candidate) >= min_distance_sq)
            {
                accepted = Some(candidate);
                break;
            }
            rejected += 1;
        }

        match accepted {
            Some(point) => points.push(point),
            None => break,
        }
    }

    SpacedPoints { points, rejected }
}

/// Place exactly `count` spaced points, or fail.
///
/// # Errors
///
/// [`GenerationError::PlacementExhausted`] when a point exhausts its budget.
pub fn place_spaced<R: Rng + ?Sized>(
    rng: &mut R,
    count: u32,
    region_min: DVec2,
    region_max: DVec2,
    min_distance: f64,
    max_attempts: u32,
    stage: PlacementStage,
) -> Result<SpacedPoints, GenerationError> {
    let placed = scatter_spaced(rng, count, region_min, region_max, min_distance, max_attempts);
    if placed.points.len() < count as usize {
        tracing::warn!(
            placed = placed.points.len(),
            requested = count,
            "Placement exhausted for {stage}"
        );
        return Err(GenerationError::PlacementExhausted {
            stage,
            placed: placed.points.len() as u32,
            requested: count,
            attempts: max_attempts,
        });
    }
    Ok(placed)
}
