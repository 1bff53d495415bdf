//! District layout: spaced placement, biome assignment and the connectivity
//! graph.

use glam::DVec2;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::biome::BiomeField;
use crate::error::{GenerationError, PlacementStage};
use crate::graph::{complete_graph, kruskal_mst};
use crate::resolve::ResolvedRun;
use crate::seed::{SeedStream, stream_rng};
use crate::spacing::place_spaced;
use crate::world::{
    Connection, ConnectionKind, District, DistrictId, MIN_TRAVERSAL_COST, Polarity,
    unreachable_districts,
};

/// Placed districts plus the number of rejected candidate positions.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictLayout {
    pub districts: Vec<District>,
    pub rejected: u32,
}

/// Edge counts produced by [`connect_districts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistrictEdgeCounts {
    /// Spanning-tree edges.
    pub tree: u32,
    /// Extra loop edges.
    pub extra: u32,
    /// Extra edges made one-way.
    pub one_way: u32,
}

/// Place `run.district_count` districts at least `district_min_distance`
/// apart and assign each the field's primary biome at its position.
///
/// # Errors
///
/// [`GenerationError::PlacementExhausted`] when the world is too small for
/// the requested spacing. With two or more districts, a world whose longer
/// side is under `district_min_distance * district_count` fails up front,
/// before any candidate is drawn.
pub fn place_districts(
    run: &ResolvedRun,
    field: &BiomeField,
) -> Result<DistrictLayout, GenerationError> {
    let mut rng = stream_rng(run.seed, SeedStream::Districts, &[]);
    let min_distance = run.config.district_min_distance;
    let world = run.config.world;

    let span = min_distance * f64::from(run.district_count);
    if run.district_count > 1 && world.width.max(world.height) < span {
        tracing::warn!(
            width = world.width,
            height = world.height,
            span,
            "World too small for district spacing"
        );
        return Err(GenerationError::PlacementExhausted {
            stage: PlacementStage::Districts { min_distance },
            placed: 0,
            requested: run.district_count,
            attempts: 0,
        });
    }

    let placed = place_spaced(
        &mut rng,
        run.district_count,
        DVec2::ZERO,
        DVec2::new(world.width, world.height),
        min_distance,
        run.config.placement_attempts,
        PlacementStage::Districts { min_distance },
    )?;

    let districts = placed
        .points
        .into_iter()
        .enumerate()
        .map(|(i, position)| {
            let sample = field.sample(position);
            District {
                id: DistrictId(i as u32),
                position,
                biome: sample.primary,
                biome_sample: sample,
                connections: Vec::new(),
                sectors: Vec::new(),
            }
        })
        .collect();

    Ok(DistrictLayout {
        districts,
        rejected: placed.rejected,
    })
}

/// Connect `districts` with a minimum spanning tree plus
/// `ceil(district_extra_edge_ratio * tree_edges)` random extra edges.
///
/// Tree edges are always bidirectional; only extra edges may become
/// one-way, so every district stays reachable from every other.
pub fn connect_districts(run: &ResolvedRun, districts: &mut [District]) -> DistrictEdgeCounts {
    let mut counts = DistrictEdgeCounts::default();
    if districts.len() < 2 {
        return counts;
    }

    let config = &run.config;
    let mut rng = stream_rng(run.seed, SeedStream::DistrictEdges, &[]);

    let positions: Vec<DVec2> = districts.iter().map(|d| d.position).collect();
    let edges = complete_graph(&positions);
    let in_tree = kruskal_mst(&edges, positions.len());

    let (tree, mut spare): (Vec<_>, Vec<_>) = edges
        .iter()
        .zip(&in_tree)
        .partition(|(_, in_tree)| **in_tree);
    spare.shuffle(&mut rng);

    let extra_budget = (config.district_extra_edge_ratio * tree.len() as f64).ceil() as usize;
    let extras = spare.into_iter().take(extra_budget);

    let chosen = tree
        .into_iter()
        .map(|(edge, _)| (edge, false))
        .chain(extras.map(|(edge, _)| (edge, true)));

    for (edge, is_extra) in chosen {
        let cost = (edge.weight * config.traversal_cost_scale).max(MIN_TRAVERSAL_COST);
        let required_polarity = (config.polarity_ratio > 0.0
            && rng.random_bool(config.polarity_ratio))
        .then(|| Polarity(rng.random_range(0..config.polarity_tags.len()) as u8));

        if is_extra {
            counts.extra += 1;
        } else {
            counts.tree += 1;
        }

        let one_way =
            is_extra && config.one_way_ratio > 0.0 && rng.random_bool(config.one_way_ratio);
        if one_way {
            let (from, to) = if rng.random_bool(0.5) {
                (edge.from, edge.to)
            } else {
                (edge.to, edge.from)
            };
            districts[from].connections.push(Connection {
                to: DistrictId(to as u32),
                kind: ConnectionKind::OneWay,
                required_polarity,
                cost,
            });
            counts.one_way += 1;
            continue;
        }

        for (from, to) in [(edge.from, edge.to), (edge.to, edge.from)] {
            districts[from].connections.push(Connection {
                to: DistrictId(to as u32),
                kind: ConnectionKind::Bidirectional,
                required_polarity,
                cost,
            });
        }
    }

    tracing::debug!(
        tree = counts.tree,
        extra = counts.extra,
        one_way = counts.one_way,
        "District graph connected"
    );
    counts
}

/// Check the connectivity postcondition.
///
/// # Errors
///
/// [`GenerationError::Disconnected`] listing districts not mutually
/// reachable with district 0.
pub fn verify_connected(districts: &[District]) -> Result<(), GenerationError> {
    let unreachable = unreachable_districts(districts);
    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(GenerationError::Disconnected { unreachable })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::{BiomeId, BiomeSeed};
    use crate::resolve::resolve;
    use strata_config::{CountRange, GenerationConfig};

    fn run_with(config: GenerationConfig) -> ResolvedRun {
        resolve(&config).unwrap()
    }

    fn two_biome_field() -> BiomeField {
        BiomeField::from_seeds(vec![
            BiomeSeed {
                position: DVec2::new(0.0, 0.0),
                biome: BiomeId(0),
                radius: 10.0,
            },
            BiomeSeed {
                position: DVec2::new(96.0, 96.0),
                biome: BiomeId(1),
                radius: 10.0,
            },
        ])
    }

    fn layout(config: GenerationConfig) -> (ResolvedRun, Vec<District>) {
        let run = run_with(config);
        let mut districts = place_districts(&run, &two_biome_field()).unwrap().districts;
        connect_districts(&run, &mut districts);
        (run, districts)
    }

    #[test]
    fn test_spacing_and_biome_assignment() {
        let field = two_biome_field();
        let run = run_with(GenerationConfig {
            seed: 11,
            district_count: CountRange::exact(5),
            ..Default::default()
        });
        let placed = place_districts(&run, &field).unwrap();
        assert_eq!(placed.districts.len(), 5);
        for (i, a) in placed.districts.iter().enumerate() {
            assert_eq!(a.id, DistrictId(i as u32));
            assert_eq!(a.biome, field.sample(a.position).primary);
            for b in &placed.districts[i + 1..] {
                assert!(a.position.distance(b.position) >= run.config.district_min_distance);
            }
        }
    }

    #[test]
    fn test_graph_connected_without_self_loops() {
        for seed in 1..=10 {
            let (_, districts) = layout(GenerationConfig {
                seed,
                one_way_ratio: 0.5,
                ..Default::default()
            });
            verify_connected(&districts).unwrap();
            for d in &districts {
                assert!(d.connections.iter().all(|c| c.to != d.id));
                assert!(d.connections.iter().all(|c| c.cost >= MIN_TRAVERSAL_COST));
            }
        }
    }

    #[test]
    fn test_bidirectional_edges_mirrored() {
        let (_, districts) = layout(GenerationConfig {
            seed: 21,
            district_count: CountRange::exact(6),
            one_way_ratio: 0.3,
            ..Default::default()
        });
        for d in &districts {
            for c in d
                .connections
                .iter()
                .filter(|c| c.kind == ConnectionKind::Bidirectional)
            {
                let mirrored = districts[c.to.0 as usize].connections.iter().any(|back| {
                    back.to == d.id
                        && back.kind == ConnectionKind::Bidirectional
                        && back.cost == c.cost
                        && back.required_polarity == c.required_polarity
                });
                assert!(mirrored, "{:?} -> {:?} not mirrored", d.id, c.to);
            }
        }
    }

    #[test]
    fn test_edge_budget() {
        let run = run_with(GenerationConfig {
            seed: 8,
            district_count: CountRange::exact(5),
            district_extra_edge_ratio: 0.5,
            ..Default::default()
        });
        let mut districts = place_districts(&run, &two_biome_field()).unwrap().districts;
        let counts = connect_districts(&run, &mut districts);
        assert_eq!(counts.tree, 4);
        assert_eq!(counts.extra, 2);
        assert_eq!(counts.one_way, 0);
    }

    #[test]
    fn test_no_one_way_unless_requested() {
        let (_, districts) = layout(GenerationConfig {
            seed: 4,
            one_way_ratio: 0.0,
            district_extra_edge_ratio: 1.0,
            ..Default::default()
        });
        assert!(
            districts
                .iter()
                .flat_map(|d| &d.connections)
                .all(|c| c.kind == ConnectionKind::Bidirectional)
        );
    }

    #[test]
    fn test_polarity_within_tags() {
        let (run, districts) = layout(GenerationConfig {
            seed: 13,
            polarity_ratio: 1.0,
            ..Default::default()
        });
        let tags = run.config.polarity_tags.len();
        for c in districts.iter().flat_map(|d| &d.connections) {
            let p = c.required_polarity.expect("every edge gated at ratio 1");
            assert!(usize::from(p.0) < tags);
        }
    }

    #[test]
    fn test_dense_config_exhausts() {
        let run = run_with(GenerationConfig {
            seed: 2,
            district_count: CountRange::exact(3),
            district_min_distance: 10.0,
            world: strata_config::WorldBounds {
                width: 8.0,
                height: 8.0,
            },
            ..Default::default()
        });
        let err = place_districts(&run, &two_biome_field()).unwrap_err();
        match err {
            GenerationError::PlacementExhausted {
                stage: PlacementStage::Districts { min_distance },
                placed,
                requested: 3,
                ..
            } => {
                assert_eq!(min_distance, 10.0);
                assert_eq!(placed, 0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_world_under_spacing_times_count_exhausts() {
        for seed in 1..=20 {
            let run = run_with(GenerationConfig {
                seed,
                district_count: CountRange::exact(4),
                district_min_distance: 20.0,
                world: strata_config::WorldBounds {
                    width: 64.0,
                    height: 64.0,
                },
                ..Default::default()
            });
            let err = place_districts(&run, &two_biome_field()).unwrap_err();
            assert!(
                matches!(
                    err,
                    GenerationError::PlacementExhausted {
                        stage: PlacementStage::Districts { .. },
                        placed: 0,
                        requested: 4,
                        attempts: 0,
                    }
                ),
                "seed {seed}: {err:?}"
            );
        }
    }

    #[test]
    fn test_world_at_spacing_times_count_places() {
        let run = run_with(GenerationConfig {
            seed: 4,
            district_count: CountRange::exact(4),
            district_min_distance: 16.0,
            world: strata_config::WorldBounds {
                width: 64.0,
                height: 64.0,
            },
            ..Default::default()
        });
        assert_eq!(place_districts(&run, &two_biome_field()).unwrap().districts.len(), 4);
    }

    #[test]
    fn test_single_district_ignores_span() {
        let run = run_with(GenerationConfig {
            seed: 4,
            district_count: CountRange::exact(1),
            district_min_distance: 200.0,
            world: strata_config::WorldBounds {
                width: 64.0,
                height: 64.0,
            },
            ..Default::default()
        });
        assert_eq!(place_districts(&run, &two_biome_field()).unwrap().districts.len(), 1);
    }
}
