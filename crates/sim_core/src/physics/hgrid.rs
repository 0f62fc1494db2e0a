//! Hashed hierarchical grid
//!
//! Broad-phase index made of a fixed number of levels whose cell size grows
//! geometrically. A collider lives in the finest level whose cells are large
//! enough for it; every cell of every level is hashed into one shared table
//! of buckets. Each bucket is the head of an intrusive doubly linked list
//! threaded through the colliders' `prev`/`next` handles.
//!
//! Per-level population counters and an occupancy bitmask let a query skip
//! empty levels. A per-bucket time stamp compared against a running `tick`
//! ensures one query scans each bucket at most once, even when several
//! cells of its footprint hash to the same bucket.

use crate::config::HGridConfig;
use crate::foundation::collections::{ColliderHandle, SlotMap};
use crate::foundation::math::{Mat4, Vec3};
use crate::physics::collider::{test_colliders_in_local_space, Collider, GridPlacement};
use crate::physics::collision_pair::{CollisionPair, CollisionPairSet};

/// Arena of every collider known to the physics manager
pub type ColliderArena = SlotMap<ColliderHandle, Collider>;

// Large odd multipliers for the spatial hash
const HASH_X: i32 = 0x8da6_b343_u32 as i32;
const HASH_Y: i32 = 0xd816_3841_u32 as i32;
const HASH_Z: i32 = 0xcb1a_b31f_u32 as i32;
const HASH_LEVEL: i32 = 0x1656_67b1_u32 as i32;

/// Discretized cell at one grid level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Cell index along X
    pub x: i32,
    /// Cell index along Y
    pub y: i32,
    /// Cell index along Z
    pub z: i32,
    /// Grid level
    pub level: i32,
}

/// Counters for one grid query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Buckets whose chains were scanned
    pub buckets_visited: usize,
    /// Other colliders run through the overlap test
    pub candidates_tested: usize,
    /// Overlaps found (including pairs already in the set)
    pub overlaps: usize,
}

impl std::ops::AddAssign for QueryStats {
    fn add_assign(&mut self, rhs: Self) {
        self.buckets_visited += rhs.buckets_visited;
        self.candidates_tested += rhs.candidates_tested;
        self.overlaps += rhs.overlaps;
    }
}

/// Hierarchical spatial hash of colliders
#[derive(Debug)]
pub struct HGrid {
    config: HGridConfig,
    cell_sizes: Vec<f32>,
    heads: Vec<Option<ColliderHandle>>,
    time_stamps: Vec<u32>,
    objects_at_level: Vec<usize>,
    occupied_levels_mask: u32,
    tick: u32,
}

impl HGrid {
    /// Build an empty grid. `config` is expected to be validated.
    pub fn new(config: HGridConfig) -> Self {
        let cell_sizes = (0..config.levels).map(|level| config.cell_size(level)).collect();
        Self {
            cell_sizes,
            heads: vec![None; config.buckets],
            time_stamps: vec![0; config.buckets],
            objects_at_level: vec![0; config.levels],
            occupied_levels_mask: 0,
            tick: 0,
            config,
        }
    }

    /// Grid layout
    pub fn config(&self) -> &HGridConfig {
        &self.config
    }

    /// Cell size of `level`
    pub fn cell_size(&self, level: usize) -> f32 {
        self.cell_sizes[level]
    }

    /// Bit `n` is set when level `n` holds at least one collider
    pub fn occupied_levels_mask(&self) -> u32 {
        self.occupied_levels_mask
    }

    /// Number of colliders filed at `level`
    pub fn objects_at_level(&self, level: usize) -> usize {
        self.objects_at_level.get(level).copied().unwrap_or(0)
    }

    /// Total number of colliders in the grid
    pub fn len(&self) -> usize {
        self.objects_at_level.iter().sum()
    }

    /// Whether the grid is empty
    pub fn is_empty(&self) -> bool {
        self.occupied_levels_mask == 0
    }

    /// Current visit tick
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Level whose cells fit a collider of the given radius, or `None` when
    /// even the coarsest level is too small.
    ///
    /// Starting at the minimum cell size, the size grows by the level ratio
    /// until `size * sphere_to_cell_ratio >= 2 * radius`.
    pub fn level_for_radius(&self, radius: f32) -> Option<usize> {
        let diameter = 2.0 * radius;
        self.cell_sizes
            .iter()
            .position(|&size| size * self.config.sphere_to_cell_ratio >= diameter)
    }

    /// Cell containing `position` at `level`
    pub fn cell_at(&self, position: &Vec3, level: usize) -> Cell {
        let inv_size = 1.0 / self.cell_sizes[level];
        Cell {
            x: (position.x * inv_size).floor() as i32,
            y: (position.y * inv_size).floor() as i32,
            z: (position.z * inv_size).floor() as i32,
            level: level as i32,
        }
    }

    /// Bucket a cell hashes to
    pub fn bucket_index(&self, cell: Cell) -> usize {
        let n = HASH_X
            .wrapping_mul(cell.x)
            .wrapping_add(HASH_Y.wrapping_mul(cell.y))
            .wrapping_add(HASH_Z.wrapping_mul(cell.z))
            .wrapping_add(HASH_LEVEL.wrapping_mul(cell.level));
        // Validated configs keep the bucket count within i32
        n.rem_euclid(self.config.buckets as i32) as usize
    }

    /// Bucket a position falls into at `level`
    pub fn bucket_for(&self, position: &Vec3, level: usize) -> usize {
        self.bucket_index(self.cell_at(position, level))
    }

    /// Handles chained in `bucket`, head first
    pub fn bucket_chain<'a>(
        &self,
        colliders: &'a ColliderArena,
        bucket: usize,
    ) -> impl Iterator<Item = ColliderHandle> + 'a {
        let mut cursor = self.heads.get(bucket).copied().flatten();
        std::iter::from_fn(move || {
            let handle = cursor?;
            cursor = colliders.get(handle).and_then(|c| c.next);
            Some(handle)
        })
    }

    /// File a collider at the head of its bucket.
    ///
    /// # Panics
    ///
    /// A collider too large for the coarsest level is a configuration bug,
    /// not a runtime condition; inserting one aborts.
    pub fn insert(&mut self, colliders: &mut ColliderArena, handle: ColliderHandle) {
        let old_head = {
            let Some(collider) = colliders.get(handle) else {
                log::error!("HGrid insert: unknown collider {handle:?}");
                return;
            };
            debug_assert!(!collider.is_in_grid(), "collider {handle:?} inserted twice");

            let radius = collider.radius();
            let Some(level) = self.level_for_radius(radius) else {
                panic!(
                    "collider radius {radius} exceeds the coarsest grid level (max diameter {})",
                    self.config.max_diameter()
                );
            };
            let position = collider.position();
            let bucket = self.bucket_for(&position, level);

            let old_head = self.heads[bucket];
            self.heads[bucket] = Some(handle);
            self.objects_at_level[level] += 1;
            self.occupied_levels_mask |= 1 << level;

            if let Some(collider) = colliders.get_mut(handle) {
                collider.prev = None;
                collider.next = old_head;
                collider.set_placement(Some(GridPlacement {
                    level,
                    bucket,
                    position,
                    radius,
                }));
            }
            old_head
        };

        if let Some(next) = old_head.and_then(|h| colliders.get_mut(h)) {
            next.prev = Some(handle);
        }
    }

    /// Unlink a collider from its bucket. Returns `false` when the collider
    /// is unknown or not filed in the grid.
    pub fn remove(&mut self, colliders: &mut ColliderArena, handle: ColliderHandle) -> bool {
        let Some(collider) = colliders.get_mut(handle) else {
            return false;
        };
        let Some(placement) = collider.placement().copied() else {
            return false;
        };
        collider.set_placement(None);
        let prev = collider.prev.take();
        let next = collider.next.take();

        let level = placement.level;
        self.objects_at_level[level] -= 1;
        if self.objects_at_level[level] == 0 {
            self.occupied_levels_mask &= !(1 << level);
        }

        match prev.and_then(|h| colliders.get_mut(h)) {
            Some(prev_collider) => prev_collider.next = next,
            None => self.heads[placement.bucket] = next,
        }
        if let Some(next_collider) = next.and_then(|h| colliders.get_mut(h)) {
            next_collider.prev = prev;
        }
        true
    }

    /// Start a new visit pass.
    fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.tick == 0 {
            // Stale stamps could alias the restarted counter
            self.time_stamps.fill(0);
            self.tick = 1;
        }
    }

    /// Find every collider overlapping `handle` and add the pairs to `pairs`.
    ///
    /// Levels are walked finest to coarsest, skipping empty ones. At each
    /// level the query footprint is the collider's radius padded by the
    /// level's fitting size plus half the minimum cell size, so colliders
    /// straddling cell borders are still reached. Colliders for which
    /// `skip` returns true are ignored. `inverse_world` is the inverse world
    /// matrix of the querying collider's entity.
    pub fn check_against_grid<F>(
        &mut self,
        colliders: &ColliderArena,
        handle: ColliderHandle,
        inverse_world: &Mat4,
        mut skip: F,
        pairs: &mut CollisionPairSet,
    ) -> QueryStats
    where
        F: FnMut(&Collider) -> bool,
    {
        let mut stats = QueryStats::default();
        let Some(collider) = colliders.get(handle) else {
            return stats;
        };
        self.advance_tick();

        let position = collider.position();
        let radius = collider.radius();
        let margin = 0.5 * self.config.min_cell_size;
        let mut occupied = self.occupied_levels_mask;

        for level in 0..self.cell_sizes.len() {
            if occupied == 0 {
                break;
            }
            let level_occupied = occupied & 1 != 0;
            occupied >>= 1;
            if !level_occupied {
                continue;
            }

            let size = self.cell_sizes[level];
            let delta = radius + size * self.config.sphere_to_cell_ratio + margin;
            let inv_size = 1.0 / size;
            let lo = |c: f32| ((c - delta) * inv_size).floor() as i32;
            let hi = |c: f32| ((c + delta) * inv_size).ceil() as i32;

            for x in lo(position.x)..=hi(position.x) {
                for y in lo(position.y)..=hi(position.y) {
                    for z in lo(position.z)..=hi(position.z) {
                        let bucket = self.bucket_index(Cell {
                            x,
                            y,
                            z,
                            level: level as i32,
                        });
                        if self.time_stamps[bucket] == self.tick {
                            continue;
                        }
                        self.time_stamps[bucket] = self.tick;
                        stats.buckets_visited += 1;

                        let mut cursor = self.heads[bucket];
                        while let Some(other_handle) = cursor {
                            let Some(other) = colliders.get(other_handle) else {
                                break;
                            };
                            cursor = other.next;
                            if other_handle == handle || skip(other) {
                                continue;
                            }
                            stats.candidates_tested += 1;
                            if test_colliders_in_local_space(collider, inverse_world, other) {
                                stats.overlaps += 1;
                                pairs.insert(CollisionPair::new(handle, other_handle));
                            }
                        }
                    }
                }
            }
        }

        stats
    }
}
