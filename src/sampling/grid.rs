//! Uniform spatial hash grid over a point pool
//!
//! The grid does not own the points. It borrows the dense pool and stores
//! indices into it, so cells never alias point storage. Removal erases the
//! index from its cell and marks it inactive.
//!
//! The list of allocated (non-empty) cells is only refreshed by
//! [`SpatialHashGrid::update_allocated_cells`]. Adds and removals are batched
//! and the list may be stale in between.

use glam::{DVec3, IVec3};
use std::collections::HashMap;

use crate::error::{Result, SamplingError};
use crate::geometry::BoundingBox;

/// Inclusive range of integer cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min: IVec3,
    pub max: IVec3,
}

impl CellRange {
    /// Iterate every cell coordinate in the range, x fastest
    pub fn iter(&self) -> impl Iterator<Item = IVec3> {
        let (min, max) = (self.min, self.max);
        (min.z..=max.z).flat_map(move |z| {
            (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }

    pub fn cell_count(&self) -> usize {
        let extent = self.max - self.min + IVec3::ONE;
        (extent.x as usize)
            .saturating_mul(extent.y as usize)
            .saturating_mul(extent.z as usize)
    }

    pub fn contains(&self, cell: IVec3) -> bool {
        self.min.cmple(cell).all() && cell.cmple(self.max).all()
    }
}

#[derive(Debug, Default)]
struct Cell {
    items: Vec<usize>,
    /// Whether the cell currently appears in the allocated list
    listed: bool,
}

/// Spatial hash grid of point indices
pub struct SpatialHashGrid<'a> {
    points: &'a [DVec3],
    bbox: BoundingBox,
    resolution: IVec3,
    voxel: DVec3,
    cells: HashMap<IVec3, Cell>,
    allocated: Vec<IVec3>,
    /// Cells that went from empty to occupied since the last refresh
    pending: Vec<IVec3>,
    active: Vec<bool>,
    live: usize,
}

impl<'a> SpatialHashGrid<'a> {
    /// Allocate an empty grid over `bbox` with `resolution` cells per axis
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` if any axis has fewer than one cell.
    pub fn init_empty(points: &'a [DVec3], bbox: BoundingBox, resolution: IVec3) -> Result<Self> {
        if resolution.cmplt(IVec3::ONE).any() {
            return Err(SamplingError::InvalidResolution {
                x: resolution.x,
                y: resolution.y,
                z: resolution.z,
            });
        }

        Ok(Self {
            points,
            bbox,
            resolution,
            voxel: bbox.size() / resolution.as_dvec3(),
            cells: HashMap::new(),
            allocated: Vec::new(),
            pending: Vec::new(),
            active: vec![false; points.len()],
            live: 0,
        })
    }

    #[inline]
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    #[inline]
    pub fn resolution(&self) -> IVec3 {
        self.resolution
    }

    /// Edge lengths of a single cell
    #[inline]
    pub fn voxel(&self) -> DVec3 {
        self.voxel
    }

    #[inline]
    pub fn points(&self) -> &'a [DVec3] {
        self.points
    }

    /// Number of indices currently stored in the grid
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Whether the point at `index` is still stored in the grid
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Cell coordinate of a world-space position, clamped to the grid
    pub fn cell_of(&self, point: DVec3) -> IVec3 {
        ((point - self.bbox.min) / self.voxel)
            .floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, self.resolution - IVec3::ONE)
    }

    /// Insert the pool point at `index`
    ///
    /// Indices that are out of range or already present are ignored.
    pub fn add(&mut self, index: usize) {
        if index >= self.points.len() || self.active[index] {
            return;
        }

        let key = self.cell_of(self.points[index]);
        let cell = self.cells.entry(key).or_default();
        if cell.items.is_empty() {
            self.pending.push(key);
        }
        cell.items.push(index);
        self.active[index] = true;
        self.live += 1;
    }

    /// Insert every point of the pool
    pub fn add_all(&mut self) {
        for index in 0..self.points.len() {
            self.add(index);
        }
    }

    /// Bring the allocated cell list in line with cell occupancy
    ///
    /// Cells that emptied are dropped without disturbing the order of the
    /// survivors; cells that became occupied are appended in insertion order.
    pub fn update_allocated_cells(&mut self) {
        let cells = &mut self.cells;
        self.allocated.retain(|key| match cells.get_mut(key) {
            Some(cell) if !cell.items.is_empty() => true,
            Some(cell) => {
                cell.listed = false;
                false
            }
            None => false,
        });

        for key in self.pending.drain(..) {
            if let Some(cell) = cells.get_mut(&key) {
                if !cell.items.is_empty() && !cell.listed {
                    cell.listed = true;
                    self.allocated.push(key);
                }
            }
        }
    }

    /// Non-empty cells as of the last refresh
    #[inline]
    pub fn allocated_cells(&self) -> &[IVec3] {
        &self.allocated
    }

    /// Mutable access to the allocated list, used to reorder it
    #[inline]
    pub fn allocated_cells_mut(&mut self) -> &mut [IVec3] {
        &mut self.allocated
    }

    /// Indices currently stored in a cell
    pub fn cell(&self, key: IVec3) -> &[usize] {
        self.cells
            .get(&key)
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_cell_empty(&self, key: IVec3) -> bool {
        self.cell(key).is_empty()
    }

    /// Convert a world-space box into the inclusive range of cells it touches
    ///
    /// The range is clipped to the grid; `None` if the box misses the grid.
    pub fn box_to_cell_range(&self, bbox: &BoundingBox) -> Option<CellRange> {
        if bbox.is_null() || !bbox.collide(&self.bbox) {
            return None;
        }

        let last = self.resolution - IVec3::ONE;
        let min = ((bbox.min - self.bbox.min) / self.voxel)
            .floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, last);
        let max = ((bbox.max - self.bbox.min) / self.voxel)
            .floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, last);

        if min.cmpgt(max).any() {
            None
        } else {
            Some(CellRange { min, max })
        }
    }

    /// Cell keys to visit for `range`
    ///
    /// After heavy refinement a query range can span far more cells than are
    /// stored; the stored keys are walked instead in that case.
    fn range_keys(&self, range: &CellRange) -> Vec<IVec3> {
        if range.cell_count() <= self.cells.len() {
            range.iter().collect()
        } else {
            self.cells
                .keys()
                .filter(|key| range.contains(**key))
                .copied()
                .collect()
        }
    }

    /// Indices of all stored points inside `bbox`
    pub fn query_box(&self, bbox: &BoundingBox) -> Vec<usize> {
        let Some(range) = self.box_to_cell_range(bbox) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for key in self.range_keys(&range) {
            found.extend(
                self.cell(key)
                    .iter()
                    .copied()
                    .filter(|&i| bbox.contains(self.points[i])),
            );
        }
        found
    }

    /// Number of stored points strictly closer than `radius` to `center`
    pub fn count_in_sphere(&self, center: DVec3, radius: f64) -> usize {
        let Some(range) = self.box_to_cell_range(&BoundingBox::around(center, radius)) else {
            return 0;
        };

        let r2 = radius * radius;
        self.range_keys(&range)
            .into_iter()
            .map(|key| {
                self.cell(key)
                    .iter()
                    .filter(|&&i| self.points[i].distance_squared(center) < r2)
                    .count()
            })
            .sum()
    }

    /// Remove every stored point strictly closer than `radius` to `center`
    ///
    /// Returns how many were removed. The allocated list is left untouched.
    pub fn remove_in_sphere(&mut self, center: DVec3, radius: f64) -> usize {
        let Some(range) = self.box_to_cell_range(&BoundingBox::around(center, radius)) else {
            return 0;
        };

        let r2 = radius * radius;
        let points = self.points;
        let mut removed = 0;
        for key in self.range_keys(&range) {
            let Some(cell) = self.cells.get_mut(&key) else {
                continue;
            };
            let active = &mut self.active;
            cell.items.retain(|&i| {
                if points[i].distance_squared(center) < r2 {
                    active[i] = false;
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }

        self.live -= removed;
        removed
    }

    /// True if no stored point lies strictly within `radius` of `point`
    pub fn is_disk_free(&self, point: DVec3, radius: f64) -> bool {
        self.count_in_sphere(point, radius) == 0
    }
}
