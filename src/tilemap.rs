//! Generic 2D cell storage shared by the float grids and the biome grid.

use rayon::prelude::*;

/// A 2D tilemap grid stored row-major. Access outside the grid is never wrapped.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Tilemap<T> {
    /// Build a map by evaluating `f(x, y)` for every cell.
    /// Cells are computed in parallel; the result does not depend on scheduling.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync + Send,
    {
        let data: Vec<T> = (0..width * height)
            .into_par_iter()
            .map(|idx| f(idx % width, idx / width))
            .collect();
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Get a cell. Panics when out of bounds; use `try_get` for checked access.
    pub fn get(&self, x: usize, y: usize) -> &T {
        assert!(x < self.width && y < self.height, "tile ({}, {}) out of bounds", x, y);
        &self.data[self.index(x, y)]
    }

    pub fn try_get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            Some(&self.data[self.index(x, y)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        assert!(x < self.width && y < self.height, "tile ({}, {}) out of bounds", x, y);
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        *self.get_mut(x, y) = value;
    }

    /// Orthogonal neighbors (left, right, up, down) that lie inside the map.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut result = Vec::with_capacity(4);
        if x > 0 {
            result.push((x - 1, y));
        }
        if x + 1 < self.width {
            result.push((x + 1, y));
        }
        if y > 0 {
            result.push((x, y - 1));
        }
        if y + 1 < self.height {
            result.push((x, y + 1));
        }
        result
    }

    /// Raw row-major cell values.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Build a new map of the same shape from every cell value.
    pub fn map<U, F>(&self, f: F) -> Tilemap<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.par_iter().map(f).collect(),
        }
    }

    /// Combine two maps of identical shape cell by cell.
    /// Callers are responsible for checking that the shapes match.
    pub fn zip_map<U, V, F>(&self, other: &Tilemap<U>, f: F) -> Tilemap<V>
    where
        T: Sync,
        U: Sync,
        V: Send,
        F: Fn(&T, &U) -> V + Sync + Send,
    {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        Tilemap {
            width: self.width,
            height: self.height,
            data: self
                .data
                .par_iter()
                .zip(other.data.par_iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    /// Mutate every cell in place.
    pub fn for_each_mut<F>(&mut self, f: F)
    where
        T: Send,
        F: Fn(&mut T) + Sync + Send,
    {
        self.data.par_iter_mut().for_each(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_is_row_major() {
        let map = Tilemap::from_fn(3, 2, |x, y| (x, y));
        assert_eq!(*map.get(2, 1), (2, 1));
        assert_eq!(map.as_slice()[1], (1, 0));
        assert_eq!(map.as_slice()[3], (0, 1));
    }

    #[test]
    fn test_try_get_does_not_wrap() {
        let map = Tilemap::new_with(4, 4, 1u8);
        assert!(map.try_get(3, 3).is_some());
        assert!(map.try_get(4, 0).is_none());
        assert!(map.try_get(0, 4).is_none());
        assert!(!map.in_bounds(-1, 0));
    }

    #[test]
    fn test_neighbors_at_corner_and_interior() {
        let map: Tilemap<u8> = Tilemap::new(5, 5);
        assert_eq!(map.neighbors(0, 0).len(), 2);
        assert_eq!(map.neighbors(2, 2), vec![(1, 2), (3, 2), (2, 1), (2, 3)]);
    }

    #[test]
    fn test_zip_map_combines_cells() {
        let a = Tilemap::from_fn(4, 4, |x, _| x as f32);
        let b = Tilemap::from_fn(4, 4, |_, y| y as f32);
        let sum = a.zip_map(&b, |p, q| p + q);
        assert_eq!(*sum.get(3, 2), 5.0);
    }
}
