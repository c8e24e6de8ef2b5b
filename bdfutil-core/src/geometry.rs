/// Point containers for grid coordinates
use nalgebra::{Point3, Vector3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::transform::{self, Transform};

/// Ordered coordinates of every grid point in a model.
///
/// Index `i` always refers to the same grid for the lifetime of the set, so a
/// snapshot taken with [`PointSet::coordinates`] can be edited and written
/// back with [`PointSet::set_coordinates`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    points: Vec<Point3<f64>>,
}

impl PointSet {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3<f64>> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Snapshot of all coordinates.
    ///
    /// The returned vector is detached from the set; editing it has no effect
    /// until it is passed to [`PointSet::set_coordinates`].
    pub fn coordinates(&self) -> Vec<Point3<f64>> {
        self.points.clone()
    }

    /// Overwrite every coordinate by position.
    ///
    /// Fails without touching the set if `coords` has a different length.
    pub fn set_coordinates(&mut self, coords: &[Point3<f64>]) -> Result<()> {
        if coords.len() != self.points.len() {
            return Err(Error::CoordinateCountMismatch {
                expected: self.points.len(),
                actual: coords.len(),
            });
        }
        self.points.copy_from_slice(coords);
        Ok(())
    }

    /// Rotate about an axis through the origin. `theta` is in degrees.
    pub fn rotate(&mut self, vx: f64, vy: f64, vz: f64, theta: f64) -> Result<()> {
        let rotation = transform::rotation_matrix(vx, vy, vz, theta)?;
        transform::apply_rotation(self, &rotation);
        Ok(())
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        transform::apply_translation(self, &Vector3::new(dx, dy, dz));
    }

    pub fn scale(&mut self, factor: f64) {
        transform::apply_scale(self, factor);
    }

    pub fn apply(&mut self, transform: &Transform) -> Result<()> {
        transform.apply_to(self)
    }

    /// Replace every point with `f(point)`.
    #[cfg(not(feature = "parallel"))]
    pub(crate) fn map_in_place<F>(&mut self, f: F)
    where
        F: Fn(&Point3<f64>) -> Point3<f64>,
    {
        for point in &mut self.points {
            *point = f(point);
        }
    }

    /// Replace every point with `f(point)`, spread across the rayon pool.
    #[cfg(feature = "parallel")]
    pub(crate) fn map_in_place<F>(&mut self, f: F)
    where
        F: Fn(&Point3<f64>) -> Point3<f64> + Sync + Send,
    {
        self.points.par_iter_mut().for_each(|point| *point = f(point));
    }
}

impl From<Vec<Point3<f64>>> for PointSet {
    fn from(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }
}

impl FromIterator<Point3<f64>> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point3<f64>;
    type IntoIter = std::slice::Iter<'a, Point3<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> PointSet {
        PointSet::from(vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-4.0, 0.5, 0.0),
            Point3::new(0.0, 0.0, 10.0),
        ])
    }

    #[test]
    fn test_snapshot_is_detached() {
        let points = sample();
        let mut coords = points.coordinates();
        coords[0].z += 1.0;
        assert_eq!(points.as_slice()[0], Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_set_coordinates_roundtrip() {
        let mut points = sample();
        let before = points.clone();
        let coords = points.coordinates();
        points.set_coordinates(&coords).unwrap();
        assert_eq!(points, before);
    }

    #[test]
    fn test_set_coordinates_writes_by_index() {
        let mut points = sample();
        let mut coords = points.coordinates();
        for c in &mut coords {
            c.z += 1.0;
        }
        points.set_coordinates(&coords).unwrap();
        assert_relative_eq!(points.as_slice()[2].z, 11.0);
        assert_relative_eq!(points.as_slice()[1].x, -4.0);
    }

    #[test]
    fn test_set_coordinates_length_mismatch() {
        let mut points = sample();
        let before = points.clone();

        let short = vec![Point3::origin(); 2];
        match points.set_coordinates(&short) {
            Err(Error::CoordinateCountMismatch { expected, actual }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let long = vec![Point3::origin(); 4];
        assert!(points.set_coordinates(&long).is_err());
        assert_eq!(points, before);
    }

    #[test]
    fn test_rotate_rejects_zero_axis_untouched() {
        let mut points = sample();
        let before = points.clone();
        assert!(matches!(
            points.rotate(0.0, 0.0, 0.0, 30.0),
            Err(Error::DegenerateAxis { .. })
        ));
        assert_eq!(points, before);
    }

    #[test]
    fn test_empty_set() {
        let mut points = PointSet::new();
        points.translate(1.0, 1.0, 1.0);
        points.scale(3.0);
        points.rotate(1.0, 0.0, 0.0, 45.0).unwrap();
        assert!(points.is_empty());
        assert!(points.set_coordinates(&[]).is_ok());
    }

    #[test]
    fn test_push_and_apply() {
        let mut points = PointSet::with_capacity(2);
        points.push(Point3::new(1.0, 0.0, 0.0));
        points.push(Point3::new(0.0, 2.0, 0.0));
        assert_eq!(points.len(), 2);

        points.apply(&Transform::scale(3.0)).unwrap();
        points.apply(&Transform::translate(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(points.as_slice()[0], Point3::new(3.0, 0.0, -1.0));
        assert_eq!(points.as_slice()[1], Point3::new(0.0, 6.0, -1.0));

        let before = points.clone();
        assert!(points.apply(&Transform::rotate(0.0, 0.0, 0.0, 1.0)).is_err());
        assert_eq!(points, before);
    }

    #[test]
    fn test_map_in_place_matches_per_point() {
        let points: PointSet = (0..5000)
            .map(|i| {
                let t = i as f64;
                Point3::new(t.sin() * 10.0, t.cos() * 3.0, t * 0.01)
            })
            .collect();
        let rotation = transform::rotation_matrix(1.0, -2.0, 0.5, 33.0).unwrap();

        let mut mapped = points.clone();
        mapped.rotate(1.0, -2.0, 0.5, 33.0).unwrap();
        mapped.translate(0.25, 0.0, -7.0);

        let offset = Vector3::new(0.25, 0.0, -7.0);
        for (p, q) in points.iter().zip(mapped.iter()) {
            assert_eq!(Point3::from(rotation * p.coords) + offset, *q);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_map_in_place_runs_on_rayon_pool() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let on_pool = AtomicUsize::new(0);
        let mut points: PointSet = (0..1000).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        points.map_in_place(|p| {
            if rayon::current_thread_index().is_some() {
                on_pool.fetch_add(1, Ordering::Relaxed);
            }
            Point3::new(p.x, p.x, 0.0)
        });

        assert_eq!(on_pool.load(Ordering::Relaxed), 1000);
        assert!(points.iter().all(|p| p.x == p.y));
    }
}
