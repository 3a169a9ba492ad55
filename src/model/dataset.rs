//! The 2D dataset handed to the clusterer

use super::point::Point;

/// Axis-aligned bounding box of a dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Smallest box containing every point, `None` when there are none
    pub fn enclosing(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in points {
            bounds.include(&p);
        }
        Some(bounds)
    }

    /// Grow the box to contain a point
    pub fn include(&mut self, p: &Point) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }
}

/// Two numeric columns extracted from a tabular file
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Name of the column used for x
    pub x_column: String,
    /// Name of the column used for y
    pub y_column: String,
    /// Observations in file order
    pub points: Vec<Point>,
    /// Line/row number in the source file (1-indexed), parallel to `points`
    pub source_lines: Vec<usize>,
}

impl Dataset {
    /// Create an empty dataset for the given column names
    pub fn new(x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        Self {
            x_column: x_column.into(),
            y_column: y_column.into(),
            points: Vec::new(),
            source_lines: Vec::new(),
        }
    }

    /// Build a dataset from in-memory points, numbering lines from 1
    pub fn from_points(points: Vec<Point>) -> Self {
        let source_lines = (1..=points.len()).collect();
        Self {
            x_column: "x".to_string(),
            y_column: "y".to_string(),
            points,
            source_lines,
        }
    }

    /// Append a point
    pub fn push(&mut self, point: Point, source_line: usize) {
        self.points.push(point);
        self.source_lines.push(source_line);
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of all points, `None` when empty
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(self.points.iter().copied())
    }

    /// Mean of the per-column (population) variances
    pub fn feature_variance_mean(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }

        let n = self.points.len() as f64;
        let mean_x = self.points.iter().map(|p| p.x).sum::<f64>() / n;
        let mean_y = self.points.iter().map(|p| p.y).sum::<f64>() / n;

        let var_x = self.points.iter().map(|p| (p.x - mean_x).powi(2)).sum::<f64>() / n;
        let var_y = self.points.iter().map(|p| (p.y - mean_y).powi(2)).sum::<f64>() / n;

        (var_x + var_y) / 2.0
    }

    /// Source line for the point at `index`
    pub fn source_line(&self, index: usize) -> Option<usize> {
        self.source_lines.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let dataset = Dataset::from_points(vec![
            Point::new(1.0, 5.0),
            Point::new(-2.0, 3.0),
            Point::new(4.0, -1.0),
        ]);
        let bounds = dataset.bounds().unwrap();
        assert_eq!(bounds.min_x, -2.0);
        assert_eq!(bounds.max_x, 4.0);
        assert_eq!(bounds.min_y, -1.0);
        assert_eq!(bounds.max_y, 5.0);

        assert!(Dataset::new("x", "y").bounds().is_none());
    }

    #[test]
    fn test_bounds_enclosing_single_point() {
        let bounds = Bounds::enclosing([Point::new(2.0, -3.0)]).unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (2.0, 2.0));
        assert_eq!((bounds.min_y, bounds.max_y), (-3.0, -3.0));
        assert!(Bounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_feature_variance_mean() {
        // var(x) = 1, var(y) = 0
        let dataset = Dataset::from_points(vec![Point::new(0.0, 7.0), Point::new(2.0, 7.0)]);
        assert_eq!(dataset.feature_variance_mean(), 0.5);
    }

    #[test]
    fn test_source_lines() {
        let mut dataset = Dataset::new("a", "b");
        dataset.push(Point::new(0.0, 0.0), 2);
        dataset.push(Point::new(1.0, 1.0), 3);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.source_line(1), Some(3));
        assert_eq!(dataset.source_line(2), None);
    }
}
