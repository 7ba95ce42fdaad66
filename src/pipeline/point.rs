//! Point line encoding for data ingestion
//!
//! A point is one line of tab-separated `key=value` fields; points are
//! joined by newlines with no trailing delimiter.

use bytes::Bytes;
use std::fmt;

/// One `key=value` pair of a point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointField {
    pub key: String,
    pub value: String,
}

impl PointField {
    pub fn new(key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            key: key.into(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for PointField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.key)?;
        for c in self.value.chars() {
            match c {
                '\t' => f.write_str("\\t")?,
                '\n' => f.write_str("\\n")?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}

/// Ordered fields of a single record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Point {
    pub fields: Vec<PointField>,
}

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push(PointField::new(key, value));
        self
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

impl FromIterator<PointField> for Point {
    fn from_iter<I: IntoIterator<Item = PointField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// A batch of points sent in one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Points(pub Vec<Point>);

impl Points {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode the batch as the ingestion request body
    pub fn to_buffer(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{point}")?;
        }
        Ok(())
    }
}

impl From<Vec<Point>> for Points {
    fn from(points: Vec<Point>) -> Self {
        Points(points)
    }
}

impl FromIterator<Point> for Points {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Points(iter.into_iter().collect())
    }
}
