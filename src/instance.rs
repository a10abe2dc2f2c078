//! TSP instances: city sets, file readers and a custom generator.
//!
//! A [`CitySet`] is the immutable input of every run. It can be read from a
//! TSPLIB `EUC_2D` file (`NODE_COORD_SECTION`), from a CSV file with `x` and
//! `y` columns, or generated from a seed with one of the [`Shape`] patterns.

use crate::error::{Result, TspError};
use crate::random::create_rng;
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub x: f64,
    pub y: f64,
}

impl City {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another city.
    #[inline]
    pub fn distance(&self, other: &City) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for City {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An ordered, validated set of cities. City identity is its index.
#[derive(Debug, Clone, PartialEq)]
pub struct CitySet {
    cities: Vec<City>,
}

impl CitySet {
    /// Builds a city set.
    ///
    /// Fails with [`TspError::InvalidInstance`] when there are fewer than two
    /// cities or any coordinate is not finite.
    pub fn new(cities: Vec<City>) -> Result<Self> {
        if cities.len() < 2 {
            return Err(TspError::instance(format!(
                "need at least 2 cities, got {}",
                cities.len()
            )));
        }
        if let Some(i) = cities
            .iter()
            .position(|c| !c.x.is_finite() || !c.y.is_finite())
        {
            return Err(TspError::instance(format!(
                "city {i} has a non-finite coordinate ({}, {})",
                cities[i].x, cities[i].y
            )));
        }
        Ok(Self { cities })
    }

    /// Builds a city set from `(x, y)` pairs.
    pub fn from_coords<I>(coords: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self::new(coords.into_iter().map(City::from).collect())
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.cities[a].distance(&self.cities[b])
    }
}

// ============================================================================
// TSPLIB
// ============================================================================

/// Reads a TSPLIB `.tsp` file with a `NODE_COORD_SECTION`.
pub fn read_tsplib(path: impl AsRef<Path>) -> Result<CitySet> {
    let content = std::fs::read_to_string(path)?;
    parse_tsplib(&content)
}

/// Parses TSPLIB content. Node lines are `id x y`; reading stops at `EOF`.
///
/// # Errors
/// [`TspError::Parse`] for a node line with fewer than three fields or a
/// non-numeric coordinate, [`TspError::InvalidInstance`] when the node count
/// disagrees with `DIMENSION`.
pub fn parse_tsplib(content: &str) -> Result<CitySet> {
    let mut cities = Vec::new();
    let mut dimension = None;
    let mut in_nodes = false;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if !in_nodes && line.starts_with("DIMENSION") {
            dimension = Some(parse_dimension(line, idx + 1)?);
            continue;
        }
        if line.starts_with("NODE_COORD_SECTION") {
            in_nodes = true;
            continue;
        }
        if line.starts_with("EOF") {
            break;
        }
        if !in_nodes {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(TspError::Parse {
                line: idx + 1,
                message: format!("expected `id x y`, got {line:?}"),
            });
        }
        let x = parse_coord(fields[1], idx + 1)?;
        let y = parse_coord(fields[2], idx + 1)?;
        cities.push(City::new(x, y));
    }

    if let Some(expected) = dimension {
        if expected != cities.len() {
            return Err(TspError::instance(format!(
                "DIMENSION is {expected} but {} nodes were read",
                cities.len()
            )));
        }
    }
    CitySet::new(cities)
}

fn parse_dimension(line: &str, line_no: usize) -> Result<usize> {
    let value = line["DIMENSION".len()..].trim_start().trim_start_matches(':').trim();
    value.parse::<usize>().map_err(|e| TspError::Parse {
        line: line_no,
        message: format!("bad dimension {value:?}: {e}"),
    })
}

fn parse_coord(field: &str, line: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|e| TspError::Parse {
        line,
        message: format!("bad coordinate {field:?}: {e}"),
    })
}

// ============================================================================
// CSV
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<usize>,
    x: f64,
    y: f64,
}

/// Reads a CSV file with a header naming `x` and `y` columns.
pub fn read_csv(path: impl AsRef<Path>) -> Result<CitySet> {
    let file = std::fs::File::open(path)?;
    read_csv_from(file)
}

/// Reads CSV cities from any reader. Rows are taken in file order.
pub fn read_csv_from<R: Read>(reader: R) -> Result<CitySet> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut cities = Vec::new();
    for row in rdr.deserialize() {
        let row: CsvRow = row?;
        cities.push(City::new(row.x, row.y));
    }
    CitySet::new(cities)
}

/// Writes cities as `id,x,y` rows.
pub fn write_csv(cities: &[City], path: impl AsRef<Path>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for (i, c) in cities.iter().enumerate() {
        wtr.serialize(CsvRow {
            id: Some(i),
            x: c.x,
            y: c.y,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Instance file formats understood by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceFormat {
    Tsplib,
    Csv,
}

impl InstanceFormat {
    /// Guesses the format from the file extension (`.csv` or TSPLIB).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => InstanceFormat::Csv,
            _ => InstanceFormat::Tsplib,
        }
    }
}

impl FromStr for InstanceFormat {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tsplib" | "tsp" => Ok(InstanceFormat::Tsplib),
            "csv" => Ok(InstanceFormat::Csv),
            other => Err(TspError::config(format!("unknown instance format {other:?}"))),
        }
    }
}

/// Loads an instance in the given format, or guesses it from the extension.
pub fn load(path: impl AsRef<Path>, format: Option<InstanceFormat>) -> Result<CitySet> {
    let path = path.as_ref();
    match format.unwrap_or_else(|| InstanceFormat::from_path(path)) {
        InstanceFormat::Tsplib => read_tsplib(path),
        InstanceFormat::Csv => read_csv(path),
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Point pattern for generated instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Uniform in `[0, 500)²`.
    Uniform,
    /// Gaussian blob around `(250, 250)` with σ = 80.
    Islands,
    /// `max(3, n / 20)` disc-shaped clusters of radius 50.
    RingClusters,
}

impl FromStr for Shape {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Shape::Uniform),
            "islands" => Ok(Shape::Islands),
            "ring_clusters" | "ring-clusters" => Ok(Shape::RingClusters),
            other => Err(TspError::config(format!("unknown shape {other:?}"))),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Uniform => "uniform",
            Shape::Islands => "islands",
            Shape::RingClusters => "ring_clusters",
        })
    }
}

const SIDE: f64 = 500.0;
const CLUSTER_RADIUS: f64 = 50.0;

/// Generates `n` cities with the given pattern.
pub fn generate(n: usize, seed: u64, shape: Shape) -> Result<Vec<City>> {
    let mut rng = create_rng(seed);
    let cities = match shape {
        Shape::Uniform => (0..n)
            .map(|_| City::new(rng.random_range(0.0..SIDE), rng.random_range(0.0..SIDE)))
            .collect(),
        Shape::Islands => {
            let normal = Normal::new(250.0, 80.0)
                .map_err(|e| TspError::config(format!("gaussian parameters: {e}")))?;
            (0..n)
                .map(|_| City::new(rng.sample(normal), rng.sample(normal)))
                .collect()
        }
        Shape::RingClusters => ring_clusters(n, &mut rng),
    };
    Ok(cities)
}

fn ring_clusters<R: Rng>(n: usize, rng: &mut R) -> Vec<City> {
    let clusters = (n / 20).max(3);
    let per_cluster = n.div_ceil(clusters);
    let mut cities = Vec::with_capacity(clusters * per_cluster);
    for _ in 0..clusters {
        let cx = rng.random_range(0.0..SIDE);
        let cy = rng.random_range(0.0..SIDE);
        for _ in 0..per_cluster {
            let angle = rng.random_range(0.0..2.0 * PI);
            let r = rng.random_range(0.0..CLUSTER_RADIUS);
            cities.push(City::new(cx + r * angle.cos(), cy + r * angle.sin()));
        }
    }
    cities.truncate(n);
    cities
}
