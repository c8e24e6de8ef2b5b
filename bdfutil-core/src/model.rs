/// In-memory BDF deck with editable GRID coordinates
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use crate::bdf::{self, GridCard};
use crate::error::{Error, Result};
use crate::geometry::PointSet;
use crate::transform::Transform;

/// Checks performed while reading a deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Reject duplicate GRID ids.
    pub validate: bool,
    /// Require every CP/CD reference to resolve to a CORD card.
    pub xref: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    /// Any line that is not part of a GRID card, kept verbatim.
    Text(String),
    Grid(GridCard),
}

/// A bulk data deck.
///
/// GRID cards are decoded; everything else is carried through as text so
/// that writing the model reproduces the input apart from the grids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BdfModel {
    entries: Vec<Entry>,
}

impl BdfModel {
    /// Read and decode a deck from disk.
    pub fn read<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::parse(&text, options)?;
        info!(
            "Read {} GRID cards from {}",
            model.node_count(),
            path.display()
        );
        Ok(model)
    }

    /// Decode a deck held in memory.
    pub fn parse(text: &str, options: &ReadOptions) -> Result<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let mut entries = Vec::with_capacity(lines.len());
        let mut coord_systems = HashSet::new();

        let mut index = 0;
        while index < lines.len() {
            let card = match bdf::read_card(&lines[index..]) {
                Some(card) => card,
                None => {
                    entries.push(Entry::Text(lines[index].to_string()));
                    index += 1;
                    continue;
                }
            };
            let span = &lines[index..index + card.span];

            if card.base_name() == "GRID" {
                let grid = GridCard::parse(&card, span, index + 1)?;
                entries.push(Entry::Grid(grid));
            } else {
                if options.xref {
                    coord_systems.extend(defined_coord_systems(card.base_name(), &card.fields));
                }
                entries.extend(span.iter().map(|line| Entry::Text(line.to_string())));
            }
            index += card.span;
        }

        let model = Self { entries };
        if options.validate {
            model.check_unique_ids()?;
        }
        if options.xref {
            model.check_coord_refs(&coord_systems)?;
        }
        debug!(
            "Parsed {} lines, {} GRID cards",
            lines.len(),
            model.node_count()
        );
        Ok(model)
    }

    pub fn node_count(&self) -> usize {
        self.grids().count()
    }

    /// GRID cards in file order.
    pub fn grids(&self) -> impl Iterator<Item = &GridCard> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Grid(grid) => Some(grid),
            Entry::Text(_) => None,
        })
    }

    fn grids_mut(&mut self) -> impl Iterator<Item = &mut GridCard> {
        self.entries.iter_mut().filter_map(|entry| match entry {
            Entry::Grid(grid) => Some(grid),
            Entry::Text(_) => None,
        })
    }

    pub fn node_ids(&self) -> Vec<u32> {
        self.grids().map(|grid| grid.id).collect()
    }

    /// Look up a grid by id.
    pub fn grid(&self, id: u32) -> Option<&GridCard> {
        self.grids().find(|grid| grid.id == id)
    }

    /// Append a GRID card at the end of the deck.
    pub fn add_grid(&mut self, grid: GridCard) {
        self.entries.push(Entry::Grid(grid));
    }

    /// Copy of every grid location, indexed in file order.
    pub fn node_coordinates(&self) -> PointSet {
        let mut points = PointSet::with_capacity(self.entries.len());
        for grid in self.grids() {
            points.push(grid.xyz);
        }
        points
    }

    /// Write back locations previously obtained from [`BdfModel::node_coordinates`].
    pub fn set_node_coordinates(&mut self, points: &PointSet) -> Result<()> {
        let expected = self.node_count();
        if points.len() != expected {
            return Err(Error::CoordinateCountMismatch {
                expected,
                actual: points.len(),
            });
        }
        for (grid, point) in self.grids_mut().zip(points) {
            grid.xyz = *point;
        }
        Ok(())
    }

    /// Apply `transform` to every grid location.
    ///
    /// Works on a copy of the coordinates, so the model is unchanged when the
    /// transform is rejected.
    pub fn transform(&mut self, transform: &Transform) -> Result<()> {
        let mut points = self.node_coordinates();
        points.apply(transform)?;
        self.set_node_coordinates(&points)?;

        let local = self.grids().filter(|grid| grid.cp != 0).count();
        if local > 0 {
            warn!(
                "{} GRID cards are defined in a local coordinate system and were transformed in that frame",
                local
            );
        }
        info!("Applied {} to {} GRID cards", transform.name(), points.len());
        Ok(())
    }

    /// Rotate about an axis through the origin. `theta` is in degrees.
    pub fn rotate(&mut self, vx: f64, vy: f64, vz: f64, theta: f64) -> Result<()> {
        self.transform(&Transform::rotate(vx, vy, vz, theta))
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) -> Result<()> {
        self.transform(&Transform::translate(dx, dy, dz))
    }

    pub fn scale(&mut self, factor: f64) -> Result<()> {
        self.transform(&Transform::scale(factor))
    }

    /// Render the deck as BDF text.
    pub fn to_bdf_string(&self) -> Result<String> {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                Entry::Text(line) => {
                    out.push_str(line);
                    out.push('\n');
                }
                Entry::Grid(grid) => {
                    for line in grid.to_lines()? {
                        out.push_str(&line);
                        out.push('\n');
                    }
                }
            }
        }
        Ok(out)
    }

    /// Write the deck to `path`, replacing any existing file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_bdf_string()?;
        fs::write(path, text).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Wrote {} GRID cards to {}", self.node_count(), path.display());
        Ok(())
    }

    fn check_unique_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for grid in self.grids() {
            if !seen.insert(grid.id) {
                return Err(Error::DuplicateNode { id: grid.id });
            }
        }
        Ok(())
    }

    fn check_coord_refs(&self, defined: &HashSet<u32>) -> Result<()> {
        let mut missing: HashMap<u32, u32> = HashMap::new();
        for grid in self.grids() {
            for cid in [grid.cp, grid.cd] {
                if cid != 0 && !defined.contains(&cid) {
                    missing.entry(cid).or_insert(grid.id);
                }
            }
        }
        match missing.into_iter().min_by_key(|&(_, node)| node) {
            Some((cid, node)) => Err(Error::UnresolvedCoordinateSystem { node, cid }),
            None => Ok(()),
        }
    }
}

/// Coordinate system ids defined by a CORD card.
///
/// `CORD1R/C/S` may define two systems per card; `CORD2R/C/S` defines one.
fn defined_coord_systems<S: AsRef<str>>(name: &str, fields: &[S]) -> Vec<u32> {
    let positions: &[usize] = match name {
        "CORD1R" | "CORD1C" | "CORD1S" => &[0, 4],
        "CORD2R" | "CORD2C" | "CORD2S" => &[0],
        _ => return Vec::new(),
    };
    positions
        .iter()
        .filter_map(|&i| fields.get(i).and_then(|text| bdf::parse_int(text.as_ref())))
        .collect()
}
