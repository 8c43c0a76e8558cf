//! Well-Known Binary geometry serialization plus the bbox/type-code
//! statistics GeoParquet-style readers expect on a GEOMETRY/GEOGRAPHY
//! column (spec.md's size-budget table, GLOSSARY "WKB"). Optional: no
//! other module depends on this one, matching parquet2's own
//! feature-gated extras (`bloom_filter`, `async`) rather than anything
//! parquet2 itself implements — grounded on the ISO/OGC WKB byte
//! layout (byte-order marker, u32 type code, coordinate tuples) common
//! to every WKB-producing library, generalized to this crate's
//! `ByteSink`-free `Vec<u8>` return the way `plain::encode` returns an
//! owned buffer rather than writing through a sink directly.

use std::collections::BTreeSet;

use crate::error::Result;

/// A single coordinate. `z` is `Some` for XYZ geometries; every
/// coordinate within one [`Geometry`] must agree on its presence
/// (spec.md §7 `UnsupportedGeometryDims`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Coord {
    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    Polygon(Vec<Vec<Coord>>),
    MultiPoint(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    MultiPolygon(Vec<Vec<Vec<Coord>>>),
    GeometryCollection(Vec<Geometry>),
}

/// Base WKB type codes (ISO 13249 / OGC SFA). The Z variant of each is
/// `code + 1000`, the convention PostGIS and GEOS both emit.
const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;
const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOINT: u32 = 4;
const WKB_MULTILINESTRING: u32 = 5;
const WKB_MULTIPOLYGON: u32 = 6;
const WKB_GEOMETRYCOLLECTION: u32 = 7;
const WKB_Z_OFFSET: u32 = 1000;

fn geometry_dims_consistent(coords: &[Coord]) -> bool {
    match coords.first() {
        None => true,
        Some(first) => coords.iter().all(|c| c.z.is_some() == first.z.is_some()),
    }
}

fn has_z(geom: &Geometry) -> Result<bool> {
    match geom {
        Geometry::Point(c) => Ok(c.z.is_some()),
        Geometry::LineString(cs) | Geometry::MultiPoint(cs) => {
            check_dims(cs)?;
            Ok(cs.first().is_some_and(|c| c.z.is_some()))
        }
        Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
            for ring in rings {
                check_dims(ring)?;
            }
            Ok(rings.first().and_then(|r| r.first()).is_some_and(|c| c.z.is_some()))
        }
        Geometry::MultiPolygon(polys) => {
            for rings in polys {
                for ring in rings {
                    check_dims(ring)?;
                }
            }
            Ok(polys
                .first()
                .and_then(|rings| rings.first())
                .and_then(|ring| ring.first())
                .is_some_and(|c| c.z.is_some()))
        }
        Geometry::GeometryCollection(parts) => {
            for part in parts {
                has_z(part)?;
            }
            Ok(false)
        }
    }
}

fn check_dims(coords: &[Coord]) -> Result<()> {
    if !geometry_dims_consistent(coords) {
        return Err(general_err!(
            "UnsupportedGeometryDims: a geometry mixes XY and XYZ coordinates"
        ));
    }
    Ok(())
}

fn write_coord(out: &mut Vec<u8>, c: &Coord) {
    out.extend_from_slice(&c.x.to_le_bytes());
    out.extend_from_slice(&c.y.to_le_bytes());
    if let Some(z) = c.z {
        out.extend_from_slice(&z.to_le_bytes());
    }
}

fn write_ring(out: &mut Vec<u8>, ring: &[Coord]) {
    out.extend_from_slice(&(ring.len() as u32).to_le_bytes());
    for c in ring {
        write_coord(out, c);
    }
}

/// Encodes `geom` as little-endian WKB (spec.md GLOSSARY "WKB").
pub fn encode_wkb(geom: &Geometry) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_into(&mut out, geom)?;
    Ok(out)
}

fn encode_into(out: &mut Vec<u8>, geom: &Geometry) -> Result<()> {
    let z = has_z(geom)?;
    let type_code = |base: u32| if z { base + WKB_Z_OFFSET } else { base };

    out.push(1); // byte order: little-endian
    match geom {
        Geometry::Point(c) => {
            out.extend_from_slice(&type_code(WKB_POINT).to_le_bytes());
            write_coord(out, c);
        }
        Geometry::LineString(coords) => {
            out.extend_from_slice(&type_code(WKB_LINESTRING).to_le_bytes());
            write_ring(out, coords);
        }
        Geometry::Polygon(rings) => {
            out.extend_from_slice(&type_code(WKB_POLYGON).to_le_bytes());
            out.extend_from_slice(&(rings.len() as u32).to_le_bytes());
            for ring in rings {
                write_ring(out, ring);
            }
        }
        Geometry::MultiPoint(coords) => {
            out.extend_from_slice(&type_code(WKB_MULTIPOINT).to_le_bytes());
            out.extend_from_slice(&(coords.len() as u32).to_le_bytes());
            for c in coords {
                out.push(1);
                out.extend_from_slice(&type_code(WKB_POINT).to_le_bytes());
                write_coord(out, c);
            }
        }
        Geometry::MultiLineString(lines) => {
            out.extend_from_slice(&type_code(WKB_MULTILINESTRING).to_le_bytes());
            out.extend_from_slice(&(lines.len() as u32).to_le_bytes());
            for line in lines {
                out.push(1);
                out.extend_from_slice(&type_code(WKB_LINESTRING).to_le_bytes());
                write_ring(out, line);
            }
        }
        Geometry::MultiPolygon(polys) => {
            out.extend_from_slice(&type_code(WKB_MULTIPOLYGON).to_le_bytes());
            out.extend_from_slice(&(polys.len() as u32).to_le_bytes());
            for rings in polys {
                out.push(1);
                out.extend_from_slice(&type_code(WKB_POLYGON).to_le_bytes());
                out.extend_from_slice(&(rings.len() as u32).to_le_bytes());
                for ring in rings {
                    write_ring(out, ring);
                }
            }
        }
        Geometry::GeometryCollection(parts) => {
            out.extend_from_slice(&type_code(WKB_GEOMETRYCOLLECTION).to_le_bytes());
            out.extend_from_slice(&(parts.len() as u32).to_le_bytes());
            for part in parts {
                encode_into(out, part)?;
            }
        }
    }
    Ok(())
}

/// `{xmin, ymin, xmax, ymax[, zmin, zmax]}`, the bbox shape GeoParquet
/// column metadata carries per column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub zmin: Option<f64>,
    pub zmax: Option<f64>,
}

impl BoundingBox {
    fn from_coord(c: &Coord) -> Self {
        Self {
            xmin: c.x,
            ymin: c.y,
            xmax: c.x,
            ymax: c.y,
            zmin: c.z,
            zmax: c.z,
        }
    }

    fn extend(&mut self, c: &Coord) {
        self.xmin = self.xmin.min(c.x);
        self.ymin = self.ymin.min(c.y);
        self.xmax = self.xmax.max(c.x);
        self.ymax = self.ymax.max(c.y);
        if let Some(z) = c.z {
            self.zmin = Some(self.zmin.map_or(z, |cur| cur.min(z)));
            self.zmax = Some(self.zmax.map_or(z, |cur| cur.max(z)));
        }
    }

    fn merge(&mut self, other: &BoundingBox) {
        self.xmin = self.xmin.min(other.xmin);
        self.ymin = self.ymin.min(other.ymin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymax = self.ymax.max(other.ymax);
        if let Some(z) = other.zmin {
            self.zmin = Some(self.zmin.map_or(z, |cur| cur.min(z)));
        }
        if let Some(z) = other.zmax {
            self.zmax = Some(self.zmax.map_or(z, |cur| cur.max(z)));
        }
    }
}

fn geometry_type_name(geom: &Geometry, z: bool) -> String {
    let base = match geom {
        Geometry::Point(_) => "Point",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    };
    if z {
        format!("{base} Z")
    } else {
        base.to_string()
    }
}

fn all_coords(geom: &Geometry, out: &mut Vec<Coord>) {
    match geom {
        Geometry::Point(c) => out.push(*c),
        Geometry::LineString(cs) | Geometry::MultiPoint(cs) => out.extend(cs),
        Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
            for ring in rings {
                out.extend(ring);
            }
        }
        Geometry::MultiPolygon(polys) => {
            for rings in polys {
                for ring in rings {
                    out.extend(ring);
                }
            }
        }
        Geometry::GeometryCollection(parts) => {
            for part in parts {
                all_coords(part, out);
            }
        }
    }
}

/// Per-column bbox + distinct geometry-type accumulator, the
/// GeoParquet column-metadata shape (`bbox`, `geometry_types`).
#[derive(Debug, Clone, Default)]
pub struct GeometryStatistics {
    pub bbox: Option<BoundingBox>,
    pub geometry_types: BTreeSet<String>,
}

impl GeometryStatistics {
    pub fn observe(&mut self, geom: &Geometry) -> Result<()> {
        let z = has_z(geom)?;
        self.geometry_types.insert(geometry_type_name(geom, z));

        let mut coords = Vec::new();
        all_coords(geom, &mut coords);
        for c in &coords {
            match &mut self.bbox {
                None => self.bbox = Some(BoundingBox::from_coord(c)),
                Some(bbox) => bbox.extend(c),
            }
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &GeometryStatistics) {
        self.geometry_types.extend(other.geometry_types.iter().cloned());
        match (&mut self.bbox, &other.bbox) {
            (Some(bbox), Some(other_bbox)) => bbox.merge(other_bbox),
            (None, Some(other_bbox)) => self.bbox = Some(*other_bbox),
            _ => {}
        }
    }
}
