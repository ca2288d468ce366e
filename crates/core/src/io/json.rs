//! JSON point-set reading/writing
//!
//! A point set is an array of objects with one numeric field per axis
//! name plus an optional value field:
//!
//! ```json
//! [
//!     { "x": 8, "y": 34, "value": 89.6548 },
//!     { "x": -3, "y": 0 }
//! ]
//! ```
//!
//! A missing or non-numeric coordinate discards the whole batch. Unless
//! the `allow-duplicate-points` feature is enabled, tolerance-equal
//! duplicates are dropped and the first occurrence wins.

#[cfg(not(feature = "allow-duplicate-points"))]
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value as Json;

use crate::error::{Error, Result};
use crate::numeric::{convert, Coord, Value};
use crate::point::Point;

/// Read a point set from a JSON file.
///
/// The top-level value must be a non-empty array of objects supplying
/// every axis in `axis_names` as a number. The value field is optional
/// and defaults to zero.
pub fn read_points<C, V, const N: usize, P>(
    path: P,
    axis_names: &[&str; N],
    value_name: &str,
) -> Result<Vec<Point<C, V, N>>>
where
    C: Coord,
    V: Value,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    let data: Json = serde_json::from_reader(BufReader::new(file))?;

    let objects = match data.as_array() {
        Some(array) if !array.is_empty() => array,
        _ => {
            return Err(Error::InvalidPointSet(
                "expected a non-empty array of points".into(),
            ))
        }
    };

    let mut points: Vec<Point<C, V, N>> = Vec::with_capacity(objects.len());

    // Indices into `points`, kept sorted under the lexicographic
    // tolerance order; an equivalent entry marks a duplicate.
    #[cfg(not(feature = "allow-duplicate-points"))]
    let mut unique: Vec<usize> = Vec::with_capacity(objects.len());

    for object in objects {
        let map = object.as_object().ok_or_else(|| {
            Error::InvalidPointSet("expected an object for every point".into())
        })?;

        let mut coords = [C::default(); N];
        for (coord, name) in coords.iter_mut().zip(axis_names) {
            let number = map.get(*name).and_then(Json::as_f64).ok_or_else(|| {
                Error::InvalidPointSet(format!("missing numeric coordinate {name:?}"))
            })?;

            *coord = convert(number);
        }

        let value: V = map
            .get(value_name)
            .and_then(Json::as_f64)
            .map(convert)
            .unwrap_or_default();

        let point = Point::new(coords, value);

        #[cfg(not(feature = "allow-duplicate-points"))]
        {
            let position = unique.binary_search_by(|&index| lex_cmp(&points[index], &point));
            match position {
                Ok(_) => continue,
                Err(slot) => unique.insert(slot, points.len()),
            }
        }

        points.push(point);
    }

    Ok(points)
}

/// Ordering induced by the lexicographic tolerance comparison:
/// neither-less means equivalent.
#[cfg(not(feature = "allow-duplicate-points"))]
fn lex_cmp<C: Coord, V: Value, const N: usize>(
    a: &Point<C, V, N>,
    b: &Point<C, V, N>,
) -> Ordering {
    if a.less_lex(b) {
        Ordering::Less
    } else if b.less_lex(a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// Write a point set as a JSON array mirroring the input schema.
///
/// `indent` is the number of spaces per level; a negative value emits
/// compact output.
pub fn write_points<C, V, const N: usize, P>(
    path: P,
    points: &[Point<C, V, N>],
    indent: i64,
    axis_names: &[&str; N],
    value_name: &str,
) -> Result<()>
where
    C: Coord,
    V: Value,
    P: AsRef<Path>,
{
    let mut array = Vec::with_capacity(points.len());
    for point in points {
        let mut object = serde_json::Map::with_capacity(N + 1);
        for (name, coord) in axis_names.iter().zip(point.coords()) {
            object.insert((*name).to_string(), coord.to_json());
        }
        object.insert(value_name.to_string(), point.value().to_json());

        array.push(Json::Object(object));
    }

    let array = Json::Array(array);

    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    if indent >= 0 {
        let spaces = vec![b' '; indent as usize];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&spaces);
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        array.serialize(&mut serializer)?;
    } else {
        serde_json::to_writer(&mut writer, &array)?;
    }

    writer.flush()?;

    Ok(())
}
