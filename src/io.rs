//! Plain-text hit and tower files.
//!
//! Hit file: one step per line
//!
//! ```text
//! # event layer hit_id  x0 y0 z0  x1 y1 z1  edep [light_yield]
//! 0 1 17  0.0 1000.0 3.0  -17.0 1000.0 4.0  0.4
//! ```
//!
//! with lengths in mm and energies in GeV. Blank lines and lines starting
//! with `#` are ignored. Consecutive lines with the same event number make up
//! one event.
//!
//! Tower file: `event layer bin1 bin2 energy`, one calibrated tower per line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use geometry::Point3;
use units::mm;

use crate::{EventId, LayerId};
use crate::deposit::StepHit;
use crate::pipeline::{Event, EventOutput};
use crate::tower::{Tower, TowerKey};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount { line: usize, expected: &'static str, found: usize },

    #[error("line {line}: cannot parse {field} from `{text}`")]
    BadField { line: usize, field: &'static str, text: String },
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("couldn't open `{path}`")]
    Open { path: PathBuf, #[source] source: std::io::Error },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn field<T: FromStr>(line: usize, name: &'static str, text: &str) -> Result<T, ParseError> {
    text.parse().map_err(|_| ParseError::BadField { line, field: name, text: text.into() })
}

fn is_blank_or_comment(text: &str) -> bool {
    let text = text.trim_start();
    text.is_empty() || text.starts_with('#')
}

/// Parse one line of a hit file. `line` (1-based) is used only in error
/// messages. Blank and comment lines give `Ok(None)`.
pub fn parse_hit(line: usize, text: &str) -> Result<Option<(EventId, StepHit)>, ParseError> {
    if is_blank_or_comment(text) { return Ok(None) }
    let f: Vec<&str> = text.split_whitespace().collect();
    if !(f.len() == 10 || f.len() == 11) {
        return Err(ParseError::FieldCount { line, expected: "10 or 11", found: f.len() })
    }
    let len = |i: usize, name: &'static str| field::<f64>(line, name, f[i]).map(mm);
    let event = field(line, "event" , f[0])?;
    let hit = StepHit {
        layer : field(line, "layer" , f[1])?,
        hit_id: field(line, "hit_id", f[2])?,
        entry : Point3::new(len(3, "x0")?, len(4, "y0")?, len(5, "z0")?),
        exit  : Point3::new(len(6, "x1")?, len(7, "y1")?, len(8, "z1")?),
        edep  : field(line, "edep"  , f[9])?,
        light_yield: f.get(10).map(|t| field(line, "light_yield", t)).transpose()?,
    };
    Ok(Some((event, hit)))
}

/// Read hits, grouping consecutive lines with equal event numbers into events
pub fn read_events_from(reader: impl BufRead) -> Result<Vec<Event>, ReadError> {
    let mut events: Vec<Event> = vec![];
    for (n, text) in reader.lines().enumerate() {
        let Some((id, hit)) = parse_hit(n + 1, &text?)? else { continue };
        match events.last_mut() {
            Some(event) if event.id == id => event.hits.push(hit),
            _ => events.push(Event { id, hits: vec![hit] }),
        }
    }
    Ok(events)
}

pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<Event>, ReadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReadError::Open { path: path.into(), source })?;
    read_events_from(BufReader::new(file))
}

pub fn write_towers_to(mut writer: impl Write, outputs: &[EventOutput]) -> std::io::Result<()> {
    writeln!(writer, "# event layer bin1 bin2 energy")?;
    for out in outputs {
        for Tower { key: TowerKey { layer, bin1, bin2 }, energy } in &out.calibrated {
            writeln!(writer, "{} {layer} {bin1} {bin2} {energy}", out.id)?;
        }
    }
    writer.flush()
}

pub fn write_towers(path: impl AsRef<Path>, outputs: &[EventOutput]) -> std::io::Result<()> {
    write_towers_to(BufWriter::new(File::create(path)?), outputs)
}

/// Read back a tower file written by `write_towers`
pub fn read_towers_from(reader: impl BufRead) -> Result<Vec<(EventId, Tower)>, ReadError> {
    let mut towers = vec![];
    for (n, text) in reader.lines().enumerate() {
        let (line, text) = (n + 1, text?);
        if is_blank_or_comment(&text) { continue }
        let f: Vec<&str> = text.split_whitespace().collect();
        if f.len() != 5 {
            return Err(ParseError::FieldCount { line, expected: "5", found: f.len() }.into())
        }
        let event: EventId = field(line, "event", f[0])?;
        let layer: LayerId = field(line, "layer", f[1])?;
        let key = TowerKey::new(layer, field(line, "bin1", f[2])?, field(line, "bin2", f[3])?);
        towers.push((event, Tower { key, energy: field(line, "energy", f[4])? }));
    }
    Ok(towers)
}
