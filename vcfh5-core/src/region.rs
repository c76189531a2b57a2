use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reference::Contig;

/// A genomic region with 1-based inclusive bounds, or a whole contig
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub contig: String,
    pub start: Option<u64>,
    pub stop: Option<u64>,
}

impl Region {
    pub fn new(contig: impl Into<String>, start: u64, stop: u64) -> Self {
        Self {
            contig: contig.into(),
            start: Some(start),
            stop: Some(stop),
        }
    }

    pub fn whole(contig: impl Into<String>) -> Self {
        Self {
            contig: contig.into(),
            start: None,
            stop: None,
        }
    }

    // Regions are in the format [contig] or [contig]:[start]-[stop]. A suffix after the last
    // colon that is not a position range belongs to the contig name, e.g. HLA-A*01:01.
    pub fn parse(region: &str) -> Result<Self> {
        let region = region.trim();
        let parse_err = || Error::RegionParse {
            region: region.into(),
        };

        if region.is_empty() || region.ends_with(':') {
            return Err(parse_err());
        }

        let Some((contig, (start, stop))) = region
            .rsplit_once(':')
            .and_then(|(contig, positions)| Some((contig, position_range(positions)?)))
        else {
            return Ok(Self::whole(region));
        };

        if contig.is_empty() {
            return Err(parse_err());
        }

        let start = parse_position(region, start)?;
        let stop = parse_position(region, stop)?;

        if start == 0 || start > stop {
            return Err(Error::RegionBounds {
                region: region.into(),
            });
        }

        Ok(Self::new(contig, start, stop))
    }

    pub fn bounds(&self) -> Option<(u64, u64)> {
        match (self.start, self.stop) {
            (Some(start), Some(stop)) => Some((start, stop)),
            _ => None,
        }
    }

    /// Filename safe label of the region
    pub fn tag(&self) -> String {
        match self.bounds() {
            Some((start, stop)) => format!("{}_{start}_{stop}", self.contig),
            None => self.contig.clone(),
        }
    }

    /// Split a bounded region into pieces of at most `chunk_size` bases
    pub fn split(&self, chunk_size: u64) -> Result<Vec<Region>> {
        if chunk_size == 0 {
            return Err(Error::ZeroChunkSize);
        }
        match self.bounds() {
            Some((start, stop)) => Ok(chunked(&self.contig, start, stop, chunk_size)),
            None => Ok(vec![self.clone()]),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds() {
            Some((start, stop)) => write!(f, "{}:{start}-{stop}", self.contig),
            None => write!(f, "{}", self.contig),
        }
    }
}

impl std::str::FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Split `start-stop` where both sides are digits with optional thousands separators
fn position_range(positions: &str) -> Option<(&str, &str)> {
    let is_position = |s: &str| {
        s.chars().any(|c| c.is_ascii_digit()) && s.chars().all(|c| c.is_ascii_digit() || c == ',')
    };
    let (start, stop) = positions.split_once('-')?;
    (is_position(start) && is_position(stop)).then_some((start, stop))
}

fn parse_position(region: &str, value: &str) -> Result<u64> {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<u64>().map_err(|_| Error::PosParse {
        region: region.into(),
        value: value.into(),
    })
}

fn chunked(contig: &str, start: u64, stop: u64, chunk_size: u64) -> Vec<Region> {
    let mut regions = vec![];
    let mut from = start;
    while from <= stop {
        let to = stop.min(from.saturating_add(chunk_size - 1));
        regions.push(Region::new(contig, from, to));
        if to == u64::MAX {
            break;
        }
        from = to + 1;
    }
    regions
}

/// Consecutive regions of `chunk_size` covering a contig of `length` bases
pub fn split_contig(contig: &str, length: u64, chunk_size: u64) -> Result<Vec<Region>> {
    if chunk_size == 0 {
        return Err(Error::ZeroChunkSize);
    }
    if length == 0 {
        return Ok(vec![]);
    }
    Ok(chunked(contig, 1, length, chunk_size))
}

/// Explicit regions are split within their own bounds, or over the contig length when the
/// region covers a whole contig of known length. Without explicit regions every contig is split.
pub fn resolve_regions(
    explicit: &[Region],
    contigs: &[Contig],
    chunk_size: u64,
) -> Result<Vec<Region>> {
    if explicit.is_empty() {
        let mut regions = vec![];
        for contig in contigs {
            regions.extend(split_contig(&contig.name, contig.length, chunk_size)?);
        }
        return Ok(regions);
    }

    let mut regions = vec![];
    for region in explicit {
        if region.bounds().is_some() {
            regions.extend(region.split(chunk_size)?);
            continue;
        }

        match contigs.iter().find(|c| c.name == region.contig) {
            Some(contig) => {
                regions.extend(split_contig(&contig.name, contig.length, chunk_size)?)
            }
            None => {
                tracing::debug!("No length known for contig {}, using it whole", region.contig);
                regions.push(region.clone());
            }
        }
    }
    Ok(regions)
}

/// Read regions from a plain list (one region per line) or a BED file.
/// BED coordinates are 0-based half-open and get converted to 1-based inclusive.
pub fn read_regions<R: io::Read>(input: R, bed: bool) -> Result<Vec<Region>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(input);

    let mut regions = vec![];
    for line in rdr.records() {
        let record = line?;
        let first = record.get(0).map(str::trim).unwrap_or_default();
        if first.is_empty() || first.starts_with("track") || first.starts_with("browser") {
            continue;
        }

        if bed && record.len() >= 3 {
            let line = record.iter().take(3).collect::<Vec<_>>().join("\t");
            let start = parse_position(&line, &record[1])?;
            let end = parse_position(&line, &record[2])?;
            if end <= start {
                return Err(Error::RegionBounds { region: line });
            }
            regions.push(Region::new(first, start + 1, end));
        } else {
            regions.push(Region::parse(first)?);
        }
    }
    Ok(regions)
}

#[cfg(test)]
#[rustfmt::skip]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        let region = Region::parse("chr9").unwrap();
        assert_eq!(region, Region::whole("chr9"));

        let region = Region::parse("chr9:1920-2500").unwrap();
        assert_eq!(region, Region::new("chr9", 1920, 2500));

        let region = Region::parse("chr9:1,000-2,000").unwrap();
        assert_eq!(region, Region::new("chr9", 1000, 2000));

        let region = Region::parse("HLA-A*01:01:1-10").unwrap();
        assert_eq!(region, Region::new("HLA-A*01:01", 1, 10));

        assert_eq!(Region::parse("HLA-A*01:01").unwrap(), Region::whole("HLA-A*01:01"));
        assert_eq!(Region::parse("chrUn:KI270742v1").unwrap(), Region::whole("chrUn:KI270742v1"));
        assert_eq!(Region::parse("chr9:1920").unwrap(), Region::whole("chr9:1920"));
        assert_eq!(Region::parse("chr9:1920--2500").unwrap(), Region::whole("chr9:1920--2500"));

        assert!(Region::parse("").is_err());
        assert!(Region::parse("chr9:").is_err());
        assert!(Region::parse(":1-10").is_err());
        assert!(matches!(Region::parse("chr9:1-99999999999999999999"), Err(Error::PosParse { .. })));
        assert!(matches!(Region::parse("chr9:0-10"), Err(Error::RegionBounds { .. })));
        assert!(matches!(Region::parse("chr9:20-10"), Err(Error::RegionBounds { .. })));
    }

    #[test]
    fn test_display_and_tag() {
        let region = Region::new("chr2", 1, 1000);
        assert_eq!(region.to_string(), "chr2:1-1000");
        assert_eq!(region.tag(), "chr2_1_1000");

        let region = Region::whole("chrM");
        assert_eq!(region.to_string(), "chrM");
        assert_eq!(region.tag(), "chrM");
    }

    #[test]
    fn test_split_contig() {
        let regions = split_contig("chr1", 2500, 1000).unwrap();
        let strings: Vec<String> = regions.iter().map(ToString::to_string).collect();
        assert_eq!(strings, vec!["chr1:1-1000", "chr1:1001-2000", "chr1:2001-2500"]);

        let regions = split_contig("chr1", 2000, 1000).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1], Region::new("chr1", 1001, 2000));

        assert!(split_contig("chr1", 0, 1000).unwrap().is_empty());
        assert!(matches!(split_contig("chr1", 10, 0), Err(Error::ZeroChunkSize)));
    }

    #[test]
    fn test_split_region() {
        let regions = Region::new("chr1", 500, 1200).split(300).unwrap();
        let strings: Vec<String> = regions.iter().map(ToString::to_string).collect();
        assert_eq!(strings, vec!["chr1:500-799", "chr1:800-1099", "chr1:1100-1200"]);

        let regions = Region::whole("chr1").split(300).unwrap();
        assert_eq!(regions, vec![Region::whole("chr1")]);
    }

    #[test]
    fn test_resolve_regions() {
        let contigs = vec![
            Contig { name: "chr1".into(), length: 250 },
            Contig { name: "chr2".into(), length: 90 },
        ];

        let regions = resolve_regions(&[], &contigs, 100).unwrap();
        let strings: Vec<String> = regions.iter().map(ToString::to_string).collect();
        assert_eq!(strings, vec!["chr1:1-100", "chr1:101-200", "chr1:201-250", "chr2:1-90"]);

        let explicit = vec![Region::whole("chr2"), Region::whole("chrUn"), Region::new("chr1", 10, 30)];
        let regions = resolve_regions(&explicit, &contigs, 15).unwrap();
        let strings: Vec<String> = regions.iter().map(ToString::to_string).collect();
        assert_eq!(
            strings,
            vec![
                "chr2:1-15", "chr2:16-30", "chr2:31-45", "chr2:46-60", "chr2:61-75", "chr2:76-90",
                "chrUn", "chr1:10-24", "chr1:25-30",
            ]
        );
    }

    #[test]
    fn test_read_regions() {
        let input = "# comment\nchr1:1-100\n\nchr2\nHLA-A*01:01\n";
        let regions = read_regions(input.as_bytes(), false).unwrap();
        assert_eq!(regions, vec![Region::new("chr1", 1, 100), Region::whole("chr2"), Region::whole("HLA-A*01:01")]);

        let input = "track name=foo\nchr1\t0\t100\tname\nchr3\t99\t200\n";
        let regions = read_regions(input.as_bytes(), true).unwrap();
        assert_eq!(regions, vec![Region::new("chr1", 1, 100), Region::new("chr3", 100, 200)]);

        let input = "chr1\t100\t100\n";
        assert!(read_regions(input.as_bytes(), true).is_err());
    }
}
