use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A closed, 1-based genomic interval on one chromosome
///
/// Accepted textual forms are `chr`, `chr:pos` and `chr:start-end`. A bare
/// chromosome spans the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
}

impl Region {
    /// Upper bound used for a whole-chromosome region
    pub const MAX_END: i64 = i32::MAX as i64;

    pub fn new(chromosome: impl Into<String>, start: i64, end: i64) -> Result<Self> {
        let chromosome = chromosome.into();
        let region = Self {
            chromosome,
            start,
            end,
        };
        region.validate()?;
        Ok(region)
    }

    pub fn whole_chromosome(chromosome: impl Into<String>) -> Result<Self> {
        Self::new(chromosome, 1, Self::MAX_END)
    }

    /// Parse a comma separated list such as `1:100-200,2:300-400`
    pub fn parse_list(input: &str) -> Result<Vec<Region>> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }

    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    pub fn is_whole_chromosome(&self) -> bool {
        self.start == 1 && self.end == Self::MAX_END
    }

    /// Inclusive overlap test
    pub fn overlaps(&self, other: &Region) -> bool {
        self.chromosome == other.chromosome && self.start <= other.end && self.end >= other.start
    }

    fn validate(&self) -> Result<()> {
        let text = self.to_string();
        if self.chromosome.is_empty() {
            return Err(CommonError::invalid_region(text, "empty chromosome"));
        }
        if self.chromosome.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(CommonError::invalid_region(text, "malformed chromosome name"));
        }
        if self.start < 1 {
            return Err(CommonError::invalid_region(text, "start must be >= 1"));
        }
        if self.end < self.start {
            return Err(CommonError::invalid_region(text, "end is before start"));
        }
        Ok(())
    }
}

impl FromStr for Region {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((chromosome, coords)) = s.split_once(':') else {
            return Region::whole_chromosome(s);
        };

        let parse = |value: &str| -> Result<i64> {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| CommonError::invalid_region(s, format!("'{value}' is not a position")))
        };

        match coords.split_once('-') {
            Some((start, end)) => Region::new(chromosome, parse(start)?, parse(end)?),
            None => {
                let position = parse(coords)?;
                Region::new(chromosome, position, position)
            },
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole_chromosome() {
            write!(f, "{}", self.chromosome)
        } else if self.start == self.end {
            write!(f, "{}:{}", self.chromosome, self.start)
        } else {
            write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
        }
    }
}
