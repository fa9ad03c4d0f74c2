use super::Region;
use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder for an empty allele in the textual form
const EMPTY_ALLELE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariantType {
    Snv,
    Mnv,
    Indel,
    Cnv,
}

impl VariantType {
    pub const ALL: [VariantType; 4] = [
        VariantType::Snv,
        VariantType::Mnv,
        VariantType::Indel,
        VariantType::Cnv,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VariantType::Snv => "SNV",
            VariantType::Mnv => "MNV",
            VariantType::Indel => "INDEL",
            VariantType::Cnv => "CNV",
        }
    }
}

/// Uncertainty windows around the two breakpoints of a structural variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub ci_start_left: i64,
    pub ci_start_right: i64,
    pub ci_end_left: i64,
    pub ci_end_right: i64,
}

impl ConfidenceInterval {
    /// Degenerate interval for exactly known breakpoints
    pub fn exact(start: i64, end: i64) -> Self {
        Self {
            ci_start_left: start,
            ci_start_right: start,
            ci_end_left: end,
            ci_end_right: end,
        }
    }
}

/// A variant identified by position and alleles
///
/// Point variants are written `chr:pos:ref:alt`, with `-` for an empty
/// allele. Copy-number variants carry a symbolic alternate such as `<CN3>`
/// and a breakpoint range: `chr:start-end:ref:<CN3>`. Either breakpoint may
/// carry its confidence interval, as in `1:1000<990..1010>-2000<1995..2005>:N:<CN0>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSpec {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub reference: String,
    pub alternate: String,
    #[serde(rename = "type")]
    pub variant_type: VariantType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sv: Option<ConfidenceInterval>,
}

impl VariantSpec {
    pub fn point(
        chromosome: impl Into<String>,
        start: i64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Result<Self> {
        let chromosome = chromosome.into();
        let reference = reference.into();
        let alternate = alternate.into();

        if is_copy_number(&alternate) {
            return Err(CommonError::invalid_variant(
                format!("{chromosome}:{start}:{reference}:{alternate}"),
                "copy-number alternates need a breakpoint range",
            ));
        }

        let variant_type = match (reference.len(), alternate.len()) {
            (1, 1) => VariantType::Snv,
            (r, a) if r == a => VariantType::Mnv,
            _ => VariantType::Indel,
        };
        let end = i64::try_from(reference.len().saturating_sub(1))
            .ok()
            .and_then(|span| start.checked_add(span))
            .ok_or_else(|| {
                CommonError::invalid_variant(
                    format!("{chromosome}:{start}:{reference}:{alternate}"),
                    "position out of range",
                )
            })?;

        let spec = Self {
            chromosome,
            start,
            end,
            reference,
            alternate,
            variant_type,
            sv: None,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn copy_number(
        chromosome: impl Into<String>,
        interval: ConfidenceInterval,
        start: i64,
        end: i64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Result<Self> {
        let spec = Self {
            chromosome: chromosome.into(),
            start,
            end,
            reference: reference.into(),
            alternate: alternate.into(),
            variant_type: VariantType::Cnv,
            sv: Some(interval),
        };
        if !is_copy_number(&spec.alternate) {
            return Err(CommonError::invalid_variant(
                spec.to_string(),
                "breakpoint ranges need a copy-number alternate such as <CN3>",
            ));
        }
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a comma separated list of variants
    pub fn parse_list(input: &str) -> Result<Vec<VariantSpec>> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }

    pub fn is_copy_number(&self) -> bool {
        self.variant_type == VariantType::Cnv
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: &str| Err(CommonError::invalid_variant(self.to_string(), reason));

        if self.chromosome.is_empty() || self.chromosome.chars().any(char::is_whitespace) {
            return fail("malformed chromosome name");
        }
        if self.start < 1 || self.end < self.start {
            return fail("invalid coordinates");
        }
        if self.end > Region::MAX_END {
            return fail("position out of range");
        }
        if self.reference.is_empty() && self.alternate.is_empty() {
            return fail("reference and alternate are both empty");
        }
        if let Some(ci) = &self.sv {
            if ci.ci_start_left > ci.ci_start_right || ci.ci_end_left > ci.ci_end_right {
                return fail("confidence interval bounds are reversed");
            }
            if !(ci.ci_start_left..=ci.ci_start_right).contains(&self.start)
                || !(ci.ci_end_left..=ci.ci_end_right).contains(&self.end)
            {
                return fail("breakpoint lies outside its confidence interval");
            }
        }
        Ok(())
    }
}

fn is_copy_number(allele: &str) -> bool {
    let upper = allele.to_ascii_uppercase();
    upper == "<CNV>"
        || upper
            .strip_prefix("<CN")
            .and_then(|rest| rest.strip_suffix('>'))
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn allele(raw: &str) -> String {
    if raw == EMPTY_ALLELE {
        String::new()
    } else {
        raw.to_string()
    }
}

/// Parses `pos` or `pos<left..right>` into the position and its window
fn breakpoint(input: &str, raw: &str) -> Result<(i64, i64, i64)> {
    let bad = || CommonError::invalid_variant(input, format!("malformed breakpoint '{raw}'"));
    let number = |v: &str| v.trim().parse::<i64>().map_err(|_| bad());

    match raw.split_once('<') {
        None => {
            let pos = number(raw)?;
            Ok((pos, pos, pos))
        },
        Some((pos, window)) => {
            let window = window.strip_suffix('>').ok_or_else(bad)?;
            let (left, right) = window.split_once("..").ok_or_else(bad)?;
            Ok((number(pos)?, number(left)?, number(right)?))
        },
    }
}

impl FromStr for VariantSpec {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parts: Vec<&str> = s.split(':').collect();
        let [chromosome, position, reference, alternate] = parts.as_slice() else {
            return Err(CommonError::invalid_variant(
                s,
                "expected chromosome:position:reference:alternate",
            ));
        };

        if is_copy_number(alternate) {
            let (start_raw, end_raw) = position.split_once('-').ok_or_else(|| {
                CommonError::invalid_variant(s, "copy-number variants need start-end")
            })?;
            let (start, ci_start_left, ci_start_right) = breakpoint(s, start_raw)?;
            let (end, ci_end_left, ci_end_right) = breakpoint(s, end_raw)?;
            let interval = ConfidenceInterval {
                ci_start_left,
                ci_start_right,
                ci_end_left,
                ci_end_right,
            };
            return VariantSpec::copy_number(
                *chromosome,
                interval,
                start,
                end,
                allele(reference),
                *alternate,
            );
        }

        let start = position
            .parse::<i64>()
            .map_err(|_| CommonError::invalid_variant(s, format!("'{position}' is not a position")))?;
        VariantSpec::point(*chromosome, start, allele(reference), allele(alternate))
    }
}

impl fmt::Display for VariantSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |a: &str| if a.is_empty() { EMPTY_ALLELE.to_string() } else { a.to_string() };

        match &self.sv {
            None => write!(
                f,
                "{}:{}:{}:{}",
                self.chromosome,
                self.start,
                show(&self.reference),
                show(&self.alternate)
            ),
            Some(ci) => {
                write!(f, "{}:", self.chromosome)?;
                write_breakpoint(f, self.start, ci.ci_start_left, ci.ci_start_right)?;
                f.write_str("-")?;
                write_breakpoint(f, self.end, ci.ci_end_left, ci.ci_end_right)?;
                write!(f, ":{}:{}", show(&self.reference), self.alternate)
            },
        }
    }
}

fn write_breakpoint(f: &mut fmt::Formatter<'_>, pos: i64, left: i64, right: i64) -> fmt::Result {
    if left == pos && right == pos {
        write!(f, "{pos}")
    } else {
        write!(f, "{pos}<{left}..{right}>")
    }
}
