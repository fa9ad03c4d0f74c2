//! Genomic region and variant matching
//!
//! Regions are closed 1-based intervals. A stored feature overlaps a query
//! region when it sits on the same chromosome, starts at or before the
//! region end and ends at or after the region start.
//!
//! Point variants and copy-number variants are matched by separate code
//! paths. A copy-number query matches a stored structural variant when each
//! of its breakpoint confidence intervals intersects the stored one, bounds
//! included. Stored documents without confidence intervals never match a
//! copy-number query.

use cellbase_common::{ConfidenceInterval, Region, VariantSpec};

use super::schema::{RegionPaths, VariantPaths};
use super::{Bound, EntitySchema, Predicate};
use crate::error::QueryBuildError;

/// OR of one overlap clause per region
pub fn regions_predicate(
    schema: &EntitySchema,
    regions: &[Region],
) -> Result<Predicate, QueryBuildError> {
    let paths = schema
        .region
        .ok_or_else(|| QueryBuildError::unsupported(schema.kind, "region queries"))?;
    Ok(Predicate::or(
        regions.iter().map(|region| overlap(&paths, region)).collect(),
    ))
}

fn overlap(paths: &RegionPaths, region: &Region) -> Predicate {
    let chromosome = Predicate::eq(paths.chromosome, region.chromosome.as_str());
    if region.is_whole_chromosome() {
        return chromosome;
    }
    Predicate::and(vec![
        chromosome,
        Predicate::range(paths.start, None, Some(Bound::inclusive(region.end))),
        Predicate::range(paths.end, Some(Bound::inclusive(region.start)), None),
    ])
}

pub fn variant_predicate(
    schema: &EntitySchema,
    variant: &VariantSpec,
) -> Result<Predicate, QueryBuildError> {
    let paths = schema
        .variant
        .ok_or_else(|| QueryBuildError::unsupported(schema.kind, "variant matching"))?;
    Ok(if variant.is_copy_number() {
        let interval = variant
            .sv
            .unwrap_or_else(|| ConfidenceInterval::exact(variant.start, variant.end));
        copy_number_match(&paths, variant, &interval)
    } else {
        point_match(&paths, variant)
    })
}

/// Exact position and alleles
fn point_match(paths: &VariantPaths, variant: &VariantSpec) -> Predicate {
    Predicate::and(vec![
        Predicate::eq(paths.chromosome, variant.chromosome.as_str()),
        Predicate::eq(paths.start, variant.start),
        Predicate::eq(paths.reference, variant.reference.as_str()),
        Predicate::eq(paths.alternate, variant.alternate.as_str()),
    ])
}

fn copy_number_match(
    paths: &VariantPaths,
    variant: &VariantSpec,
    ci: &ConfidenceInterval,
) -> Predicate {
    let at_most = |path: &str, value: i64| Predicate::range(path, None, Some(Bound::inclusive(value)));
    let at_least = |path: &str, value: i64| Predicate::range(path, Some(Bound::inclusive(value)), None);

    Predicate::and(vec![
        Predicate::eq(paths.chromosome, variant.chromosome.as_str()),
        at_most(paths.ci_start_left, ci.ci_start_right),
        at_least(paths.ci_start_right, ci.ci_start_left),
        at_most(paths.ci_end_left, ci.ci_end_right),
        at_least(paths.ci_end_right, ci.ci_end_left),
        Predicate::eq(paths.reference, variant.reference.as_str()),
        Predicate::eq(paths.alternate, variant.alternate.as_str()),
    ])
}
