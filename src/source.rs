//! Result sources: where the dashboard's numbers come from.
//!
//! Two implementations of one trait, selected at startup. `FileSource`
//! reads the four upstream artifacts from a base directory, substituting
//! the synthetic counterpart for any artifact that is absent; a file that
//! exists but fails validation is an error, never silently replaced.
//! `SyntheticSource` always returns the built-in bundle.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::LoadError;
use crate::model::{
    validate_ab_results, validate_funnel, BusinessImpactRecord, CohortFunnel, FunnelStep,
    ResultBundle, SegmentResult, AB_COLUMNS, COHORT_FUNNEL_COLUMNS, FUNNEL_COLUMNS,
};
use crate::synthetic;

pub const BUSINESS_IMPACT_FILE: &str = "business_impact.json";
pub const AB_RESULTS_FILE: &str = "ab_test_results.csv";
pub const FUNNEL_OVERALL_FILE: &str = "funnel_metrics_overall.csv";
pub const FUNNEL_COHORT_FILE: &str = "funnel_metrics_by_cohort.csv";

/// Where one artifact's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactOrigin {
    File,
    Synthetic,
}

/// Load provenance for one artifact, shown in the Methodology view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub artifact: String,
    pub origin: ArtifactOrigin,
    /// Path the loader looked at; present even for synthetic substitutes.
    pub path: String,
    /// SHA-256 of the file contents; absent for synthetic substitutes.
    pub sha256: Option<String>,
    /// Data rows (records for the JSON artifact).
    pub rows: usize,
}

/// A loaded bundle together with per-artifact provenance.
#[derive(Debug, Clone)]
pub struct LoadedResults {
    pub bundle: ResultBundle,
    pub manifest: Vec<ArtifactManifest>,
}

/// An injected source of result data.
pub trait ResultSource {
    fn load(&self) -> Result<LoadedResults, LoadError>;
}

/// Always returns the built-in bundle. Used by `--synthetic` and by tests.
#[derive(Debug, Default)]
pub struct SyntheticSource;

impl ResultSource for SyntheticSource {
    fn load(&self) -> Result<LoadedResults, LoadError> {
        let bundle = synthetic::bundle();
        let manifest = vec![
            synthetic_manifest(BUSINESS_IMPACT_FILE, 2),
            synthetic_manifest(AB_RESULTS_FILE, bundle.ab_results.len()),
            synthetic_manifest(FUNNEL_OVERALL_FILE, bundle.funnel_overall.len()),
            synthetic_manifest(
                FUNNEL_COHORT_FILE,
                bundle.funnel_cohort.iter().map(|c| c.steps.len()).sum(),
            ),
        ];
        Ok(LoadedResults { bundle, manifest })
    }
}

fn synthetic_manifest(artifact: &str, rows: usize) -> ArtifactManifest {
    ArtifactManifest {
        artifact: artifact.into(),
        origin: ArtifactOrigin::Synthetic,
        path: artifact.into(),
        sha256: None,
        rows,
    }
}

/// Reads artifacts from `base_dir`, falling back per-artifact to the
/// synthetic counterpart when a file is missing.
#[derive(Debug, Clone)]
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl ResultSource for FileSource {
    fn load(&self) -> Result<LoadedResults, LoadError> {
        let mut manifest = Vec::with_capacity(4);

        let business_impact = load_artifact(
            &self.base_dir.join(BUSINESS_IMPACT_FILE),
            &mut manifest,
            parse_business_impact,
        )?;
        let ab_results =
            load_artifact(&self.base_dir.join(AB_RESULTS_FILE), &mut manifest, parse_ab_results)?;
        let funnel_overall =
            load_artifact(&self.base_dir.join(FUNNEL_OVERALL_FILE), &mut manifest, parse_funnel)?;
        let funnel_cohort = load_artifact(
            &self.base_dir.join(FUNNEL_COHORT_FILE),
            &mut manifest,
            parse_cohort_funnel,
        )?;

        for row in &ab_results {
            if !row.significance_consistent() {
                log::warn!(
                    "segment {}: significant={} disagrees with p_value={}",
                    row.segment,
                    row.significant,
                    row.p_value
                );
            }
        }

        let substituted = manifest
            .iter()
            .filter(|m| m.origin == ArtifactOrigin::Synthetic)
            .count();
        log::info!(
            "loaded {} artifacts from {} ({} synthetic substitutes)",
            manifest.len(),
            self.base_dir.display(),
            substituted
        );

        Ok(LoadedResults {
            bundle: ResultBundle {
                business_impact,
                ab_results,
                funnel_overall,
                funnel_cohort,
            },
            manifest,
        })
    }
}

/// Load one artifact: parse the file when present, otherwise substitute the
/// synthetic value. Parse failures on a present file propagate.
fn load_artifact<T: SyntheticDefault>(
    path: &Path,
    manifest: &mut Vec<ArtifactManifest>,
    parse: impl FnOnce(&Path) -> Result<(T, usize), LoadError>,
) -> Result<T, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    if path.exists() {
        let (value, rows) = parse(path)?;
        manifest.push(ArtifactManifest {
            artifact: name,
            origin: ArtifactOrigin::File,
            path: path.display().to_string(),
            sha256: Some(file_sha256(path)?),
            rows,
        });
        Ok(value)
    } else {
        log::warn!("{} not found, using synthetic data", path.display());
        let (value, rows) = T::synthetic_default();
        manifest.push(ArtifactManifest {
            artifact: name,
            origin: ArtifactOrigin::Synthetic,
            path: path.display().to_string(),
            sha256: None,
            rows,
        });
        Ok(value)
    }
}

/// The synthetic substitute for each artifact type.
trait SyntheticDefault: Sized {
    fn synthetic_default() -> (Self, usize);
}

impl SyntheticDefault for BusinessImpactRecord {
    fn synthetic_default() -> (Self, usize) {
        (synthetic::business_impact(), 2)
    }
}

impl SyntheticDefault for Vec<SegmentResult> {
    fn synthetic_default() -> (Self, usize) {
        let v = synthetic::ab_results();
        let n = v.len();
        (v, n)
    }
}

impl SyntheticDefault for Vec<FunnelStep> {
    fn synthetic_default() -> (Self, usize) {
        let v = synthetic::funnel_overall();
        let n = v.len();
        (v, n)
    }
}

impl SyntheticDefault for Vec<CohortFunnel> {
    fn synthetic_default() -> (Self, usize) {
        let v = synthetic::funnel_cohort();
        let n = v.iter().map(|c| c.steps.len()).sum();
        (v, n)
    }
}

fn read_to_string(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_business_impact(path: &Path) -> Result<(BusinessImpactRecord, usize), LoadError> {
    let content = read_to_string(path)?;
    let record: BusinessImpactRecord = serde_json::from_str(&content)
        .map_err(|e| LoadError::malformed(path, e.to_string()))?;
    for (period, p) in [("daily", &record.daily), ("monthly", &record.monthly)] {
        for (field, v) in [
            ("additional_creators", p.additional_creators),
            ("additional_reels", p.additional_reels),
            ("additional_watch_time_hours", p.additional_watch_time_hours),
            ("additional_revenue", p.additional_revenue),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(LoadError::malformed(
                    path,
                    format!("{}.{} is {} (must be a non-negative number)", period, field, v),
                ));
            }
        }
    }
    Ok((record, 2))
}

/// Split a CSV into its header and data rows, skipping blanks and `#`
/// comments. The header must match `expected` exactly.
fn csv_rows<'a>(
    path: &Path,
    content: &'a str,
    expected: &[&str],
) -> Result<Vec<(usize, Vec<&'a str>)>, LoadError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let (_, header) = lines
        .next()
        .ok_or_else(|| LoadError::malformed(path, "file is empty"))?;
    let got: Vec<&str> = header.split(',').map(str::trim).collect();
    if got != expected {
        return Err(LoadError::malformed(
            path,
            format!("header mismatch: got {:?}, expected {:?}", got, expected),
        ));
    }

    let mut rows = Vec::new();
    for (lineno, line) in lines {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != expected.len() {
            return Err(LoadError::malformed(
                path,
                format!(
                    "line {}: expected {} columns, got {}",
                    lineno,
                    expected.len(),
                    fields.len()
                ),
            ));
        }
        rows.push((lineno, fields));
    }
    Ok(rows)
}

fn parse_f64(path: &Path, lineno: usize, name: &str, raw: &str) -> Result<f64, LoadError> {
    raw.parse::<f64>()
        .map_err(|_| LoadError::malformed(path, format!("line {}: bad {}: {:?}", lineno, name, raw)))
}

fn parse_u64(path: &Path, lineno: usize, name: &str, raw: &str) -> Result<u64, LoadError> {
    raw.parse::<u64>()
        .map_err(|_| LoadError::malformed(path, format!("line {}: bad {}: {:?}", lineno, name, raw)))
}

fn parse_bool(path: &Path, lineno: usize, name: &str, raw: &str) -> Result<bool, LoadError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(LoadError::malformed(
            path,
            format!("line {}: bad {}: {:?}", lineno, name, raw),
        )),
    }
}

fn parse_ab_results(path: &Path) -> Result<(Vec<SegmentResult>, usize), LoadError> {
    let content = read_to_string(path)?;
    let mut out = Vec::new();
    for (lineno, f) in csv_rows(path, &content, &AB_COLUMNS)? {
        out.push(SegmentResult {
            segment: f[0].to_string(),
            control_mean: parse_f64(path, lineno, "control_mean", f[1])?,
            treatment_mean: parse_f64(path, lineno, "treatment_mean", f[2])?,
            relative_lift: parse_f64(path, lineno, "relative_lift", f[3])?,
            p_value: parse_f64(path, lineno, "p_value", f[4])?,
            significant: parse_bool(path, lineno, "significant", f[5])?,
        });
    }
    validate_ab_results(&out).map_err(|reason| LoadError::malformed(path, reason))?;
    let n = out.len();
    Ok((out, n))
}

fn funnel_step(path: &Path, lineno: usize, f: &[&str]) -> Result<FunnelStep, LoadError> {
    Ok(FunnelStep {
        step: f[0].to_string(),
        sessions_reached: parse_u64(path, lineno, "sessions_reached", f[1])?,
        conversion_rate: parse_f64(path, lineno, "conversion_rate", f[2])?,
        dropoff_rate: parse_f64(path, lineno, "dropoff_rate", f[3])?,
    })
}

fn parse_funnel(path: &Path) -> Result<(Vec<FunnelStep>, usize), LoadError> {
    let content = read_to_string(path)?;
    let mut out = Vec::new();
    for (lineno, f) in csv_rows(path, &content, &FUNNEL_COLUMNS)? {
        out.push(funnel_step(path, lineno, &f)?);
    }
    validate_funnel(&out).map_err(|reason| LoadError::malformed(path, reason))?;
    let n = out.len();
    Ok((out, n))
}

fn parse_cohort_funnel(path: &Path) -> Result<(Vec<CohortFunnel>, usize), LoadError> {
    let content = read_to_string(path)?;
    let mut cohorts: Vec<CohortFunnel> = Vec::new();
    let mut rows = 0usize;
    for (lineno, f) in csv_rows(path, &content, &COHORT_FUNNEL_COLUMNS)? {
        let cohort = f[0].to_string();
        let step = funnel_step(path, lineno, &f[1..])?;
        match cohorts.last_mut() {
            Some(c) if c.cohort == cohort => c.steps.push(step),
            _ => {
                if cohorts.iter().any(|c| c.cohort == cohort) {
                    return Err(LoadError::malformed(
                        path,
                        format!("line {}: cohort {} rows are not contiguous", lineno, cohort),
                    ));
                }
                cohorts.push(CohortFunnel {
                    cohort,
                    steps: vec![step],
                });
            }
        }
        rows += 1;
    }
    if cohorts.is_empty() {
        return Err(LoadError::malformed(path, "file has no data rows"));
    }
    for c in &cohorts {
        validate_funnel(&c.steps)
            .map_err(|reason| LoadError::malformed(path, format!("cohort {}: {}", c.cohort, reason)))?;
    }
    Ok((cohorts, rows))
}

/// SHA-256 of a file's contents, streamed in 8 KiB chunks.
pub fn file_sha256(path: &Path) -> Result<String, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_rejects_header_mismatch() {
        let path = Path::new("ab.csv");
        let err = csv_rows(path, "segment,control_mean\nx,0.1\n", &AB_COLUMNS).unwrap_err();
        assert!(err.to_string().contains("header mismatch"), "{}", err);
    }

    #[test]
    fn csv_rows_skips_comments_and_blanks() {
        let path = Path::new("funnel.csv");
        let content = "# upstream export\n\nfunnel_step,sessions_reached,conversion_rate,dropoff_rate\nopened,10,1.0,0.0\n";
        let rows = csv_rows(path, content, &FUNNEL_COLUMNS).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1[0], "opened");
    }

    #[test]
    fn csv_rows_rejects_ragged_rows() {
        let path = Path::new("funnel.csv");
        let content = "funnel_step,sessions_reached,conversion_rate,dropoff_rate\nopened,10,1.0\n";
        let err = csv_rows(path, content, &FUNNEL_COLUMNS).unwrap_err();
        assert!(err.to_string().contains("expected 4 columns"), "{}", err);
    }

    #[test]
    fn bool_parsing_accepts_python_style_literals() {
        let path = Path::new("ab.csv");
        assert!(parse_bool(path, 1, "significant", "True").unwrap());
        assert!(!parse_bool(path, 1, "significant", "false").unwrap());
        assert!(parse_bool(path, 1, "significant", "yes").is_err());
    }

    #[test]
    fn synthetic_source_is_fully_populated() {
        let loaded = SyntheticSource.load().unwrap();
        assert_eq!(loaded.manifest.len(), 4);
        assert!(loaded
            .manifest
            .iter()
            .all(|m| m.origin == ArtifactOrigin::Synthetic));
        assert!(!loaded.bundle.ab_results.is_empty());
        assert!(!loaded.bundle.funnel_overall.is_empty());
        assert!(!loaded.bundle.funnel_cohort.is_empty());
    }
}
