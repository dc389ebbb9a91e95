//! Declared versions (exact, dynamic, range) and the Maven version ordering.
//!
//! Maven versions use a custom ordering that differs from semver:
//! - Segments are split on `.`, `-`, `_` and on digit/letter transitions
//! - Numeric segments compare as numbers
//! - String qualifiers have a special ordering:
//!   `alpha` < `beta` < `milestone` < `rc` < `snapshot` < `""` (release) < `sp`
//! - SNAPSHOT versions sort before their release equivalent
//!
//! Dynamic (`1.4.+`, `latest.release`) and range (`[1.0,2.0)`) versions are not
//! comparable; they are matched against the concrete versions a repository lists.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use jeka_util::errors::JekaError;
use serde::{Serialize, Serializer};

const LATEST_RELEASE: &str = "latest.release";
const LATEST_INTEGRATION: &str = "latest.integration";

/// A version as declared on a dependency.
#[derive(Debug, Clone)]
pub enum Version {
    /// A literal version such as `1.5.3.RELEASE`.
    Exact(String),
    /// `+`, `1.4.+`, `latest.release` or `latest.integration`.
    Dynamic(String),
    /// A Maven range such as `[1.0,2.0)`.
    Range { text: String, range: VersionRange },
}

impl Version {
    /// Parse a declared version string.
    pub fn parse(input: &str) -> Result<Self, JekaError> {
        let invalid = |reason: &str| JekaError::InvalidVersionFormat {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        if input.is_empty() {
            return Err(invalid("version is empty"));
        }
        if input.chars().any(char::is_whitespace) {
            return Err(invalid("version contains whitespace"));
        }
        if input.starts_with('[') || input.starts_with('(') {
            let range = VersionRange::parse(input)?;
            return Ok(Version::Range {
                text: input.to_string(),
                range,
            });
        }
        if input.contains(['[', ']', '(', ')', ',']) {
            return Err(invalid("unexpected range character outside a range"));
        }
        if input == LATEST_RELEASE || input == LATEST_INTEGRATION {
            return Ok(Version::Dynamic(input.to_string()));
        }
        match input.find('+') {
            Some(pos) if pos == input.len() - 1 => Ok(Version::Dynamic(input.to_string())),
            Some(_) => Err(invalid("'+' is only allowed as the last character")),
            None => Ok(Version::Exact(input.to_string())),
        }
    }

    /// Build an exact version without validation of range syntax.
    pub fn exact(value: impl Into<String>) -> Self {
        Version::Exact(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Version::Exact(v) | Version::Dynamic(v) => v,
            Version::Range { text, .. } => text,
        }
    }

    /// `true` for dynamic markers and ranges: such versions must be resolved
    /// against a repository listing before use.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Version::Exact(_))
    }

    /// Whether `candidate` (a concrete version) satisfies this declaration.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Version::Exact(v) => v == candidate,
            Version::Dynamic(marker) if marker == LATEST_INTEGRATION => true,
            Version::Dynamic(marker) if marker == LATEST_RELEASE => {
                !ComparableVersion::parse(candidate).is_snapshot()
            }
            Version::Dynamic(marker) => {
                let prefix = marker.trim_end_matches('+');
                candidate.starts_with(prefix)
            }
            Version::Range { range, .. } => range.contains(&ComparableVersion::parse(candidate)),
        }
    }

    /// Pick the highest concrete version from `available` that satisfies this
    /// declaration. Exact versions are returned as-is when listed.
    pub fn select<'a>(&self, available: &'a [String]) -> Option<&'a str> {
        available
            .iter()
            .filter(|candidate| self.matches(candidate))
            .max_by(|a, b| ComparableVersion::parse(a).cmp(&ComparableVersion::parse(b)))
            .map(String::as_str)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::str::FromStr for Version {
    type Err = JekaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

/// A parsed concrete version with comparable segments.
#[derive(Debug, Clone)]
pub struct ComparableVersion {
    pub original: String,
    segments: Vec<Segment>,
}

impl PartialEq for ComparableVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ComparableVersion {}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Numeric(u64),
    Qualifier(QualifierKind),
    Text(String),
}

/// Well-known Maven qualifiers with defined ordering.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum QualifierKind {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Release,
    Sp,
}

impl ComparableVersion {
    pub fn parse(version: &str) -> Self {
        Self {
            original: version.to_string(),
            segments: parse_segments(version),
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.original.ends_with("-SNAPSHOT")
    }
}

impl fmt::Display for ComparableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for ComparableVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.segments.len().max(other.segments.len());
        (0..max_len)
            .map(|i| compare_segments(self.segments.get(i), other.segments.get(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for ComparableVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare two concrete version strings with the Maven ordering.
pub fn compare(a: &str, b: &str) -> Ordering {
    ComparableVersion::parse(a).cmp(&ComparableVersion::parse(b))
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (Some(s), None) => compare_segment_to_empty(s),
        (None, Some(s)) => compare_segment_to_empty(s).reverse(),
        (Some(a), Some(b)) => compare_two_segments(a, b),
    }
}

fn compare_segment_to_empty(seg: &Segment) -> Ordering {
    match seg {
        Segment::Numeric(0) => Ordering::Equal,
        Segment::Numeric(_) => Ordering::Greater,
        Segment::Qualifier(q) => q.cmp(&QualifierKind::Release),
        Segment::Text(_) => Ordering::Less,
    }
}

fn compare_two_segments(a: &Segment, b: &Segment) -> Ordering {
    match (a, b) {
        (Segment::Numeric(a), Segment::Numeric(b)) => a.cmp(b),
        (Segment::Qualifier(a), Segment::Qualifier(b)) => a.cmp(b),
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Segment::Numeric(_), _) => Ordering::Greater,
        (_, Segment::Numeric(_)) => Ordering::Less,
        (Segment::Qualifier(q), Segment::Text(_)) => {
            if *q >= QualifierKind::Release {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (Segment::Text(_), Segment::Qualifier(q)) => {
            if *q >= QualifierKind::Release {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
    }
}

fn parse_segments(version: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_is_digit = false;

    for ch in version.chars() {
        if matches!(ch, '.' | '-' | '_') {
            if !current.is_empty() {
                segments.push(classify(&current));
                current.clear();
            }
            continue;
        }
        let is_digit = ch.is_ascii_digit();
        if !current.is_empty() && is_digit != current_is_digit {
            segments.push(classify(&current));
            current.clear();
        }
        current_is_digit = is_digit;
        current.push(ch);
    }
    if !current.is_empty() {
        segments.push(classify(&current));
    }

    segments
}

fn classify(token: &str) -> Segment {
    if let Ok(n) = token.parse::<u64>() {
        return Segment::Numeric(n);
    }
    match token.to_lowercase().as_str() {
        "alpha" | "a" => Segment::Qualifier(QualifierKind::Alpha),
        "beta" | "b" => Segment::Qualifier(QualifierKind::Beta),
        "milestone" | "m" => Segment::Qualifier(QualifierKind::Milestone),
        "rc" | "cr" => Segment::Qualifier(QualifierKind::Rc),
        "snapshot" => Segment::Qualifier(QualifierKind::Snapshot),
        "ga" | "final" | "release" => Segment::Qualifier(QualifierKind::Release),
        "sp" => Segment::Qualifier(QualifierKind::Sp),
        _ => Segment::Text(token.to_string()),
    }
}

/// A Maven version range expression.
///
/// Supports: `[1.0,2.0)`, `[1.0,]`, `(,2.0)`, `[1.0]` (exact).
#[derive(Debug, Clone)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

#[derive(Debug, Clone)]
pub struct Bound {
    pub version: ComparableVersion,
    pub inclusive: bool,
}

impl VersionRange {
    /// Parse a Maven version range string.
    pub fn parse(spec: &str) -> Result<Self, JekaError> {
        let invalid = |reason: &str| JekaError::InvalidVersionFormat {
            input: spec.to_string(),
            reason: reason.to_string(),
        };
        let s = spec.trim();
        let open_inclusive = match s.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(invalid("range must start with '[' or '('")),
        };
        let close_inclusive = match s.chars().last() {
            Some(']') if s.len() > 1 => true,
            Some(')') if s.len() > 1 => false,
            _ => return Err(invalid("unterminated range")),
        };
        let inner = &s[1..s.len() - 1];
        if inner.contains(['[', ']', '(', ')']) {
            return Err(invalid("range unions are not supported"));
        }

        let Some((lower, upper)) = inner.split_once(',') else {
            if !(open_inclusive && close_inclusive) || inner.is_empty() {
                return Err(invalid("single-version range must be written [x]"));
            }
            let v = ComparableVersion::parse(inner);
            return Ok(VersionRange {
                lower: Some(Bound {
                    version: v.clone(),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    version: v,
                    inclusive: true,
                }),
            });
        };
        if upper.contains(',') {
            return Err(invalid("range has more than two bounds"));
        }
        if lower.is_empty() && upper.is_empty() {
            return Err(invalid("range has no bound"));
        }

        let range = VersionRange {
            lower: (!lower.is_empty()).then(|| Bound {
                version: ComparableVersion::parse(lower),
                inclusive: open_inclusive,
            }),
            upper: (!upper.is_empty()).then(|| Bound {
                version: ComparableVersion::parse(upper),
                inclusive: close_inclusive,
            }),
        };
        if let (Some(lo), Some(hi)) = (&range.lower, &range.upper) {
            match lo.version.cmp(&hi.version) {
                Ordering::Greater => return Err(invalid("lower bound is above upper bound")),
                Ordering::Equal if !(lo.inclusive && hi.inclusive) => {
                    return Err(invalid("range is empty"));
                }
                _ => {}
            }
        }
        Ok(range)
    }

    /// Check if a version satisfies this range.
    pub fn contains(&self, version: &ComparableVersion) -> bool {
        let above_lower = self.lower.as_ref().map_or(true, |lower| {
            match version.cmp(&lower.version) {
                Ordering::Greater => true,
                Ordering::Equal => lower.inclusive,
                Ordering::Less => false,
            }
        });
        let below_upper = self.upper.as_ref().map_or(true, |upper| {
            match version.cmp(&upper.version) {
                Ordering::Less => true,
                Ordering::Equal => upper.inclusive,
                Ordering::Greater => false,
            }
        });
        above_lower && below_upper
    }
}
