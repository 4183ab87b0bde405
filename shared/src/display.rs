use chrono::{DateTime, NaiveDateTime};

use crate::models::UploadStatus;

/// Badge shown for a classification string coming from the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationBadge {
    Normal,
    Abnormal,
    PossiblyAbnormal,
    Other(String),
}

impl ClassificationBadge {
    pub fn from_classification(classification: &str) -> Option<Self> {
        if classification.trim().is_empty() {
            return None;
        }
        let badge = if classification.contains("Normal") {
            ClassificationBadge::Normal
        } else if classification.contains("High") {
            ClassificationBadge::Abnormal
        } else if classification.contains("Moderate") || classification.contains("Possibly") {
            ClassificationBadge::PossiblyAbnormal
        } else {
            ClassificationBadge::Other(classification.to_string())
        };
        Some(badge)
    }

    pub fn label(&self) -> &str {
        match self {
            ClassificationBadge::Normal => "Normal",
            ClassificationBadge::Abnormal => "Abnormal",
            ClassificationBadge::PossiblyAbnormal => "Possibly Abnormal",
            ClassificationBadge::Other(raw) => raw,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ClassificationBadge::Normal => "badge badge-success",
            ClassificationBadge::Abnormal => "badge badge-danger",
            ClassificationBadge::PossiblyAbnormal => "badge badge-warning",
            ClassificationBadge::Other(_) => "badge",
        }
    }
}

/// Colour of the classification banner on the result page.
pub fn classification_tone(classification: Option<&str>) -> &'static str {
    match classification {
        None => "tone-neutral",
        Some(c) if c.contains("Normal") => "tone-normal",
        Some(c) if c.contains("High") => "tone-danger",
        Some(_) => "tone-warning",
    }
}

pub fn status_badge(status: UploadStatus) -> (&'static str, &'static str) {
    match status {
        UploadStatus::Done => ("Completed", "badge badge-success"),
        UploadStatus::Processing => ("Processing", "badge badge-warning"),
        UploadStatus::Uploaded => ("Uploaded", "badge badge-info"),
        UploadStatus::Failed => ("Failed", "badge badge-danger"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Elevated,
    Moderate,
    Low,
}

impl Severity {
    pub fn of(probability: f64) -> Self {
        if probability >= 0.7 {
            Severity::High
        } else if probability >= 0.5 {
            Severity::Elevated
        } else if probability >= 0.3 {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Severity::High => "bar-high",
            Severity::Elevated => "bar-elevated",
            Severity::Moderate => "bar-moderate",
            Severity::Low => "bar-low",
        }
    }
}

/// `0.873` -> `"87%"`.
pub fn percent(fraction: f64) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}

pub fn optional_percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(value) if value > 0.0 => percent(value),
        _ => "-".to_string(),
    }
}

/// Width style for a bar, clamped so malformed values cannot overflow the track.
pub fn bar_width(fraction: f64) -> String {
    format!("width: {:.1}%", (fraction * 100.0).clamp(0.0, 100.0))
}

pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Formats backend timestamps (RFC 3339 or naive ISO) as `Jan 15, 2026, 09:30`.
pub fn format_timestamp(raw: &str) -> String {
    const FORMAT: &str = "%b %-d, %Y, %H:%M";
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(FORMAT).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_badges() {
        assert_eq!(
            ClassificationBadge::from_classification("Normal"),
            Some(ClassificationBadge::Normal)
        );
        assert_eq!(
            ClassificationBadge::from_classification("Abnormal - High Risk"),
            Some(ClassificationBadge::Abnormal)
        );
        assert_eq!(
            ClassificationBadge::from_classification("Possibly Abnormal").map(|b| b.label().to_string()),
            Some("Possibly Abnormal".to_string())
        );
        assert_eq!(
            ClassificationBadge::from_classification("Abnormal"),
            Some(ClassificationBadge::Other("Abnormal".into()))
        );
        assert_eq!(ClassificationBadge::from_classification(""), None);
    }

    #[test]
    fn test_tones() {
        assert_eq!(classification_tone(Some("Normal")), "tone-normal");
        assert_eq!(classification_tone(Some("High Risk")), "tone-danger");
        assert_eq!(classification_tone(Some("Moderate")), "tone-warning");
        assert_eq!(classification_tone(None), "tone-neutral");
    }

    #[test]
    fn test_severity_buckets() {
        assert_eq!(Severity::of(0.7), Severity::High);
        assert_eq!(Severity::of(0.69), Severity::Elevated);
        assert_eq!(Severity::of(0.3), Severity::Moderate);
        assert_eq!(Severity::of(0.05), Severity::Low);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(percent(0.873), "87%");
        assert_eq!(optional_percent(None), "-");
        assert_eq!(bar_width(1.7), "width: 100.0%");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(format_timestamp("2026-01-15T09:30:00.123456"), "Jan 15, 2026, 09:30");
        assert_eq!(format_timestamp("2026-01-15T09:30:00+00:00"), "Jan 15, 2026, 09:30");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }
}
