//! Metadata rules: privacy tags, capture age and editing software.

use time::macros::format_description;
use time::Date;

use super::{ComplianceRule, RuleContext};
use crate::domain::{tags, MetadataMap, RuleId, Verdict};

/// Oldest accepted capture, in calendar months.
pub const MAX_AGE_MONTHS: i32 = 6;

const EDITORS: [&str; 4] = ["photoshop", "gimp", "lightroom", "paint"];

/// Fails iff GPS coordinates or an orientation flag are present.
///
/// No metadata at all passes.
#[must_use]
pub fn privacy_check(metadata: Option<&MetadataMap>) -> Verdict {
    let sensitive = metadata.is_some_and(|m| {
        [tags::GPS_LATITUDE, tags::GPS_LONGITUDE, tags::ORIENTATION]
            .iter()
            .any(|t| m.contains(t))
    });
    if sensitive {
        Verdict::fail("GPS/Orientation present")
    } else {
        Verdict::pass("OK")
    }
}

/// Passes iff the capture date is at most six calendar months before `now`.
///
/// Only year and month count. Missing or unreadable timestamps fail.
#[must_use]
pub fn age_check(metadata: Option<&MetadataMap>, now: Date) -> Verdict {
    let Some(raw) = metadata.and_then(|m| m.get(tags::DATE_TIME_ORIGINAL)) else {
        return Verdict::fail("No capture date");
    };
    let Some(taken) = parse_capture_date(raw) else {
        return Verdict::fail(format!("{raw} (unreadable)"));
    };
    let months = (now.year() - taken.year()) * 12
        + (i32::from(u8::from(now.month())) - i32::from(u8::from(taken.month())));
    Verdict::from_bool(months <= MAX_AGE_MONTHS, raw)
}

/// Fails without metadata, or when `Software` names a known editor.
#[must_use]
pub fn edited_check(metadata: Option<&MetadataMap>) -> Verdict {
    let Some(metadata) = metadata else {
        return Verdict::fail("No metadata");
    };
    let software = metadata.get(tags::SOFTWARE).unwrap_or_default();
    let lower = software.to_lowercase();
    let edited = EDITORS.iter().any(|e| lower.contains(e));
    Verdict::from_bool(!edited, software)
}

/// Date portion of `YYYY:MM:DD HH:MM:SS`; dashes are accepted in place of colons.
fn parse_capture_date(raw: &str) -> Option<Date> {
    let date_part = raw.trim().split([' ', 'T']).next()?.replace(':', "-");
    Date::parse(&date_part, format_description!("[year]-[month]-[day]")).ok()
}

/// No sensitive tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrivacyRule;

impl ComplianceRule for PrivacyRule {
    fn id(&self) -> RuleId {
        RuleId::MetadataPrivacy
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        privacy_check(ctx.snapshot().metadata)
    }
}

/// Capture date recency.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateAgeRule;

impl ComplianceRule for DateAgeRule {
    fn id(&self) -> RuleId {
        RuleId::DateAge
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        let snapshot = ctx.snapshot();
        age_check(snapshot.metadata, snapshot.now)
    }
}

/// No editing software signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditedRule;

impl ComplianceRule for EditedRule {
    fn id(&self) -> RuleId {
        RuleId::Edited
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Verdict {
        edited_check(ctx.snapshot().metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn with_date(value: &str) -> MetadataMap {
        MetadataMap::new().with(tags::DATE_TIME_ORIGINAL, value)
    }

    #[test]
    fn test_privacy() {
        let gps = MetadataMap::new().with(tags::GPS_LATITUDE, "52.5");
        assert!(privacy_check(Some(&gps)).is_fail());
        assert_eq!(privacy_check(Some(&gps)).detail, "GPS/Orientation present");

        let orient = MetadataMap::new().with(tags::ORIENTATION, "1");
        assert!(privacy_check(Some(&orient)).is_fail());

        let clean = MetadataMap::new().with(tags::SOFTWARE, "Camera 1.0");
        assert!(privacy_check(Some(&clean)).is_pass());
        assert!(privacy_check(None).is_pass());
    }

    #[test]
    fn test_privacy_ignores_blank_values() {
        let blank = MetadataMap::new().with(tags::GPS_LONGITUDE, "  ");
        assert!(privacy_check(Some(&blank)).is_pass());
    }

    #[test]
    fn test_age_six_months_boundary() {
        let m = with_date("2024:01:15 10:00:00");
        assert!(age_check(Some(&m), date!(2024 - 07 - 01)).is_pass());
        assert!(age_check(Some(&m), date!(2024 - 07 - 31)).is_pass());
        assert!(age_check(Some(&m), date!(2024 - 08 - 01)).is_fail());
        assert_eq!(age_check(Some(&m), date!(2024 - 07 - 01)).detail, "2024:01:15 10:00:00");
    }

    #[test]
    fn test_age_across_years() {
        let m = with_date("2023:12:31 23:59:59");
        assert!(age_check(Some(&m), date!(2024 - 06 - 01)).is_pass());
        assert!(age_check(Some(&m), date!(2024 - 07 - 01)).is_fail());
    }

    #[test]
    fn test_age_future_date_passes() {
        let m = with_date("2025:01:01 00:00:00");
        assert!(age_check(Some(&m), date!(2024 - 07 - 01)).is_pass());
    }

    #[test]
    fn test_age_accepts_dashed_form() {
        let m = with_date("2024-05-02 08:00:00");
        assert!(age_check(Some(&m), date!(2024 - 07 - 01)).is_pass());
    }

    #[test]
    fn test_age_missing_or_unreadable() {
        assert!(age_check(None, date!(2024 - 07 - 01)).is_fail());
        assert!(age_check(Some(&MetadataMap::new()), date!(2024 - 07 - 01)).is_fail());

        let v = age_check(Some(&with_date("yesterday")), date!(2024 - 07 - 01));
        assert!(v.is_fail());
        assert!(v.detail.contains("unreadable"));

        let v = age_check(Some(&with_date("2024:13:01 00:00:00")), date!(2024 - 07 - 01));
        assert!(v.is_fail());
    }

    #[test]
    fn test_edited() {
        assert!(edited_check(None).is_fail());
        assert!(edited_check(Some(&MetadataMap::new())).is_pass());

        for sw in ["Adobe Photoshop CC 2019", "gimp 2.10", "LIGHTROOM", "Paint.NET"] {
            let m = MetadataMap::new().with(tags::SOFTWARE, sw);
            let v = edited_check(Some(&m));
            assert!(v.is_fail(), "{sw}");
            assert_eq!(v.detail, sw);
        }

        let m = MetadataMap::new().with(tags::SOFTWARE, "Camera Firmware 1.2");
        assert!(edited_check(Some(&m)).is_pass());
    }

    #[test]
    fn test_no_metadata_privacy_pass_edited_fail() {
        assert!(privacy_check(None).is_pass());
        assert!(edited_check(None).is_fail());
    }
}
