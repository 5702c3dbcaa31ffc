use serde::{Deserialize, Serialize};

use super::option::parse_time_zone;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFormat {
    Hours12,
    Hours24,
}

impl TimeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormat::Hours12 => "hours12",
            TimeFormat::Hours24 => "hours24",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hours12" => Some(TimeFormat::Hours12),
            "hours24" => Some(TimeFormat::Hours24),
            _ => None,
        }
    }
}

/// Per-user display preferences. Every field is optional; on upsert only
/// the fields that are set replace what's stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// 0 = Sunday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_start: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<TimeFormat>,
}

impl UserPreferences {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(day) = self.week_start {
            if day > 6 {
                return Err(ValidationError::WeekStartOutOfRange(day));
            }
        }
        if let Some(zone) = &self.time_zone {
            parse_time_zone(zone)?;
        }
        Ok(())
    }

    /// Overlays the fields set in `update` onto `self`.
    pub fn merge(&mut self, update: &UserPreferences) {
        if update.time_zone.is_some() {
            self.time_zone = update.time_zone.clone();
        }
        if update.week_start.is_some() {
            self.week_start = update.week_start;
        }
        if update.time_format.is_some() {
            self.time_format = update.time_format;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_start_must_be_a_weekday() {
        let prefs = UserPreferences {
            week_start: Some(7),
            ..Default::default()
        };
        assert_eq!(prefs.validate(), Err(ValidationError::WeekStartOutOfRange(7)));
        assert!(UserPreferences { week_start: Some(6), ..Default::default() }
            .validate()
            .is_ok());
    }

    #[test]
    fn merge_only_overwrites_set_fields() {
        let mut stored = UserPreferences {
            time_zone: Some("Europe/London".to_string()),
            week_start: Some(1),
            time_format: Some(TimeFormat::Hours24),
        };
        stored.merge(&UserPreferences {
            week_start: Some(0),
            ..Default::default()
        });
        assert_eq!(stored.time_zone.as_deref(), Some("Europe/London"));
        assert_eq!(stored.week_start, Some(0));
        assert_eq!(stored.time_format, Some(TimeFormat::Hours24));
    }

    #[test]
    fn parses_wire_format() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"timeFormat":"hours12","weekStart":1}"#).unwrap();
        assert_eq!(prefs.time_format, Some(TimeFormat::Hours12));
        assert_eq!(prefs.week_start, Some(1));
        assert_eq!(TimeFormat::parse("hours12"), Some(TimeFormat::Hours12));
    }
}
