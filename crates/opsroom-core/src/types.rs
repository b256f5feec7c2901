use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// How often a template fires. Weekday numbering follows the stored data:
/// 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekday,
    Weekend,
    /// Deprecated alias with no anchor day. Still deserializes so legacy
    /// books load, but evaluation refuses it until migrated.
    Weekly,
    WeeklyCustom,
}

impl Frequency {
    pub fn all() -> &'static [Frequency] {
        &[
            Frequency::Daily,
            Frequency::Weekday,
            Frequency::Weekend,
            Frequency::Weekly,
            Frequency::WeeklyCustom,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekday => "weekday",
            Frequency::Weekend => "weekend",
            Frequency::Weekly => "weekly",
            Frequency::WeeklyCustom => "weekly_custom",
        }
    }

    /// Evaluate this frequency against a calendar date. `template_id` is
    /// only used to name the offender when a deprecated `weekly` template
    /// is hit.
    pub fn matches(
        self,
        date: NaiveDate,
        weekly_days: &BTreeSet<u8>,
        template_id: &str,
    ) -> crate::error::Result<bool> {
        let dow = date.weekday().num_days_from_sunday() as u8;
        match self {
            Frequency::Daily => Ok(true),
            Frequency::Weekday => Ok((1..=5).contains(&dow)),
            Frequency::Weekend => Ok(dow == 0 || dow == 6),
            Frequency::Weekly => Err(crate::error::OpsError::DeprecatedFrequency(
                template_id.to_string(),
            )),
            Frequency::WeeklyCustom => Ok(weekly_days.contains(&dow)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = crate::error::OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekday" => Ok(Frequency::Weekday),
            "weekend" => Ok(Frequency::Weekend),
            "weekly" => Ok(Frequency::Weekly),
            "weekly_custom" => Ok(Frequency::WeeklyCustom),
            _ => Err(crate::error::OpsError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TimeBlock
// ---------------------------------------------------------------------------

/// Named segment of the working day used to bucket and deduplicate tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBlock {
    WakeUp,
    WarmUp,
    Production,
    War,
    Closing,
}

impl TimeBlock {
    pub fn all() -> &'static [TimeBlock] {
        &[
            TimeBlock::WakeUp,
            TimeBlock::WarmUp,
            TimeBlock::Production,
            TimeBlock::War,
            TimeBlock::Closing,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeBlock::WakeUp => "wake_up",
            TimeBlock::WarmUp => "warm_up",
            TimeBlock::Production => "production",
            TimeBlock::War => "war",
            TimeBlock::Closing => "closing",
        }
    }
}

impl fmt::Display for TimeBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TimeBlock {
    type Err = crate::error::OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wake_up" => Ok(TimeBlock::WakeUp),
            "warm_up" => Ok(TimeBlock::WarmUp),
            "production" => Ok(TimeBlock::Production),
            "war" => Ok(TimeBlock::War),
            "closing" => Ok(TimeBlock::Closing),
            _ => Err(crate::error::OpsError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    PendingPublish,
    Completed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::PendingPublish => "pending_publish",
            TaskStatus::Completed => "completed",
            TaskStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = crate::error::OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_publish" => Ok(TaskStatus::PendingPublish),
            "completed" => Ok(TaskStatus::Completed),
            "skipped" => Ok(TaskStatus::Skipped),
            _ => Err(crate::error::OpsError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    OpsReply,
    OpsReport,
    Content,
    Sop,
}

impl TaskKind {
    /// Ops kinds log their results as append-only WorkTaskLog entries;
    /// the others write evidence onto the task itself.
    pub fn is_ops(self) -> bool {
        matches!(self, TaskKind::OpsReply | TaskKind::OpsReport)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::OpsReply => "ops_reply",
            TaskKind::OpsReport => "ops_report",
            TaskKind::Content => "content",
            TaskKind::Sop => "sop",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TaskOrigin
// ---------------------------------------------------------------------------

/// Only generated tasks participate in the (persona, time block, date)
/// dedup key; manual tasks are exempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOrigin {
    Generated,
    Manual,
}

// ---------------------------------------------------------------------------
// OnboardingStatus
// ---------------------------------------------------------------------------

/// Forward-only onboarding flow for a platform account. Only `completed`
/// accounts are visible to the assignment resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    Assigned,
    Notified,
    Binding,
    SettingPersona,
    Completed,
}

impl OnboardingStatus {
    pub fn all() -> &'static [OnboardingStatus] {
        &[
            OnboardingStatus::Assigned,
            OnboardingStatus::Notified,
            OnboardingStatus::Binding,
            OnboardingStatus::SettingPersona,
            OnboardingStatus::Completed,
        ]
    }

    pub fn next(self) -> Option<OnboardingStatus> {
        let all = Self::all();
        all.get(self as usize + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OnboardingStatus::Assigned => "assigned",
            OnboardingStatus::Notified => "notified",
            OnboardingStatus::Binding => "binding",
            OnboardingStatus::SettingPersona => "setting_persona",
            OnboardingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OnboardingStatus {
    type Err = crate::error::OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assigned" => Ok(OnboardingStatus::Assigned),
            "notified" => Ok(OnboardingStatus::Notified),
            "binding" => Ok(OnboardingStatus::Binding),
            "setting_persona" => Ok(OnboardingStatus::SettingPersona),
            "completed" => Ok(OnboardingStatus::Completed),
            _ => Err(crate::error::OpsError::InvalidStatus(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// TaskPayload
// ---------------------------------------------------------------------------

/// Typed task payload. The original console stored these as free-form
/// blobs; here each task kind carries its own known fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskPayload {
    Sop {
        title: String,
        instruction: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        steps: Vec<String>,
    },
    Content {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        brief: Option<String>,
    },
    Ops {
        instruction: String,
    },
}

impl TaskPayload {
    pub fn title(&self) -> &str {
        match self {
            TaskPayload::Sop { title, .. } | TaskPayload::Content { title, .. } => title,
            TaskPayload::Ops { instruction } => instruction,
        }
    }
}

// ---------------------------------------------------------------------------
// Time slot parsing
// ---------------------------------------------------------------------------

/// Parse a "HH:MM" time slot into minutes since midnight.
pub fn parse_time_slot(slot: &str) -> crate::error::Result<u32> {
    let err = || crate::error::OpsError::InvalidTimeSlot(slot.to_string());
    let (h, m) = slot.split_once(':').ok_or_else(err)?;
    let h: u32 = h.parse().map_err(|_| err())?;
    let m: u32 = m.parse().map_err(|_| err())?;
    if h > 23 || m > 59 {
        return Err(err());
    }
    Ok(h * 60 + m)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn daily_matches_everything() {
        let days = BTreeSet::new();
        assert!(Frequency::Daily.matches(date("2025-06-10"), &days, "t1").unwrap());
        assert!(Frequency::Daily.matches(date("2025-06-14"), &days, "t1").unwrap());
    }

    #[test]
    fn weekday_excludes_weekends() {
        let days = BTreeSet::new();
        // 2025-06-10 is a Tuesday, 2025-06-14 a Saturday.
        assert!(Frequency::Weekday.matches(date("2025-06-10"), &days, "t1").unwrap());
        assert!(!Frequency::Weekday.matches(date("2025-06-14"), &days, "t1").unwrap());
        assert!(Frequency::Weekend.matches(date("2025-06-14"), &days, "t1").unwrap());
        assert!(!Frequency::Weekend.matches(date("2025-06-10"), &days, "t1").unwrap());
    }

    #[test]
    fn weekly_custom_uses_sunday_zero_numbering() {
        // 1 = Monday, 3 = Wednesday
        let days: BTreeSet<u8> = [1, 3].into_iter().collect();
        // 2025-06-09 Mon, 2025-06-11 Wed, 2025-06-12 Thu
        assert!(Frequency::WeeklyCustom.matches(date("2025-06-09"), &days, "t1").unwrap());
        assert!(Frequency::WeeklyCustom.matches(date("2025-06-11"), &days, "t1").unwrap());
        assert!(!Frequency::WeeklyCustom.matches(date("2025-06-12"), &days, "t1").unwrap());
    }

    #[test]
    fn bare_weekly_refuses_evaluation() {
        let days = BTreeSet::new();
        let err = Frequency::Weekly
            .matches(date("2025-06-10"), &days, "legacy-tpl")
            .unwrap_err();
        assert!(err.to_string().contains("legacy-tpl"));
    }

    #[test]
    fn frequency_roundtrip() {
        for f in Frequency::all() {
            assert_eq!(Frequency::from_str(f.as_str()).unwrap(), *f);
        }
    }

    #[test]
    fn time_block_ordering() {
        assert!(TimeBlock::WakeUp < TimeBlock::Production);
        assert!(TimeBlock::War < TimeBlock::Closing);
    }

    #[test]
    fn time_block_roundtrip() {
        for b in TimeBlock::all() {
            assert_eq!(TimeBlock::from_str(b.as_str()).unwrap(), *b);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!TaskStatus::PendingPublish.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Skipped.is_terminal());
    }

    #[test]
    fn onboarding_next_chain() {
        assert_eq!(
            OnboardingStatus::Assigned.next(),
            Some(OnboardingStatus::Notified)
        );
        assert_eq!(
            OnboardingStatus::SettingPersona.next(),
            Some(OnboardingStatus::Completed)
        );
        assert_eq!(OnboardingStatus::Completed.next(), None);
    }

    #[test]
    fn ops_kinds() {
        assert!(TaskKind::OpsReply.is_ops());
        assert!(TaskKind::OpsReport.is_ops());
        assert!(!TaskKind::Content.is_ops());
        assert!(!TaskKind::Sop.is_ops());
    }

    #[test]
    fn parse_valid_time_slots() {
        assert_eq!(parse_time_slot("00:00").unwrap(), 0);
        assert_eq!(parse_time_slot("09:30").unwrap(), 570);
        assert_eq!(parse_time_slot("23:59").unwrap(), 1439);
    }

    #[test]
    fn parse_invalid_time_slots() {
        for slot in ["", "9", "24:00", "12:60", "ab:cd", "12-30"] {
            assert!(parse_time_slot(slot).is_err(), "expected invalid: {slot}");
        }
    }

    #[test]
    fn payload_serde_is_tagged() {
        let p = TaskPayload::Sop {
            title: "Daily Reply Check".to_string(),
            instruction: "Daily Reply Check".to_string(),
            steps: vec!["open inbox".to_string()],
        };
        let yaml = serde_yaml::to_string(&p).unwrap();
        assert!(yaml.contains("kind: sop"));
        let parsed: TaskPayload = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, p);
    }
}
