use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::model::ids::TipId;

/// Short sustainability fact shown on the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTip {
    pub id: TipId,
    pub title: String,
    pub content: String,
    pub icon: String,
    pub date: DateTime<Utc>,
}

impl DailyTip {
    /// UTC calendar day the tip is scheduled for.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Picks the tip for `today`: an exact day match first, otherwise the most
/// recent tip dated before it. Tips dated in the future are never shown.
#[must_use]
pub fn pick_tip_for_day(tips: &[DailyTip], today: NaiveDate) -> Option<&DailyTip> {
    tips.iter()
        .filter(|tip| tip.day() <= today)
        .max_by_key(|tip| (tip.date, tip.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::time::fixed_now;

    fn tip(id: u64, date: DateTime<Utc>) -> DailyTip {
        DailyTip {
            id: TipId::new(id),
            title: format!("Tip {id}"),
            content: "Take the metro.".into(),
            icon: "lightbulb".into(),
            date,
        }
    }

    #[test]
    fn prefers_todays_tip() {
        let now = fixed_now();
        let tips = vec![tip(1, now - Duration::days(3)), tip(2, now)];
        let picked = pick_tip_for_day(&tips, now.date_naive()).unwrap();
        assert_eq!(picked.id, TipId::new(2));
    }

    #[test]
    fn falls_back_to_latest_past_tip_and_skips_future() {
        let now = fixed_now();
        let tips = vec![
            tip(1, now - Duration::days(5)),
            tip(2, now - Duration::days(1)),
            tip(3, now + Duration::days(2)),
        ];
        let picked = pick_tip_for_day(&tips, now.date_naive()).unwrap();
        assert_eq!(picked.id, TipId::new(2));
    }

    #[test]
    fn no_tips_means_none() {
        assert!(pick_tip_for_day(&[], fixed_now().date_naive()).is_none());
        let future = vec![tip(1, fixed_now() + Duration::days(1))];
        assert!(pick_tip_for_day(&future, fixed_now().date_naive()).is_none());
    }
}
