//! Deterministic sample data for the fixture store.
//!
//! Emails sit at fixed second-offsets behind the supplied clock so recency
//! questions have stable answers; calendar fixtures anchor on upcoming
//! weekdays so "next Friday" style questions resolve to real rows.

use chrono::{Duration, NaiveDateTime, NaiveTime, Weekday};
use tracing::info;

use crate::time::{format_timestamp, upcoming_weekday};
use crate::{FixtureStore, StoreError};

/// The seeded user identity; the default sender for outgoing email.
pub const DEFAULT_USER: &str = "avery@driftwood.dev";

const MANAGER: &str = "priya@driftwood.dev";
const PM: &str = "noah@driftwood.dev";
const ENGINEER: &str = "liam@driftwood.dev";
const DESIGNER: &str = "sofia@driftwood.dev";
const TEAM: &str = "team@driftwood.dev";
const HOTEL: &str = "noreply@skylodge.example";

struct SeedEmail {
    sender: &'static str,
    recipient: &'static str,
    subject: &'static str,
    body: &'static str,
    offset_secs: i64,
    thread_id: i64,
}

const SAMPLE_EMAILS: &[SeedEmail] = &[
    SeedEmail {
        sender: MANAGER,
        recipient: DEFAULT_USER,
        subject: "Roadmap update",
        body: "Quarter milestones are drafted. Can you review the staffing section before Thursday?",
        offset_secs: 2105,
        thread_id: 10,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: MANAGER,
        subject: "Re: Roadmap update",
        body: "Reviewed. One question on the migration timeline, otherwise looks solid.",
        offset_secs: 2040,
        thread_id: 10,
    },
    SeedEmail {
        sender: PM,
        recipient: DEFAULT_USER,
        subject: "Standup agenda",
        body: "Adding the migration project and the dashboard rollout to tomorrow's standup.",
        offset_secs: 1985,
        thread_id: 9,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: PM,
        subject: "Re: Standup agenda",
        body: "Works for me. I'll bring the rollout numbers.",
        offset_secs: 1920,
        thread_id: 9,
    },
    SeedEmail {
        sender: ENGINEER,
        recipient: DEFAULT_USER,
        subject: "Quick question about the build",
        body: "The nightly build is failing on the reporting module. Did anything change in the config?",
        offset_secs: 1840,
        thread_id: 8,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: ENGINEER,
        subject: "Re: Quick question about the build",
        body: "Yes, the cache path moved. I pushed a fix, rerun and tell me if it still fails.",
        offset_secs: 1760,
        thread_id: 8,
    },
    SeedEmail {
        sender: DESIGNER,
        recipient: DEFAULT_USER,
        subject: "Design review notes",
        body: "Notes from today's review are in the shared folder. The empty states need another pass.",
        offset_secs: 1685,
        thread_id: 7,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: DESIGNER,
        subject: "Re: Design review notes",
        body: "Thanks. I'll take the empty states and have something by Friday.",
        offset_secs: 1600,
        thread_id: 7,
    },
    SeedEmail {
        sender: MANAGER,
        recipient: TEAM,
        subject: "Team offsite logistics",
        body: "Offsite runs next Friday through Sunday at Skylodge. Flights and rooms are booked; agenda to follow.",
        offset_secs: 1520,
        thread_id: 6,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: MANAGER,
        subject: "Re: Team offsite logistics",
        body: "Got it. I land Friday morning, so count me in for the first session.",
        offset_secs: 1450,
        thread_id: 6,
    },
    SeedEmail {
        sender: PM,
        recipient: DEFAULT_USER,
        subject: "Dashboard feature request",
        body: "Customers keep asking for a personalized dashboard view. Can we scope it this sprint?",
        offset_secs: 1370,
        thread_id: 5,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: PM,
        subject: "Re: Dashboard feature request",
        body: "Scoping now. Rough cut says two weeks including the settings page.",
        offset_secs: 1300,
        thread_id: 5,
    },
    SeedEmail {
        sender: HOTEL,
        recipient: DEFAULT_USER,
        subject: "Reservation confirmation",
        body: "Your reservation at Skylodge is confirmed: three nights, checking in Friday. Confirmation SL-88213.",
        offset_secs: 1210,
        thread_id: 4,
    },
    SeedEmail {
        sender: ENGINEER,
        recipient: DEFAULT_USER,
        subject: "Budget approval needed",
        body: "The load-testing cluster needs a budget sign-off before I can provision it.",
        offset_secs: 1130,
        thread_id: 3,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: ENGINEER,
        subject: "Re: Budget approval needed",
        body: "Approved up to the usual cap. Forwarding the paperwork to finance.",
        offset_secs: 1055,
        thread_id: 3,
    },
    SeedEmail {
        sender: DESIGNER,
        recipient: DEFAULT_USER,
        subject: "Asset handoff",
        body: "Final icons and illustrations are exported and tagged in the asset library.",
        offset_secs: 980,
        thread_id: 2,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: DESIGNER,
        subject: "Re: Asset handoff",
        body: "Pulled them into the build. The new icons render crisply, nice work.",
        offset_secs: 900,
        thread_id: 2,
    },
    SeedEmail {
        sender: DESIGNER,
        recipient: TEAM,
        subject: "Component library update",
        body: "Buttons and form fields moved to the new tokens. Update your branches before the next release.",
        offset_secs: 820,
        thread_id: 1,
    },
    SeedEmail {
        sender: MANAGER,
        recipient: DEFAULT_USER,
        subject: "Quarterly goals review",
        body: "Let's review quarterly goals this week. Does Thursday afternoon work?",
        offset_secs: 260,
        thread_id: 0,
    },
    SeedEmail {
        sender: DEFAULT_USER,
        recipient: MANAGER,
        subject: "Re: Quarterly goals review",
        body: "Thursday works. I'll book a room and send an invite.",
        offset_secs: 185,
        thread_id: 0,
    },
];

/// One filler event per day; this index carries the odd one out.
const SECRET_EVENT_INDEX: usize = 24;

impl FixtureStore {
    /// Seeds the sample mailbox and calendar relative to `now`.
    ///
    /// Skips entirely when the store already holds email. Returns the number
    /// of rows inserted.
    pub fn seed_sample_data(&self, now: NaiveDateTime) -> Result<usize, StoreError> {
        let existing = self.email_count()?;
        if existing > 0 {
            info!("Fixture store already has {} emails, skipping seed", existing);
            return Ok(0);
        }

        for email in SAMPLE_EMAILS {
            let timestamp = format_timestamp(now - Duration::seconds(email.offset_secs));
            self.insert_email_at(
                email.sender,
                email.recipient,
                email.subject,
                email.body,
                &timestamp,
                email.thread_id,
            )?;
        }

        let fri = upcoming_weekday(now, Weekday::Fri, 1);
        let sun = upcoming_weekday(now, Weekday::Sun, 1);
        let thu = upcoming_weekday(now, Weekday::Thu, 1);
        let wedding_sat = upcoming_weekday(now, Weekday::Sat, 2);

        let named: [(&str, Option<&str>, NaiveDateTime, NaiveDateTime); 7] = [
            ("Team sync", None, now + Duration::days(1), now + Duration::days(1) + Duration::hours(1)),
            (
                "Project kickoff",
                Some("Kickoff for the migration project."),
                now + Duration::days(3) + Duration::hours(9),
                now + Duration::days(3) + Duration::hours(11),
            ),
            (
                "Flight DL 214 to Portland",
                Some("Outbound for the offsite. Confirmation QL4822."),
                fri + Duration::hours(7),
                fri + Duration::hours(9),
            ),
            (
                "Company offsite",
                Some("All hands at Skylodge. Agenda in the team folder."),
                fri + Duration::hours(9),
                sun + Duration::hours(15),
            ),
            (
                "Flight DL 215 home",
                Some("Return from the offsite. Confirmation QL4823."),
                sun + Duration::hours(16),
                sun + Duration::hours(18),
            ),
            (
                "Flight AA 317",
                Some("Flight to Liam's wedding! Don't forget the gift!"),
                wedding_sat + Duration::hours(8),
                wedding_sat + Duration::hours(11),
            ),
            (
                "Launch party",
                Some("Celebrate the dashboard launch."),
                thu + Duration::hours(18),
                thu + Duration::hours(21),
            ),
        ];
        let mut events = 0;
        for (title, description, start, end) in named {
            self.insert_event(
                title,
                description,
                &format_timestamp(start),
                &format_timestamp(end),
            )?;
            events += 1;
        }

        for i in 0..50 {
            let morning = (now + Duration::days(i as i64)).date().and_time(NaiveTime::MIN);
            let description = (i == SECRET_EVENT_INDEX)
                .then_some("Top secret planning session. The passphrase is 'copper falcon'.");
            self.insert_event(
                &format!("Event {}", i + 1),
                description,
                &format_timestamp(morning + Duration::hours(9)),
                &format_timestamp(morning + Duration::hours(10)),
            )?;
            events += 1;
        }

        info!("Seeded {} emails and {} calendar events", SAMPLE_EMAILS.len(), events);
        Ok(SAMPLE_EMAILS.len() + events)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{EmailFilter, EventFilter};

    fn clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn seeds_once_then_skips() {
        let store = FixtureStore::open_in_memory().unwrap();
        let inserted = store.seed_sample_data(clock()).unwrap();
        assert_eq!(inserted, 20 + 7 + 50);
        assert_eq!(store.email_count().unwrap(), 20);
        assert_eq!(store.event_count().unwrap(), 57);

        assert_eq!(store.seed_sample_data(clock()).unwrap(), 0);
        assert_eq!(store.email_count().unwrap(), 20);
    }

    #[test]
    fn seeded_emails_sit_behind_the_clock() {
        let store = FixtureStore::open_in_memory().unwrap();
        store.seed_sample_data(clock()).unwrap();

        let recent = EmailFilter {
            start_date: Some("2024-05-01 11:55:00".to_string()),
            ..Default::default()
        };
        // Only the quarterly-goals pair sits inside the last five minutes.
        let found = store.search_emails(&recent).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|e| e.thread_id == 0));
    }

    #[test]
    fn offsite_weekend_is_searchable_by_window() {
        let store = FixtureStore::open_in_memory().unwrap();
        store.seed_sample_data(clock()).unwrap();

        // Next week's Friday from 2024-05-01 is 2024-05-10.
        let filter = EventFilter {
            queries: vec!["offsite".to_string()],
            start_date: Some("2024-05-10".to_string()),
            ..Default::default()
        };
        let found = store.search_events(&filter).unwrap();
        assert!(found.iter().any(|e| e.title == "Company offsite"));
    }

    #[test]
    fn secret_event_description_is_findable() {
        let store = FixtureStore::open_in_memory().unwrap();
        store.seed_sample_data(clock()).unwrap();

        let filter = EventFilter {
            queries: vec!["copper falcon".to_string()],
            ..Default::default()
        };
        let found = store.search_events(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Event 25");
    }
}
