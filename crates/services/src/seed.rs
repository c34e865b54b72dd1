use bson::doc;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use devmeet_db::models::{EventCategory, SessionSpeaker, SessionType, Speaker};
use tracing::info;

use crate::calendar::format_event_date;
use crate::dao::{
    DaoError, DaoResult,
    event::{EventDao, EventPatch, NewEvent},
    feedback::{FeedbackDao, FeedbackPatch},
    question::QuestionDao,
    session::{NewSession, SessionDao},
};

/// Counts of what [`seed_sample_data`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub events: usize,
    pub sessions: usize,
    pub questions: usize,
}

fn speaker(name: &str, role: &str, company: &str) -> Speaker {
    Speaker {
        name: name.to_string(),
        role: role.to_string(),
        company: Some(company.to_string()),
    }
}

fn card(name: &str, avatar: &str, role: &str) -> SessionSpeaker {
    SessionSpeaker {
        name: name.to_string(),
        avatar: avatar.to_string(),
        role: role.to_string(),
    }
}

fn at(date: NaiveDate, hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    date.and_time(time).and_utc()
}

/// Inserts a small sample catalogue when the events collection is empty.
/// Returns `None` when data is already present.
pub async fn seed_sample_data(
    events: &EventDao,
    sessions: &SessionDao,
    questions: &QuestionDao,
    feedback: &FeedbackDao,
    today: NaiveDate,
) -> DaoResult<Option<SeedReport>> {
    if events.base.count(doc! {}).await? > 0 {
        info!("Events present, skipping sample data");
        return Ok(None);
    }

    let mut report = SeedReport::default();

    // A talk night happening today: one session done, one live, Q&A still to come.
    let react = events
        .create(NewEvent {
            title: "React 19 Deep Dive: What's New and How to Migrate".to_string(),
            description: "An in-depth look at React 19: the new compiler, performance \
                          work, breaking changes and practical migration strategies."
                .to_string(),
            date: format_event_date(today),
            time: "19:00 - 21:00".to_string(),
            location: "BBD Rosebank, Johannesburg, ZA".to_string(),
            attendee_count: 45,
            max_attendees: 80,
            price: "free".to_string(),
            speakers: vec![
                speaker("Thabiso Magwaza", "Senior Frontend Engineer", "Takealot"),
                speaker("Nathi Ngwenya", "React Specialist", "Microsoft"),
            ],
            has_in_person: true,
            has_online: true,
            is_live: true,
            tags: vec!["React".into(), "Frontend".into(), "JavaScript".into()],
            category: EventCategory::Talk,
            featured_session_id: None,
        })
        .await?;
    report.events += 1;
    let react_id = react.id.ok_or(DaoError::NotFound)?;

    let opening = sessions
        .create(
            events,
            NewSession {
                event_id: react_id,
                title: "Welcome & Opening Remarks".to_string(),
                session_type: SessionType::Announcement,
                start_time: at(today, 19, 0),
                end_time: at(today, 19, 5),
                completed: true,
                is_active: false,
                speaker: None,
                description: Some("Welcome to our React 19 Deep Dive event.".to_string()),
                video_link: None,
            },
        )
        .await?;
    let main_talk = sessions
        .create(
            events,
            NewSession {
                event_id: react_id,
                title: "React 19: What's New and How to Migrate".to_string(),
                session_type: SessionType::Talk,
                start_time: at(today, 19, 5),
                end_time: at(today, 20, 45),
                completed: false,
                is_active: true,
                speaker: Some(card("Thabiso Magwaza", "TM", "Senior Frontend Engineer")),
                description: Some(
                    "The latest React 19 features and how they improve your workflow."
                        .to_string(),
                ),
                video_link: Some("https://meet.google.com/abc-defg-hij".to_string()),
            },
        )
        .await?;
    sessions
        .create(
            events,
            NewSession {
                event_id: react_id,
                title: "Q&A Session".to_string(),
                session_type: SessionType::Talk,
                start_time: at(today, 20, 45),
                end_time: at(today, 21, 0),
                completed: false,
                is_active: false,
                speaker: Some(card("Thabiso Magwaza", "TM", "Senior Frontend Engineer")),
                description: Some("Open Q&A about React 19 and migration.".to_string()),
                video_link: None,
            },
        )
        .await?;
    report.sessions += 3;

    let main_talk_id = main_talk.id.ok_or(DaoError::NotFound)?;
    questions
        .ask(sessions, main_talk_id, "Where do you work?".to_string(), "Nathi".to_string())
        .await?;
    questions
        .raise_hand(sessions, main_talk_id, "Thabiso".to_string())
        .await?;
    questions
        .ask(
            sessions,
            main_talk_id,
            "Does the new compiler work with class components?".to_string(),
            "Lindiwe".to_string(),
        )
        .await?;
    report.questions += 3;

    feedback
        .upsert(
            sessions,
            opening.id.ok_or(DaoError::NotFound)?,
            &FeedbackPatch {
                rating: Some(5),
                tags: Some(vec!["Engaging".to_string()]),
                comment: Some("Great start to the evening".to_string()),
            },
        )
        .await?;

    // A paid workshop next week.
    let next_week = today + Duration::days(7);
    let node = events
        .create(NewEvent {
            title: "Building Scalable APIs with Node.js and TypeScript".to_string(),
            description: "Authentication, database design, testing strategies and \
                          deployment for production APIs."
                .to_string(),
            date: format_event_date(next_week),
            time: "18:30 - 20:30".to_string(),
            location: "WeWork Sandton, Johannesburg, ZA".to_string(),
            attendee_count: 32,
            max_attendees: 50,
            price: "R50".to_string(),
            speakers: vec![speaker("Sarah Johnson", "Backend Lead", "Yoco")],
            has_in_person: true,
            has_online: false,
            is_live: false,
            tags: vec!["Node.js".into(), "TypeScript".into(), "API".into()],
            category: EventCategory::Workshop,
            featured_session_id: None,
        })
        .await?;
    report.events += 1;

    sessions
        .create(
            events,
            NewSession {
                event_id: node.id.ok_or(DaoError::NotFound)?,
                title: "Building Scalable APIs with Node.js and TypeScript".to_string(),
                session_type: SessionType::Talk,
                start_time: at(next_week, 18, 30),
                end_time: at(next_week, 20, 30),
                completed: false,
                is_active: false,
                speaker: Some(card("Sarah Johnson", "SJ", "Backend Lead")),
                description: None,
                video_link: None,
            },
        )
        .await?;
    report.sessions += 1;

    // Point the React event at its main talk.
    events
        .update(
            react_id,
            &EventPatch {
                featured_session_id: Some(main_talk.id),
                ..Default::default()
            },
        )
        .await?;

    info!(
        events = report.events,
        sessions = report.sessions,
        questions = report.questions,
        "Sample data seeded"
    );
    Ok(Some(report))
}
