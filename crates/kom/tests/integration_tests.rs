//! Integration tests for the kom crate
//!
//! These tests drive the read queue, read-markings and sessions through the
//! public API against the in-memory and SQLite backends.

use kom::models::{
    CommentLink, ConfNo, LocalReadMarking, LocalTextNo, PersNo, Recipient, RecipientType,
    Session, Text, TextNo, UnreadConference, UnreadConferences,
};
use kom::service::{
    ConferenceService, InMemoryKomBackend, ReadMarkingStore, SessionService,
    SqliteReadMarkingStore, TextService,
};
use kom::{AuthContext, QueueError, QueueEvent, ReadQueue};
use tempfile::TempDir;

/// Helper to create a fetched text with comments
fn make_text(no: u32, subject: &str, comments: &[u32]) -> Text {
    Text::builder(TextNo(no))
        .subject(subject)
        .body(format!("Body of text {}", no))
        .recipient(Recipient::new(RecipientType::To, ConfNo(6)).with_name("Kom"))
        .comments(comments)
        .build()
}

/// Helper to create a backend holding the given texts
fn make_backend(texts: Vec<Text>) -> InMemoryKomBackend {
    let backend = InMemoryKomBackend::new();
    for text in texts {
        backend.insert_text(text).unwrap();
    }
    backend
}

/// Advance until exhausted, collecting the visited text numbers
fn read_to_end(queue: &mut ReadQueue, service: &dyn TextService) -> Vec<u32> {
    let mut visited = Vec::new();
    while let Some(text) = queue.advance(service).unwrap() {
        visited.push(text.text_no().unwrap().get());
    }
    visited
}

fn nos(list: &[u32]) -> Vec<TextNo> {
    list.iter().map(|&n| TextNo(n)).collect()
}

#[test]
fn test_unrelated_texts_are_read_lowest_first() {
    let backend = make_backend(vec![
        make_text(10, "Ten", &[]),
        make_text(5, "Five", &[]),
        make_text(8, "Eight", &[]),
    ]);

    let mut queue = ReadQueue::new(nos(&[10, 5, 8]));
    assert_eq!(read_to_end(&mut queue, &backend), vec![5, 8, 10]);
    assert!(queue.current().is_none());
    assert!(queue.is_exhausted());
}

#[test]
fn test_comment_thread_is_read_depth_first() {
    let backend = make_backend(vec![
        make_text(10, "Root", &[11, 12]),
        make_text(11, "First comment", &[13]),
        make_text(12, "Second comment", &[]),
        make_text(13, "Reply to first comment", &[]),
    ]);

    let mut queue = ReadQueue::new(nos(&[10]));
    assert_eq!(read_to_end(&mut queue, &backend), vec![10, 11, 13, 12]);
}

#[test]
fn test_thread_finishes_before_next_pending_text() {
    let backend = make_backend(vec![
        make_text(3, "Thread", &[20, 21]),
        make_text(4, "Other", &[]),
        make_text(20, "c1", &[]),
        make_text(21, "c2", &[]),
    ]);

    let mut queue = ReadQueue::new(nos(&[3, 4]));
    assert_eq!(read_to_end(&mut queue, &backend), vec![3, 20, 21, 4]);
}

#[test]
fn test_fetch_failure_keeps_text_for_retry() {
    let backend = make_backend(vec![make_text(1, "One", &[]), make_text(2, "Two", &[])]);
    backend.fail_text(TextNo(2)).unwrap();

    let mut queue = ReadQueue::new(nos(&[1, 2]));
    queue.advance(&backend).unwrap();

    let err = queue.advance(&backend).unwrap_err();
    assert!(matches!(err, QueueError::Fetch { text_no, .. } if text_no == TextNo(2)));
    assert_eq!(queue.current().and_then(Text::text_no), Some(TextNo(1)));
    assert!(queue.contains(TextNo(2)));

    backend.heal_text(TextNo(2)).unwrap();
    let text = queue.advance(&backend).unwrap().unwrap();
    assert_eq!(text.text_no(), Some(TextNo(2)));
    assert_eq!(backend.fetch_log().unwrap(), nos(&[1, 2, 2]));
}

#[test]
fn test_two_phase_advance_with_interleaved_changes() {
    let backend = make_backend(vec![make_text(7, "Seven", &[]), make_text(9, "Nine", &[])]);
    let mut queue = ReadQueue::new(nos(&[9]));
    let events = queue.subscribe_channel();

    let step = queue.begin_advance().unwrap();
    let kom::AdvanceStep::Fetch(text_no) = step else {
        panic!("expected a fetch, got {:?}", step);
    };
    assert_eq!(text_no, TextNo(9));

    // New unread texts arrive while the fetch is outstanding
    queue.add_unread(nos(&[7, 9]));
    assert!(matches!(
        queue.begin_advance(),
        Err(QueueError::Busy { in_flight }) if in_flight == TextNo(9)
    ));

    let fetched = backend.fetch_text(text_no);
    queue.complete_advance(text_no, fetched).unwrap();
    assert_eq!(read_to_end(&mut queue, &backend), vec![7]);

    let received: Vec<QueueEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            QueueEvent::Removed(TextNo(9)),
            QueueEvent::Added(nos(&[7])),
            QueueEvent::Changed(Some(TextNo(9))),
            QueueEvent::Removed(TextNo(7)),
            QueueEvent::Changed(Some(TextNo(7))),
            QueueEvent::Changed(None),
        ]
    );
}

#[test]
fn test_queue_seeded_from_conference_read_markings() {
    let backend = make_backend(vec![
        make_text(100, "Hundred", &[101]),
        make_text(101, "Comment", &[]),
        make_text(150, "Later", &[]),
    ]);
    backend
        .set_unread_conferences(UnreadConferences::new(vec![
            UnreadConference {
                conf_no: ConfNo(1),
                name: Some("Empty".to_string()),
                no_of_unread: 0,
            },
            UnreadConference {
                conf_no: ConfNo(6),
                name: Some("Kom".to_string()),
                no_of_unread: 3,
            },
        ]))
        .unwrap();

    for (local, global, unread) in [(1, 100, true), (2, 101, true), (3, 120, false), (4, 150, true)] {
        backend
            .save_local_read_marking(&LocalReadMarking::new(
                ConfNo(6),
                LocalTextNo(local),
                TextNo(global),
                unread,
            ))
            .unwrap();
    }

    let summary = backend.list_unread_conferences().unwrap();
    assert_eq!(summary.total_unread(), 3);
    let conf = summary.first_with_unread().unwrap();
    assert_eq!(conf.conf_no, ConfNo(6));

    let mut queue = ReadQueue::for_conference(&backend, conf.conf_no).unwrap();
    assert_eq!(queue.len(), 3);
    assert!(!queue.contains(TextNo(120)));

    let first = queue.first(&backend).unwrap().unwrap();
    assert_eq!(first.text_no(), Some(TextNo(100)));
    assert_eq!(read_to_end(&mut queue, &backend), vec![101, 150]);
}

#[test]
fn test_read_then_unread_then_read_in_memory() {
    let backend = make_backend(vec![make_text(42, "Answer", &[])]);
    let text = backend.fetch_text(TextNo(42)).unwrap();

    text.mark_as_read_global(&backend).unwrap();
    let marking = backend.get_global_read_marking(TextNo(42)).unwrap().unwrap();
    assert!(!marking.unread);

    text.mark_as_unread_global(&backend).unwrap();
    assert!(backend.get_global_read_marking(TextNo(42)).unwrap().is_none());

    text.mark_as_read_global(&backend).unwrap();
    let marking = backend.get_global_read_marking(TextNo(42)).unwrap().unwrap();
    assert!(!marking.unread);
}

#[test]
fn test_read_markings_persist_in_sqlite() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("markings.db");
    let text = make_text(42, "Answer", &[]);

    {
        let store = SqliteReadMarkingStore::new(&db_path).unwrap();
        text.mark_as_read_global(&store).unwrap();
        text.mark_as_unread_global(&store).unwrap();
        text.mark_as_read_global(&store).unwrap();
        store
            .save_local_read_marking(&LocalReadMarking::new(
                ConfNo(6),
                LocalTextNo(2),
                TextNo(42),
                true,
            ))
            .unwrap();
    }

    let store = SqliteReadMarkingStore::new(&db_path).unwrap();
    let marking = store.get_global_read_marking(TextNo(42)).unwrap().unwrap();
    assert!(!marking.unread);

    let queue = ReadQueue::for_conference(&store, ConfNo(6)).unwrap();
    assert!(queue.contains(TextNo(42)));
}

#[test]
fn test_session_login_resume_and_logout() {
    let backend = InMemoryKomBackend::new();
    backend.register_person("Oskar", "secret", PersNo(14)).unwrap();

    let session = Session::new("Oskar", "secret").login(&backend).unwrap();
    assert!(!session.is_new());
    assert_eq!(session.pers_no, Some(PersNo(14)));
    assert!(session.password.is_none());

    let id = session.id.clone().unwrap();
    let resumed = Session::resume(&backend, Some(&id));
    assert_eq!(resumed.id.as_deref(), Some(id.as_str()));
    assert_eq!(
        resumed.auth_context(),
        AuthContext::Authenticated {
            session_id: id.clone(),
            pers_no: Some(PersNo(14)),
        }
    );

    resumed.logout(&backend).unwrap();
    assert!(backend.get_session(&id).is_err());

    let after_logout = Session::resume(&backend, Some(&id));
    assert!(after_logout.is_new());
    assert_eq!(after_logout.auth_context(), AuthContext::Anonymous);
}

#[test]
fn test_login_with_wrong_password_fails() {
    let backend = InMemoryKomBackend::new();
    backend.register_person("Oskar", "secret", PersNo(14)).unwrap();

    let result = Session::new("Oskar", "guess").login(&backend);
    assert!(matches!(result, Err(kom::KomError::AuthRequired)));
}

#[test]
fn test_comment_on_current_text_joins_its_thread() {
    let backend = make_backend(vec![make_text(10, "Discussion", &[])]);
    let mut queue = ReadQueue::new(nos(&[10]));
    let current = queue.advance(&backend).unwrap().unwrap().clone();

    let mut reply = Text::draft();
    reply.make_comment_to(&current).unwrap();
    reply.set_body("I agree").unwrap();
    let reply_no = reply.submit(&backend).unwrap();

    assert_eq!(reply.text_no(), Some(reply_no));
    assert_eq!(reply.subject(), "Discussion");
    assert_eq!(reply.comment_to_list(), &[CommentLink::comment(TextNo(10))]);
    assert_eq!(reply.recipient_conferences(), vec![ConfNo(6)]);

    let stored = backend.fetch_text(reply_no).unwrap();
    assert_eq!(stored.body(), "I agree");

    queue.add_unread([reply_no]);
    let next = queue.advance(&backend).unwrap().unwrap();
    assert_eq!(next.text_no(), Some(reply_no));
}

#[test]
fn test_text_round_trips_backend_representation() {
    let json = serde_json::json!({
        "text_no": 4711,
        "subject": "Hello",
        "body": "World",
        "comment_in_list": [{"type": "comment", "text_no": 4712}],
        "recipient_list": [{"type": "to", "conf_no": 5}, {"type": "cc", "conf_no": 6}]
    });

    let text = Text::from_json(json).unwrap();
    assert_eq!(text.recipient_list().len(), 2);
    assert_eq!(text.comment_in_text_nos(), nos(&[4712]));

    let serialized = text.to_json();
    assert_eq!(
        serialized["recipient_list"],
        serde_json::json!([{"type": "to", "conf_no": 5}, {"type": "cc", "conf_no": 6}])
    );
    assert_eq!(Text::from_json(serialized).unwrap(), text);
}
