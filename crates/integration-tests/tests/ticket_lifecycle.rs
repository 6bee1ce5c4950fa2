//! Integration tests for the full ticket lifecycle.
//!
//! One file-backed profile, driven through the same controllers the
//! views use: a submitter files a ticket on the dashboard, staff work
//! it on the board, and the two sides talk in the ticket chat until the
//! ticket ends up in the archive.
//!
//! Run with: cargo test -p kummerkasten-integration-tests

use kummerkasten_admin::{AdminError, Board};
use kummerkasten_core::{Password, Priority, Role, TicketId, TicketStatus, UserId, Username};
use kummerkasten_dashboard::{Dashboard, DashboardError, NewTicket};
use kummerkasten_integration_tests::{TestProfile, init_tracing};
use kummerkasten_store::auth::{self, GuardOutcome, PageGuard};
use kummerkasten_store::{Store, User};

/// Insert an admin account covering the given departments.
fn add_admin(store: &mut Store, username: &str, depts: &[&str]) {
    let user = User {
        id: UserId::new(),
        username: Username::parse(username).expect("valid username"),
        password: Password::new("123"),
        name: String::new(),
        email: None,
        role: Role::Admin,
        depts: depts.iter().map(|dept| (*dept).to_owned()).collect(),
        can_manage_users: false,
        can_manage_requests: false,
        two_factor_enabled: false,
        two_factor_secret: None,
    };
    store.insert_user(user).expect("username free");
}

/// Sign in and file one ticket as the built-in demo user.
fn file_ticket(store: &mut Store, title: &str, categories: &[&str]) -> TicketId {
    auth::login(store, "user", "123").expect("demo user login");
    let mut dash = Dashboard::new(store).expect("dashboard");
    let ticket = dash
        .create_ticket(NewTicket {
            title: title.to_owned(),
            description: String::new(),
            priority: Priority::Normal,
            categories: categories.iter().map(|c| (*c).to_owned()).collect(),
        })
        .expect("ticket created");
    ticket.id
}

// ============================================================================
// Page Guards
// ============================================================================

#[test]
fn test_guards_route_visitors_to_their_page() {
    init_tracing();
    let profile = TestProfile::new();
    let mut store = profile.open();
    store.init();

    // Anonymous visitors land on the login page.
    let check = |store: &Store, guard| auth::check_guard(store, guard);
    assert_eq!(check(&store, PageGuard::Login), GuardOutcome::Allow);
    assert_eq!(check(&store, PageGuard::Dashboard), GuardOutcome::ToLogin);
    assert_eq!(check(&store, PageGuard::Board), GuardOutcome::ToLogin);

    // Signed-in submitters bounce off the login page and the board.
    auth::login(&mut store, "user", "123").expect("login");
    assert_eq!(check(&store, PageGuard::Login), GuardOutcome::ToDashboard);
    assert_eq!(check(&store, PageGuard::Dashboard), GuardOutcome::Allow);
    assert_eq!(check(&store, PageGuard::Board), GuardOutcome::ToDashboard);

    // Staff get the board; a fresh open sees the same session.
    auth::login(&mut store, "admin", "123").expect("login");
    let store = profile.open();
    assert_eq!(check(&store, PageGuard::Login), GuardOutcome::ToBoard);
    assert_eq!(check(&store, PageGuard::Board), GuardOutcome::Allow);
}

// ============================================================================
// Submission to Archive
// ============================================================================

#[test]
fn test_ticket_flows_from_submission_to_archive() {
    init_tracing();
    let profile = TestProfile::new();
    let mut store = profile.open();
    store.init();
    add_admin(&mut store, "anna", &["Technik"]);

    // The submitter files a ticket and asks for an update.
    let id = file_ticket(&mut store, "Drucker druckt nicht", &["Technik"]);
    {
        let mut dash = Dashboard::new(&mut store).expect("dashboard");
        assert!(
            dash.post_chat(id, "Ist das Problem bekannt?", Vec::new())
                .expect("chat sent")
        );
    }

    // Staff pick it up on the board and answer in the chat.
    auth::login(&mut store, "anna", "123").expect("anna login");
    {
        let mut board = Board::new(&mut store).expect("board");
        let kanban = board.board();
        assert_eq!(kanban.new.len(), 1);
        assert!(board.move_ticket(id, TicketStatus::InProgress).expect("moved"));
        assert!(
            board
                .post_chat(id, "Wir schauen uns das an.", Vec::new())
                .expect("reply sent")
        );
        assert!(board.post_comment(id, "Toner bestellt").expect("note added"));
        assert!(board.toggle_assignee(id, "anna").expect("assigned"));
    }

    // The submitter sees the staff reply, not the internal note's text
    // in chat.
    auth::login(&mut store, "user", "123").expect("user login");
    {
        let dash = Dashboard::new(&mut store).expect("dashboard");
        let ticket = dash.ticket(id).expect("own ticket");
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(ticket.chat.len(), 2);
        let reply = ticket.chat.last().expect("staff reply");
        assert_eq!(reply.text, "Wir schauen uns das an.");
        assert_eq!(reply.role, Role::Admin);
        assert_eq!(ticket.assignees.len(), 1);
    }

    // Staff close and archive; the archived ticket refuses new chat.
    auth::login(&mut store, "anna", "123").expect("anna login");
    {
        let mut board = Board::new(&mut store).expect("board");
        assert!(matches!(board.archive_ticket(id), Err(AdminError::NotClosed)));
        assert!(board.move_ticket(id, TicketStatus::Closed).expect("closed"));
        assert!(board.archive_ticket(id).expect("archived"));
        assert_eq!(board.board().total(), 0);
        assert!(matches!(
            board.post_chat(id, "Noch da?", Vec::new()),
            Err(AdminError::Archived)
        ));
    }

    // The submitter still sees the archived ticket, read-only.
    auth::login(&mut store, "user", "123").expect("user login");
    {
        let mut dash = Dashboard::new(&mut store).expect("dashboard");
        assert_eq!(dash.my_tickets().len(), 1);
        assert!(matches!(
            dash.post_chat(id, "Hallo?", Vec::new()),
            Err(DashboardError::Archived)
        ));
    }

    // Only the superadmin brings it back, into In Bearbeitung.
    auth::login(&mut store, "anna", "123").expect("anna login");
    {
        let mut board = Board::new(&mut store).expect("board");
        assert!(matches!(
            board.reactivate_ticket(id),
            Err(AdminError::Forbidden)
        ));
    }
    auth::login(&mut store, "admin", "123").expect("admin login");
    {
        let mut board = Board::new(&mut store).expect("board");
        assert!(board.reactivate_ticket(id).expect("reactivated"));
        let ticket = board.ticket(id).expect("ticket");
        assert!(!ticket.archived);
        assert_eq!(ticket.status, TicketStatus::InProgress);
        assert_eq!(board.board().in_progress.len(), 1);
    }

    // The audit trail tells the whole story, on disk.
    let store = profile.open();
    let ticket = store.ticket(id).expect("ticket persisted");
    let messages: Vec<&str> = ticket
        .logs
        .iter()
        .map(|entry| entry.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Ticket erstellt",
            "Nachricht gesendet",
            "Status geändert von Neu zu In Bearbeitung",
            "Nachricht gesendet",
            "Interne Notiz hinzugefügt",
            "Admin anna hinzugefügt",
            "Status geändert von In Bearbeitung zu Geschlossen",
            "Ticket archiviert",
            "Ticket aus dem Archiv reaktiviert",
        ]
    );
}

// ============================================================================
// Department Routing
// ============================================================================

#[test]
fn test_department_routing_controls_board_visibility() {
    init_tracing();
    let profile = TestProfile::new();
    let mut store = profile.open();
    store.init();
    add_admin(&mut store, "anna", &["Technik"]);
    add_admin(&mut store, "karl", &["Abrechnung"]);

    let technik = file_ticket(&mut store, "VPN Zugang", &["Technik"]);
    let billing = file_ticket(&mut store, "Falsche Rechnung", &["Abrechnung"]);

    auth::login(&mut store, "anna", "123").expect("anna login");
    {
        let board = Board::new(&mut store).expect("board");
        let kanban = board.board();
        assert_eq!(kanban.total(), 1);
        assert_eq!(kanban.new.first().expect("ticket").id, technik);
        // A direct link still opens the foreign ticket.
        assert!(board.ticket(billing).is_some());
    }

    auth::login(&mut store, "karl", "123").expect("karl login");
    {
        let board = Board::new(&mut store).expect("board");
        assert_eq!(board.board().new.first().expect("ticket").id, billing);
    }

    // The wildcard department of the built-in admin covers everything.
    auth::login(&mut store, "admin", "123").expect("admin login");
    let board = Board::new(&mut store).expect("board");
    assert_eq!(board.board().total(), 2);
}

#[test]
fn test_dashboard_never_shows_foreign_tickets() {
    init_tracing();
    let profile = TestProfile::new();
    let mut store = profile.open();
    store.init();
    add_admin(&mut store, "anna", &["Technik"]);
    let foreign = file_ticket(&mut store, "Fremdes Ticket", &["Technik"]);

    // anna is staff, but her dashboard only lists what she authored.
    auth::login(&mut store, "anna", "123").expect("anna login");
    let mut dash = Dashboard::new(&mut store).expect("dashboard");
    assert!(dash.my_tickets().is_empty());
    assert!(dash.ticket(foreign).is_none());
    assert!(!dash.post_chat(foreign, "Hallo?", Vec::new()).expect("no-op"));
}

// ============================================================================
// Archive View
// ============================================================================

#[test]
fn test_archive_search_spans_sessions() {
    init_tracing();
    let profile = TestProfile::new();
    {
        let mut store = profile.open();
        store.init();
        for title in ["Drucker defekt", "Monitor flackert"] {
            let id = file_ticket(&mut store, title, &["Technik"]);
            auth::login(&mut store, "admin", "123").expect("admin login");
            let mut board = Board::new(&mut store).expect("board");
            board.move_ticket(id, TicketStatus::Closed).expect("closed");
            board.archive_ticket(id).expect("archived");
        }
    }

    // Next page load: the archive is still searchable.
    let mut store = profile.open();
    store.init();
    auth::login(&mut store, "admin", "123").expect("admin login");
    let board = Board::new(&mut store).expect("board");
    assert_eq!(board.archived_tickets("").len(), 2);
    assert_eq!(board.archived_tickets("drucker").len(), 1);
    assert_eq!(board.archived_tickets("mustermann").len(), 2);
    assert!(board.archived_tickets("zzz").is_empty());

    // The submitter's history shows them too.
    assert_eq!(board.author_history("user", "").len(), 2);
    assert_eq!(board.author_history("user", "monitor").len(), 1);
}
