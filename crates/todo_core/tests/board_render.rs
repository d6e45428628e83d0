use std::collections::BTreeMap;
use todo_core::render::{HandlerError, RenderEngine, RenderInput};
use todo_core::{
    to_html, BoardVariant, Header, PendingKind, PendingOp, ProgressView, RowAction, RowState,
    Task, TaskId, TaskList,
};

fn header(variant: BoardVariant) -> Header {
    Header {
        greeting: "Good Morning, Boss".to_string(),
        date: variant.shows_date().then(|| "Monday, Oct 19".to_string()),
    }
}

fn list(flags: &[bool]) -> TaskList {
    TaskList::new(
        flags
            .iter()
            .enumerate()
            .map(|(index, &completed)| Task {
                id: TaskId::new(100 - index as u64),
                text: format!("task {index}"),
                completed,
            })
            .collect(),
    )
}

fn input<'a>(
    variant: BoardVariant,
    header: &'a Header,
    list: &'a TaskList,
    pending: &'a BTreeMap<TaskId, PendingOp>,
) -> RenderInput<'a> {
    RenderInput {
        variant,
        header,
        list,
        editing: None,
        pending,
        add_draft: "",
        edit_draft: None,
    }
}

#[test]
fn empty_board_shows_empty_state_and_zero_progress() {
    let header = header(BoardVariant::Premium);
    let tasks = TaskList::default();
    let pending = BTreeMap::new();
    let mut engine = RenderEngine::new();

    let view = engine.render(&input(BoardVariant::Premium, &header, &tasks, &pending));
    assert!(view.empty_state_visible);
    assert_eq!(view.progress, ProgressView::Percent { percent: 0 });
    assert!(view.rows.is_empty());
    assert!(engine.handlers().is_empty());
}

#[test]
fn premium_progress_is_rounded_percentage() {
    let header = header(BoardVariant::Premium);
    let tasks = list(&[true, false, true, false]);
    let pending = BTreeMap::new();
    let mut engine = RenderEngine::new();

    let view = engine.render(&input(BoardVariant::Premium, &header, &tasks, &pending));
    assert!(!view.empty_state_visible);
    assert_eq!(view.progress, ProgressView::Percent { percent: 50 });

    let html = to_html(&view);
    assert!(html.contains("style=\"width: 50%\""));
    assert!(html.contains(">50%</span>"));
    assert!(html.contains("empty-state hidden"));
}

#[test]
fn lovely_progress_counts_remaining_tasks() {
    let header = header(BoardVariant::Lovely);
    let tasks = list(&[true, false, false]);
    let pending = BTreeMap::new();
    let mut engine = RenderEngine::new();

    let view = engine.render(&input(BoardVariant::Lovely, &header, &tasks, &pending));
    assert_eq!(
        view.progress,
        ProgressView::Remaining {
            count: 2,
            label: "2 tasks left".to_string(),
        }
    );
}

#[test]
fn rows_follow_list_order_with_variant_affordances() {
    let tasks = list(&[false, true]);
    let pending = BTreeMap::new();
    let mut engine = RenderEngine::new();

    let premium_header = header(BoardVariant::Premium);
    let premium = engine.render(&input(BoardVariant::Premium, &premium_header, &tasks, &pending));
    let ids = premium.rows.iter().map(|row| row.task_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![TaskId::new(100), TaskId::new(99)]);
    let actions = premium.rows[0]
        .affordances
        .iter()
        .map(|affordance| affordance.action)
        .collect::<Vec<_>>();
    assert_eq!(
        actions,
        vec![RowAction::Toggle, RowAction::Edit, RowAction::Delete]
    );
    assert!(premium.rows[1].completed);

    let lovely_header = header(BoardVariant::Lovely);
    let lovely = engine.render(&input(BoardVariant::Lovely, &lovely_header, &tasks, &pending));
    let actions = lovely.rows[0]
        .affordances
        .iter()
        .map(|affordance| affordance.action)
        .collect::<Vec<_>>();
    assert_eq!(actions, vec![RowAction::Toggle, RowAction::Delete]);
}

#[test]
fn editing_row_offers_save_with_autofocus() {
    let header = header(BoardVariant::Premium);
    let tasks = list(&[false, false]);
    let pending = BTreeMap::new();
    let mut engine = RenderEngine::new();

    let mut render_input = input(BoardVariant::Premium, &header, &tasks, &pending);
    render_input.editing = Some(TaskId::new(99));
    render_input.edit_draft = Some("draft <text>");
    let view = engine.render(&render_input);

    assert_eq!(view.rows[0].state, RowState::Normal);
    assert_eq!(
        view.rows[1].state,
        RowState::Editing {
            draft: "draft <text>".to_string(),
            autofocus: true,
        }
    );
    assert!(view.rows[1].handler_for(RowAction::Save).is_some());
    assert!(view.rows[1].handler_for(RowAction::Toggle).is_none());

    let html = to_html(&view);
    assert!(html.contains("value=\"draft &lt;text&gt;\" autofocus"));
}

#[test]
fn pending_rows_render_once_without_affordances() {
    let header = header(BoardVariant::Lovely);
    let tasks = list(&[false, false]);
    let mut pending = BTreeMap::new();
    pending.insert(
        TaskId::new(100),
        PendingOp {
            kind: PendingKind::Removal,
            due_at_ms: 10,
        },
    );
    pending.insert(
        TaskId::new(99),
        PendingOp {
            kind: PendingKind::Completion,
            due_at_ms: 10,
        },
    );
    let mut engine = RenderEngine::new();

    for _ in 0..3 {
        let view = engine.render(&input(BoardVariant::Lovely, &header, &tasks, &pending));
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].state, RowState::Exiting);
        assert_eq!(view.rows[1].state, RowState::CompletionPending);
        assert!(view.rows.iter().all(|row| row.affordances.is_empty()));
    }
}

#[test]
fn handlers_resolve_only_for_the_latest_render() {
    let header = header(BoardVariant::Premium);
    let tasks = list(&[false]);
    let pending = BTreeMap::new();
    let mut engine = RenderEngine::new();

    let first = engine.render(&input(BoardVariant::Premium, &header, &tasks, &pending));
    let delete = first.rows[0].handler_for(RowAction::Delete).unwrap();
    let binding = engine.resolve(delete).unwrap();
    assert_eq!(binding.task_id, TaskId::new(100));
    assert_eq!(binding.action, RowAction::Delete);

    engine.render(&input(BoardVariant::Premium, &header, &tasks, &pending));
    assert_eq!(engine.resolve(delete), Err(HandlerError::Stale(delete)));
}

#[test]
fn task_text_is_escaped_in_markup() {
    let header = header(BoardVariant::Premium);
    let tasks = TaskList::new(vec![Task {
        id: TaskId::new(1),
        text: "<script>alert(1)</script>".to_string(),
        completed: false,
    }]);
    let pending = BTreeMap::new();
    let mut engine = RenderEngine::new();

    let view = engine.render(&input(BoardVariant::Premium, &header, &tasks, &pending));
    assert_eq!(view.rows[0].text, "<script>alert(1)</script>");

    let html = to_html(&view);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(html.contains("<p id=\"date\">Monday, Oct 19</p>"));
}
