//! HTML rendering of a `BoardView`.
//!
//! Task text and drafts are user-controlled; every interpolated value goes
//! through `escape_html` so markup in task text displays literally.
//! Interactive elements carry `data-handler` ids instead of inline scripts.

use super::{Affordance, BoardView, ProgressView, RowAction, RowState, RowView};
use std::fmt::{self, Display, Formatter};

const EMPTY_STATE_TEXT: &str = "No tasks yet. Add one above.";

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders the whole board as one HTML fragment.
pub fn to_html(view: &BoardView) -> String {
    BoardHtml(view).to_string()
}

/// `Display` adapter writing a board as HTML.
pub struct BoardHtml<'a>(pub &'a BoardView);

impl Display for BoardHtml<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let view = self.0;

        write!(
            f,
            "<header><h1 id=\"greeting\">{}</h1>",
            escape_html(&view.header.greeting)
        )?;
        if let Some(date) = &view.header.date {
            write!(f, "<p id=\"date\">{}</p>", escape_html(date))?;
        }
        f.write_str("</header>")?;

        match &view.progress {
            ProgressView::Percent { percent } => write!(
                f,
                "<div class=\"progress\"><div id=\"progress-bar\" style=\"width: {percent}%\"></div><span id=\"progress-percent\">{percent}%</span></div>"
            )?,
            ProgressView::Remaining { label, .. } => {
                write!(f, "<p id=\"remaining\">{}</p>", escape_html(label))?
            }
        }

        write!(
            f,
            "<input id=\"todo-input\" type=\"text\" value=\"{}\"><button id=\"add-btn\">Add</button>",
            escape_html(&view.add_draft)
        )?;

        let hidden = if view.empty_state_visible { "" } else { " hidden" };
        write!(
            f,
            "<p id=\"empty-state\" class=\"empty-state{hidden}\">{EMPTY_STATE_TEXT}</p>"
        )?;

        f.write_str("<ul id=\"todo-list\">")?;
        for row in &view.rows {
            write_row(f, row)?;
        }
        f.write_str("</ul>")
    }
}

fn write_row(f: &mut Formatter<'_>, row: &RowView) -> fmt::Result {
    let mut classes = Vec::new();
    if row.completed {
        classes.push("completed");
    }
    match row.state {
        RowState::CompletionPending => classes.push("completing"),
        RowState::Exiting => classes.push("exiting"),
        RowState::Normal | RowState::Editing { .. } => {}
    }
    write!(
        f,
        "<li class=\"{}\" data-task-id=\"{}\">",
        classes.join(" "),
        row.task_id
    )?;

    if let RowState::Editing { draft, autofocus } = &row.state {
        write!(
            f,
            "<input type=\"text\" class=\"edit-input\" value=\"{}\"{}>",
            escape_html(draft),
            if *autofocus { " autofocus" } else { "" }
        )?;
        f.write_str("<div class=\"actions\">")?;
        write_button(f, &row.affordances, RowAction::Save, "icon-btn")?;
        return f.write_str("</div></li>");
    }

    match find(&row.affordances, RowAction::Toggle) {
        Some(toggle) => write!(
            f,
            "<div class=\"task-left\" data-handler=\"{}\">",
            toggle.handler
        )?,
        None => f.write_str("<div class=\"task-left\">")?,
    }
    write!(
        f,
        "<div class=\"custom-checkbox\"></div><span class=\"task-content\">{}</span></div>",
        escape_html(&row.text)
    )?;
    f.write_str("<div class=\"actions\">")?;
    write_button(f, &row.affordances, RowAction::Edit, "icon-btn")?;
    write_button(f, &row.affordances, RowAction::Delete, "icon-btn delete-btn")?;
    f.write_str("</div></li>")
}

fn write_button(
    f: &mut Formatter<'_>,
    affordances: &[Affordance],
    action: RowAction,
    class: &str,
) -> fmt::Result {
    match find(affordances, action) {
        Some(affordance) => write!(
            f,
            "<button class=\"{class}\" data-action=\"{}\" data-handler=\"{}\"></button>",
            action.as_str(),
            affordance.handler
        ),
        None => Ok(()),
    }
}

fn find(affordances: &[Affordance], action: RowAction) -> Option<&Affordance> {
    affordances.iter().find(|affordance| affordance.action == action)
}
