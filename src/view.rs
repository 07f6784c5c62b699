// View state machine for interactive front ends
//
// The reducer is pure: it never touches the task store. Store work is handed
// back as a `Command` for the caller to run.

use crate::filter::{ListQuery, StatusFilter};
use crate::models::{Task, TaskDraft, TaskStatus};

/// Which screen the user is on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    /// Add form when `target` is `None`, edit form otherwise
    Editing { target: Option<String>, form: TaskDraft },
    Listing { query: ListQuery },
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Editing { target: None, .. } => "add",
            View::Editing { target: Some(_), .. } => "edit",
            View::Listing { .. } => "tasks",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GoHome,
    NewTask,
    EditTask(Task),
    SetTitle(String),
    SetDescription(String),
    SetDueDate(String),
    SetStatus(TaskStatus),
    Submit,
    Cancel,
    ShowList,
    SetFilter(StatusFilter),
    ToggleSort,
    DeleteTask(String),
}

/// Store work requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(TaskDraft),
    Update(String, TaskDraft),
    Delete(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub view: View,
    pub command: Option<Command>,
}

impl Transition {
    fn to(view: View) -> Self {
        Self { view, command: None }
    }

    fn with(view: View, command: Command) -> Self {
        Self {
            view,
            command: Some(command),
        }
    }
}

/// Compute the next view for an action
///
/// Actions that make no sense on the current screen leave it as it is.
pub fn reduce(view: &View, action: Action) -> Transition {
    match (view, action) {
        (_, Action::GoHome) => Transition::to(View::Home),
        (_, Action::NewTask) => Transition::to(View::Editing {
            target: None,
            form: TaskDraft::default(),
        }),
        (_, Action::EditTask(task)) => Transition::to(View::Editing {
            form: task.to_draft(),
            target: Some(task.id),
        }),
        (_, Action::ShowList) => Transition::to(View::Listing {
            query: ListQuery::default(),
        }),

        (View::Editing { target, form }, Action::SetTitle(title)) => {
            let mut form = form.clone();
            form.title = title;
            Transition::to(View::Editing {
                target: target.clone(),
                form,
            })
        }
        (View::Editing { target, form }, Action::SetDescription(description)) => {
            let mut form = form.clone();
            form.description = description;
            Transition::to(View::Editing {
                target: target.clone(),
                form,
            })
        }
        (View::Editing { target, form }, Action::SetDueDate(due_date)) => {
            let mut form = form.clone();
            form.due_date = due_date;
            Transition::to(View::Editing {
                target: target.clone(),
                form,
            })
        }
        (View::Editing { target, form }, Action::SetStatus(status)) => {
            let mut form = form.clone();
            form.status = status;
            Transition::to(View::Editing {
                target: target.clone(),
                form,
            })
        }
        (View::Editing { target: None, form }, Action::Submit) => {
            Transition::with(View::Home, Command::Create(form.clone()))
        }
        (View::Editing { target: Some(id), form }, Action::Submit) => {
            Transition::with(View::Home, Command::Update(id.clone(), form.clone()))
        }
        (View::Editing { .. }, Action::Cancel) => Transition::to(View::Home),

        (View::Listing { query }, Action::SetFilter(status)) => Transition::to(View::Listing {
            query: ListQuery { status, ..*query },
        }),
        (View::Listing { query }, Action::ToggleSort) => Transition::to(View::Listing {
            query: ListQuery {
                sort_by_due_date: !query.sort_by_due_date,
                ..*query
            },
        }),
        (View::Listing { query }, Action::DeleteTask(id)) => {
            Transition::with(View::Listing { query: *query }, Command::Delete(id))
        }

        (current, _) => Transition::to(current.clone()),
    }
}
