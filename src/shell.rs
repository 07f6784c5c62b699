// Interactive line-oriented session driven by the view state machine

use crate::error::TaskError;
use crate::filter::StatusFilter;
use crate::kv::KeyValueStore;
use crate::models::TaskStatus;
use crate::render;
use crate::store::TaskStore;
use crate::view::{Action, Command, View, reduce};
use eyre::Result;
use std::io::{BufRead, Write};
use tracing::debug;

const DELETE_PROMPT: &str = "Are you sure you want to delete this task? [y/N] ";

const HOME_HELP: &str = "Commands: add, list, quit";
const FORM_HELP: &str = "Commands: title <text>, desc <text>, due <YYYY-MM-DD>, status <status>, save, cancel";
const LIST_HELP: &str = "Commands: filter <all|pending|in-progress|completed>, sort, show <id>, edit <id>, delete <id>, add, home";

/// What one input line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Act(Action),
    Show(String),
    Help,
    Quit,
    Blank,
}

pub struct Session<'a, S: KeyValueStore, R: BufRead, W: Write> {
    store: &'a mut TaskStore<S>,
    view: View,
    input: R,
    output: W,
}

impl<'a, S: KeyValueStore, R: BufRead, W: Write> Session<'a, S, R, W> {
    pub fn new(store: &'a mut TaskStore<S>, input: R, output: W) -> Self {
        Self {
            store,
            view: View::Home,
            input,
            output,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// Read and handle lines until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        self.enter_view()?;
        while let Some(line) = self.prompt()? {
            match self.parse(&line) {
                Ok(Input::Quit) => break,
                Ok(Input::Blank) => {}
                Ok(Input::Help) => {
                    let help = self.help();
                    writeln!(self.output, "{}", help)?;
                }
                Ok(Input::Show(prefix)) => match self.store.find_by_prefix(&prefix) {
                    Ok(task) => write!(self.output, "{}", render::task_detail(task))?,
                    Err(e) => writeln!(self.output, "{}", e)?,
                },
                Ok(Input::Act(action)) => self.dispatch(action)?,
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, action: Action) -> Result<()> {
        if matches!(action, Action::DeleteTask(_)) && !self.confirm(DELETE_PROMPT)? {
            return Ok(());
        }

        let previous = self.view.clone();
        let transition = reduce(&self.view, action);
        debug!(from = previous.name(), to = transition.view.name(), "View transition");
        self.view = transition.view;

        if let Some(command) = transition.command {
            if let Err(e) = self.execute(command) {
                // Nothing changed in the store; report and keep the session going
                writeln!(self.output, "{:#}", e)?;
                let keep_form = match e.downcast_ref::<TaskError>() {
                    Some(task_error) => task_error.is_validation(),
                    None => matches!(previous, View::Editing { .. }),
                };
                if keep_form {
                    self.view = previous.clone();
                }
            }
        }

        if self.view != previous || matches!(self.view, View::Listing { .. }) {
            self.enter_view()?;
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Create(draft) => {
                let task = self.store.create(&draft)?;
                writeln!(self.output, "Added task {}", self.store.short_id(&task))?;
            }
            Command::Update(id, draft) => {
                let task = self.store.update(&id, &draft)?;
                writeln!(self.output, "Updated task {}", self.store.short_id(&task))?;
            }
            Command::Delete(id) => {
                let task = self.store.delete(&id)?;
                writeln!(self.output, "Deleted task {}", task.id)?;
            }
        }
        Ok(())
    }

    fn enter_view(&mut self) -> Result<()> {
        match &self.view {
            View::Home => writeln!(self.output, "Task Manager\n{}", HOME_HELP)?,
            View::Editing { target, form } => {
                write!(self.output, "{}", render::task_form(target.is_some(), form))?;
            }
            View::Listing { query } => {
                let tasks = self.store.list(query);
                writeln!(self.output, "Task List - {}", render::query_summary(query))?;
                write!(self.output, "{}", render::task_table(&tasks, self.store.short_id_len()))?;
            }
        }
        Ok(())
    }

    fn help(&self) -> &'static str {
        match self.view {
            View::Home => HOME_HELP,
            View::Editing { .. } => FORM_HELP,
            View::Listing { .. } => LIST_HELP,
        }
    }

    fn prompt(&mut self) -> Result<Option<String>> {
        write!(self.output, "{}> ", self.view.name())?;
        self.output.flush()?;
        self.read_line()
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }

    fn parse(&self, line: &str) -> Result<Input, String> {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let action = match (word.to_lowercase().as_str(), &self.view) {
            ("", _) => return Ok(Input::Blank),
            ("quit" | "exit" | "q", _) => return Ok(Input::Quit),
            ("help" | "?", _) => return Ok(Input::Help),
            ("home", _) => Action::GoHome,
            ("add" | "new", _) => Action::NewTask,
            ("list" | "tasks", _) => Action::ShowList,

            ("title", View::Editing { .. }) => Action::SetTitle(rest.to_string()),
            ("desc" | "description", View::Editing { .. }) => Action::SetDescription(rest.to_string()),
            ("due", View::Editing { .. }) => Action::SetDueDate(rest.to_string()),
            ("status", View::Editing { .. }) => Action::SetStatus(rest.parse::<TaskStatus>()?),
            ("save" | "submit", View::Editing { .. }) => Action::Submit,
            ("cancel", View::Editing { .. }) => Action::Cancel,

            ("filter", View::Listing { .. }) => Action::SetFilter(rest.parse::<StatusFilter>()?),
            ("sort", View::Listing { .. }) => Action::ToggleSort,
            ("show", View::Listing { .. }) => return Ok(Input::Show(rest.to_string())),
            ("edit", View::Listing { .. }) => {
                let task = self.store.find_by_prefix(rest).map_err(|e| e.to_string())?;
                Action::EditTask(task.clone())
            }
            ("delete", View::Listing { .. }) => {
                let task = self.store.find_by_prefix(rest).map_err(|e| e.to_string())?;
                Action::DeleteTask(task.id.clone())
            }

            (other, _) => return Err(format!("Unknown command: {} ({})", other, self.help())),
        };
        Ok(Input::Act(action))
    }
}
