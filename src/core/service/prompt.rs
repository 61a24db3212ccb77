//! Operator prompts.
//!
//! Services and the engine ask questions through [`Io`], never through the
//! terminal directly, so conflict confirmations can be scripted in tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use console::{style, Term};
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::error::{Error, Result, ServiceError};

/// Answers questions for the engine.
pub trait Prompt {
    /// Ask a yes/no question.
    fn confirm(&self, message: &str, help: Option<&str>, default: bool) -> Result<bool>;

    /// Ask for free text.
    fn input(&self, message: &str, default: Option<&str>, help: Option<&str>) -> Result<String>;

    /// Pick one item; returns its index.
    fn select(&self, message: &str, items: &[String], default: usize) -> Result<usize>;

    /// Pick any number of items; returns their indexes.
    fn multi_select(&self, message: &str, items: &[String]) -> Result<Vec<usize>>;
}

/// Shared handle passed to services and actions.
#[derive(Clone)]
pub struct Io {
    prompt: Rc<dyn Prompt>,
}

impl Io {
    pub fn new(prompt: Rc<dyn Prompt>) -> Self {
        Self { prompt }
    }

    /// Interactive terminal prompts.
    pub fn terminal() -> Self {
        Self::new(Rc::new(Terminal))
    }

    /// Prompts that always take the default answer.
    pub fn unattended() -> Self {
        Self::new(Rc::new(Unattended))
    }

    pub fn confirm(&self, message: &str, help: Option<&str>, default: bool) -> Result<bool> {
        self.prompt.confirm(message, help, default)
    }

    pub fn input(&self, message: &str, default: Option<&str>, help: Option<&str>) -> Result<String> {
        self.prompt.input(message, default, help)
    }

    pub fn select(&self, message: &str, items: &[String], default: usize) -> Result<usize> {
        self.prompt.select(message, items, default)
    }

    pub fn multi_select(&self, message: &str, items: &[String]) -> Result<Vec<usize>> {
        self.prompt.multi_select(message, items)
    }
}

impl std::fmt::Debug for Io {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Io").finish_non_exhaustive()
    }
}

/// Prompts rendered with dialoguer on stderr.
///
/// Falls back to [`Unattended`] answers when stderr is not a terminal.
pub struct Terminal;

impl Terminal {
    fn attached() -> bool {
        Term::stderr().is_term()
    }

    fn help(help: Option<&str>) {
        if let Some(help) = help {
            let _ = Term::stderr().write_line(&style(help).dim().to_string());
        }
    }
}

impl Prompt for Terminal {
    fn confirm(&self, message: &str, help: Option<&str>, default: bool) -> Result<bool> {
        if !Self::attached() {
            return Unattended.confirm(message, help, default);
        }
        Self::help(help);
        Ok(Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()?)
    }

    fn input(&self, message: &str, default: Option<&str>, help: Option<&str>) -> Result<String> {
        if !Self::attached() {
            return Unattended.input(message, default, help);
        }
        Self::help(help);
        let mut input = Input::<String>::new().with_prompt(message);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn select(&self, message: &str, items: &[String], default: usize) -> Result<usize> {
        if !Self::attached() {
            return Unattended.select(message, items, default);
        }
        Ok(Select::new()
            .with_prompt(message)
            .items(items)
            .default(default)
            .interact()?)
    }

    fn multi_select(&self, message: &str, items: &[String]) -> Result<Vec<usize>> {
        if !Self::attached() {
            return Unattended.multi_select(message, items);
        }
        Ok(MultiSelect::new()
            .with_prompt(message)
            .items(items)
            .interact()?)
    }
}

/// Non-interactive prompts: defaults only.
pub struct Unattended;

impl Prompt for Unattended {
    fn confirm(&self, _message: &str, _help: Option<&str>, default: bool) -> Result<bool> {
        Ok(default)
    }

    fn input(&self, message: &str, default: Option<&str>, _help: Option<&str>) -> Result<String> {
        match default {
            Some(d) => Ok(d.to_string()),
            None => Err(ServiceError::MissingOption(message.to_string()).into()),
        }
    }

    fn select(&self, message: &str, items: &[String], default: usize) -> Result<usize> {
        if default < items.len() {
            Ok(default)
        } else {
            Err(ServiceError::MissingOption(message.to_string()).into())
        }
    }

    fn multi_select(&self, message: &str, _items: &[String]) -> Result<Vec<usize>> {
        Err(Error::Prompt(format!("{}: selection requires a terminal", message)))
    }
}

/// A queued answer for [`Scripted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    Text(String),
    Choice(usize),
    Choices(Vec<usize>),
}

/// Prompts answered from a queue; records every question asked.
///
/// When the queue is empty, answers like [`Unattended`].
#[derive(Debug, Default)]
pub struct Scripted {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
}

impl Scripted {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Queue another answer.
    pub fn push(&self, answer: Answer) {
        self.answers.borrow_mut().push_back(answer);
    }

    /// Every prompt message seen so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    fn next(&self, message: &str) -> Option<Answer> {
        self.asked.borrow_mut().push(message.to_string());
        self.answers.borrow_mut().pop_front()
    }

    fn mismatch(message: &str, answer: &Answer) -> Error {
        Error::Prompt(format!("scripted answer {:?} does not fit `{}`", answer, message))
    }
}

impl Prompt for Scripted {
    fn confirm(&self, message: &str, help: Option<&str>, default: bool) -> Result<bool> {
        match self.next(message) {
            Some(Answer::Confirm(v)) => Ok(v),
            Some(other) => Err(Self::mismatch(message, &other)),
            None => Unattended.confirm(message, help, default),
        }
    }

    fn input(&self, message: &str, default: Option<&str>, help: Option<&str>) -> Result<String> {
        match self.next(message) {
            Some(Answer::Text(v)) => Ok(v),
            Some(other) => Err(Self::mismatch(message, &other)),
            None => Unattended.input(message, default, help),
        }
    }

    fn select(&self, message: &str, items: &[String], default: usize) -> Result<usize> {
        match self.next(message) {
            Some(Answer::Choice(i)) if i < items.len() => Ok(i),
            Some(other) => Err(Self::mismatch(message, &other)),
            None => Unattended.select(message, items, default),
        }
    }

    fn multi_select(&self, message: &str, items: &[String]) -> Result<Vec<usize>> {
        match self.next(message) {
            Some(Answer::Choices(v)) if v.iter().all(|i| *i < items.len()) => Ok(v),
            Some(other) => Err(Self::mismatch(message, &other)),
            None => Unattended.multi_select(message, items),
        }
    }
}
