use std::borrow::Cow;
use std::collections::BTreeSet;

use anstyle::Style;
use clap::CommandFactory;
use rustyline::completion::Completer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::Context;
use rustyline_derive::Helper;

/// Register names offered when completing a `register` argument
const REGISTERS: [&str; 10] = ["a", "b", "d", "dp", "cc", "x", "y", "s", "u", "pc"];

/// Completes, hints and highlights the debugger command line, driven by the
/// clap definition of the commands
#[derive(Helper, Debug)]
pub(crate) struct CommandHelper {
    command: clap::Command,
}

impl CommandHelper {
    pub fn new<T: CommandFactory>() -> Self {
        Self {
            command: T::command(),
        }
    }

    /// Candidates for the word under the cursor, along with the length of
    /// what was already typed of it
    fn candidates(&self, line: &str, pos: usize) -> Option<(usize, Vec<String>)> {
        let words = words_before_cursor(line, pos)?;
        let (typed, candidates) = candidates_for(&self.command, &words);
        Some((typed, candidates.into_iter().collect()))
    }
}

fn paint(style: Style, text: &str) -> String {
    format!("{}{text}{}", style.render(), style.render_reset())
}

/// Split the line up to the cursor in words, with an empty last word if the
/// cursor is right after a space
fn words_before_cursor(line: &str, pos: usize) -> Option<Vec<String>> {
    let line = line.get(..pos)?;
    let mut words = shell_words::split(line).ok()?;
    if line.ends_with([' ', '\t']) {
        words.push(String::new());
    }
    Some(words)
}

fn candidates_for(command: &clap::Command, words: &[String]) -> (usize, BTreeSet<String>) {
    match words {
        [] => (0, BTreeSet::new()),

        [last] => {
            let mut known: BTreeSet<String> = command
                .get_subcommands()
                .flat_map(|sub| {
                    std::iter::once(sub.get_name().to_owned())
                        .chain(sub.get_visible_aliases().map(ToOwned::to_owned))
                })
                .collect();

            if command.has_subcommands() {
                known.insert("help".to_owned());
            }

            let first_positional = command.get_positionals().next();
            if first_positional.is_some_and(|arg| arg.get_id() == "register") {
                known.extend(REGISTERS.map(ToOwned::to_owned));
            }

            known.retain(|candidate| candidate.starts_with(last.as_str()));
            (last.len(), known)
        }

        [first, rest @ ..] => command
            .find_subcommand(first)
            .map(|sub| candidates_for(sub, rest))
            .unwrap_or_default(),
    }
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        Ok(self
            .candidates(line, pos)
            .map_or((pos, Vec::new()), |(typed, candidates)| {
                (pos - typed, candidates)
            }))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let (typed, candidates) = self.candidates(line, pos)?;
        let [only] = candidates.as_slice() else {
            return None;
        };
        only.get(typed..).map(ToOwned::to_owned)
    }
}

impl Highlighter for CommandHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(paint(Style::new().dimmed(), hint))
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        _default: bool,
    ) -> Cow<'b, str> {
        Cow::Owned(paint(Style::new().bold(), prompt))
    }
}

impl Validator for CommandHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        // Keep reading while a quote is left open
        Ok(match shell_words::split(ctx.input()) {
            Ok(_) => ValidationResult::Valid(None),
            Err(_) => ValidationResult::Incomplete,
        })
    }
}
