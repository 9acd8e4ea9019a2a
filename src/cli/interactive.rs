use anyhow::Result;
use console::style;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output::{self, ExportSelection, FontChoice};
use crate::session::{reduce, Action, Session, SummaryStyle, WORD_LIMIT_MAX, WORD_LIMIT_MIN};
use crate::summarize::SummaryWorkflow;

/// One line typed at the form prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Link(String),
    Style(SummaryStyle),
    WordLimit(Option<u32>),
    Summarize,
    Reset,
    Show,
    Save(Option<PathBuf>),
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  link <url>        set the YouTube video link
  style <name>      balanced, professional, formal, casual, concise, detailed
  limit <n> | off   word limit (50-1000) or no limit
  summarize         fetch the transcript and summarize
  show              print the form and the current summary
  save [dir]        save video_summary.txt and video_summary.pdf
  reset             clear the form
  quit              exit";

/// Parse one input line
pub fn parse_command(line: &str) -> std::result::Result<FormCommand, String> {
    let line = line.trim();
    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    match name.to_lowercase().as_str() {
        "link" => Ok(FormCommand::Link(arg.to_string())),
        "style" => SummaryStyle::from_name(arg)
            .map(FormCommand::Style)
            .ok_or_else(|| format!("Unknown summary type: {}", arg)),
        "limit" => parse_limit(arg).map(FormCommand::WordLimit),
        "summarize" | "s" => Ok(FormCommand::Summarize),
        "reset" | "clear" => Ok(FormCommand::Reset),
        "show" => Ok(FormCommand::Show),
        "save" => Ok(FormCommand::Save((!arg.is_empty()).then(|| PathBuf::from(arg)))),
        "help" | "?" => Ok(FormCommand::Help),
        "quit" | "exit" | "q" => Ok(FormCommand::Quit),
        "" => Err("Type 'help' for the list of commands".to_string()),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_limit(arg: &str) -> std::result::Result<Option<u32>, String> {
    if arg.eq_ignore_ascii_case("off") {
        return Ok(None);
    }

    let value: u32 = arg
        .parse()
        .map_err(|_| format!("Word limit must be a number or 'off', got '{}'", arg))?;

    if !(WORD_LIMIT_MIN..=WORD_LIMIT_MAX).contains(&value) {
        return Err(format!(
            "Word limit must be between {} and {}",
            WORD_LIMIT_MIN, WORD_LIMIT_MAX
        ));
    }

    Ok(Some(value))
}

/// Form edits expressed as session actions
pub fn form_actions(command: &FormCommand) -> Vec<Action> {
    match command {
        FormCommand::Link(link) => vec![Action::SetLink(link.clone())],
        FormCommand::Style(style) => vec![Action::SelectStyle(*style)],
        FormCommand::WordLimit(Some(value)) => {
            vec![Action::SetUseWordLimit(true), Action::SetWordLimitValue(*value)]
        }
        FormCommand::WordLimit(None) => vec![Action::SetUseWordLimit(false)],
        FormCommand::Reset => vec![Action::Reset],
        _ => Vec::new(),
    }
}

/// Run the form loop on stdin until `quit` or end of input
pub async fn run(
    workflow: &SummaryWorkflow,
    font: &FontChoice,
    default_output_dir: Option<PathBuf>,
) -> Result<()> {
    println!("{}", style("YouTube Video Summary").bold());
    println!("Type 'help' for commands.");

    let mut session = Session::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", style(message).yellow());
                continue;
            }
        };

        session = form_actions(&command).into_iter().fold(session, reduce);

        match command {
            FormCommand::Summarize => {
                let outcome = workflow.summarize(session).await;
                session = outcome.session;
                match outcome.error {
                    Some(error) => output::print_error(&error),
                    None => output::print_summary(&session),
                }
            }
            FormCommand::Show => print_form(&session),
            FormCommand::Save(dir) => {
                let Some(dir) = dir.or_else(|| default_output_dir.clone()) else {
                    println!("{}", style("Give a directory: save <dir>").yellow());
                    continue;
                };
                match save_downloads(&session, &dir, font) {
                    Ok(paths) if paths.is_empty() => {
                        println!("{}", style("Nothing to save yet, summarize a video first.").yellow());
                    }
                    Ok(paths) => {
                        for path in paths {
                            println!("Saved {}", path.display());
                        }
                    }
                    Err(err) => {
                        tracing::warn!("Saving downloads failed: {:#}", err);
                        println!("{}", style(format!("Could not save: {:#}", err)).red());
                    }
                }
            }
            FormCommand::Reset => println!("Form cleared."),
            FormCommand::Help => println!("{}", HELP),
            FormCommand::Quit => break,
            FormCommand::Link(_) | FormCommand::Style(_) | FormCommand::WordLimit(_) => {}
        }
    }

    Ok(())
}

/// Write both downloads of `session` into `dir`
pub fn save_downloads(session: &Session, dir: &Path, font: &FontChoice) -> Result<Vec<PathBuf>> {
    output::downloads(session, ExportSelection::from_flags(true, true), font)?
        .iter()
        .map(|file| file.save_to(dir))
        .collect()
}

fn print_prompt() {
    use std::io::Write;

    print!("{} ", style(">").cyan());
    let _ = std::io::stdout().flush();
}

fn print_form(session: &Session) {
    let link = if session.video_link.is_empty() {
        "(none)"
    } else {
        session.video_link.as_str()
    };
    println!("Link:         {}", link);
    println!("Summary type: {}", session.selected_summary_type);
    match session.word_limit() {
        Some(limit) => println!("Word limit:   {}", limit),
        None => println!("Word limit:   off"),
    }
    output::print_summary(session);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("link https://www.youtube.com/watch?v=abc"),
            Ok(FormCommand::Link("https://www.youtube.com/watch?v=abc".to_string()))
        );
        assert_eq!(parse_command("  style   Casual "), Ok(FormCommand::Style(SummaryStyle::Casual)));
        assert_eq!(parse_command("limit 300"), Ok(FormCommand::WordLimit(Some(300))));
        assert_eq!(parse_command("limit OFF"), Ok(FormCommand::WordLimit(None)));
        assert_eq!(parse_command("s"), Ok(FormCommand::Summarize));
        assert_eq!(parse_command("save"), Ok(FormCommand::Save(None)));
        assert_eq!(
            parse_command("save ./out"),
            Ok(FormCommand::Save(Some(PathBuf::from("./out"))))
        );
        assert_eq!(parse_command("QUIT"), Ok(FormCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("style loud").is_err());
        assert!(parse_command("limit 20").is_err());
        assert!(parse_command("limit 1001").is_err());
        assert!(parse_command("limit lots").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn test_form_actions_drive_session() {
        let session = [
            FormCommand::Link("https://www.youtube.com/watch?v=abc".to_string()),
            FormCommand::Style(SummaryStyle::Formal),
            FormCommand::WordLimit(Some(400)),
        ]
        .iter()
        .flat_map(form_actions)
        .fold(Session::default(), reduce);

        assert_eq!(session.video_link, "https://www.youtube.com/watch?v=abc");
        assert_eq!(session.selected_summary_type, SummaryStyle::Formal);
        assert_eq!(session.word_limit(), Some(400));

        let session = form_actions(&FormCommand::WordLimit(None))
            .into_iter()
            .fold(session, reduce);
        assert_eq!(session.word_limit(), None);
        // stepper value is kept for when the limit is turned back on
        assert_eq!(session.word_limit_value, 400);

        let session = form_actions(&FormCommand::Reset).into_iter().fold(session, reduce);
        assert_eq!(session, Session::default());
    }

    fn summarized() -> Session {
        reduce(
            Session::default(),
            Action::SummaryReady("A short summary.".to_string()),
        )
    }

    #[test]
    fn test_save_downloads_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");

        let paths = save_downloads(&summarized(), &out, &FontChoice::Builtin).unwrap();
        assert_eq!(
            paths,
            vec![out.join("video_summary.txt"), out.join("video_summary.pdf")]
        );
        assert_eq!(fs_err::read_to_string(&paths[0]).unwrap(), "A short summary.");
    }

    #[test]
    fn test_save_downloads_nothing_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let paths = save_downloads(&Session::default(), dir.path(), &FontChoice::Builtin).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn test_save_downloads_under_regular_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        fs_err::write(&file, "occupied").unwrap();

        let result = save_downloads(&summarized(), &file.join("out"), &FontChoice::Builtin);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_form_commands_have_no_actions() {
        assert!(form_actions(&FormCommand::Summarize).is_empty());
        assert!(form_actions(&FormCommand::Help).is_empty());
    }
}
