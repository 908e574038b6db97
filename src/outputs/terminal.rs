//! Terminal front end for the conversation.
//!
//! Prints each transcript message once, shows the active prompt's options as
//! a numbered list, and reads the user's pick from a line-based reader.
//! Reader and writer are generic so the loop can be driven from tests.

use crate::api::NewsSource;
use crate::conversation::{Controller, Phase};
use crate::models::{ChatOption, Message, Sender};
use crate::usage::UsageStore;
use std::fmt::Write as _;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, instrument};

const TYPING: &str = "   · · ·";
const SEARCHING: &str = "   🔎 Searching the news · · ·";

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Quit,
    Choice(ChatOption),
    Invalid,
}

/// Interpret `line` against the options of `prompt`.
///
/// Accepts a 1-based option number, an option label or an option value
/// (case-insensitive), or `q` / `quit` / `exit`.
pub fn parse_input(line: &str, prompt: &Message) -> Input {
    let line = line.trim();
    if matches!(line.to_lowercase().as_str(), "q" | "quit" | "exit") {
        return Input::Quit;
    }

    if let Ok(n) = line.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| prompt.options.get(i))
            .map(|o| Input::Choice(o.clone()))
            .unwrap_or(Input::Invalid);
    }

    prompt
        .options
        .iter()
        .find(|o| o.label.eq_ignore_ascii_case(line) || o.value.eq_ignore_ascii_case(line))
        .map(|o| Input::Choice(o.clone()))
        .unwrap_or(Input::Invalid)
}

pub fn render_header(uses: u64) -> String {
    format!("🗞️  NewsByte  ·  Global bot usage: {uses}\n")
}

/// Render one message, with its options numbered when it has any.
pub fn render_message(message: &Message) -> String {
    let mut out = String::new();
    let who = match message.sender {
        Sender::Bot => "🤖 NewsByte",
        Sender::User => "🧑 You",
    };
    writeln!(out, "[{}] {}", message.sent_at.format("%H:%M"), who).unwrap();
    for line in message.text.lines() {
        writeln!(out, "   {line}").unwrap();
    }
    for (i, option) in message.options.iter().enumerate() {
        writeln!(out, "   {}) {}", i + 1, option.label).unwrap();
    }
    out
}

/// Write every message after the first `shown` and return the new count.
async fn flush_new<W, N, U>(
    out: &mut W,
    controller: &Controller<N, U>,
    shown: usize,
) -> std::io::Result<usize>
where
    W: AsyncWrite + Unpin,
    N: NewsSource,
    U: UsageStore,
{
    let messages = controller.transcript().messages();
    for message in &messages[shown..] {
        out.write_all(render_message(message).as_bytes()).await?;
        out.write_all(b"\n").await?;
    }
    out.flush().await?;
    Ok(messages.len())
}

/// Run the conversation until the user quits or input ends.
#[instrument(level = "debug", skip_all)]
pub async fn run<R, W, N, U>(
    controller: &mut Controller<N, U>,
    input: R,
    out: &mut W,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    N: NewsSource,
    U: UsageStore,
{
    let mut uses = controller.usage_count();
    out.write_all(render_header(uses).as_bytes()).await?;
    out.write_all(format!("{TYPING}\n").as_bytes()).await?;
    out.flush().await?;

    controller.start().await;
    let mut shown = flush_new(out, controller, 0).await?;
    let mut lines = input.lines();

    while let Some(prompt) = controller.active_prompt() {
        let prompt = prompt.clone();
        out.write_all(b"> ").await?;
        out.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("Input closed");
            break;
        };

        let option = match parse_input(&line, &prompt) {
            Input::Quit => break,
            Input::Invalid => {
                let hint = format!(
                    "   Pick a number from 1 to {}, or q to quit.\n",
                    prompt.options.len()
                );
                out.write_all(hint.as_bytes()).await?;
                continue;
            }
            Input::Choice(option) => option,
        };

        match controller.select(prompt.id, &option.value) {
            Ok(pending) => {
                shown = flush_new(out, controller, shown).await?;
                debug!(
                    phase = ?controller.phase(),
                    pending_category = ?controller.state().pending_category,
                    "Waiting on bot reply"
                );
                let indicator = if controller.phase() == Phase::Fetching {
                    SEARCHING
                } else {
                    TYPING
                };
                out.write_all(format!("{indicator}\n").as_bytes()).await?;
                out.flush().await?;
                controller.complete(pending).await;
                shown = flush_new(out, controller, shown).await?;
            }
            Err(e) => {
                out.write_all(format!("   {e}\n").as_bytes()).await?;
            }
        }

        if controller.usage_count() != uses {
            uses = controller.usage_count();
            out.write_all(format!("   (Global bot usage: {uses})\n\n").as_bytes())
                .await?;
        }
    }

    out.write_all(b"\nBye! Come back for more news.\n").await?;
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NewsProvider;
    use crate::api::tests::{Canned, FakeSource};
    use crate::conversation::{Pacing, category_options};
    use crate::fallback;
    use crate::usage::{MemoryUsageStore, UsageCounter};
    use chrono::Local;

    fn prompt() -> Message {
        Message {
            id: 1,
            text: "Please choose a category:".to_string(),
            sender: Sender::Bot,
            options: category_options(),
            sent_at: Local::now(),
        }
    }

    #[test]
    fn test_parse_input_by_number() {
        assert_eq!(
            parse_input("3", &prompt()),
            Input::Choice(ChatOption::new("technology", "technology"))
        );
        assert_eq!(parse_input("0", &prompt()), Input::Invalid);
        assert_eq!(parse_input("7", &prompt()), Input::Invalid);
    }

    #[test]
    fn test_parse_input_by_label() {
        assert_eq!(
            parse_input("  Sports ", &prompt()),
            Input::Choice(ChatOption::new("sports", "sports"))
        );
        assert_eq!(parse_input("weather", &prompt()), Input::Invalid);
    }

    #[test]
    fn test_parse_input_quit() {
        assert_eq!(parse_input("q", &prompt()), Input::Quit);
        assert_eq!(parse_input("QUIT", &prompt()), Input::Quit);
    }

    #[test]
    fn test_render_message_numbers_options() {
        let rendered = render_message(&prompt());
        assert!(rendered.contains("🤖 NewsByte"));
        assert!(rendered.contains("   1) business\n"));
        assert!(rendered.contains("   6) health\n"));
    }

    #[tokio::test]
    async fn test_run_scripted_session() {
        let provider = NewsProvider::new(
            FakeSource::new(Canned::Unreachable),
            UsageCounter::load(MemoryUsageStore::new()),
        );
        let mut controller = Controller::new(provider, Pacing::instant());
        let input: &[u8] = b"technology\nbogus\n1\nq\n";
        let mut out: Vec<u8> = Vec::new();

        run(&mut controller, input, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Global bot usage: 0"));
        assert!(text.contains("Pick a number from 1 to 2"));
        for article in fallback::articles_for("technology") {
            assert!(text.contains(&article.title));
        }
        assert!(text.contains("Searching the news"));
        assert!(text.contains("(Global bot usage: 1)"));
        assert!(text.ends_with("Bye! Come back for more news.\n"));
        assert_eq!(controller.usage_count(), 1);
    }

    #[tokio::test]
    async fn test_run_stops_at_end_of_input() {
        let provider = NewsProvider::new(
            FakeSource::body(r#"{"articles": []}"#),
            UsageCounter::load(MemoryUsageStore::new()),
        );
        let mut controller = Controller::new(provider, Pacing::instant());
        let input: &[u8] = b"";
        let mut out: Vec<u8> = Vec::new();

        run(&mut controller, input, &mut out).await.unwrap();
        assert_eq!(controller.transcript().messages().len(), 1);
        assert_eq!(controller.usage_count(), 0);
    }
}
