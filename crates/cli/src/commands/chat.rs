//! Chat command handler.
//!
//! Reads questions from stdin one at a time and prints each answer as it
//! arrives. Only one question is outstanding at any time.

use std::io::Write;

use clap::Args;
use kbquery_core::{config::AppConfig, AppResult};
use kbquery_query::{QueryInput, QueryService, RequestOverrides, Session};
use kbquery_render::Renderer;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /effort <minimal|low|medium|default>   set retrieval reasoning effort
  /mode <extractiveData|answerSynthesis|default>   set output mode
  /history                                list questions asked so far
  /clear                                  forget the session history
  /help                                   show this help
  exit, quit, q                           leave";

/// Interactive question loop
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Initial retrieval reasoning effort (minimal, low, medium)
    #[arg(short, long)]
    pub effort: Option<String>,

    /// Initial output mode (extractiveData, answerSynthesis)
    #[arg(short, long)]
    pub mode: Option<String>,
}

/// One line of chat input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Skip,
    Quit,
    Help,
    History,
    Clear,
    Effort(Option<&'a str>),
    Mode(Option<&'a str>),
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_line(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Skip;
    }

    if matches!(line.to_lowercase().as_str(), "exit" | "quit" | "q") {
        return ChatInput::Quit;
    }

    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Question(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim())),
        None => (command, None),
    };
    // "default" (or no value) returns to the knowledge base's own setting
    let value = arg.filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case("default"));

    match name {
        "help" => ChatInput::Help,
        "history" => ChatInput::History,
        "clear" => ChatInput::Clear,
        "effort" => ChatInput::Effort(value),
        "mode" => ChatInput::Mode(value),
        _ => ChatInput::Unknown(name),
    }
}

impl ChatCommand {
    /// Execute the chat loop until the user quits or stdin closes.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let service = QueryService::from_config(config)?;
        let renderer = Renderer::with_workspace(&config.workspace)?;

        // Reject bad initial overrides before the first question
        RequestOverrides::parse(self.effort.as_deref(), self.mode.as_deref())?;
        let mut effort = self.effort.clone();
        let mut mode = self.mode.clone();
        let mut session = Session::new();

        println!(
            "Connected to knowledge base '{}'. Type /help for commands, 'exit' to leave.",
            service.knowledge_base_name()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("\n> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match parse_line(&line) {
                ChatInput::Skip => continue,
                ChatInput::Quit => break,
                ChatInput::Help => println!("{}", HELP),
                ChatInput::History => {
                    if session.is_empty() {
                        println!("No questions asked yet.");
                    }
                    for (i, interaction) in session.iter().enumerate() {
                        println!(
                            "{:>3}. {} ({} citation(s), {:.2}s)",
                            i + 1,
                            interaction.question,
                            interaction.citations.len(),
                            interaction.timing.total
                        );
                    }
                }
                ChatInput::Clear => {
                    session.clear();
                    println!("Session history cleared.");
                }
                ChatInput::Effort(value) => match RequestOverrides::parse(value, None) {
                    Ok(parsed) => {
                        effort = parsed.reasoning_effort.map(|e| e.as_str().to_string());
                        println!(
                            "Reasoning effort: {}",
                            parsed.applied().retrieval_reasoning_effort
                        );
                    }
                    Err(e) => eprintln!("{}", e),
                },
                ChatInput::Mode(value) => match RequestOverrides::parse(None, value) {
                    Ok(parsed) => {
                        mode = parsed.output_mode.map(|m| m.as_str().to_string());
                        println!(
                            "Output mode: {}",
                            parsed.applied().knowledge_retrieval_output_mode
                        );
                    }
                    Err(e) => eprintln!("{}", e),
                },
                ChatInput::Unknown(name) => {
                    eprintln!("Unknown command '/{}'. Type /help for commands.", name)
                }
                ChatInput::Question(question) => {
                    let mut input = QueryInput::new(question);
                    input.retrieval_reasoning_effort = effort.clone();
                    input.knowledge_retrieval_output_mode = mode.clone();

                    match service.submit(&input).await {
                        Ok(interaction) => {
                            print!("{}", renderer.render_interaction_text(&interaction)?);
                            session.record(interaction);
                        }
                        Err(failure) => {
                            eprintln!(
                                "Error: {} (after {:.2}s)",
                                failure, failure.timing.total
                            );
                        }
                    }
                }
            }
        }

        tracing::debug!("Chat ended after {} question(s)", session.len());
        println!("Goodbye.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_quit() {
        assert_eq!(parse_line("   "), ChatInput::Skip);
        assert_eq!(parse_line("exit"), ChatInput::Quit);
        assert_eq!(parse_line(" QUIT "), ChatInput::Quit);
        assert_eq!(parse_line("q"), ChatInput::Quit);
    }

    #[test]
    fn test_questions_are_trimmed() {
        assert_eq!(
            parse_line("  What does Contoso offer? "),
            ChatInput::Question("What does Contoso offer?")
        );
        // Words that merely start with a quit command are questions
        assert_eq!(parse_line("quitting time?"), ChatInput::Question("quitting time?"));
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse_line("/history"), ChatInput::History);
        assert_eq!(parse_line("/clear"), ChatInput::Clear);
        assert_eq!(parse_line("/help"), ChatInput::Help);
        assert_eq!(parse_line("/effort low"), ChatInput::Effort(Some("low")));
        assert_eq!(parse_line("/mode  answerSynthesis "), ChatInput::Mode(Some("answerSynthesis")));
        assert_eq!(parse_line("/unknown x"), ChatInput::Unknown("unknown"));
    }

    #[test]
    fn test_default_resets_override() {
        assert_eq!(parse_line("/effort"), ChatInput::Effort(None));
        assert_eq!(parse_line("/effort default"), ChatInput::Effort(None));
        assert_eq!(parse_line("/mode DEFAULT"), ChatInput::Mode(None));
    }
}
