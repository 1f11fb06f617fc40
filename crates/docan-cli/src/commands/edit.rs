//! Edit command - review and correct extracted data interactively.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use docan_core::invoice::rules::format_amount;
use docan_core::{
    report_file_name, ChatBackend, ChatRole, DocumentAssistant, DocumentReader, InvoiceParser,
    OpenRouterClient, Session, SpreadsheetExporter,
};

use super::output::format_text;
use super::{analyze_file, load_config};

const CHART_WIDTH: usize = 40;

const HELP: &str = "\
Commands:
  show                          show the current data
  set number|date|total <value> change a header field
  item <n> desc|amount <value>  change line item <n>
  add <amount> <description>    append a line item
  rm <n>                        remove line item <n>
  recompute                     set the total to the sum of the items
  chart                         cost breakdown by item
  ask <question>                ask about the document
  history                       show questions and answers
  export [path]                 write the corrected data to .xlsx
  reset                         discard all corrections
  help                          show this help
  quit                          leave";

/// Arguments for the edit command.
#[derive(Args)]
pub struct EditArgs {
    /// Input file (PDF, image or text)
    #[arg(required = true)]
    input: PathBuf,

    /// OpenRouter API key for questions (default: config or OPENROUTER_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum EditCommand {
    Show,
    SetNumber(String),
    SetDate(String),
    SetTotal(String),
    ItemDescription(usize, String),
    ItemAmount(usize, String),
    Add { amount: String, description: String },
    Remove(usize),
    Recompute,
    Chart,
    Ask(String),
    History,
    Export(Option<PathBuf>),
    Reset,
    Help,
    Quit,
}

pub async fn run(args: EditArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.chat.resolve_api_key())
        .unwrap_or_default();

    let reader = DocumentReader::from_config(&config);
    let parser = InvoiceParser::from_config(&config.extraction)?;
    let (document, result) = analyze_file(&args.input, &reader, &parser)?;

    let name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut session = Session::new(name, document.text, result);
    let assistant = DocumentAssistant::new(OpenRouterClient::new(&config.chat)?);

    println!("{}", format_text(&session.corrected(), None));
    println!("Type 'help' for commands.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", style("docan>").cyan());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };

        let command = match parse_command(&line?) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{} {}", style("✗").red(), message);
                continue;
            }
        };

        if command == EditCommand::Quit {
            break;
        }

        if let Err(e) = execute(&mut session, command, &assistant, &api_key).await {
            println!("{} {}", style("✗").red(), e);
        }
    }

    Ok(())
}

async fn execute<B: ChatBackend>(
    session: &mut Session,
    command: EditCommand,
    assistant: &DocumentAssistant<B>,
    api_key: &str,
) -> anyhow::Result<()> {
    match command {
        EditCommand::Show => {
            let marker = if session.is_modified() { " (modified)" } else { "" };
            println!("{}{}", style(session.document_name()).bold(), marker);
            println!("{}", format_text(&session.corrected(), None));
        }
        EditCommand::SetNumber(value) => session.set_invoice_number(&value),
        EditCommand::SetDate(value) => session.set_date(&value),
        EditCommand::SetTotal(value) => session.set_total(&value)?,
        EditCommand::ItemDescription(index, value) => session.set_item_description(index, &value)?,
        EditCommand::ItemAmount(index, value) => session.set_item_amount(index, &value)?,
        EditCommand::Add { amount, description } => {
            let index = session.add_item(&description, &amount)?;
            println!("{} Added item {}", style("✓").green(), index + 1);
        }
        EditCommand::Remove(index) => {
            let item = session.remove_item(index)?;
            println!("{} Removed {}", style("✓").green(), item.description);
        }
        EditCommand::Recompute => {
            session.recompute_total();
            println!("Total Amount: {}", session.header().display_total());
        }
        EditCommand::Chart => print!("{}", render_chart(&session.cost_breakdown(), CHART_WIDTH)),
        EditCommand::Ask(question) => {
            let reply = assistant.ask(&question, session.raw_text(), api_key).await;
            if reply.is_failure() {
                println!("{} {}", style("✗").red(), reply.text());
            } else {
                println!("{}", reply.text());
            }
            session.record_exchange(&question, &reply);
        }
        EditCommand::History => {
            for message in session.history() {
                let speaker = match message.role {
                    ChatRole::User => style("you").cyan(),
                    _ => style("assistant").green(),
                };
                println!("{}: {}", speaker, message.content);
            }
        }
        EditCommand::Export(path) => {
            let header = session.header().to_display();
            let path = path.unwrap_or_else(|| {
                PathBuf::from(report_file_name(&header, session.is_modified()))
            });
            SpreadsheetExporter::new()
                .with_bold_headers(true)
                .save(&path, &header, session.line_items())?;
            println!("{} Exported to {}", style("✓").green(), path.display());
        }
        EditCommand::Reset => {
            session.reset();
            println!("{} Corrections discarded", style("✓").green());
        }
        EditCommand::Help => println!("{}", HELP),
        EditCommand::Quit => {}
    }

    Ok(())
}

/// Parse one input line. Blank lines yield `None`.
fn parse_command(line: &str) -> Result<Option<EditCommand>, String> {
    let line = line.trim();
    let (word, rest) = split_word(line);

    let command = match word {
        "" => return Ok(None),
        "show" => EditCommand::Show,
        "set" => {
            let (field, value) = split_word(rest);
            match field {
                "number" => EditCommand::SetNumber(value.to_string()),
                "date" => EditCommand::SetDate(value.to_string()),
                "total" => EditCommand::SetTotal(value.to_string()),
                _ => return Err("usage: set number|date|total <value>".to_string()),
            }
        }
        "item" => {
            let (position, rest) = split_word(rest);
            let index = item_index(position)?;
            let (field, value) = split_word(rest);
            match field {
                "desc" | "description" => EditCommand::ItemDescription(index, value.to_string()),
                "amount" => EditCommand::ItemAmount(index, value.to_string()),
                _ => return Err("usage: item <n> desc|amount <value>".to_string()),
            }
        }
        "add" => {
            let (amount, description) = split_word(rest);
            if amount.is_empty() || description.is_empty() {
                return Err("usage: add <amount> <description>".to_string());
            }
            EditCommand::Add {
                amount: amount.to_string(),
                description: description.to_string(),
            }
        }
        "rm" | "remove" => EditCommand::Remove(item_index(rest)?),
        "recompute" => EditCommand::Recompute,
        "chart" => EditCommand::Chart,
        "ask" => {
            if rest.is_empty() {
                return Err("usage: ask <question>".to_string());
            }
            EditCommand::Ask(rest.to_string())
        }
        "history" => EditCommand::History,
        "export" => EditCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "reset" => EditCommand::Reset,
        "help" | "?" => EditCommand::Help,
        "quit" | "exit" | "q" => EditCommand::Quit,
        other => return Err(format!("unknown command '{}', type 'help'", other)),
    };

    Ok(Some(command))
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// Convert a 1-based item number to an index.
fn item_index(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("invalid item number '{}'", s.trim())),
    }
}

/// Horizontal bar chart of item amounts, scaled to the largest.
fn render_chart(breakdown: &[(String, Decimal)], width: usize) -> String {
    if breakdown.is_empty() {
        return "No line items to chart.\n".to_string();
    }

    let max = breakdown
        .iter()
        .map(|(_, amount)| *amount)
        .max()
        .unwrap_or(Decimal::ZERO);
    let label_width = breakdown
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (label, amount) in breakdown {
        let len = if max > Decimal::ZERO && *amount > Decimal::ZERO {
            (*amount / max * Decimal::from(width))
                .round()
                .to_usize()
                .unwrap_or(0)
        } else {
            0
        };
        output.push_str(&format!(
            "{:<label_width$}  {:<width$}  {}\n",
            label,
            "█".repeat(len),
            format_amount(*amount),
            label_width = label_width,
            width = width
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("   "), Ok(None));
        assert_eq!(
            parse_command("set number  AB 12"),
            Ok(Some(EditCommand::SetNumber("AB 12".to_string())))
        );
        assert_eq!(
            parse_command("item 2 amount 1,200.00"),
            Ok(Some(EditCommand::ItemAmount(1, "1,200.00".to_string())))
        );
        assert_eq!(
            parse_command("add 15.00 Shipping and handling"),
            Ok(Some(EditCommand::Add {
                amount: "15.00".to_string(),
                description: "Shipping and handling".to_string(),
            }))
        );
        assert_eq!(parse_command("rm 1"), Ok(Some(EditCommand::Remove(0))));
        assert_eq!(parse_command("export"), Ok(Some(EditCommand::Export(None))));
        assert_eq!(parse_command("quit"), Ok(Some(EditCommand::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("rm 0").is_err());
        assert!(parse_command("item x desc Bolt").is_err());
        assert!(parse_command("set colour red").is_err());
        assert!(parse_command("ask").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[test]
    fn test_render_chart() {
        let chart = render_chart(
            &[
                ("Widget".to_string(), Decimal::new(100000, 2)),
                ("Fee".to_string(), Decimal::new(25000, 2)),
            ],
            8,
        );

        assert_eq!(
            chart,
            "Widget  ████████  1000.00\nFee     ██        250.00\n"
        );
        assert_eq!(render_chart(&[], 8), "No line items to chart.\n");
    }
}
