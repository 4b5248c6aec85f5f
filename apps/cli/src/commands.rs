//! Line-oriented command parsing for the terminal front end.

use trade_core::ConverterId;
use trade_session::ConverterField;

pub const HELP: &str = "\
commands:
  qty <n> <item>            set an inventory quantity (e.g. qty 20 Mushrooms)
  unset <item>              clear one inventory quantity
  reset                     clear the whole inventory
  set <conv> <field> [text] type into a converter field (amount|ratio|tro)
  enter <conv> <field>      press Enter in a converter field
  calc <conv>               press the calculate button
  clear                     clear the conversion log
  show                      print inventory, converters and totals
  log                       print the conversion log, newest first
  say <text>                post in the trade chat (with --chat)
  help                      this text
  quit                      exit";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Quantity { item: String, text: String },
    Unset { item: String },
    Reset,
    Set {
        converter: ConverterId,
        field: ConverterField,
        text: String,
    },
    Enter {
        converter: ConverterId,
        field: ConverterField,
    },
    Calc { converter: ConverterId },
    ClearLog,
    Show,
    Log,
    Say(String),
    Help,
    Quit,
}

fn parse_field(word: Option<&str>) -> Result<ConverterField, String> {
    match word.map(str::to_ascii_lowercase).as_deref() {
        Some("amount") => Ok(ConverterField::Amount),
        Some("ratio") => Ok(ConverterField::Ratio),
        Some("tro") => Ok(ConverterField::Tro),
        Some(other) => Err(format!("unknown field {other:?}; use amount, ratio or tro")),
        None => Err("missing field; use amount, ratio or tro".to_string()),
    }
}

fn required<'a>(word: Option<&'a str>, what: &str) -> Result<&'a str, String> {
    word.filter(|w| !w.is_empty())
        .ok_or_else(|| format!("missing {what}"))
}

/// Parse one input line. Blank lines parse as `Show`.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut words = rest.split_whitespace();
    match verb.to_ascii_lowercase().as_str() {
        "" | "show" => Ok(Command::Show),
        "qty" => {
            let (text, item) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: qty <n> <item>".to_string())?;
            Ok(Command::Quantity {
                item: item.trim().to_string(),
                text: text.to_string(),
            })
        }
        "unset" => Ok(Command::Unset {
            item: required(Some(rest), "item")?.to_string(),
        }),
        "reset" => Ok(Command::Reset),
        "set" => {
            let converter = ConverterId::new(required(words.next(), "converter")?);
            let field = parse_field(words.next())?;
            let text = words.next().unwrap_or("").to_string();
            Ok(Command::Set {
                converter,
                field,
                text,
            })
        }
        "enter" => {
            let converter = ConverterId::new(required(words.next(), "converter")?);
            let field = parse_field(words.next())?;
            Ok(Command::Enter { converter, field })
        }
        "calc" => Ok(Command::Calc {
            converter: ConverterId::new(required(words.next(), "converter")?),
        }),
        "clear" => Ok(Command::ClearLog),
        "log" => Ok(Command::Log),
        "say" => Ok(Command::Say(required(Some(rest), "message")?.to_string())),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command {other:?}; try help")),
    }
}
