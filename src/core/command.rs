//! Command parser for the : command system

use crate::domain::TxType;
use crate::store::{PageMove, SortDirection, SortField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// Statement CSV written locally
    LocalCsv,
    /// PDF rendered by the backend
    Pdf,
    /// CSV rendered by the backend
    ServerCsv,
}

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Query
    Analyze {
        chain: String,
        address: String,
        start: String,
        end: String,
    },
    Refresh,

    // Table view
    Filter(Option<TxType>),
    Search(String),
    Sort {
        field: SortField,
        direction: Option<SortDirection>,
    },
    Page(PageMove),

    // Corrections
    Delete(String),
    Edit {
        hash: String,
        fields: Vec<(String, String)>,
    },
    Opening {
        native: String,
        tokens: Vec<(String, String)>,
    },
    Current {
        native: String,
        tokens: Vec<(String, String)>,
    },
    Reset,

    // Output
    Export(ExportTarget),
    Health,
    Quit,

    /// Known command with bad arguments
    Usage(&'static str),

    // Unknown command
    Unknown(String),
}

fn key_values(parts: &[&str]) -> Option<Vec<(String, String)>> {
    parts
        .iter()
        .map(|part| {
            part.split_once('=')
                .filter(|(k, _)| !k.is_empty())
                .map(|(k, v)| (k.to_string(), v.to_string()))
        })
        .collect()
}

fn balance_command(args: &[&str], usage: &'static str) -> Result<(String, Vec<(String, String)>), Command> {
    let Some((native, rest)) = args.split_first() else {
        return Err(Command::Usage(usage));
    };
    let tokens = key_values(rest).ok_or(Command::Usage(usage))?;
    Ok((native.to_string(), tokens))
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match cmd.to_lowercase().as_str() {
        // Query
        "analyze" | "a" => match args.as_slice() {
            [chain, address, start, end] => Command::Analyze {
                chain: chain.to_string(),
                address: address.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            },
            _ => Command::Usage("analyze <chain> <address> <from YYYY-MM-DD> <to YYYY-MM-DD>"),
        },
        "refresh" | "reload" => Command::Refresh,

        // Table view
        "filter" | "f" => match args.first() {
            None => Command::Filter(None),
            Some(arg) if arg.eq_ignore_ascii_case("all") => Command::Filter(None),
            Some(_) => match TxType::parse(&args.join(" ")) {
                Some(tx_type) => Command::Filter(Some(tx_type)),
                None => Command::Usage("filter <type|all>"),
            },
        },
        "search" | "/" => Command::Search(args.join(" ")),
        "sort" => {
            let field = args.first().and_then(|f| SortField::parse(f));
            let direction = args.get(1).map(|d| SortDirection::parse(d));
            match (field, direction) {
                (Some(field), None) => Command::Sort {
                    field,
                    direction: None,
                },
                (Some(field), Some(Some(direction))) => Command::Sort {
                    field,
                    direction: Some(direction),
                },
                _ => Command::Usage("sort <field> [asc|desc]"),
            }
        }
        "page" => match args.first().map(|a| a.to_lowercase()).as_deref() {
            Some("next" | "n") => Command::Page(PageMove::Next),
            Some("prev" | "p" | "previous") => Command::Page(PageMove::Prev),
            _ => Command::Usage("page next|prev"),
        },

        // Corrections
        "delete" | "del" | "rm" => match args.as_slice() {
            [hash] => Command::Delete(hash.to_string()),
            _ => Command::Usage("delete <hash>"),
        },
        "edit" => match args.split_first() {
            Some((hash, rest)) if !rest.is_empty() => match key_values(rest) {
                Some(fields) => Command::Edit {
                    hash: hash.to_string(),
                    fields,
                },
                None => Command::Usage("edit <hash> key=value..."),
            },
            _ => Command::Usage("edit <hash> key=value..."),
        },
        "opening" => match balance_command(&args, "opening <amount> [SYMBOL=amount...]") {
            Ok((native, tokens)) => Command::Opening { native, tokens },
            Err(usage) => usage,
        },
        "current" => match balance_command(&args, "current <amount> [SYMBOL=amount...]") {
            Ok((native, tokens)) => Command::Current { native, tokens },
            Err(usage) => usage,
        },
        "reset" => Command::Reset,

        // Output
        "export" | "e" => match args.first().map(|a| a.to_lowercase()).as_deref() {
            None | Some("csv") => Command::Export(ExportTarget::LocalCsv),
            Some("pdf") => Command::Export(ExportTarget::Pdf),
            Some("server-csv" | "servercsv") => Command::Export(ExportTarget::ServerCsv),
            _ => Command::Usage("export csv|pdf|server-csv"),
        },
        "health" => Command::Health,
        "quit" | "q" | "exit" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}
