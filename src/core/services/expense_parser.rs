use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// ascii digits with at most one decimal group: 500, 500.5, 32,90
static AMOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+(?:[.,][0-9]{1,2})?").unwrap());

const CURRENCY_MARKERS: [&str; 2] = ["r$", "reais"];

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no amount found in the message")]
    NoAmountFound,
    #[error("amount is not a valid number")]
    InvalidNumber,
}

/// What a free-text message says was spent.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpense {
    pub value: f64,
    pub description: String,
    pub account: String,
}

/// Extracts `<amount> <description...> <account>` from a message.
///
/// The first number in the text is the amount, `.` is read as a thousands
/// separator and `,` as the decimal one. Whatever is left is split on
/// whitespace: the last word is the account, the rest the description.
pub fn parse_expense(text: &str) -> Result<ParsedExpense, ParseFailure> {
    let mut normalized = text.to_lowercase();
    for marker in CURRENCY_MARKERS {
        normalized = normalized.replace(marker, "");
    }
    let normalized = normalized.trim();

    let found = AMOUNT_RE
        .find(normalized)
        .ok_or(ParseFailure::NoAmountFound)?;
    let value = parse_amount(found.as_str())?;

    // the halves are joined as-is, so "uber18pix" leaves "uberpix"
    let rest = format!(
        "{}{}",
        &normalized[..found.start()],
        &normalized[found.end()..]
    );
    let mut words: Vec<&str> = rest.split_whitespace().collect();

    let account = if words.len() >= 2 {
        words.pop().unwrap_or_default().to_owned()
    } else {
        String::new()
    };

    Ok(ParsedExpense {
        value,
        description: words.join(" "),
        account,
    })
}

// "1.234" -> 1234, "32,90" -> 32.90; a lone "." is therefore never decimal
fn parse_amount(raw: &str) -> Result<f64, ParseFailure> {
    raw.replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| ParseFailure::InvalidNumber)
}
