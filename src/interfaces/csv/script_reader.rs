use crate::domain::money::Money;
use crate::domain::order::PaymentMethod;
use crate::error::{ComandaError, Result};
use crate::interfaces::script::ScriptTarget;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ScriptAction {
    Submit,
    Ready,
    Deliver,
    Pay,
    Close,
    Clean,
}

/// One line of a floor script.
///
/// Columns: `action,target,item,price,quantity,method,amount,note`. Columns
/// an action does not use are left empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScriptRow {
    pub action: ScriptAction,
    pub target: ScriptTarget,
    pub item: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<u32>,
    pub method: Option<PaymentMethod>,
    pub amount: Option<Money>,
    pub note: Option<String>,
}

/// Reads floor script rows from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<ScriptRow>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct ScriptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> ScriptReader<R> {
    /// Creates a new `ScriptReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes rows.
    pub fn rows(self) -> impl Iterator<Item = Result<ScriptRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(ComandaError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "action,target,item,price,quantity,method,amount,note\n";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}submit, table:5, burger, 25.00, 2, , ,no onion\npay, table:5, , , , cash, 58.00,\nclose, takeaway:Ana, , , , , , cliente sem dinheiro"
        );
        let reader = ScriptReader::new(data.as_bytes());
        let rows: Vec<Result<ScriptRow>> = reader.rows().collect();

        assert_eq!(rows.len(), 3);
        let submit = rows[0].as_ref().unwrap();
        assert_eq!(submit.action, ScriptAction::Submit);
        assert_eq!(submit.target, ScriptTarget::Tables(vec![5]));
        assert_eq!(submit.price, Some(Money::from_cents(2500)));
        assert_eq!(submit.quantity, Some(2));
        assert_eq!(submit.note.as_deref(), Some("no onion"));

        let pay = rows[1].as_ref().unwrap();
        assert_eq!(pay.method, Some(PaymentMethod::Cash));
        assert_eq!(pay.amount, Some(Money::from_cents(5800)));
        assert_eq!(pay.item, None);

        let close = rows[2].as_ref().unwrap();
        assert_eq!(close.target, ScriptTarget::Takeaway("Ana".to_string()));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = format!("{HEADER}cook, table:5, , , , , ,\nsubmit, bar:1, burger, 25.00, 1, , ,");
        let reader = ScriptReader::new(data.as_bytes());
        let rows: Vec<Result<ScriptRow>> = reader.rows().collect();

        assert!(rows[0].is_err());
        assert!(rows[1].is_err());
    }
}
