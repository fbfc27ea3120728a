use crate::ModelError;
use crate::records::Transaction;

pub const CSV_HEADER: [&str; 4] = ["Date", "Description", "Type", "Amount"];

/// Transactions as CSV with a fixed column order. Fields containing the
/// delimiter, quotes or newlines are quoted.
pub fn transactions_csv(transactions: &[Transaction]) -> Result<String, ModelError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| ModelError::Csv(e.to_string()))?;
    for tx in transactions {
        let amount = format!("{:.2}", tx.amount);
        writer
            .write_record([
                tx.date.as_str(),
                tx.description.as_str(),
                tx.kind.as_str(),
                amount.as_str(),
            ])
            .map_err(|e| ModelError::Csv(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ModelError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ModelError::Csv(e.to_string()))
}
