//! Transaction batch file reading
//!
//! Batch files are plain CSV with a header row: `label,amount` plus an
//! optional `account_label` column. This is the input surface for the
//! batch processor; the full bank-statement import pipeline lives outside
//! this crate.

use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::TransactionInput;

/// Read a transaction batch from a CSV file
pub fn read_batch_file(path: &Path) -> Result<Vec<TransactionInput>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut transactions = Vec::new();
    for (i, row) in reader.deserialize::<TransactionInput>().enumerate() {
        let tx = row.map_err(|e| {
            Error::InvalidData(format!(
                "{}: row {}: {}",
                path.display(),
                i + 2, // 1-based, after the header
                e
            ))
        })?;
        transactions.push(tx);
    }

    if transactions.is_empty() {
        return Err(Error::InvalidData(format!(
            "No transactions in {}",
            path.display()
        )));
    }

    info!(
        "Read {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_batch_with_account_column() {
        let path = write_temp(
            "centime_batch_full.csv",
            "label,amount,account_label\n\
             CARTE TOTAL 4 CB,-40.50,Compte courant\n\
             CARREFOUR MARKET,-63.12,Compte courant\n",
        );

        let batch = read_batch_file(&path).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].label, "CARTE TOTAL 4 CB");
        assert_eq!(batch[0].amount, -40.50);
        assert_eq!(batch[0].account_label.as_deref(), Some("Compte courant"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_read_batch_without_account_column() {
        let path = write_temp(
            "centime_batch_minimal.csv",
            "label,amount\nPHARMACIE DU CENTRE,-12.00\n",
        );

        let batch = read_batch_file(&path).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch[0].account_label.is_none());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_amount_reports_row() {
        let path = write_temp(
            "centime_batch_bad.csv",
            "label,amount\nOK LABEL,-1.0\nBROKEN,not-a-number\n",
        );

        let err = read_batch_file(&path).unwrap_err();
        assert!(err.to_string().contains("row 3"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_empty_file_rejected() {
        let path = write_temp("centime_batch_empty.csv", "label,amount\n");
        assert!(read_batch_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
