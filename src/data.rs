//! Order file loading
//!
//! Reads demo order batches from CSV files with the header
//! `side,product_id,quantity,limit_price`. Every row goes through the
//! validated [`Order::new`] constructor, so an invalid row fails the whole
//! load with its row number.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::types::{Order, Price, ProductId, Side};

/// Load orders from a CSV file
pub fn load_orders(path: impl AsRef<Path>) -> Result<Vec<Order>> {
    let mut reader =
        csv::Reader::from_path(path.as_ref()).context("Failed to open order file")?;

    let mut orders = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read row {}", row_idx + 1))?;

        let side: Side = record
            .get(0)
            .context("Missing side column")?
            .parse()
            .context("Failed to parse side")?;
        let product_id = record.get(1).context("Missing product_id column")?;
        let quantity: u32 = record
            .get(2)
            .context("Missing quantity column")?
            .parse()
            .context("Failed to parse quantity")?;
        let limit_price: f64 = record
            .get(3)
            .context("Missing limit_price column")?
            .parse()
            .context("Failed to parse limit_price")?;

        let order = Order::new(
            side,
            ProductId::new(product_id),
            quantity,
            Price::from_f64(limit_price),
        )
        .context(format!("Invalid order at row {}", row_idx + 1))?;

        orders.push(order);
    }

    info!(
        "Loaded {} orders from {}",
        orders.len(),
        path.as_ref().display()
    );

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_orders(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_orders_parses_rows() {
        let (_dir, path) = write_orders(
            "side,product_id,quantity,limit_price\n\
             buy,123,1000,100.0\n\
             SELL,456,500,120.5\n",
        );

        let orders = load_orders(&path).unwrap();
        assert_eq!(orders.len(), 2);

        assert_eq!(orders[0].side(), Side::Buy);
        assert_eq!(orders[0].product_id().as_str(), "123");
        assert_eq!(orders[0].quantity(), 1000);
        assert_eq!(orders[0].limit_price(), Price::from_f64(100.0));

        // Side parsing is case-insensitive
        assert_eq!(orders[1].side(), Side::Sell);
        assert_eq!(orders[1].limit_price(), Price::from_f64(120.5));
    }

    #[test]
    fn test_load_orders_rejects_unknown_side() {
        let (_dir, path) = write_orders(
            "side,product_id,quantity,limit_price\n\
             hold,123,10,100.0\n",
        );

        let err = load_orders(&path).unwrap_err();
        assert!(
            err.to_string().contains("side"),
            "unexpected error: {:#}",
            err
        );
    }

    #[test]
    fn test_load_orders_rejects_invalid_quantity() {
        let (_dir, path) = write_orders(
            "side,product_id,quantity,limit_price\n\
             buy,123,0,100.0\n",
        );

        let err = load_orders(&path).unwrap_err();
        assert!(
            err.to_string().contains("row 1"),
            "error should point at the row: {:#}",
            err
        );
    }

    #[test]
    fn test_load_orders_rejects_negative_limit() {
        let (_dir, path) = write_orders(
            "side,product_id,quantity,limit_price\n\
             sell,123,10,-5.0\n",
        );

        assert!(load_orders(&path).is_err());
    }

    #[test]
    fn test_load_orders_empty_file_is_empty_batch() {
        let (_dir, path) = write_orders("side,product_id,quantity,limit_price\n");

        let orders = load_orders(&path).unwrap();
        assert!(orders.is_empty());
    }

    #[test]
    fn test_load_orders_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.csv");

        assert!(load_orders(&path).is_err());
    }
}
