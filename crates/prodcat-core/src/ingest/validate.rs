use rust_decimal::Decimal;

use crate::error::IngestError;
use crate::pricing::storable_price;
use crate::products::ProductRecord;

/// Rounds `price` and `discountedPrice` to cents and rejects any record
/// whose rounded value does not fit the catalog's price columns.
///
/// # Errors
///
/// Returns [`IngestError::InvalidPrice`] for the first out-of-range value.
/// The batch is left partially rounded in that case.
pub fn normalize_prices(records: &mut [ProductRecord]) -> Result<(), IngestError> {
    for (index, record) in records.iter_mut().enumerate() {
        record.price = checked_price(index, "price", record.price)?;
        if let Some(discounted) = record.discounted_price {
            record.discounted_price = Some(checked_price(index, "discountedPrice", discounted)?);
        }
    }
    Ok(())
}

fn checked_price(index: usize, field: &'static str, value: Decimal) -> Result<Decimal, IngestError> {
    storable_price(value).ok_or_else(|| {
        tracing::warn!(index, field, value = %value, "price out of range");
        IngestError::InvalidPrice {
            index,
            field,
            value: value.to_string(),
        }
    })
}
