use ::entity::sea_orm_active_enums::Unit;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::ServiceError;

pub(crate) fn name(value: &str, what: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::validation(format!("{what} name is required")));
    }
    Ok(value.to_owned())
}

pub(crate) fn positive(value: Decimal, what: &str) -> Result<Decimal, ServiceError> {
    if value <= Decimal::ZERO {
        return Err(ServiceError::validation(format!(
            "{what} must be greater than zero"
        )));
    }
    Ok(value)
}

/// Waste and VAT are fractions in `[0, 1)`
pub(crate) fn fraction(value: Decimal, what: &str) -> Result<Decimal, ServiceError> {
    if value < Decimal::ZERO || value >= Decimal::ONE {
        return Err(ServiceError::validation(format!(
            "{what} must be at least 0% and below 100%"
        )));
    }
    Ok(value)
}

pub(crate) fn waste_pct(value: Decimal) -> Result<Decimal, ServiceError> {
    fraction(value, "Waste")
}

/// A recipe line as submitted; exactly one of the references must be set
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeLineInput {
    pub ingredient_id: Option<i32>,
    pub subrecipe_id: Option<i32>,
    pub quantity: Decimal,
    pub unit: Unit,
}

impl RecipeLineInput {
    pub(crate) fn validate(&self) -> Result<(), ServiceError> {
        if self.ingredient_id.is_some() == self.subrecipe_id.is_some() {
            return Err(ServiceError::validation(
                "Each recipe line must reference exactly one ingredient or subrecipe",
            ));
        }
        positive(self.quantity, "Quantity")?;
        Ok(())
    }
}
