use ::entity::sea_orm_active_enums::Unit;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::ServiceError;

/// What a unit measures; quantities only convert within one dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

pub fn dimension(unit: Unit) -> Dimension {
    match unit {
        Unit::G | Unit::Kg => Dimension::Mass,
        Unit::Ml | Unit::L => Dimension::Volume,
        Unit::Unit => Dimension::Count,
    }
}

/// How many base units (g, ml, unit) one `unit` holds
pub fn base_factor(unit: Unit) -> Decimal {
    match unit {
        Unit::Kg | Unit::L => dec!(1000),
        Unit::G | Unit::Ml | Unit::Unit => Decimal::ONE,
    }
}

/// `None` when the conversion leaves the decimal range
pub fn to_base(quantity: Decimal, unit: Unit) -> Option<Decimal> {
    quantity.checked_mul(base_factor(unit))
}

pub fn ensure_compatible(
    line: Unit,
    component: Dimension,
    what: &str,
) -> Result<(), ServiceError> {
    if dimension(line) == component {
        Ok(())
    } else {
        Err(ServiceError::Costing(format!(
            "{what} is measured by {component:?} but the recipe line uses {line:?}"
        )))
    }
}
