// src/services/estimate_calculator.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::error::AppError,
    models::estimate::{Estimate, PurchaseItem, StructureItem, MAX_AMOUNT},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostInputs {
    pub labor: Decimal,
    pub material: Decimal,
    pub equipment: Decimal,
    pub overhead: Decimal,
    /// Percentage, 0..=100.
    pub margin: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostTotals {
    pub total_cost: Decimal,
    pub quoted_price: Decimal,
}

fn cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn too_large() -> AppError {
    AppError::BadRequest("Estimate amounts exceed the largest storable value".into())
}

fn storable(value: Decimal) -> Result<Decimal, AppError> {
    let value = cents(value);
    if value > MAX_AMOUNT {
        return Err(too_large());
    }
    Ok(value)
}

/// `total = labor + material + equipment + overhead`,
/// `quoted = total * (1 + margin / 100)`, both to the cent.
/// `BadRequest` when either result would not fit a money column.
pub fn totals(inputs: CostInputs) -> Result<CostTotals, AppError> {
    let sum = [inputs.material, inputs.equipment, inputs.overhead]
        .into_iter()
        .try_fold(inputs.labor, |acc, v| acc.checked_add(v))
        .ok_or_else(too_large)?;
    let total_cost = storable(sum)?;

    let quoted = (Decimal::ONE_HUNDRED + inputs.margin)
        .checked_mul(total_cost)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(too_large)?;
    let quoted_price = storable(quoted)?;

    Ok(CostTotals {
        total_cost,
        quoted_price,
    })
}

pub fn line_total(quantity: i32, unit_cost: Decimal) -> Result<Decimal, AppError> {
    Decimal::from(quantity)
        .checked_mul(unit_cost)
        .map(cents)
        .ok_or_else(too_large)
}

/// Overwrites every line total with `quantity * unit_cost`.
pub fn recompute_lines(structures: &mut [StructureItem], items: &mut [PurchaseItem]) -> Result<(), AppError> {
    for s in structures.iter_mut() {
        s.total_cost = line_total(s.quantity, s.unit_cost)?;
    }
    for i in items.iter_mut() {
        i.total_cost = line_total(i.quantity, i.unit_cost)?;
    }
    Ok(())
}

/// Brings every derived field of `estimate` in line with its inputs.
/// Called right before each save.
pub fn apply(estimate: &mut Estimate) -> Result<(), AppError> {
    recompute_lines(&mut estimate.structures.0, &mut estimate.items_to_purchase.0)?;
    let t = totals(CostInputs {
        labor: estimate.labor_cost,
        material: estimate.material_cost,
        equipment: estimate.equipment_cost,
        overhead: estimate.overhead_cost,
        margin: estimate.profit_margin,
    })?;
    estimate.total_cost = t.total_cost;
    estimate.quoted_price = t.quoted_price;
    Ok(())
}
