//! Report aggregation.
//!
//! These run against the repositories on every cache miss; the cache layer
//! decides when that happens.

use serde::Serialize;

use crate::repository::{
    CustomerRepository, CustomerStatus, DealRepository, DealStage, InvoiceRepository,
    InvoiceStatus,
};
use crate::{CrmError, TenantScope};

#[derive(Debug, Serialize)]
struct StatusCount {
    status: &'static str,
    count: usize,
}

#[derive(Debug, Serialize)]
struct CustomersReport {
    total: usize,
    by_status: Vec<StatusCount>,
}

/// Customer base broken down by lifecycle status.
pub async fn customers_report(
    customers: &dyn CustomerRepository,
    scope: &TenantScope,
) -> Result<serde_json::Value, CrmError> {
    let rows = customers.list(scope).await?;

    let count_of = |status: CustomerStatus| rows.iter().filter(|c| c.status == status).count();

    let report = CustomersReport {
        total: rows.len(),
        by_status: vec![
            StatusCount { status: CustomerStatus::Lead.as_str(), count: count_of(CustomerStatus::Lead) },
            StatusCount { status: CustomerStatus::Prospect.as_str(), count: count_of(CustomerStatus::Prospect) },
            StatusCount { status: CustomerStatus::Active.as_str(), count: count_of(CustomerStatus::Active) },
            StatusCount { status: CustomerStatus::Churned.as_str(), count: count_of(CustomerStatus::Churned) },
        ],
    };

    serde_json::to_value(report).map_err(|e| CrmError::DatabaseError(e.to_string()))
}

#[derive(Debug, Serialize)]
struct StageTotal {
    stage: &'static str,
    count: usize,
    value_cents: i64,
}

#[derive(Debug, Serialize)]
struct SalesReport {
    pipeline: Vec<StageTotal>,
    open_value_cents: i64,
    won_value_cents: i64,
    invoiced_cents: i64,
    paid_cents: i64,
}

/// Deal pipeline totals plus invoice totals.
pub async fn sales_report(
    deals: &dyn DealRepository,
    invoices: &dyn InvoiceRepository,
    scope: &TenantScope,
) -> Result<serde_json::Value, CrmError> {
    let deal_rows = deals.list(scope).await?;
    let invoice_rows = invoices.list(scope).await?;

    let stage_total = |stage: DealStage| {
        let matching = deal_rows.iter().filter(|d| d.stage == stage);
        StageTotal {
            stage: stage.as_str(),
            count: matching.clone().count(),
            value_cents: matching.map(|d| d.value_cents).sum(),
        }
    };

    let open_value_cents = deal_rows
        .iter()
        .filter(|d| !d.stage.is_terminal())
        .map(|d| d.value_cents)
        .sum();
    let won_value_cents = deal_rows
        .iter()
        .filter(|d| d.stage == DealStage::Won)
        .map(|d| d.value_cents)
        .sum();
    let invoiced_cents = invoice_rows
        .iter()
        .filter(|i| i.status != InvoiceStatus::Draft && i.status != InvoiceStatus::Void)
        .map(|i| i.total_cents)
        .sum();
    let paid_cents = invoice_rows
        .iter()
        .filter(|i| i.status == InvoiceStatus::Paid)
        .map(|i| i.total_cents)
        .sum();

    let report = SalesReport {
        pipeline: vec![
            stage_total(DealStage::Qualification),
            stage_total(DealStage::Proposal),
            stage_total(DealStage::Negotiation),
            stage_total(DealStage::Won),
            stage_total(DealStage::Lost),
        ],
        open_value_cents,
        won_value_cents,
        invoiced_cents,
        paid_cents,
    };

    serde_json::to_value(report).map_err(|e| CrmError::DatabaseError(e.to_string()))
}

#[derive(Debug, Serialize)]
struct ProductTotal {
    product: String,
    deals: usize,
    won_value_cents: i64,
}

#[derive(Debug, Serialize)]
struct ProductsReport {
    products: Vec<ProductTotal>,
}

/// Deal volume and won value per product, best sellers first.
pub async fn products_report(
    deals: &dyn DealRepository,
    scope: &TenantScope,
) -> Result<serde_json::Value, CrmError> {
    let rows = deals.list(scope).await?;

    let mut totals: Vec<ProductTotal> = Vec::new();
    for deal in &rows {
        let product = deal.product.clone().unwrap_or_else(|| "(unspecified)".to_owned());
        let won = if deal.stage == DealStage::Won {
            deal.value_cents
        } else {
            0
        };

        match totals.iter_mut().find(|t| t.product == product) {
            Some(total) => {
                total.deals += 1;
                total.won_value_cents += won;
            }
            None => totals.push(ProductTotal {
                product,
                deals: 1,
                won_value_cents: won,
            }),
        }
    }

    totals.sort_by(|a, b| b.won_value_cents.cmp(&a.won_value_cents));

    serde_json::to_value(ProductsReport { products: totals })
        .map_err(|e| CrmError::DatabaseError(e.to_string()))
}
