//! Report generation service.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};
use consolidator_shared::config::AnalyticsConfig;
use consolidator_shared::types::EntityId;
use futures::future::join_all;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::types::{ConsolidatedReport, EntitySummary, Section, SectionStatus};
use crate::cashflow::{CashflowForecaster, CashflowOverview, ForecastScope};
use crate::entity::EntityRegistry;
use crate::error::SectionError;
use crate::ledger::{EntityBook, EntitySnapshot, LedgerSource, Normalizer, QueryWindow};
use crate::overview::{FinancialOverview, OverviewCalculator};
use crate::reconciliation::{ReconciliationEngine, ReconciliationResult};
use crate::vat::{IncompleteReason, VatAnalyzer, VatOverview, VatPeriod};

/// Normalized inputs shared by the engines.
struct Books {
    books: BTreeMap<EntityId, EntityBook>,
    /// Entities whose ledger could not be fetched, in registry order.
    missing: Vec<SectionError>,
    /// Entities whose bank balance is unknown.
    missing_balances: Vec<SectionError>,
    available: usize,
    total: usize,
}

impl Books {
    fn status(&self) -> SectionStatus {
        if self.available == 0 {
            SectionStatus::Unavailable
        } else if self.available < self.total {
            SectionStatus::Partial
        } else {
            SectionStatus::Ok
        }
    }

    fn upstream_diagnostics(&self) -> Vec<String> {
        self.missing.iter().map(ToString::to_string).collect()
    }
}

/// Composes the engines into one consolidated report.
pub struct ReportService;

impl ReportService {
    /// Fetches every entity and builds the report.
    ///
    /// Entity fetches run concurrently. A failing entity degrades the affected
    /// sections; the report itself is always returned.
    pub async fn generate<S>(
        source: &S,
        registry: &EntityRegistry,
        config: &AnalyticsConfig,
        as_of: NaiveDate,
    ) -> ConsolidatedReport
    where
        S: LedgerSource + ?Sized,
    {
        let window = Self::window(as_of, config);
        info!(
            as_of = %as_of,
            from = %window.from,
            to = %window.to,
            entities = registry.entities().len(),
            "Generating consolidated report"
        );

        let snapshots = join_all(
            registry
                .entities()
                .iter()
                .map(|entity| Self::fetch(source, entity.id, window, as_of)),
        )
        .await;

        let report = Self::compose(registry, snapshots, config, as_of);

        for (section, status) in [
            ("overview", report.overview.status),
            ("intercompany", report.intercompany.status),
            ("vat", report.vat.status),
            ("cashflow", report.cashflow.status),
        ] {
            if status != SectionStatus::Ok {
                warn!(report_id = %report.report_id, section, ?status, "Report section degraded");
            }
        }
        info!(
            report_id = %report.report_id,
            status = ?report.overall_status(),
            breaks = report.intercompany.data.as_ref().map_or(0, |r| r.breaks),
            "Consolidated report ready"
        );

        report
    }

    /// The record window a report for `as_of` needs.
    ///
    /// Starts at the previous VAT period or at January 1, whichever is
    /// earlier, so that the sign-reversal rule and the year-to-date overview
    /// have data. Ends at the forecast horizon.
    #[must_use]
    pub fn window(as_of: NaiveDate, config: &AnalyticsConfig) -> QueryWindow {
        let prior_vat = VatPeriod::containing(as_of, config.vat_cadence).previous().start;
        let from = prior_vat.min(OverviewCalculator::year_start(as_of));
        let to = as_of + Days::new(u64::from(config.forecast_horizon_weeks) * 7);
        QueryWindow::new(from, to)
    }

    /// Builds the report from already fetched snapshots.
    ///
    /// Pure apart from the report id. Snapshots of unregistered entities are
    /// ignored; registered entities without a snapshot count as unavailable.
    #[must_use]
    pub fn compose(
        registry: &EntityRegistry,
        snapshots: Vec<EntitySnapshot>,
        config: &AnalyticsConfig,
        as_of: NaiveDate,
    ) -> ConsolidatedReport {
        let books = Self::normalize(registry, snapshots, config);

        let ((overview, intercompany), (vat, cashflow)) = rayon::join(
            || {
                rayon::join(
                    || Self::overview_section(registry, &books, as_of, config),
                    || Self::intercompany_section(registry, &books, as_of, config),
                )
            },
            || {
                rayon::join(
                    || Self::vat_section(registry, &books, as_of, config),
                    || Self::cashflow_section(registry, &books, as_of, config),
                )
            },
        );

        let entities = registry
            .entities()
            .iter()
            .map(|entity| {
                let book = books.books.get(&entity.id);
                EntitySummary {
                    entity: entity.clone(),
                    jurisdiction: entity.jurisdiction(),
                    data_available: book.is_some_and(EntityBook::is_available),
                    bank_balance: book.and_then(EntityBook::bank_balance),
                    bank_accounts: book.map(|b| b.bank_accounts().to_vec()).unwrap_or_default(),
                }
            })
            .collect();

        ConsolidatedReport {
            report_id: Uuid::now_v7(),
            as_of,
            reporting_currency: config.reporting_currency,
            entities,
            overview,
            intercompany,
            vat,
            cashflow,
        }
    }

    async fn fetch<S>(
        source: &S,
        entity: EntityId,
        window: QueryWindow,
        as_of: NaiveDate,
    ) -> EntitySnapshot
    where
        S: LedgerSource + ?Sized,
    {
        let (records, bank_accounts) = futures::join!(
            source.fetch_records(entity, window),
            source.fetch_bank_accounts(entity, as_of)
        );

        match &records {
            Ok(records) => debug!(entity = %entity, count = records.len(), "Fetched ledger records"),
            Err(e) => error!(entity = %entity, error = %e, "Failed to fetch ledger records"),
        }
        if let Err(e) = &bank_accounts {
            warn!(entity = %entity, error = %e, "Failed to fetch bank accounts");
        }

        EntitySnapshot {
            entity_id: entity,
            records,
            bank_accounts,
        }
    }

    fn normalize(
        registry: &EntityRegistry,
        snapshots: Vec<EntitySnapshot>,
        config: &AnalyticsConfig,
    ) -> Books {
        let normalizer = Normalizer::new(config);
        let mut books = BTreeMap::new();
        let mut unconverted_balances = BTreeSet::new();

        for snapshot in snapshots {
            let entity = snapshot.entity_id;
            if !registry.contains(entity) {
                warn!(entity = %entity, "Ignoring snapshot of unregistered entity");
                continue;
            }
            let normalized = normalizer.normalize(snapshot);
            if normalized.duplicates_dropped > 0 {
                debug!(
                    entity = %entity,
                    dropped = normalized.duplicates_dropped,
                    "Dropped duplicate ledger records"
                );
            }
            if normalized.book.is_available() && normalized.book.bank_balance().is_none() {
                // Unconverted accounts stay in their native currency.
                let currency = normalized
                    .book
                    .bank_accounts()
                    .iter()
                    .map(|a| a.balance.currency)
                    .find(|c| *c != config.reporting_currency);
                unconverted_balances.insert((entity, currency));
            }
            books.insert(entity, normalized.book);
        }

        let mut missing = Vec::new();
        let mut missing_balances = Vec::new();
        for entity in registry.entities() {
            match books.get(&entity.id) {
                Some(EntityBook::Unavailable(source)) => {
                    missing.push(SectionError::UpstreamUnavailable {
                        entity: entity.id,
                        source: source.clone(),
                    });
                }
                None => missing.push(SectionError::DataIncomplete {
                    entity: entity.id,
                    detail: "no ledger snapshot".to_string(),
                }),
                Some(EntityBook::Available { .. }) => {}
            }
        }
        for (entity, currency) in unconverted_balances {
            let detail = currency.map_or_else(
                || "bank balance unavailable, opening balance taken as zero".to_string(),
                |c| format!("no {c} rate for the bank balance, opening balance taken as zero"),
            );
            missing_balances.push(SectionError::DataIncomplete { entity, detail });
        }

        let total = registry.entities().len();
        Books {
            available: total - missing.len(),
            total,
            books,
            missing,
            missing_balances,
        }
    }

    fn overview_section(
        registry: &EntityRegistry,
        books: &Books,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Section<FinancialOverview> {
        let mut diagnostics = books.upstream_diagnostics();
        if books.available == 0 {
            return Section::failed(diagnostics);
        }

        match OverviewCalculator::overview(registry, &books.books, as_of, config) {
            Ok(overview) => {
                if overview.consolidated.profit_and_loss.result < Decimal::ZERO {
                    diagnostics.push(format!(
                        "Year-to-date result is negative: {}",
                        overview.consolidated.profit_and_loss.result
                    ));
                }
                Section::with_data(books.status(), overview, diagnostics)
            }
            Err(e) => {
                diagnostics.push(e.to_string());
                Section::failed(diagnostics)
            }
        }
    }

    fn intercompany_section(
        registry: &EntityRegistry,
        books: &Books,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Section<ReconciliationResult> {
        match ReconciliationEngine::reconcile(registry, &books.books, as_of, config) {
            Ok(result) => {
                let mut diagnostics = books.upstream_diagnostics();
                diagnostics.extend(result.positions.iter().filter(|p| p.is_break).map(|p| {
                    format!(
                        "Break between {} and {}: difference {}",
                        registry.label(p.entity_a),
                        registry.label(p.entity_b),
                        p.difference
                    )
                }));
                if !result.group_net.is_zero() {
                    diagnostics.push(format!(
                        "Intercompany positions do not net to zero: {}",
                        result.group_net
                    ));
                }
                Section::with_data(books.status(), result, diagnostics)
            }
            Err(e) => Section::failed(vec![e.to_string()]),
        }
    }

    fn vat_section(
        registry: &EntityRegistry,
        books: &Books,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Section<VatOverview> {
        let overview = VatAnalyzer::overview(registry, &books.books, as_of, config);

        let mut diagnostics = books.upstream_diagnostics();
        let mut incomplete = false;
        for position in &overview.positions {
            let diagnostic = match position.incomplete {
                None | Some(IncompleteReason::UpstreamUnavailable) => None,
                Some(IncompleteReason::NoPeriodData) => Some(SectionError::DataIncomplete {
                    entity: position.entity_id,
                    detail: format!("no VAT entries in {}", overview.period_label),
                }),
                Some(IncompleteReason::MixedCurrency) => Some(SectionError::Configuration(
                    format!(
                        "VAT entries of entity {} are not all in {}",
                        position.entity_id, config.reporting_currency
                    ),
                )),
            };
            incomplete |= position.incomplete.is_some();
            diagnostics.extend(diagnostic.map(|d| d.to_string()));
        }

        let status = match books.status() {
            SectionStatus::Ok if incomplete => SectionStatus::Partial,
            status => status,
        };
        Section::with_data(status, overview, diagnostics)
    }

    fn cashflow_section(
        registry: &EntityRegistry,
        books: &Books,
        as_of: NaiveDate,
        config: &AnalyticsConfig,
    ) -> Section<CashflowOverview> {
        let mut diagnostics = books.upstream_diagnostics();
        if books.available == 0 {
            return Section::failed(diagnostics);
        }
        diagnostics.extend(books.missing_balances.iter().map(ToString::to_string));

        let available: Vec<(EntityId, &EntityBook)> = registry
            .entities()
            .iter()
            .filter_map(|e| books.books.get(&e.id).map(|b| (e.id, b)))
            .filter(|(_, b)| b.is_available())
            .collect();

        let mut entities = Vec::with_capacity(available.len());
        for (id, book) in &available {
            let opening = book.bank_balance().unwrap_or(Decimal::ZERO);
            let records = book.records().unwrap_or_default();
            match CashflowForecaster::forecast(ForecastScope::Entity(*id), records, opening, as_of, config) {
                Ok(forecast) => entities.push(forecast),
                Err(e) => {
                    diagnostics.push(e.to_string());
                    return Section::failed(diagnostics);
                }
            }
        }

        let consolidated_opening: Decimal = entities.iter().map(|f| f.opening_balance).sum();
        let all_records = available
            .iter()
            .filter_map(|(_, b)| b.records())
            .flatten();
        let consolidated = match CashflowForecaster::forecast(
            ForecastScope::Consolidated,
            all_records,
            consolidated_opening,
            as_of,
            config,
        ) {
            Ok(forecast) => forecast,
            Err(e) => {
                diagnostics.push(e.to_string());
                return Section::failed(diagnostics);
            }
        };

        if let Some(week) = consolidated.first_shortfall_week {
            diagnostics.push(format!(
                "Consolidated cash turns negative in week {week} (lowest balance {})",
                consolidated.lowest_running_balance
            ));
        }

        let status = match books.status() {
            SectionStatus::Ok if !books.missing_balances.is_empty() => SectionStatus::Partial,
            status => status,
        };
        Section::with_data(
            status,
            CashflowOverview {
                consolidated,
                entities,
            },
            diagnostics,
        )
    }
}
